//! Built-in missions that keep the service usable without a mission bank file.

use crate::domain::{
  Difficulty, Email, Mission, MissionContent, NetworkQuestion, OsintProfile, OsintQuestion, ProfilePost, QuestionKind,
};

fn email(subject: &str, sender: &str, body: &str, is_phishing: bool, explanation: &str, red_flags: &[&str]) -> Email {
  Email {
    subject: subject.into(),
    sender: sender.into(),
    body: body.into(),
    is_phishing,
    explanation: explanation.into(),
    red_flags: red_flags.iter().map(|s| s.to_string()).collect(),
  }
}

fn choice(text: &str, options: &[&str], correct: &str, explanation: &str) -> NetworkQuestion {
  NetworkQuestion {
    text: text.into(),
    kind: QuestionKind::MultipleChoice,
    options: options.iter().map(|s| s.to_string()).collect(),
    correct_answer: correct.into(),
    explanation: explanation.into(),
  }
}

fn ask(text: &str, correct: &str, explanation: &str) -> OsintQuestion {
  OsintQuestion { text: text.into(), correct_answer: correct.into(), explanation: explanation.into() }
}

fn post(content: &str, timestamp: &str, location: &str) -> ProfilePost {
  ProfilePost { content: content.into(), timestamp: Some(timestamp.into()), location: Some(location.into()) }
}

pub fn seed_missions() -> Vec<Mission> {
  vec![
    Mission {
      id: "phishing-inbox-101".into(),
      title: "Spot the Phish: Email Inbox Challenge".into(),
      difficulty: Difficulty::Easy,
      description: "Review these emails and identify which ones are phishing attempts.".into(),
      story: None,
      xp_reward: 20,
      content: MissionContent::Phishing {
        emails: vec![
          email(
            "Your account has been suspended",
            "security@amazon.com",
            "We have detected unusual activity on your account. Verify your identity: http://amazon-verify-now.com\n\nIf you do not act within 24 hours, your account will be permanently closed.",
            true,
            "The link uses a look-alike domain, the message creates urgency with a deadline, and the greeting is generic.",
            &["Suspicious domain in link", "Urgent tone with deadline", "Generic greeting"],
          ),
          email(
            "Order Confirmation #12345",
            "noreply@amazon.com",
            "Order #12345 has been confirmed. Track it in your account: https://amazon.com/orders",
            false,
            "Official domain, specific order details and no pressure to act.",
            &[],
          ),
          email(
            "URGENT: Verify Your PayPal Account",
            "paypal-security@paypalsecurity.net",
            "Your PayPal account will be limited in 48 hours unless you verify your information: http://paypalsecurity.net/verify",
            true,
            "paypalsecurity.net is not paypal.com, and the message threatens account limitation.",
            &["Fake sender domain", "Urgent/threatening language", "Suspicious link"],
          ),
          email(
            "Password Reset Request",
            "noreply@github.com",
            "We received a request to reset your password: https://github.com/password-reset?token=abc123\n\nIf you did not request this, ignore this email.",
            false,
            "Official github.com domain and an explicit option to ignore the request.",
            &[],
          ),
          email(
            "You Won $10,000! Claim Now!",
            "winner@lottery-prize.com",
            "Congratulations! Claim your prize within 24 hours: http://claim-prize-now.com",
            true,
            "Unrealistic prize, suspicious domain and false urgency.",
            &["Too good to be true", "Suspicious domain", "Urgent deadline"],
          ),
        ],
      },
    },
    Mission {
      id: "network-basics".into(),
      title: "Network Security Basics".into(),
      difficulty: Difficulty::Easy,
      description: "Test your knowledge of basic network security concepts.".into(),
      story: None,
      xp_reward: 25,
      content: MissionContent::Network {
        questions: vec![
          choice(
            "Which port should you close to reduce attack surface on a web server that only serves HTTPS?",
            &["Port 22 (SSH)", "Port 80 (HTTP)", "Port 443 (HTTPS)", "Port 3389 (RDP)"],
            "Port 80 (HTTP)",
            "A server that only serves HTTPS on 443 has no need for plain HTTP on port 80.",
          ),
          choice(
            "Which password policy is more secure?",
            &[
              "Password must be 8 characters with uppercase, lowercase, and numbers",
              "Password must be 12+ characters with complexity requirements",
              "Password must be 6 characters, any characters allowed",
              "No password policy",
            ],
            "Password must be 12+ characters with complexity requirements",
            "Length matters more than complexity alone.",
          ),
          choice(
            "What is the primary purpose of a firewall?",
            &[
              "To encrypt data in transit",
              "To control incoming and outgoing network traffic",
              "To store passwords securely",
              "To scan for viruses",
            ],
            "To control incoming and outgoing network traffic",
            "A firewall filters traffic between networks based on security rules.",
          ),
        ],
      },
    },
    Mission {
      id: "network-advanced".into(),
      title: "Advanced Network Configuration".into(),
      difficulty: Difficulty::Hard,
      description: "Advanced scenarios for network security configuration.".into(),
      story: None,
      xp_reward: 50,
      content: MissionContent::Network {
        questions: vec![
          choice(
            "Ports 22, 80, 443 and 3306 are open. Which one poses the highest risk if exposed to the internet?",
            &["Port 22 (SSH)", "Port 80 (HTTP)", "Port 443 (HTTPS)", "Port 3306 (MySQL)"],
            "Port 3306 (MySQL)",
            "Database servers should only be reachable from internal networks.",
          ),
          choice(
            "Which configuration is safest for a public-facing web server?",
            &[
              "Open all ports, allow all traffic",
              "Only open ports 80 and 443, firewall blocks everything else",
              "Open port 22 without key authentication",
              "Disable firewall completely",
            ],
            "Only open ports 80 and 443, firewall blocks everything else",
            "Expose only what the service needs and block the rest.",
          ),
        ],
      },
    },
    Mission {
      id: "osint-oversharing".into(),
      title: "Privacy Awareness: Social Media Oversharing".into(),
      difficulty: Difficulty::Easy,
      description: "Analyze this simulated social media profile and identify privacy risks.".into(),
      story: None,
      xp_reward: 30,
      content: MissionContent::Osint {
        profile: OsintProfile {
          name: "Alex Johnson".into(),
          image: None,
          bio: "Software developer, coffee enthusiast, living in San Francisco".into(),
          posts: vec![
            post("Just moved to my new apartment at 123 Main St, San Francisco!", "2024-01-15", "San Francisco, CA"),
            post("Birthday dinner tonight at 7pm! Turning 25 today!", "2024-02-10", "San Francisco, CA"),
            post("Working from home today. My home office setup is amazing!", "2024-01-20", "San Francisco, CA"),
          ],
        },
        questions: vec![
          ask(
            "Which information should Alex NOT share publicly?",
            "Home address (123 Main St)",
            "A public home address enables stalking, burglary and other physical threats.",
          ),
          ask(
            "What risk does sharing your birthday publicly create?",
            "Identity theft and account recovery attacks",
            "Birthdays are common verification data for account recovery.",
          ),
          ask(
            "Why is it risky to post about working from home?",
            "It signals when your home is empty, making it a target",
            "Routine posts tell burglars when a home is likely empty.",
          ),
        ],
      },
    },
    Mission {
      id: "osint-breadcrumbs".into(),
      title: "Mission 6: The Digital Breadcrumbs".into(),
      difficulty: Difficulty::Medium,
      description: "Track ZeroCool using nothing but public information.".into(),
      story: Some(
        "ShadowByte's leader posted a photo of a coffee shop with a unique statue in the background ten minutes ago.".into(),
      ),
      xp_reward: 40,
      content: MissionContent::Osint {
        profile: OsintProfile {
          name: "ZeroCool".into(),
          image: None,
          bio: "Digital Ghost".into(),
          posts: vec![],
        },
        questions: vec![
          ask(
            "Geolocating a public photo of a statue is what type of intelligence gathering? (Enter the acronym)",
            "OSINT",
            "Open Source Intelligence uses publicly available information.",
          ),
          ask(
            "Which tool allows you to see historical versions of a website?",
            "Wayback Machine",
            "The Internet Archive's Wayback Machine stores historical snapshots of websites.",
          ),
          ask(
            "Which tool checks where a username is registered across social sites?",
            "Sherlock",
            "Sherlock hunts usernames across hundreds of social networks.",
          ),
        ],
      },
    },
  ]
}

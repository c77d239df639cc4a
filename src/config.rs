//! Loading the mission bank from TOML.
//!
//! See `MissionBank` and `MissionCfg` for the expected schema. Entries that do not
//! describe a gradable mission are logged and skipped; the rest of the bank loads.

use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{
  Category, Difficulty, Email, Mission, MissionContent, NetworkQuestion, OsintProfile, OsintQuestion,
};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct MissionBank {
  #[serde(default)]
  pub missions: Vec<MissionCfg>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ScenarioCfg {
  #[serde(default)] pub profile: OsintProfile,
  #[serde(default)] pub questions: Vec<OsintQuestion>,
}

/// Mission entry accepted in TOML configuration.
/// Exactly one answer-key branch (emails / questions / scenario) must match `category`.
#[derive(Clone, Debug, Deserialize)]
pub struct MissionCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  pub category: Category,
  pub difficulty: Difficulty,
  #[serde(default)] pub description: String,
  #[serde(default)] pub story: Option<String>,
  pub xp_reward: u32,
  // phishing
  #[serde(default)] pub emails: Option<Vec<Email>>,
  // network
  #[serde(default)] pub questions: Option<Vec<NetworkQuestion>>,
  // osint
  #[serde(default)] pub scenario: Option<ScenarioCfg>,
}

impl MissionCfg {
  /// Turn a bank entry into a `Mission`, or explain why it cannot be graded.
  pub fn into_mission(self) -> Result<Mission, String> {
    if self.xp_reward == 0 {
      return Err("xp_reward must be positive".into());
    }

    let content = match (self.category, self.emails, self.questions, self.scenario) {
      (Category::Phishing, Some(emails), None, None) if !emails.is_empty() => MissionContent::Phishing { emails },
      (Category::Network, None, Some(questions), None) if !questions.is_empty() => {
        MissionContent::Network { questions }
      }
      (Category::Osint, None, None, Some(s)) if !s.questions.is_empty() => {
        MissionContent::Osint { profile: s.profile, questions: s.questions }
      }
      (category, ..) => {
        return Err(format!(
          "category '{category}' needs exactly one non-empty answer key ({})",
          match category {
            Category::Phishing => "emails",
            Category::Network => "questions",
            Category::Osint => "scenario.questions",
          }
        ))
      }
    };

    Ok(Mission {
      id: self.id.filter(|s| !s.trim().is_empty()).unwrap_or_else(|| Uuid::new_v4().to_string()),
      title: self.title,
      difficulty: self.difficulty,
      description: self.description,
      story: self.story,
      xp_reward: self.xp_reward,
      content,
    })
  }
}

/// Parse a TOML bank, dropping (and logging) entries that fail validation.
pub fn parse_mission_bank(src: &str) -> Result<Vec<Mission>, toml::de::Error> {
  let bank: MissionBank = toml::from_str(src)?;
  let mut out = Vec::with_capacity(bank.missions.len());
  for (pos, cfg) in bank.missions.into_iter().enumerate() {
    let title = cfg.title.clone();
    match cfg.into_mission() {
      Ok(m) => out.push(m),
      Err(reason) => {
        error!(target: "mission", pos, %title, %reason, "Skipping bank mission");
      }
    }
  }
  Ok(out)
}

/// Load missions from MISSION_BANK_PATH. On any IO/parse error, returns an empty bank.
pub fn load_mission_bank_from_env() -> Vec<Mission> {
  let Ok(path) = std::env::var("MISSION_BANK_PATH") else {
    return Vec::new();
  };
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_mission_bank(&s) {
      Ok(missions) => {
        info!(target: "cyberquest", %path, count = missions.len(), "Loaded mission bank (TOML)");
        missions
      }
      Err(e) => {
        error!(target: "cyberquest", %path, error = %e, "Failed to parse mission bank");
        Vec::new()
      }
    },
    Err(e) => {
      error!(target: "cyberquest", %path, error = %e, "Failed to read mission bank file");
      Vec::new()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const BANK: &str = r#"
[[missions]]
id = "net-ports"
title = "Ports"
category = "network"
difficulty = "medium"
xp_reward = 30

[[missions.questions]]
question = "Which port does HTTPS use?"
options = ["80", "443"]
correct_answer = "443"
explanation = "TLS on 443."

[[missions]]
title = "Inbox"
category = "phishing"
difficulty = "easy"
xp_reward = 10

[[missions.emails]]
subject = "Hi"
sender = "boss@corp.example"
body = "Wire me money"
is_phishing = true
red_flags = ["Urgency"]

[[missions]]
id = "osint-1"
title = "Profile"
category = "osint"
difficulty = "hard"
xp_reward = 15

[missions.scenario.profile]
name = "Sam"
bio = "Student"

[[missions.scenario.questions]]
text = "Which tool shows old websites?"
correct_answer = "Wayback Machine"
"#;

  #[test]
  fn parses_all_three_shapes() {
    let missions = parse_mission_bank(BANK).expect("bank parses");
    assert_eq!(missions.len(), 3);
    assert_eq!(missions[0].id, "net-ports");
    assert_eq!(missions[0].category(), Category::Network);
    assert_eq!(missions[1].category(), Category::Phishing);
    assert!(!missions[1].id.is_empty(), "missing id gets a generated one");
    match &missions[2].content {
      MissionContent::Osint { profile, questions } => {
        assert_eq!(profile.name, "Sam");
        assert_eq!(questions[0].correct_answer, "Wayback Machine");
      }
      other => panic!("unexpected content {other:?}"),
    }
  }

  #[test]
  fn skips_entries_without_a_matching_key() {
    let src = r#"
[[missions]]
title = "Wrong shape"
category = "phishing"
difficulty = "easy"
xp_reward = 10
[[missions.questions]]
text = "q"
options = ["a"]
correct_answer = "a"

[[missions]]
title = "No reward"
category = "network"
difficulty = "easy"
xp_reward = 0
[[missions.questions]]
text = "q"
options = ["a"]
correct_answer = "a"

[[missions]]
title = "Empty key"
category = "network"
difficulty = "easy"
xp_reward = 5
questions = []
"#;
    assert!(parse_mission_bank(src).expect("parses").is_empty());
  }

  #[test]
  fn rejects_unknown_category() {
    let src = r#"
[[missions]]
title = "Bad"
category = "crypto"
difficulty = "easy"
xp_reward = 5
"#;
    assert!(parse_mission_bank(src).is_err());
  }
}

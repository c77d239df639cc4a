//! Domain models used by the backend: missions (one answer-key shape per category),
//! badges, and the per-user progression record.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Mission category. Closed set; each one has its own answer-key shape.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Phishing,
  Network,
  Osint,
}

impl Category {
  pub const ALL: [Category; 3] = [Category::Phishing, Category::Network, Category::Osint];

  pub fn as_str(self) -> &'static str {
    match self {
      Category::Phishing => "phishing",
      Category::Network => "network",
      Category::Osint => "osint",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|c| c.as_str() == s)
  }

  /// Badge granted once enough missions of this category are completed.
  pub fn badge(self) -> Badge {
    match self {
      Category::Phishing => Badge::PhishingHunter,
      Category::Network => Badge::NetworkNinja,
      Category::Osint => Badge::OsintDetective,
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Informational only; never affects grading math.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
      .into_iter()
      .find(|d| d.as_str() == s)
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
  PhishingHunter,
  NetworkNinja,
  OsintDetective,
}

// ---------- Answer keys ----------

#[derive(Clone, Debug, Deserialize)]
pub struct Email {
  pub subject: String,
  pub sender: String,
  pub body: String,
  pub is_phishing: bool,
  #[serde(default)] pub explanation: String,
  #[serde(default)] pub red_flags: Vec<String>,
}

/// How a network question is presented. Display only; grading is always exact match.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
  #[default]
  MultipleChoice,
  DragDrop,
  Matching,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NetworkQuestion {
  #[serde(alias = "question")] pub text: String,
  #[serde(default)] pub kind: QuestionKind,
  pub options: Vec<String>,
  pub correct_answer: String,
  #[serde(default)] pub explanation: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OsintQuestion {
  #[serde(alias = "question")] pub text: String,
  pub correct_answer: String,
  #[serde(default)] pub explanation: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfilePost {
  pub content: String,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub timestamp: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub location: Option<String>,
}

/// Simulated social profile shown alongside an OSINT scenario. Not graded.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OsintProfile {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub image: Option<String>,
  #[serde(default)] pub bio: String,
  #[serde(default)] pub posts: Vec<ProfilePost>,
}

/// Category-specific payload. The variant *is* the category.
#[derive(Clone, Debug)]
pub enum MissionContent {
  Phishing { emails: Vec<Email> },
  Network { questions: Vec<NetworkQuestion> },
  Osint { profile: OsintProfile, questions: Vec<OsintQuestion> },
}

impl MissionContent {
  pub fn category(&self) -> Category {
    match self {
      MissionContent::Phishing { .. } => Category::Phishing,
      MissionContent::Network { .. } => Category::Network,
      MissionContent::Osint { .. } => Category::Osint,
    }
  }

  /// Number of gradable items in the answer key.
  pub fn len(&self) -> usize {
    match self {
      MissionContent::Phishing { emails } => emails.len(),
      MissionContent::Network { questions } => questions.len(),
      MissionContent::Osint { questions, .. } => questions.len(),
    }
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Immutable once authored.
#[derive(Clone, Debug)]
pub struct Mission {
  pub id: String,
  pub title: String,
  pub difficulty: Difficulty,
  pub description: String,
  pub story: Option<String>,
  /// Maximum XP for a perfect score; always > 0.
  pub xp_reward: u32,
  pub content: MissionContent,
}

impl Mission {
  pub fn category(&self) -> Category { self.content.category() }
}

// ---------- Users & progression ----------

/// One ledger entry. The mission category is copied in at append time so badge
/// counting never needs a catalog lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletedMission {
  pub mission_id: String,
  pub category: Category,
  pub completed_at: DateTime<Utc>,
  /// Percentage, 0..=100.
  pub score: f64,
  pub xp_earned: u32,
}

#[derive(Clone, Debug)]
pub struct User {
  pub id: String,
  pub name: String,
  pub email: String,
  pub created_at: DateTime<Utc>,

  pub xp: u64,
  /// Always `xp / XP_PER_LEVEL + 1`; only `progression` writes it.
  pub level: u32,
  pub completed_missions: Vec<CompletedMission>,
  pub badges: Vec<Badge>,
  pub streak: u32,
  /// UTC calendar date of the last day a mission was newly completed.
  pub last_mission_date: Option<NaiveDate>,

  /// Bumped by the store on every committed write.
  pub version: u64,
}

impl User {
  pub fn new(id: String, name: String, email: String, now: DateTime<Utc>) -> Self {
    Self {
      id,
      name,
      email,
      created_at: now,
      xp: 0,
      level: 1,
      completed_missions: Vec::new(),
      badges: Vec::new(),
      streak: 0,
      last_mission_date: None,
      version: 0,
    }
  }

  pub fn has_completed(&self, mission_id: &str) -> bool {
    self.completed_missions.iter().any(|m| m.mission_id == mission_id)
  }

  pub fn completed_in(&self, category: Category) -> usize {
    self.completed_missions.iter().filter(|m| m.category == category).count()
  }
}

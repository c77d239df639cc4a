//! Grading engine: scores an answer set against a mission's answer key.
//!
//! Pure and deterministic. `answers[i]` is matched to the i-th item of the key;
//! the orchestrator validates count and blanks before calling in here.

use serde::Serialize;

use crate::domain::{Mission, MissionContent};
use crate::error::AppError;

pub const PHISHING_TOKEN: &str = "phishing";
pub const SAFE_TOKEN: &str = "safe";

/// Feedback for one answer-key item.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
  pub index: usize,
  pub correct: bool,
  pub explanation: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub red_flags: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GradingResult {
  pub score: usize,
  pub total: usize,
  /// `score / total * 100`.
  pub percentage: f64,
  pub xp_earned: u32,
  pub results: Vec<ItemResult>,
}

/// Expected token for an email classification.
fn verdict_token(is_phishing: bool) -> &'static str {
  if is_phishing { PHISHING_TOKEN } else { SAFE_TOKEN }
}

/// Strict identity comparison: case-sensitive, no trimming.
fn is_exact(answer: Option<&String>, expected: &str) -> bool {
  answer.map(|a| a.as_str() == expected).unwrap_or(false)
}

pub fn grade(mission: &Mission, answers: &[String]) -> Result<GradingResult, AppError> {
  if mission.content.is_empty() {
    return Err(AppError::InvalidMission(format!(
      "mission {} ({}) has an empty answer key",
      mission.id,
      mission.category()
    )));
  }

  let results: Vec<ItemResult> = match &mission.content {
    MissionContent::Phishing { emails } => emails
      .iter()
      .enumerate()
      .map(|(index, email)| ItemResult {
        index,
        correct: is_exact(answers.get(index), verdict_token(email.is_phishing)),
        explanation: email.explanation.clone(),
        red_flags: Some(email.red_flags.clone()),
      })
      .collect(),
    MissionContent::Network { questions } => questions
      .iter()
      .enumerate()
      .map(|(index, q)| ItemResult {
        index,
        correct: is_exact(answers.get(index), &q.correct_answer),
        explanation: q.explanation.clone(),
        red_flags: None,
      })
      .collect(),
    MissionContent::Osint { questions, .. } => questions
      .iter()
      .enumerate()
      .map(|(index, q)| ItemResult {
        index,
        correct: is_exact(answers.get(index), &q.correct_answer),
        explanation: q.explanation.clone(),
        red_flags: None,
      })
      .collect(),
  };

  let total = results.len();
  let score = results.iter().filter(|r| r.correct).count();
  let percentage = (score as f64 / total as f64) * 100.0;
  // Integer floor of xp_reward * score / total, i.e. floor(xp_reward * percentage / 100)
  // without float rounding.
  let xp_earned = (u64::from(mission.xp_reward) * score as u64 / total as u64) as u32;

  Ok(GradingResult { score, total, percentage, xp_earned, results })
}

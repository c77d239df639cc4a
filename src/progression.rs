//! Progression ledger rules: XP, level, streak and badges.
//!
//! `apply_completion` mutates an in-memory `User`; making that mutation durable
//! and race-free is the store's job (`UserStore::commit_completion`).
//!
//! Streak days are UTC calendar dates.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::domain::{Badge, Category, CompletedMission, Mission, User};
use crate::grading::GradingResult;

pub const XP_PER_LEVEL: u64 = 100;
/// Completed missions of one category needed for its badge.
pub const BADGE_THRESHOLD: usize = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateOutcome {
  pub already_completed: bool,
  pub xp_earned: u32,
  pub new_level: u32,
  pub new_badges: Vec<Badge>,
  pub new_streak: u32,
}

pub fn level_for(xp: u64) -> u32 {
  u32::try_from(xp / XP_PER_LEVEL).unwrap_or(u32::MAX - 1) + 1
}

/// Only the first completion of a calendar day moves the streak.
fn update_streak(user: &mut User, today: NaiveDate) {
  match user.last_mission_date {
    Some(last) if last >= today => {}
    last => {
      let continues = last.is_some() && last == today.pred_opt();
      user.streak = if continues { user.streak + 1 } else { 1 };
      user.last_mission_date = Some(today);
    }
  }
}

fn award_badges(user: &mut User) -> Vec<Badge> {
  let mut granted = Vec::new();
  for category in Category::ALL {
    let badge = category.badge();
    if user.completed_in(category) >= BADGE_THRESHOLD && !user.badges.contains(&badge) {
      user.badges.push(badge);
      granted.push(badge);
    }
  }
  granted
}

/// Apply a graded completion to `user`. A mission already in the ledger leaves
/// the user untouched and reports `already_completed`.
pub fn apply_completion(
  user: &mut User,
  mission: &Mission,
  grading: &GradingResult,
  now: DateTime<Utc>,
) -> UpdateOutcome {
  if user.has_completed(&mission.id) {
    debug!(target: "progress", user = %user.id, mission = %mission.id, "Mission already completed; no XP");
    return UpdateOutcome {
      already_completed: true,
      xp_earned: 0,
      new_level: user.level,
      new_badges: Vec::new(),
      new_streak: user.streak,
    };
  }

  user.xp += u64::from(grading.xp_earned);
  user.level = level_for(user.xp);

  user.completed_missions.push(CompletedMission {
    mission_id: mission.id.clone(),
    category: mission.category(),
    completed_at: now,
    score: grading.percentage,
    xp_earned: grading.xp_earned,
  });

  update_streak(user, now.date_naive());
  let new_badges = award_badges(user);

  info!(
    target: "progress",
    user = %user.id,
    mission = %mission.id,
    xp_earned = grading.xp_earned,
    xp = user.xp,
    level = user.level,
    streak = user.streak,
    new_badges = new_badges.len(),
    "Completion applied"
  );

  UpdateOutcome {
    already_completed: false,
    xp_earned: grading.xp_earned,
    new_level: user.level,
    new_badges,
    new_streak: user.streak,
  }
}

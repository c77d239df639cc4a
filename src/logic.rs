//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Mission submission: validate, grade, apply progression, commit atomically
//!   - Progress and profile views
//!   - Registering a progression record for a new account

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::{Category, Mission, User};
use crate::error::AppError;
use crate::grading::{grade, GradingResult};
use crate::progression::{apply_completion, UpdateOutcome};
use crate::protocol::{CategoryCounts, CompletedMissionOut, ProfileOut, ProgressOut, RegisterIn, SubmitOut};
use crate::state::AppState;
use crate::util::{is_blank, normalize_email, trunc_for_log};

pub const ALREADY_COMPLETED_MESSAGE: &str = "Mission already completed. No XP awarded.";

/// A mission with no answer key is a catalog fault, never the client's.
fn ensure_gradable(mission: &Mission) -> Result<(), AppError> {
  if mission.content.is_empty() {
    error!(target: "mission", id = %mission.id, title = %trunc_for_log(&mission.title, 64), "Mission has an empty answer key");
    return Err(AppError::InvalidMission(format!("mission {} has an empty answer key", mission.id)));
  }
  Ok(())
}

/// One non-blank answer per answer-key item.
fn validate_answers(mission: &Mission, answers: Vec<Option<String>>) -> Result<Vec<String>, AppError> {
  let expected = mission.content.len();
  if answers.len() != expected {
    return Err(AppError::Validation(format!(
      "Expected {expected} answers, got {}",
      answers.len()
    )));
  }
  answers
    .into_iter()
    .enumerate()
    .map(|(i, a)| match a {
      Some(s) if !is_blank(&s) => Ok(s),
      _ => Err(AppError::Validation(format!("Answer {} is missing", i + 1))),
    })
    .collect()
}

fn compose_response(grading: &GradingResult, outcome: UpdateOutcome) -> SubmitOut {
  if outcome.already_completed {
    return SubmitOut {
      score: grading.percentage,
      xp_earned: 0,
      results: grading.results.clone(),
      already_completed: true,
      new_level: None,
      new_badges: None,
      streak: None,
      message: Some(ALREADY_COMPLETED_MESSAGE.into()),
    };
  }
  let message = if outcome.new_badges.is_empty() {
    None
  } else {
    Some(format!("Congratulations! You earned {} new badge(s)!", outcome.new_badges.len()))
  };
  SubmitOut {
    score: grading.percentage,
    xp_earned: outcome.xp_earned,
    results: grading.results.clone(),
    already_completed: false,
    new_level: Some(outcome.new_level),
    new_badges: Some(outcome.new_badges),
    streak: Some(outcome.new_streak),
    message,
  }
}

/// Grade a submission and credit it to the user at most once.
///
/// Nothing is written unless the whole update (XP, ledger entry, streak, badges)
/// commits as one record swap. Writers for the same user are serialized, so
/// concurrent submissions of different missions all land.
#[instrument(level = "info", skip(state, answers, now), fields(answers = answers.len()))]
pub async fn submit(
  state: &AppState,
  user_id: &str,
  mission_id: &str,
  answers: Vec<Option<String>>,
  now: DateTime<Utc>,
) -> Result<SubmitOut, AppError> {
  let mission = state
    .catalog
    .find_by_id(mission_id)
    .ok_or_else(|| AppError::mission_not_found(mission_id))?;

  ensure_gradable(mission)?;
  let answers = validate_answers(mission, answers)?;
  let grading = grade(mission, &answers)?;
  info!(
    target: "mission",
    id = %mission.id,
    category = %mission.category(),
    score = grading.score,
    total = grading.total,
    xp = grading.xp_earned,
    "Submission graded"
  );

  let _writer = state.users.lock_user(user_id).await?;
  let snapshot = state.users.load_by_id(user_id).await?;
  credit(state, snapshot, mission, &grading, now).await
}

/// Apply and commit a graded submission starting from `user`.
///
/// A lost conditional commit means another write landed first: re-read and
/// apply again. If the winner credited this mission, the re-read answers
/// "already completed". Every conflict implies a committed write, so this
/// always makes progress.
async fn credit(
  state: &AppState,
  mut user: User,
  mission: &Mission,
  grading: &GradingResult,
  now: DateTime<Utc>,
) -> Result<SubmitOut, AppError> {
  let user_id = user.id.clone();
  let mut attempt = 1u32;
  loop {
    let read_version = user.version;
    let outcome = apply_completion(&mut user, mission, grading, now);
    if outcome.already_completed {
      return Ok(compose_response(grading, outcome));
    }
    match state.users.commit_completion(user, read_version, &mission.id).await {
      Ok(saved) => {
        debug!(target: "progress", user = %saved.id, mission = %mission.id, version = saved.version, "Completion committed");
        return Ok(compose_response(grading, outcome));
      }
      Err(AppError::ConcurrentUpdateConflict) => {
        warn!(target: "progress", %user_id, mission = %mission.id, attempt, "Re-reading after commit conflict");
        attempt += 1;
      }
      Err(e) => return Err(e),
    }
    user = state.users.load_by_id(&user_id).await?;
  }
}

fn category_counts(user: &User) -> CategoryCounts {
  CategoryCounts {
    phishing: user.completed_in(Category::Phishing),
    network: user.completed_in(Category::Network),
    osint: user.completed_in(Category::Osint),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn get_progress(state: &AppState, user_id: &str) -> Result<ProgressOut, AppError> {
  let user = state.users.load_by_id(user_id).await?;
  let list = user
    .completed_missions
    .iter()
    .map(|c| {
      let mission = state.catalog.find_by_id(&c.mission_id);
      CompletedMissionOut {
        mission_id: c.mission_id.clone(),
        category: c.category,
        completed_at: c.completed_at,
        score: c.score,
        xp_earned: c.xp_earned,
        title: mission.map(|m| m.title.clone()),
        difficulty: mission.map(|m| m.difficulty),
      }
    })
    .collect();

  Ok(ProgressOut {
    xp: user.xp,
    level: user.level,
    badges: user.badges.clone(),
    completed_missions: user.completed_missions.len(),
    streak: user.streak,
    category_counts: category_counts(&user),
    completed_missions_list: list,
  })
}

fn to_profile_out(user: User) -> ProfileOut {
  ProfileOut {
    completed_missions: user.completed_missions.len(),
    id: user.id,
    name: user.name,
    email: user.email,
    xp: user.xp,
    level: user.level,
    badges: user.badges,
    streak: user.streak,
    joined_at: user.created_at,
  }
}

#[instrument(level = "info", skip(state))]
pub async fn get_profile(state: &AppState, user_id: &str) -> Result<ProfileOut, AppError> {
  state.users.load_by_id(user_id).await.map(to_profile_out)
}

/// Create the progression record for a newly signed-up account.
#[instrument(level = "info", skip(state, body, now))]
pub async fn register(state: &AppState, body: RegisterIn, now: DateTime<Utc>) -> Result<ProfileOut, AppError> {
  let name = body.name.trim().to_string();
  if name.is_empty() {
    return Err(AppError::Validation("Please provide a name".into()));
  }
  let email = normalize_email(&body.email);
  if email.is_empty() || !email.contains('@') {
    return Err(AppError::Validation("Please provide an email".into()));
  }
  let user = state.users.create(name, email, now).await?;
  info!(target: "cyberquest", user = %user.id, "User registered");
  Ok(to_profile_out(user))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};

  use crate::catalog::MissionCatalog;
  use crate::domain::{Badge, Difficulty, Email, MissionContent, NetworkQuestion, QuestionKind};
  use crate::seeds::seed_missions;

  fn network(id: &str, xp_reward: u32, answers: &[&str]) -> Mission {
    Mission {
      id: id.into(),
      title: format!("Network {id}"),
      difficulty: Difficulty::Medium,
      description: String::new(),
      story: None,
      xp_reward,
      content: MissionContent::Network {
        questions: answers
          .iter()
          .map(|a| NetworkQuestion {
            text: "q".into(),
            kind: QuestionKind::MultipleChoice,
            options: vec![a.to_string(), "wrong".into()],
            correct_answer: a.to_string(),
            explanation: format!("it is {a}"),
          })
          .collect(),
      },
    }
  }

  fn test_state() -> AppState {
    let mut bank: Vec<Mission> = (1..=6).map(|i| network(&format!("net-{i}"), 10, &["a"])).collect();
    bank.push(network("net-two", 50, &["a", "b"]));
    bank.push(network("net-ten", 10, &["a"]));
    bank.push(network("net-95", 95, &["a"]));
    bank.push(Mission {
      id: "broken".into(),
      title: "Broken".into(),
      difficulty: Difficulty::Easy,
      description: String::new(),
      story: None,
      xp_reward: 10,
      content: MissionContent::Phishing { emails: Vec::<Email>::new() },
    });
    AppState::with_catalog(MissionCatalog::build(bank, seed_missions()))
  }

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 15, 30, 0).unwrap()
  }

  fn answers(xs: &[&str]) -> Vec<Option<String>> {
    xs.iter().map(|s| Some(s.to_string())).collect()
  }

  async fn new_user(state: &AppState) -> String {
    let body = RegisterIn { name: "Alex".into(), email: "alex@example.com".into() };
    register(state, body, now()).await.unwrap().id
  }

  #[tokio::test]
  async fn second_submission_is_not_credited() {
    let state = test_state();
    let uid = new_user(&state).await;

    let first = submit(&state, &uid, "net-two", answers(&["a", "b"]), now()).await.unwrap();
    assert_eq!(first.xp_earned, 50);
    assert!(!first.already_completed);
    assert_eq!(first.message, None);

    let again = submit(&state, &uid, "net-two", answers(&["wrong", "wrong"]), now()).await.unwrap();
    assert!(again.already_completed);
    assert_eq!(again.xp_earned, 0);
    assert_eq!(again.score, 0.0);
    assert_eq!(again.new_level, None);
    assert_eq!(again.message.as_deref(), Some(ALREADY_COMPLETED_MESSAGE));

    let progress = get_progress(&state, &uid).await.unwrap();
    assert_eq!(progress.xp, 50);
    assert_eq!(progress.completed_missions, 1);
  }

  #[tokio::test]
  async fn half_right_network_mission() {
    let state = test_state();
    let uid = new_user(&state).await;
    let out = submit(&state, &uid, "net-two", answers(&["a", "nope"]), now()).await.unwrap();
    assert_eq!(out.score, 50.0);
    assert_eq!(out.xp_earned, 25);
    assert_eq!(out.results.len(), 2);
    assert!(out.results[0].correct && !out.results[1].correct);
    assert_eq!(out.streak, Some(1));
  }

  #[tokio::test]
  async fn perfect_seed_phishing_inbox() {
    let state = test_state();
    let uid = new_user(&state).await;
    let out = submit(
      &state,
      &uid,
      "phishing-inbox-101",
      answers(&["phishing", "safe", "phishing", "safe", "phishing"]),
      now(),
    )
    .await
    .unwrap();
    assert_eq!(out.score, 100.0);
    assert_eq!(out.xp_earned, 20);
    assert_eq!(out.new_level, Some(1));
  }

  #[tokio::test]
  async fn level_up_from_95_xp() {
    let state = test_state();
    let uid = new_user(&state).await;
    let first = submit(&state, &uid, "net-95", answers(&["a"]), now()).await.unwrap();
    assert_eq!(first.new_level, Some(1));
    let out = submit(&state, &uid, "net-ten", answers(&["a"]), now()).await.unwrap();
    assert_eq!(out.xp_earned, 10);
    assert_eq!(out.new_level, Some(2));
    let progress = get_progress(&state, &uid).await.unwrap();
    assert_eq!(progress.xp, 105);
    assert_eq!(progress.level, 2);
  }

  #[tokio::test]
  async fn fifth_network_mission_grants_badge_once() {
    let state = test_state();
    let uid = new_user(&state).await;
    for i in 1..=4 {
      let out = submit(&state, &uid, &format!("net-{i}"), answers(&["a"]), now()).await.unwrap();
      assert_eq!(out.new_badges, Some(vec![]));
    }
    let fifth = submit(&state, &uid, "net-5", answers(&["a"]), now()).await.unwrap();
    assert_eq!(fifth.new_badges, Some(vec![Badge::NetworkNinja]));
    assert_eq!(fifth.message.as_deref(), Some("Congratulations! You earned 1 new badge(s)!"));
    let sixth = submit(&state, &uid, "net-6", answers(&["a"]), now()).await.unwrap();
    assert_eq!(sixth.new_badges, Some(vec![]));

    let progress = get_progress(&state, &uid).await.unwrap();
    assert_eq!(progress.badges, vec![Badge::NetworkNinja]);
    assert_eq!(progress.category_counts, CategoryCounts { phishing: 0, network: 6, osint: 0 });
    assert_eq!(progress.completed_missions_list[0].title.as_deref(), Some("Network net-1"));
  }

  #[tokio::test]
  async fn same_day_missions_bump_streak_once() {
    let state = test_state();
    let uid = new_user(&state).await;
    let a = submit(&state, &uid, "net-1", answers(&["a"]), now()).await.unwrap();
    let b = submit(&state, &uid, "net-2", answers(&["a"]), now() + Duration::hours(3)).await.unwrap();
    assert_eq!((a.streak, b.streak), (Some(1), Some(1)));
    let c = submit(&state, &uid, "net-3", answers(&["a"]), now() + Duration::days(1)).await.unwrap();
    assert_eq!(c.streak, Some(2));
  }

  #[tokio::test]
  async fn validation_failures_do_not_mutate() {
    let state = test_state();
    let uid = new_user(&state).await;

    let err = submit(&state, &uid, "net-two", answers(&["a"]), now()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = submit(&state, &uid, "net-two", vec![Some("a".into()), None], now()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = submit(&state, &uid, "net-two", answers(&["a", "  "]), now()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let progress = get_progress(&state, &uid).await.unwrap();
    assert_eq!(progress.xp, 0);
    assert_eq!(progress.completed_missions, 0);
  }

  #[tokio::test]
  async fn unknown_ids_and_broken_missions() {
    let state = test_state();
    let uid = new_user(&state).await;

    let err = submit(&state, &uid, "nope", answers(&["a"]), now()).await.unwrap_err();
    assert_eq!(err, AppError::mission_not_found("nope"));

    let err = submit(&state, "ghost", "net-1", answers(&["a"]), now()).await.unwrap_err();
    assert_eq!(err, AppError::user_not_found("ghost"));

    let err = submit(&state, &uid, "broken", vec![], now()).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidMission(_)));
  }

  #[tokio::test]
  async fn empty_answer_key_is_a_server_fault_whatever_is_sent() {
    let state = test_state();
    let uid = new_user(&state).await;
    let err = submit(&state, &uid, "broken", answers(&["phishing"]), now()).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidMission(_)));
    assert_eq!(err.status_code().as_u16(), 500);
  }

  /// Commit `mission_id` for `uid` outside the orchestrator, as a concurrent request would.
  async fn commit_elsewhere(state: &AppState, uid: &str, mission_id: &str, key: &[&str]) {
    let mission = state.catalog.find_by_id(mission_id).unwrap();
    let key: Vec<String> = key.iter().map(|s| s.to_string()).collect();
    let grading = grade(mission, &key).unwrap();
    let mut winner = state.users.load_by_id(uid).await.unwrap();
    let version = winner.version;
    apply_completion(&mut winner, mission, &grading, now());
    state.users.commit_completion(winner, version, mission_id).await.unwrap();
  }

  #[tokio::test]
  async fn lost_commit_for_same_mission_answers_already_completed() {
    let state = test_state();
    let uid = new_user(&state).await;
    let stale = state.users.load_by_id(&uid).await.unwrap();
    commit_elsewhere(&state, &uid, "net-two", &["a", "b"]).await;

    let mission = state.catalog.find_by_id("net-two").unwrap();
    let grading = grade(mission, &["a".to_string(), "b".to_string()]).unwrap();
    let out = credit(&state, stale, mission, &grading, now()).await.unwrap();
    assert!(out.already_completed);
    assert_eq!(out.xp_earned, 0);
    assert_eq!(out.message.as_deref(), Some(ALREADY_COMPLETED_MESSAGE));

    let progress = get_progress(&state, &uid).await.unwrap();
    assert_eq!(progress.xp, 50);
    assert_eq!(progress.completed_missions, 1);
  }

  #[tokio::test]
  async fn lost_commit_for_other_mission_is_reapplied() {
    let state = test_state();
    let uid = new_user(&state).await;
    let stale = state.users.load_by_id(&uid).await.unwrap();
    commit_elsewhere(&state, &uid, "net-1", &["a"]).await;

    let mission = state.catalog.find_by_id("net-two").unwrap();
    let grading = grade(mission, &["a".to_string(), "b".to_string()]).unwrap();
    let out = credit(&state, stale, mission, &grading, now()).await.unwrap();
    assert!(!out.already_completed);
    assert_eq!(out.xp_earned, 50);

    let progress = get_progress(&state, &uid).await.unwrap();
    assert_eq!(progress.xp, 60);
    assert_eq!(progress.completed_missions, 2);
  }

  #[tokio::test]
  async fn register_validates_and_normalizes() {
    let state = test_state();
    let p = register(&state, RegisterIn { name: " Sam ".into(), email: " Sam@Example.com".into() }, now())
      .await
      .unwrap();
    assert_eq!(p.name, "Sam");
    assert_eq!(p.email, "sam@example.com");
    assert_eq!((p.xp, p.level, p.streak, p.completed_missions), (0, 1, 0, 0));

    let dup = register(&state, RegisterIn { name: "Sam".into(), email: "SAM@example.com".into() }, now()).await;
    assert_eq!(dup.unwrap_err(), AppError::DuplicateEmail);

    let bad = register(&state, RegisterIn { name: "  ".into(), email: "x@y.z".into() }, now()).await;
    assert!(matches!(bad, Err(AppError::Validation(_))));
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn concurrent_submissions_credit_once() {
    let state = test_state();
    let uid = new_user(&state).await;

    let mut handles = Vec::new();
    for _ in 0..16 {
      let state = state.clone();
      let uid = uid.clone();
      handles.push(tokio::spawn(async move {
        submit(&state, &uid, "net-two", answers(&["a", "b"]), now()).await
      }));
    }

    let mut credited = 0;
    for h in handles {
      let out = h.await.unwrap().unwrap();
      if !out.already_completed {
        credited += 1;
        assert_eq!(out.xp_earned, 50);
      } else {
        assert_eq!(out.xp_earned, 0);
      }
    }
    assert_eq!(credited, 1);

    let progress = get_progress(&state, &uid).await.unwrap();
    assert_eq!(progress.xp, 50);
    assert_eq!(progress.completed_missions, 1);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
  async fn concurrent_distinct_missions_all_land() {
    let bank: Vec<Mission> = (0..64).map(|i| network(&format!("m{i}"), 10, &["a"])).collect();
    let state = AppState::with_catalog(MissionCatalog::build(bank, vec![]));
    let uid = new_user(&state).await;

    let mut handles = Vec::new();
    for i in 0..64 {
      let state = state.clone();
      let uid = uid.clone();
      handles.push(tokio::spawn(async move {
        submit(&state, &uid, &format!("m{i}"), answers(&["a"]), now()).await
      }));
    }
    for h in handles {
      let out = h.await.unwrap().unwrap();
      assert!(!out.already_completed);
      assert_eq!(out.xp_earned, 10);
    }

    let progress = get_progress(&state, &uid).await.unwrap();
    assert_eq!(progress.completed_missions, 64);
    assert_eq!(progress.xp, 640);
    assert_eq!(progress.level, 7);
  }
}

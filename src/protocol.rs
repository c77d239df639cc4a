//! Public protocol structs for the HTTP endpoints (serde ready).
//! JSON field names are camelCase to match the web frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::MissionSummary;
use crate::domain::{Badge, Category, Difficulty, Mission, MissionContent, OsintProfile, QuestionKind};
use crate::grading::ItemResult;

//
// Missions
//

#[derive(Debug, Default, Deserialize)]
pub struct MissionQuery {
    pub category: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionSummaryOut {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub description: String,
    pub xp_reward: u32,
    pub item_count: usize,
}

impl From<MissionSummary> for MissionSummaryOut {
    fn from(s: MissionSummary) -> Self {
        Self {
            id: s.id,
            title: s.title,
            category: s.category,
            difficulty: s.difficulty,
            description: s.description,
            xp_reward: s.xp_reward,
            item_count: s.item_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmailOut {
    pub subject: String,
    pub sender: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionOut {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<QuestionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ScenarioOut {
    pub profile: OsintProfile,
    pub questions: Vec<QuestionOut>,
}

/// Playable mission: everything needed to render it, nothing that gives the answers away.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionDetailOut {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    pub xp_reward: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<EmailOut>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuestionOut>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<ScenarioOut>,
}

/// Convert a full `Mission` (internal, with answer key) to the public DTO.
pub fn to_detail_out(m: &Mission) -> MissionDetailOut {
    let mut out = MissionDetailOut {
        id: m.id.clone(),
        title: m.title.clone(),
        category: m.category(),
        difficulty: m.difficulty,
        description: m.description.clone(),
        story: m.story.clone(),
        xp_reward: m.xp_reward,
        emails: None,
        questions: None,
        scenario: None,
    };
    match &m.content {
        MissionContent::Phishing { emails } => {
            out.emails = Some(
                emails
                    .iter()
                    .map(|e| EmailOut { subject: e.subject.clone(), sender: e.sender.clone(), body: e.body.clone() })
                    .collect(),
            );
        }
        MissionContent::Network { questions } => {
            out.questions = Some(
                questions
                    .iter()
                    .map(|q| QuestionOut { text: q.text.clone(), kind: Some(q.kind), options: Some(q.options.clone()) })
                    .collect(),
            );
        }
        MissionContent::Osint { profile, questions } => {
            out.scenario = Some(ScenarioOut {
                profile: profile.clone(),
                questions: questions
                    .iter()
                    .map(|q| QuestionOut { text: q.text.clone(), kind: None, options: None })
                    .collect(),
            });
        }
    }
    out
}

//
// Submission
//

/// `null` entries are accepted here so they can be reported as validation errors.
#[derive(Debug, Deserialize)]
pub struct SubmitIn {
    pub answers: Vec<Option<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOut {
    pub score: f64,
    pub xp_earned: u32,
    pub results: Vec<ItemResult>,
    pub already_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_badges: Option<Vec<Badge>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
    pub message: Option<String>,
}

//
// Users
//

#[derive(Debug, Deserialize)]
pub struct RegisterIn {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct CategoryCounts {
    pub phishing: usize,
    pub network: usize,
    pub osint: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedMissionOut {
    pub mission_id: String,
    pub category: Category,
    pub completed_at: DateTime<Utc>,
    pub score: f64,
    pub xp_earned: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOut {
    pub xp: u64,
    pub level: u32,
    pub badges: Vec<Badge>,
    pub completed_missions: usize,
    pub streak: u32,
    pub category_counts: CategoryCounts,
    pub completed_missions_list: Vec<CompletedMissionOut>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileOut {
    pub id: String,
    pub name: String,
    pub email: String,
    pub xp: u64,
    pub level: u32,
    pub badges: Vec<Badge>,
    pub completed_missions: usize,
    pub streak: u32,
    pub joined_at: DateTime<Utc>,
}

//
// Misc
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

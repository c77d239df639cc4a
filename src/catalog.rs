//! Read-only mission catalog.
//!
//! Built once at startup from the TOML bank (if any) and the built-in seeds,
//! then shared behind an `Arc`. Missions never change at runtime, so no locking.

use std::collections::HashMap;

use tracing::{info, instrument};

use crate::domain::{Category, Difficulty, Mission};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MissionFilter {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
}

impl MissionFilter {
    fn accepts(&self, m: &Mission) -> bool {
        self.category.map_or(true, |c| m.category() == c)
            && self.difficulty.map_or(true, |d| m.difficulty == d)
    }
}

/// List view of a mission. Carries no answer-key data.
#[derive(Clone, Debug, PartialEq)]
pub struct MissionSummary {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub description: String,
    pub xp_reward: u32,
    pub item_count: usize,
}

impl From<&Mission> for MissionSummary {
    fn from(m: &Mission) -> Self {
        Self {
            id: m.id.clone(),
            title: m.title.clone(),
            category: m.category(),
            difficulty: m.difficulty,
            description: m.description.clone(),
            xp_reward: m.xp_reward,
            item_count: m.content.len(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MissionCatalog {
    by_id: HashMap<String, Mission>,
    /// Insertion order, so listings are stable.
    order: Vec<String>,
}

impl MissionCatalog {
    /// Bank missions first; seeds fill in ids the bank did not claim.
    #[instrument(level = "info", skip_all, fields(bank = bank.len(), seeds = seeds.len()))]
    pub fn build(bank: Vec<Mission>, seeds: Vec<Mission>) -> Self {
        let mut catalog = Self::default();
        for m in bank.into_iter().chain(seeds) {
            if catalog.by_id.contains_key(&m.id) {
                continue;
            }
            catalog.order.push(m.id.clone());
            catalog.by_id.insert(m.id.clone(), m);
        }

        for category in Category::ALL {
            let count = catalog.by_id.values().filter(|m| m.category() == category).count();
            info!(target: "mission", %category, count, "Startup mission inventory");
        }
        catalog
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Mission> {
        self.by_id.get(id)
    }

    pub fn list(&self, filter: MissionFilter) -> Vec<MissionSummary> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .filter(|m| filter.accepts(m))
            .map(MissionSummary::from)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;

use super::domain::UserId;
use super::recommendation::Recommendation;

/// Inputs that invalidate a cached recommendation when they change. History
/// and completions are append-only, so their lengths change on every write,
/// including assessments logged with a backdated timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Freshness {
    pub assessments_logged: usize,
    pub completed_modules: usize,
    pub as_of_day: NaiveDate,
}

/// Most recent recommendation per user, reused until another assessment or
/// completion is stored or the calendar day changes.
#[derive(Debug, Default)]
pub(crate) struct RecommendationCache {
    entries: Mutex<HashMap<UserId, (Freshness, Recommendation)>>,
}

impl RecommendationCache {
    pub fn get(&self, user: &UserId, freshness: &Freshness) -> Option<Recommendation> {
        // Entries are recomputable, so a poisoned lock is still safe to read.
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(user)
            .filter(|(cached, _)| cached == freshness)
            .map(|(_, recommendation)| recommendation.clone())
    }

    pub fn put(&self, user: UserId, freshness: Freshness, recommendation: Recommendation) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(user, (freshness, recommendation));
    }
}

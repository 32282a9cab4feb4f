//! Review scheduling over persisted card records
//!
//! All records live in memory and are written back as one JSON object keyed by
//! card id after every answer. Storage failures never block a review: they are
//! logged, reported to the caller, and the in-memory map stays authoritative.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::algorithm::sm2_update;
use super::models::*;
use crate::clock::Clock;
use crate::config::SchedulerConfig;
use crate::storage::{KeyValueStore, StorageError};

/// Storage key of the card record map
pub const SRS_STORAGE_KEY: &str = "n5lab_srs_v1";

type Result<T> = std::result::Result<T, StorageError>;

pub struct Scheduler {
    records: BTreeMap<CardId, CardReviewRecord>,
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a scheduler and hydrate it from `store`.
    ///
    /// Unreadable or malformed data is logged and treated as "no cards reviewed yet".
    pub fn load(
        store: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
        config: SchedulerConfig,
    ) -> Self {
        let records = match read_records(store.as_ref()) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Failed to load review records: {}", e);
                BTreeMap::new()
            }
        };
        log::debug!("Loaded {} review records", records.len());

        Self {
            records,
            store,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ==================== Queries ====================

    /// Cards for the next session: due reviews first, then unseen cards, each
    /// group in input order, truncated to `session_size`.
    pub fn get_due_cards<S: AsRef<str>>(&self, card_ids: &[S], session_size: usize) -> Vec<CardId> {
        let now = self.now();
        let mut due = Vec::new();
        let mut new_cards = Vec::new();

        for id in card_ids {
            let id = id.as_ref();
            match self.records.get(id) {
                None => new_cards.push(id.to_string()),
                Some(record) if record.is_due(now) => due.push(id.to_string()),
                Some(_) => {}
            }
        }

        due.into_iter()
            .chain(new_cards)
            .take(session_size)
            .collect()
    }

    /// Same as [`get_due_cards`](Self::get_due_cards) with the configured session size.
    pub fn next_session<S: AsRef<str>>(&self, card_ids: &[S]) -> Vec<CardId> {
        self.get_due_cards(card_ids, self.config.session_size)
    }

    /// Review record of a card, `None` if it was never reviewed
    pub fn get_card_stats(&self, card_id: &str) -> Option<&CardReviewRecord> {
        self.records.get(card_id)
    }

    /// Number of cards that are new or past their next review
    pub fn due_count<S: AsRef<str>>(&self, card_ids: &[S]) -> usize {
        let now = self.now();
        card_ids
            .iter()
            .filter(|id| {
                self.records
                    .get(id.as_ref())
                    .map_or(true, |record| record.is_due(now))
            })
            .count()
    }

    /// Fraction of `card_ids` at or above the mastery threshold
    pub fn mastery_rate<S: AsRef<str>>(&self, card_ids: &[S]) -> f64 {
        if card_ids.is_empty() {
            return 0.0;
        }

        let mastered = card_ids
            .iter()
            .filter(|id| {
                self.records
                    .get(id.as_ref())
                    .map_or(false, |record| record.is_mastered(self.config.mastery_repetitions))
            })
            .count();

        mastered as f64 / card_ids.len() as f64
    }

    /// Review-state breakdown for a deck
    pub fn deck_stats<S: AsRef<str>>(&self, card_ids: &[S]) -> DeckStats {
        let now = self.now();
        let mut stats = DeckStats {
            total_cards: card_ids.len(),
            ..DeckStats::default()
        };

        for id in card_ids {
            match self.records.get(id.as_ref()) {
                None => {
                    stats.new_cards += 1;
                    stats.due_cards += 1;
                }
                Some(record) => {
                    if record.is_mastered(self.config.mastery_repetitions) {
                        stats.mastered_cards += 1;
                    } else {
                        stats.learning_cards += 1;
                    }
                    if record.is_due(now) {
                        stats.due_cards += 1;
                    }
                }
            }
        }

        stats
    }

    pub fn records(&self) -> &BTreeMap<CardId, CardReviewRecord> {
        &self.records
    }

    // ==================== Commands ====================

    /// Apply an answer to a card and persist the whole record map.
    ///
    /// The in-memory record is updated even when the write fails.
    pub fn record_response(&mut self, card_id: &str, outcome: ReviewOutcome) -> Result<()> {
        let updated = sm2_update(self.records.get(card_id), outcome.quality(), self.now());
        log::debug!(
            "Card {} answered {}: interval {}d, ease {:.2}",
            card_id,
            outcome,
            updated.interval,
            updated.ease_factor
        );
        self.records.insert(card_id.to_string(), updated);
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let result = serde_json::to_string(&self.records)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(SRS_STORAGE_KEY, &json));

        if let Err(e) = &result {
            log::warn!("Failed to save review records: {}", e);
        }
        result
    }
}

fn read_records(store: &dyn KeyValueStore) -> Result<BTreeMap<CardId, CardReviewRecord>> {
    match store.get(SRS_STORAGE_KEY)? {
        Some(content) => Ok(serde_json::from_str(&content)?),
        None => Ok(BTreeMap::new()),
    }
}

//! Read-time aggregation over persisted responses.
//!
//! Everything here is a pure function of the rows handed in. Callers re-read
//! the store on every request, so results always reflect the latest inserts.

pub mod analytics;
pub mod leaderboard;

use std::collections::HashMap;

use uuid::Uuid;

use crate::dao::models::ResponseEntity;

/// Running totals for a set of responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Sum of awarded points.
    pub points: u64,
    /// Number of responses.
    pub responses: u64,
    /// Number of correct responses.
    pub correct: u64,
}

impl Tally {
    fn record(&mut self, response: &ResponseEntity) {
        self.points += u64::from(response.points);
        self.responses += 1;
        if response.is_correct {
            self.correct += 1;
        }
    }

    fn merge(&mut self, other: Tally) {
        self.points += other.points;
        self.responses += other.responses;
        self.correct += other.correct;
    }

    /// Correct responses as a percentage of all responses; 0 without responses.
    pub fn accuracy(&self) -> f64 {
        percentage(self.correct, self.responses)
    }
}

/// Sum each participant's responses.
pub fn tally_by_participant<'a>(
    responses: impl IntoIterator<Item = &'a ResponseEntity>,
) -> HashMap<Uuid, Tally> {
    let mut tallies: HashMap<Uuid, Tally> = HashMap::new();
    for response in responses {
        tallies
            .entry(response.participant_id)
            .or_default()
            .record(response);
    }
    tallies
}

pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

pub(crate) fn mean(sum: f64, count: u64) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

// The session exposes more of its state than the CLI consumes; accessors are
// part of the engine contract
#![allow(dead_code)]

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::problems::{Category, Generator};

/// Live state of one quiz run, from `start` to `end`.
///
/// The lifecycle is Created -> Running -> Ended; `start` and `end` are each
/// meant to fire once. The engine does not police double calls or answer
/// counts beyond `total_problems`; the presentation loop owns the pacing.
pub struct Session {
    category: Category,
    total_problems: usize,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    answers: Vec<bool>,
}

impl Session {
    pub fn new(generator: &dyn Generator, total_problems: usize) -> Self {
        Self {
            category: generator.category(),
            total_problems,
            started_at: None,
            ended_at: None,
            answers: Vec::with_capacity(total_problems),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn total_problems(&self) -> usize {
        self.total_problems
    }

    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    pub fn start(&mut self) {
        self.started_at = Some(Utc::now());
    }

    pub fn record_answer(&mut self, correct: bool) {
        self.answers.push(correct);
    }

    pub fn end(&mut self) {
        self.ended_at = Some(Utc::now());
    }

    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|correct| **correct).count()
    }

    /// Time spent so far; fixed once the session has ended. Never negative.
    pub fn elapsed(&self) -> Duration {
        let started_at = match self.started_at {
            Some(t) => t,
            None => return Duration::ZERO,
        };
        let ended_at = self.ended_at.unwrap_or_else(Utc::now);
        (ended_at - started_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Snapshots the session into its persistable summary. Intended to be
    /// called after `end`; once ended, repeated calls yield equal values.
    pub fn result(&self) -> SessionResult {
        SessionResult {
            category: self.category,
            correct_count: self.correct_count() as u32,
            total_count: self.answers.len() as u32,
            duration: self.elapsed(),
            completed_at: self.ended_at.unwrap_or_else(Utc::now),
        }
    }
}

/// Immutable summary of a finished session; the unit of persistence.
/// On the wire: `duration` is integer nanoseconds, `completed_at` RFC3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub category: Category,
    pub correct_count: u32,
    pub total_count: u32,
    #[serde(with = "duration_nanos")]
    pub duration: Duration,
    pub completed_at: DateTime<Utc>,
}

impl SessionResult {
    pub fn percent_correct(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            (self.correct_count as f64 / self.total_count as f64) * 100.0
        }
    }
}

mod duration_nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_nanos().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const CHALLENGE_DAYS: u32 = 7;

/// Persisted habit-challenge blob, the sole piece of state that survives a
/// restart. Last write wins; no other invariants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HabitData {
    #[serde(default)]
    pub current_habit: String,
    #[serde(default)]
    pub completed_days: u32,
    #[serde(default)]
    pub challenge_start_date: Option<String>,
    #[serde(default)]
    pub last_completed_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayMarker {
    Completed,
    Current,
    Upcoming,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    /// Day recorded; holds the new completed-day count.
    Recorded(u32),
    /// The seventh day was just recorded.
    ChallengeComplete,
    NoHabitSelected,
    AlreadyDoneToday,
    AlreadyFinished,
}

/// Seven-day habit challenge. Completion is once per calendar day and the
/// counter never moves past seven.
#[derive(Debug, Default)]
pub struct HabitChallenge {
    pub data: HabitData,
    /// Set after the first failed write; the tracker keeps working in memory
    /// and the user is warned once.
    pub memory_only: bool,
}

impl HabitChallenge {
    pub fn new(data: HabitData) -> Self {
        Self {
            data,
            memory_only: false,
        }
    }

    pub fn select_habit(&mut self, habit: String) {
        self.data.current_habit = habit;
    }

    pub fn mark_done(&mut self, today: NaiveDate) -> MarkOutcome {
        if self.data.current_habit.is_empty() {
            return MarkOutcome::NoHabitSelected;
        }
        if self.data.completed_days >= CHALLENGE_DAYS {
            return MarkOutcome::AlreadyFinished;
        }
        let today = today.to_string();
        if self.data.last_completed_date.as_deref() == Some(today.as_str()) {
            return MarkOutcome::AlreadyDoneToday;
        }

        self.data.completed_days += 1;
        self.data.last_completed_date = Some(today.clone());
        if self.data.challenge_start_date.is_none() {
            self.data.challenge_start_date = Some(today);
        }

        if self.data.completed_days == CHALLENGE_DAYS {
            MarkOutcome::ChallengeComplete
        } else {
            MarkOutcome::Recorded(self.data.completed_days)
        }
    }

    pub fn reset(&mut self) {
        self.data = HabitData::default();
    }

    pub fn is_complete(&self) -> bool {
        self.data.completed_days >= CHALLENGE_DAYS
    }

    pub fn progress_percent(&self) -> f64 {
        f64::from(self.data.completed_days) / f64::from(CHALLENGE_DAYS) * 100.0
    }

    pub fn day_markers(&self) -> Vec<DayMarker> {
        (0..CHALLENGE_DAYS)
            .map(|day| {
                if day < self.data.completed_days {
                    DayMarker::Completed
                } else if day == self.data.completed_days && !self.is_complete() {
                    DayMarker::Current
                } else {
                    DayMarker::Upcoming
                }
            })
            .collect()
    }
}

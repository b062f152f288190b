use crate::habit::HabitChallenge;
use crate::journal::JournalSession;
use crate::quiz::QuizFlow;
use crate::services::Services;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Shared state for the single user session. The browser event loop of the
/// original is replaced by these mutexes: every handler takes the lock for
/// the piece it mutates, so journal, habit, and quiz updates stay strictly
/// serialized.
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub journal: Arc<Mutex<JournalSession>>,
    pub habit: Arc<Mutex<HabitChallenge>>,
    pub quiz: Arc<Mutex<QuizFlow>>,
    pub services: Services,
}

impl AppState {
    pub fn new(
        data_path: PathBuf,
        journal: JournalSession,
        habit: HabitChallenge,
        services: Services,
    ) -> Self {
        Self {
            data_path,
            journal: Arc::new(Mutex::new(journal)),
            habit: Arc::new(Mutex::new(habit)),
            quiz: Arc::new(Mutex::new(QuizFlow::default())),
            services,
        }
    }
}

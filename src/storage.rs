use crate::errors::AppError;
use crate::habit::HabitData;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/habit.json"))
}

/// Loads the persisted habit blob, defaulting on a missing or unreadable
/// file so a broken store never blocks startup.
pub async fn load_habit_data(path: &Path) -> HabitData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse habit data file: {err}");
                HabitData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => HabitData::default(),
        Err(err) => {
            error!("failed to read habit data file: {err}");
            HabitData::default()
        }
    }
}

pub async fn persist_habit_data(path: &Path, data: &HabitData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

pub mod app;
pub mod canvas;
pub mod community;
pub mod doctors;
pub mod errors;
pub mod habit;
pub mod handlers;
pub mod journal;
pub mod models;
pub mod quiz;
pub mod sentiment;
pub mod services;
pub mod state;
pub mod storage;
pub mod stressmap;
pub mod ui;

pub use app::router;
pub use services::Services;
pub use state::AppState;
pub use storage::{load_habit_data, resolve_data_path};

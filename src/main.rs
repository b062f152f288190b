use std::{env, net::SocketAddr, time::Duration};

use mindspace::{
    habit::HabitChallenge, journal::JournalSession, load_habit_data, resolve_data_path, router,
    AppState, Services,
};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let data_path = resolve_data_path()?;
    if let Some(parent) = data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let habit_data = load_habit_data(&data_path).await;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let services = Services::new(http);

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let state = AppState::new(
        data_path,
        JournalSession::new(today),
        HabitChallenge::new(habit_data),
        services,
    );

    let app = router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct JournalView {
    date: String,
    canvas_image: String,
    rich_text: String,
    image_placements: Vec<ImagePlacement>,
    undo_depth: usize,
    entry_count: usize,
}

#[derive(Debug, Deserialize)]
struct ImagePlacement {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Debug, Deserialize)]
struct UndoResponse {
    undone: bool,
    message: Option<String>,
    view: JournalView,
}

#[derive(Debug, Deserialize)]
struct HabitView {
    current_habit: String,
    completed_days: u32,
    challenge_days: u32,
    complete: bool,
    message: Option<String>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("mindspace_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/habit")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    // External services are pointed at a closed local port so any request
    // that should not leave the process fails fast instead of going out.
    let child = Command::new(env!("CARGO_BIN_EXE_mindspace"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("SENTIMENT_BASE_URL", "http://127.0.0.1:9")
        .env("BACKEND_BASE_URL", "http://127.0.0.1:9")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn switch_date(client: &Client, base_url: &str, date: &str) -> JournalView {
    client
        .post(format!("{base_url}/api/journal/date"))
        .json(&serde_json::json!({ "date": date }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_journal_entry_starts_empty() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let view = switch_date(&client, &server.base_url, "2026-01-01").await;
    assert_eq!(view.date, "2026-01-01");
    assert_eq!(view.canvas_image, "");
    assert_eq!(view.rich_text, "");
    assert!(view.image_placements.is_empty());
    assert_eq!(view.undo_depth, 0);

    let fetched: JournalView = client
        .get(format!("{}/api/journal/entry", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched.date, "2026-01-01");
}

#[tokio::test]
async fn http_journal_date_rejects_malformed_input() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/journal/date", server.base_url))
        .json(&serde_json::json!({ "date": "01-01-2026" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_stroke_requires_drawing_mode() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    switch_date(&client, &server.base_url, "2026-01-02").await;
    let response = client
        .post(format!("{}/api/journal/tool", server.base_url))
        .json(&serde_json::json!({ "mode": "text" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/api/journal/stroke", server.base_url))
        .json(&serde_json::json!({ "points": [{ "x": 10.0, "y": 10.0 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_stroke_then_undo_restores_blank_canvas() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    switch_date(&client, &server.base_url, "2026-01-03").await;
    client
        .post(format!("{}/api/journal/tool", server.base_url))
        .json(&serde_json::json!({ "mode": "draw", "color": "#ff0000", "size": 8 }))
        .send()
        .await
        .unwrap();

    // First save is the baseline, second save gives undo something to pop.
    let first: JournalView = client
        .post(format!("{}/api/journal/text", server.base_url))
        .json(&serde_json::json!({ "html": "" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first.undo_depth, 1);

    let after_stroke: JournalView = client
        .post(format!("{}/api/journal/stroke", server.base_url))
        .json(&serde_json::json!({
            "points": [{ "x": 100.0, "y": 100.0 }, { "x": 200.0, "y": 150.0 }]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after_stroke.undo_depth, 2);
    assert!(after_stroke.canvas_image.starts_with("data:image/png;base64,"));

    let undo: UndoResponse = client
        .post(format!("{}/api/journal/undo", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(undo.undone);
    assert_eq!(undo.view.canvas_image, "");

    let exhausted: UndoResponse = client
        .post(format!("{}/api/journal/undo", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!exhausted.undone);
    assert_eq!(exhausted.message.as_deref(), Some("Nothing to undo"));
}

#[tokio::test]
async fn http_text_saves_create_entries() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = switch_date(&client, &server.base_url, "2026-01-04").await;
    let view: JournalView = client
        .post(format!("{}/api/journal/text", server.base_url))
        .json(&serde_json::json!({ "html": "<p>Slept well, went for a run.</p>" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.rich_text, "<p>Slept well, went for a run.</p>");
    assert_eq!(view.entry_count, before.entry_count + 1);

    // Switching away and back reloads the stored entry and seeds undo.
    switch_date(&client, &server.base_url, "2026-01-05").await;
    let reloaded = switch_date(&client, &server.base_url, "2026-01-04").await;
    assert_eq!(reloaded.rich_text, "<p>Slept well, went for a run.</p>");
    assert_eq!(reloaded.undo_depth, 1);
}

#[tokio::test]
async fn http_image_placement_is_clamped() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    switch_date(&client, &server.base_url, "2026-01-06").await;
    let view: JournalView = client
        .post(format!("{}/api/journal/images", server.base_url))
        .json(&serde_json::json!({ "data": "data:image/png;base64,iVBORw0KGgo=" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.image_placements.len(), 1);
    assert_eq!(view.image_placements[0].width, 300.0);
    assert_eq!(view.image_placements[0].height, 200.0);

    let moved: JournalView = client
        .post(format!("{}/api/journal/images/0/move", server.base_url))
        .json(&serde_json::json!({ "x": -50.0, "y": 10000.0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(moved.image_placements[0].x, 0.0);
    assert!(moved.image_placements[0].y + moved.image_placements[0].height <= 600.0);

    let resized: JournalView = client
        .post(format!("{}/api/journal/images/0/resize", server.base_url))
        .json(&serde_json::json!({ "width": 10.0, "height": 10.0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resized.image_placements[0].width, 100.0);
    assert_eq!(resized.image_placements[0].height, 100.0);

    let response = client
        .delete(format!("{}/api/journal/images/5", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let deleted: JournalView = client
        .delete(format!("{}/api/journal/images/0", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(deleted.image_placements.is_empty());
}

#[tokio::test]
async fn http_quiz_submit_rejects_bad_pincode() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/quiz/submit", server.base_url))
        .json(&serde_json::json!({ "pincode": "12345" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body = response.text().await.unwrap();
    assert!(body.contains("valid 6-digit pincode"));
}

#[tokio::test]
async fn http_habit_tracking_flow() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    client
        .post(format!("{}/api/habit/reset", server.base_url))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/api/habit/done", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let view: HabitView = client
        .post(format!("{}/api/habit/select", server.base_url))
        .json(&serde_json::json!({ "habit": "meditation" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.current_habit, "meditation");
    assert_eq!(view.completed_days, 0);
    assert_eq!(view.challenge_days, 7);

    let done: HabitView = client
        .post(format!("{}/api/habit/done", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(done.completed_days, 1);
    assert!(!done.complete);
    assert!(done.message.is_some());

    let repeat: HabitView = client
        .post(format!("{}/api/habit/done", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(repeat.completed_days, 1);
    assert_eq!(
        repeat.message.as_deref(),
        Some("You've already completed your habit for today! 🎉")
    );
}

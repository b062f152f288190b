use crate::handlers;
use crate::state::AppState;
use axum::{routing::{delete, get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/journal/entry", get(handlers::journal_entry))
        .route("/api/journal/date", post(handlers::journal_date))
        .route("/api/journal/tool", post(handlers::journal_tool))
        .route("/api/journal/stroke", post(handlers::journal_stroke))
        .route("/api/journal/text", post(handlers::journal_text))
        .route("/api/journal/images", post(handlers::journal_image_add))
        .route("/api/journal/images/:index/move", post(handlers::journal_image_move))
        .route("/api/journal/images/:index/resize", post(handlers::journal_image_resize))
        .route("/api/journal/images/:index", delete(handlers::journal_image_delete))
        .route("/api/journal/undo", post(handlers::journal_undo))
        .route("/api/journal/clear", post(handlers::journal_clear))
        .route("/api/journal/analyze", post(handlers::journal_analyze))
        .route("/api/journal/mood-history", get(handlers::journal_mood_history))
        .route("/api/journal/share", post(handlers::journal_share))
        .route("/api/community", get(handlers::community_posts))
        .route("/api/community/:id/comments", post(handlers::community_comment))
        .route("/api/quiz/start", post(handlers::quiz_start))
        .route("/api/quiz/question", get(handlers::quiz_question))
        .route("/api/quiz/answer", post(handlers::quiz_answer))
        .route("/api/quiz/previous", post(handlers::quiz_previous))
        .route("/api/quiz/locate", post(handlers::quiz_locate))
        .route("/api/quiz/submit", post(handlers::quiz_submit))
        .route("/api/habit", get(handlers::habit_view))
        .route("/api/habit/select", post(handlers::habit_select))
        .route("/api/habit/done", post(handlers::habit_done))
        .route("/api/habit/reset", post(handlers::habit_reset))
        .route("/api/stressmap", get(handlers::stressmap_stats))
        .route("/api/stressmap/:pincode", get(handlers::stressmap_pincode))
        .route("/api/doctors/:specialty", get(handlers::doctors_by_specialty))
        .route("/api/doctors/:specialty/book", post(handlers::doctor_book))
        .with_state(state)
}

use crate::canvas;
use crate::community;
use crate::doctors;
use crate::errors::AppError;
use crate::habit::{HabitChallenge, MarkOutcome, CHALLENGE_DAYS};
use crate::journal::JournalSession;
use crate::models::{
    AnswerRequest, AnswerResponse, AreaProperties, BookingRequest, BookingResponse,
    CommentRequest, CommunityComment,
    CommunityPost, DateRequest, DoctorListResponse, DoctorQuery, HabitSelectRequest, HabitView,
    ImageAddRequest, JournalView, LocateRequest, MapStats, MessageResponse, MoodHistoryResponse,
    MoveRequest, PincodeLookup, PreviousResponse, QuizProgress, QuizResultResponse,
    QuizStartResponse, ResizeRequest, SentimentView, SharePost, StrokeRequest, SubmitAssessmentRequest,
    SubmitRequest, TextRequest, ToolRequest, UndoResponse,
};
use crate::quiz::{self, NextStep, QuizFlow, ResultBand};
use crate::sentiment;
use crate::services::SubmissionOutcome;
use crate::state::AppState;
use crate::storage::persist_habit_data;
use crate::stressmap;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::{Local, NaiveDate};
use tracing::error;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let entry_count = state.journal.lock().await.entry_count();
    let habit = state.habit.lock().await;
    Html(render_index(&today_string(), entry_count, &habit))
}

// ---------------------------------------------------------------------------
// Journal

pub async fn journal_entry(State(state): State<AppState>) -> Result<Json<JournalView>, AppError> {
    let journal = state.journal.lock().await;
    Ok(Json(view_of(&journal)?))
}

pub async fn journal_date(
    State(state): State<AppState>,
    Json(payload): Json<DateRequest>,
) -> Result<Json<JournalView>, AppError> {
    let date = payload.date.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("date must be formatted YYYY-MM-DD"))?;
    let mut journal = state.journal.lock().await;
    journal.switch_date(date.to_string())?;
    Ok(Json(view_of(&journal)?))
}

pub async fn journal_tool(
    State(state): State<AppState>,
    Json(payload): Json<ToolRequest>,
) -> Result<Json<JournalView>, AppError> {
    let mut journal = state.journal.lock().await;
    if let Some(mode) = payload.mode {
        journal.tools.mode = mode;
    }
    if let Some(color) = payload.color {
        journal.tools.draw_color = canvas::parse_color(&color)?;
    }
    if let Some(size) = payload.size {
        journal.tools.brush_size = canvas::clamp_brush_size(size);
    }
    if let Some(highlighter) = payload.highlighter {
        journal.tools.highlighter = highlighter;
    }
    Ok(Json(view_of(&journal)?))
}

pub async fn journal_stroke(
    State(state): State<AppState>,
    Json(payload): Json<StrokeRequest>,
) -> Result<Json<JournalView>, AppError> {
    if payload.points.is_empty() {
        return Err(AppError::bad_request("a stroke needs at least one point"));
    }
    let mut journal = state.journal.lock().await;
    journal.apply_stroke(&payload.points)?;
    Ok(Json(view_of(&journal)?))
}

pub async fn journal_text(
    State(state): State<AppState>,
    Json(payload): Json<TextRequest>,
) -> Result<Json<JournalView>, AppError> {
    let mut journal = state.journal.lock().await;
    journal.set_text(payload.html)?;
    Ok(Json(view_of(&journal)?))
}

pub async fn journal_image_add(
    State(state): State<AppState>,
    Json(payload): Json<ImageAddRequest>,
) -> Result<Json<JournalView>, AppError> {
    let mut journal = state.journal.lock().await;
    journal.add_image(payload.data)?;
    Ok(Json(view_of(&journal)?))
}

pub async fn journal_image_move(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(payload): Json<MoveRequest>,
) -> Result<Json<JournalView>, AppError> {
    let mut journal = state.journal.lock().await;
    journal.move_image(index, payload.x, payload.y)?;
    Ok(Json(view_of(&journal)?))
}

pub async fn journal_image_resize(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(payload): Json<ResizeRequest>,
) -> Result<Json<JournalView>, AppError> {
    let mut journal = state.journal.lock().await;
    journal.resize_image(index, payload.width, payload.height)?;
    Ok(Json(view_of(&journal)?))
}

pub async fn journal_image_delete(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<JournalView>, AppError> {
    let mut journal = state.journal.lock().await;
    journal.delete_image(index)?;
    Ok(Json(view_of(&journal)?))
}

pub async fn journal_undo(State(state): State<AppState>) -> Result<Json<UndoResponse>, AppError> {
    let mut journal = state.journal.lock().await;
    let restored = journal.undo()?;
    let view = view_of(&journal)?;
    Ok(Json(match restored {
        Some(_) => UndoResponse {
            undone: true,
            message: None,
            view,
        },
        None => UndoResponse {
            undone: false,
            message: Some("Nothing to undo".to_string()),
            view,
        },
    }))
}

pub async fn journal_clear(State(state): State<AppState>) -> Result<Json<JournalView>, AppError> {
    let mut journal = state.journal.lock().await;
    journal.clear_active_date();
    Ok(Json(view_of(&journal)?))
}

pub async fn journal_analyze(
    State(state): State<AppState>,
) -> Result<Json<SentimentView>, AppError> {
    let (text, images) = {
        let journal = state.journal.lock().await;
        let images = journal
            .placements()
            .iter()
            .map(|placement| placement.image_data.clone())
            .collect();
        (community::plain_text(journal.rich_text()), images)
    };

    let analysis = state.services.analyze(text, images).await?;
    let Some(summary) = analysis.emotional_summary else {
        return Err(AppError::bad_gateway(
            analysis
                .error
                .unwrap_or_else(|| "no response from the sentiment service".to_string()),
        ));
    };
    Ok(Json(SentimentView {
        emoji: sentiment::emotion_emoji(&analysis.dominant_emotion).to_string(),
        bars: sentiment::emotion_bars(&analysis.emotion_scores),
        emotion: analysis.dominant_emotion,
        summary,
    }))
}

pub async fn journal_mood_history(
    State(state): State<AppState>,
) -> Result<Json<MoodHistoryResponse>, AppError> {
    let records = state.services.mood_history().await?;
    Ok(Json(MoodHistoryResponse {
        points: sentiment::build_mood_history(&records),
    }))
}

pub async fn journal_share(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let text = {
        let journal = state.journal.lock().await;
        community::plain_text(journal.rich_text())
    };
    if text.is_empty() {
        return Err(AppError::bad_request(
            "Please write something in your journal before posting.",
        ));
    }

    let post = SharePost {
        text: community::sanitize_text(&text),
        timestamp: now_timestamp(),
    };
    state.services.share_post(&post).await?;
    Ok(Json(MessageResponse {
        message: "Your journal has been posted to the community!".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Community

pub async fn community_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<CommunityPost>>, AppError> {
    Ok(Json(state.services.community_posts().await?))
}

pub async fn community_comment(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(payload): Json<CommentRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let comment = payload.comment.trim();
    if comment.is_empty() {
        return Err(AppError::bad_request("Please write a comment!"));
    }
    let comment = CommunityComment {
        comment: community::sanitize_text(comment),
        timestamp: now_timestamp(),
    };
    state.services.post_comment(post_id, &comment).await?;
    Ok(Json(MessageResponse {
        message: "Comment posted".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Quiz

pub async fn quiz_start(
    State(state): State<AppState>,
) -> Result<Json<QuizStartResponse>, AppError> {
    let eligibility = state.services.check_eligibility().await;
    if !eligibility.can_submit {
        return Ok(Json(QuizStartResponse::Cooldown {
            days_remaining: eligibility.days_remaining,
            message: format!(
                "You have already completed this assessment recently. \
                 You can retake it in {} day(s).",
                eligibility.days_remaining
            ),
        }));
    }

    // The lock is not held across the upstream call; a concurrent request
    // hits the in-progress guard instead of queueing behind the mutex.
    let (history, index) = {
        let mut flow = state.quiz.lock().await;
        flow.start()?;
        flow.begin_generation()?;
        (flow.history().to_vec(), flow.current_index())
    };
    let question = state.services.generate_question(&history, index).await;
    let mut flow = state.quiz.lock().await;
    flow.present(question.clone());
    Ok(Json(QuizStartResponse::Question {
        progress: progress_of(&flow),
        question,
    }))
}

pub async fn quiz_question(
    State(state): State<AppState>,
) -> Result<Json<PreviousResponse>, AppError> {
    let flow = state.quiz.lock().await;
    let question = flow
        .current_question()
        .cloned()
        .ok_or_else(|| AppError::bad_request("no question is currently presented"))?;
    Ok(Json(PreviousResponse {
        question,
        previous_value: 0,
        progress: progress_of(&flow),
    }))
}

pub async fn quiz_answer(
    State(state): State<AppState>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let mut flow = state.quiz.lock().await;
    match flow.record_answer(payload.value, payload.text)? {
        NextStep::NextQuestion => {
            flow.begin_generation()?;
            let (history, index) = (flow.history().to_vec(), flow.current_index());
            drop(flow);
            let question = state.services.generate_question(&history, index).await;
            let mut flow = state.quiz.lock().await;
            flow.present(question.clone());
            Ok(Json(AnswerResponse::Question {
                progress: progress_of(&flow),
                question,
            }))
        }
        NextStep::PincodeEntry => Ok(Json(AnswerResponse::PincodeEntry {
            message: "Enter your 6-digit pincode to see your area's statistics.".to_string(),
        })),
    }
}

pub async fn quiz_previous(
    State(state): State<AppState>,
) -> Result<Json<PreviousResponse>, AppError> {
    let mut flow = state.quiz.lock().await;
    let (question, previous_value) = flow.previous()?;
    Ok(Json(PreviousResponse {
        question,
        previous_value,
        progress: progress_of(&flow),
    }))
}

pub async fn quiz_locate(
    State(state): State<AppState>,
    Json(payload): Json<LocateRequest>,
) -> Result<Json<PincodeLookup>, AppError> {
    let lookup = state
        .services
        .pincode_from_location(payload.latitude, payload.longitude)
        .await?;
    Ok(Json(lookup))
}

pub async fn quiz_submit(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<QuizResultResponse>, AppError> {
    let pincode = payload.pincode.trim();
    if !quiz::is_valid_pincode(pincode) {
        return Err(AppError::bad_request(
            "Please enter a valid 6-digit pincode.",
        ));
    }

    let (score, max_score, history) = {
        let flow = state.quiz.lock().await;
        let (score, max_score) = flow.score()?;
        (score, max_score, flow.history().to_vec())
    };

    let outcome = state
        .services
        .submit_assessment(&SubmitAssessmentRequest {
            pincode,
            score,
            max_score,
            conversation_history: &history,
        })
        .await?;

    let area = match outcome {
        SubmissionOutcome::RateLimited(message) => {
            return Err(AppError {
                status: StatusCode::TOO_MANY_REQUESTS,
                message,
            });
        }
        SubmissionOutcome::Accepted(area) => area,
    };

    let percentage = score as f64 / max_score as f64 * 100.0;
    let band = ResultBand::for_percentage(percentage);
    Ok(Json(QuizResultResponse {
        score,
        max_score,
        percentage,
        band,
        icon: band.icon().to_string(),
        title: band.title().to_string(),
        description: band.description().to_string(),
        area: Some(area),
    }))
}

// ---------------------------------------------------------------------------
// Habit

pub async fn habit_view(State(state): State<AppState>) -> Result<Json<HabitView>, AppError> {
    let habit = state.habit.lock().await;
    Ok(Json(habit_view_of(&habit, None, None)))
}

pub async fn habit_select(
    State(state): State<AppState>,
    Json(payload): Json<HabitSelectRequest>,
) -> Result<Json<HabitView>, AppError> {
    let habit_name = payload.habit.trim().to_string();
    let mut habit = state.habit.lock().await;
    habit.select_habit(habit_name);
    let warning = persist_habit(&state, &mut habit).await;
    Ok(Json(habit_view_of(&habit, None, warning)))
}

pub async fn habit_done(State(state): State<AppState>) -> Result<Json<HabitView>, AppError> {
    let mut habit = state.habit.lock().await;
    let message = match habit.mark_done(Local::now().date_naive()) {
        MarkOutcome::NoHabitSelected => {
            return Err(AppError::bad_request("select a habit before marking a day done"));
        }
        MarkOutcome::AlreadyDoneToday => {
            "You've already completed your habit for today! 🎉".to_string()
        }
        MarkOutcome::AlreadyFinished => {
            "Challenge already complete. Reset to start a new one.".to_string()
        }
        MarkOutcome::Recorded(day) => format!("Day {day} of {CHALLENGE_DAYS} recorded."),
        MarkOutcome::ChallengeComplete => {
            "🎉 Congratulations! You've completed your 7-day habit challenge!".to_string()
        }
    };
    let warning = persist_habit(&state, &mut habit).await;
    Ok(Json(habit_view_of(&habit, Some(message), warning)))
}

pub async fn habit_reset(State(state): State<AppState>) -> Result<Json<HabitView>, AppError> {
    let mut habit = state.habit.lock().await;
    habit.reset();
    let warning = persist_habit(&state, &mut habit).await;
    Ok(Json(habit_view_of(&habit, Some("Challenge reset".to_string()), warning)))
}

// ---------------------------------------------------------------------------
// Stress map & doctors

pub async fn stressmap_stats(State(state): State<AppState>) -> Result<Json<MapStats>, AppError> {
    let data = state.services.map_data().await?;
    Ok(Json(stressmap::aggregate(&data.features)))
}

pub async fn stressmap_pincode(
    State(state): State<AppState>,
    Path(pincode): Path<String>,
) -> Result<Json<AreaProperties>, AppError> {
    if !quiz::is_valid_pincode(&pincode) {
        return Err(AppError::bad_request(
            "Please enter a valid 6-digit pincode.",
        ));
    }
    let data = state.services.map_data().await?;
    match stressmap::find_pincode(&data.features, &pincode) {
        Some(area) => Ok(Json(area.clone())),
        None => Err(AppError {
            status: StatusCode::NOT_FOUND,
            message: format!("No assessment data found for pincode {pincode}"),
        }),
    }
}

pub async fn doctors_by_specialty(
    State(state): State<AppState>,
    Path(specialty): Path<String>,
    Query(query): Query<DoctorQuery>,
) -> Result<Json<DoctorListResponse>, AppError> {
    let response = state.services.doctors(&specialty).await?;
    let mut listed = response.doctors;
    if !response.success {
        listed.clear();
    }
    if let Some(search) = query.search.as_deref() {
        listed = doctors::filter_doctors(&listed, search)
            .into_iter()
            .cloned()
            .collect();
    }
    Ok(Json(DoctorListResponse {
        specialty,
        doctors: listed,
    }))
}

/// Booking confirmation: re-fetches the specialty's list and echoes the
/// matched doctor back. No appointment state is kept server-side.
pub async fn doctor_book(
    State(state): State<AppState>,
    Path(specialty): Path<String>,
    Json(payload): Json<BookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let response = state.services.doctors(&specialty).await?;
    let doctor = doctors::find_doctor(&response.doctors, payload.doctor_id)
        .ok_or_else(|| AppError {
            status: StatusCode::NOT_FOUND,
            message: format!(
                "No doctor with id {} offers {specialty}",
                payload.doctor_id
            ),
        })?
        .clone();
    Ok(Json(BookingResponse {
        message: format!("Appointment requested with {}.", doctor.name),
        doctor,
    }))
}

// ---------------------------------------------------------------------------

fn view_of(journal: &JournalSession) -> Result<JournalView, AppError> {
    let snapshot = journal.snapshot()?;
    Ok(JournalView {
        date: journal.active_date().to_string(),
        canvas_image: snapshot.canvas_image,
        rich_text: snapshot.rich_text,
        image_placements: snapshot.image_placements,
        undo_depth: journal.undo_depth(),
        entry_count: journal.entry_count(),
    })
}

fn progress_of(flow: &QuizFlow) -> QuizProgress {
    QuizProgress {
        question_number: flow.current_index() + 1,
        total_questions: quiz::TOTAL_QUESTIONS,
        percent: flow.progress_percent(),
    }
}

fn habit_view_of(
    habit: &HabitChallenge,
    message: Option<String>,
    storage_warning: Option<String>,
) -> HabitView {
    HabitView {
        current_habit: habit.data.current_habit.clone(),
        completed_days: habit.data.completed_days,
        challenge_days: CHALLENGE_DAYS,
        progress_percent: habit.progress_percent(),
        streak: habit.data.completed_days,
        complete: habit.is_complete(),
        markers: habit.day_markers(),
        message,
        storage_warning,
    }
}

/// Writes the habit blob through to disk; a failure flips the tracker into
/// memory-only mode and returns the warning exactly once.
async fn persist_habit(state: &AppState, habit: &mut HabitChallenge) -> Option<String> {
    if habit.memory_only {
        return None;
    }
    match persist_habit_data(&state.data_path, &habit.data).await {
        Ok(()) => None,
        Err(err) => {
            error!("failed to persist habit data: {}", err.message);
            habit.memory_only = true;
            Some(
                "Storage is unavailable: progress will reset when the server restarts."
                    .to_string(),
            )
        }
    }
}

fn now_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn today_string() -> String {
    Local::now().date_naive().to_string()
}

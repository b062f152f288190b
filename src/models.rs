use crate::canvas::Point;
use crate::habit::DayMarker;
use crate::journal::{EditorMode, ImagePlacement};
use crate::quiz::{ConversationTurn, Question, QuizOption, ResultBand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Journal API

#[derive(Debug, Deserialize)]
pub struct DateRequest {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct ToolRequest {
    pub mode: Option<EditorMode>,
    pub color: Option<String>,
    pub size: Option<u32>,
    pub highlighter: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct StrokeRequest {
    pub points: Vec<Point>,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub html: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageAddRequest {
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct ResizeRequest {
    pub width: f64,
    pub height: f64,
}

/// Current editor view: the active date's surfaces plus the session
/// counters shown in the toolbar.
#[derive(Debug, Serialize, Deserialize)]
pub struct JournalView {
    pub date: String,
    pub canvas_image: String,
    pub rich_text: String,
    pub image_placements: Vec<ImagePlacement>,
    pub undo_depth: usize,
    pub entry_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UndoResponse {
    pub undone: bool,
    /// "Nothing to undo" notification when the history is too short.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub view: JournalView,
}

// ---------------------------------------------------------------------------
// Sentiment service wire types (upstream field casing preserved)

#[derive(Debug, Serialize)]
pub struct AnalyzeRequest {
    pub text: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(rename = "EmotionalSummary")]
    pub emotional_summary: Option<String>,
    #[serde(rename = "DominantEmotion", default)]
    pub dominant_emotion: String,
    #[serde(rename = "EmotionScores", default)]
    pub emotion_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: String,
    #[serde(rename = "DominantEmotion", default)]
    pub dominant_emotion: String,
    #[serde(rename = "EmotionScores", default)]
    pub emotion_scores: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmotionBar {
    pub emotion: String,
    pub percent: i64,
    pub color: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoodPoint {
    pub label: String,
    pub emotion: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SentimentView {
    pub summary: String,
    pub emotion: String,
    pub emoji: String,
    pub bars: Vec<EmotionBar>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoodHistoryResponse {
    pub points: Vec<MoodPoint>,
}

// ---------------------------------------------------------------------------
// Community

#[derive(Debug, Serialize)]
pub struct SharePost {
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityComment {
    pub comment: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityPost {
    pub id: i64,
    pub text: String,
    pub timestamp: String,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default)]
    pub comments: Vec<CommunityComment>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub comment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Quiz backend wire types

#[derive(Debug, Serialize)]
pub struct GenerateQuestionRequest<'a> {
    pub conversation_history: &'a [ConversationTurn],
    pub question_number: usize,
    pub total_questions: usize,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedQuestion {
    pub success: bool,
    #[serde(default)]
    pub question: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<QuizOption>>,
    #[serde(default)]
    pub follow_up_areas: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EligibilityResponse {
    #[serde(default)]
    pub can_submit: bool,
    #[serde(default)]
    pub days_remaining: u32,
}

#[derive(Debug, Serialize)]
pub struct SubmitAssessmentRequest<'a> {
    pub pincode: &'a str,
    pub score: i64,
    pub max_score: i64,
    pub conversation_history: &'a [ConversationTurn],
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubmissionData {
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub total_assessments: u64,
    #[serde(default)]
    pub stress_level: Option<String>,
    #[serde(default)]
    pub average_score: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LocateRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PincodeLookup {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub pincode: Option<String>,
}

// ---------------------------------------------------------------------------
// Quiz API

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizProgress {
    pub question_number: usize,
    pub total_questions: usize,
    pub percent: f64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum QuizStartResponse {
    Question {
        question: Question,
        progress: QuizProgress,
    },
    Cooldown {
        days_remaining: u32,
        message: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub value: i64,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum AnswerResponse {
    Question {
        question: Question,
        progress: QuizProgress,
    },
    PincodeEntry {
        message: String,
    },
}

#[derive(Debug, Serialize)]
pub struct PreviousResponse {
    pub question: Question,
    pub previous_value: i64,
    pub progress: QuizProgress,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub pincode: String,
}

#[derive(Debug, Serialize)]
pub struct QuizResultResponse {
    pub score: i64,
    pub max_score: i64,
    pub percentage: f64,
    pub band: ResultBand,
    pub icon: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<SubmissionData>,
}

// ---------------------------------------------------------------------------
// Habit API

#[derive(Debug, Deserialize)]
pub struct HabitSelectRequest {
    pub habit: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitView {
    pub current_habit: String,
    pub completed_days: u32,
    pub challenge_days: u32,
    pub progress_percent: f64,
    pub streak: u32,
    pub complete: bool,
    pub markers: Vec<DayMarker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// One-time notice that progress is no longer being persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_warning: Option<String>,
}

// ---------------------------------------------------------------------------
// Stress map wire types

#[derive(Debug, Clone, Deserialize)]
pub struct MapData {
    #[serde(default)]
    pub features: Vec<MapFeature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapFeature {
    pub properties: AreaProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaProperties {
    pub pincode: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub stress_level: String,
    #[serde(default)]
    pub total_assessments: u64,
    #[serde(default)]
    pub average_score: f64,
    #[serde(default)]
    pub office_name: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MapStats {
    pub total_pincodes: usize,
    pub total_assessments: u64,
    pub average_score: f64,
    pub high_risk_areas: usize,
}

// ---------------------------------------------------------------------------
// Doctors

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialist: String,
    pub fees: i64,
}

#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub doctor_id: i64,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub message: String,
    pub doctor: Doctor,
}

#[derive(Debug, Deserialize)]
pub struct DoctorsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
}

#[derive(Debug, Deserialize)]
pub struct DoctorQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DoctorListResponse {
    pub specialty: String,
    pub doctors: Vec<Doctor>,
}

use crate::errors::AppError;
use crate::models::{
    AnalyzeRequest, AnalyzeResponse, CommunityComment, CommunityPost, DoctorsResponse,
    EligibilityResponse, GenerateQuestionRequest, GeneratedQuestion, HistoryRecord, LocateRequest,
    MapData, PincodeLookup, SharePost, SubmissionData, SubmitAssessmentRequest,
};
use crate::quiz::{self, ConversationTurn, Question};
use reqwest::{Client, StatusCode};
use std::env;
use tracing::warn;

pub const DEFAULT_SENTIMENT_BASE_URL: &str =
    "https://sentimentalanalyser-production.up.railway.app";
pub const DEFAULT_BACKEND_BASE_URL: &str = "http://127.0.0.1:8000";

pub enum SubmissionOutcome {
    Accepted(SubmissionData),
    /// The backend's cooldown kicked in (HTTP 429).
    RateLimited(String),
}

/// Clients for the remote collaborators: the sentiment/community service and
/// the assessment backend. Their contracts are opaque JSON; every call is
/// fire-and-forget from the session's perspective, with failures surfaced as
/// messages and never retried.
#[derive(Clone)]
pub struct Services {
    http: Client,
    sentiment_base: String,
    backend_base: String,
}

impl Services {
    pub fn new(http: Client) -> Self {
        Self::with_base_urls(
            http,
            base_url("SENTIMENT_BASE_URL", DEFAULT_SENTIMENT_BASE_URL),
            base_url("BACKEND_BASE_URL", DEFAULT_BACKEND_BASE_URL),
        )
    }

    pub fn with_base_urls(http: Client, sentiment_base: String, backend_base: String) -> Self {
        Self {
            http,
            sentiment_base,
            backend_base,
        }
    }

    // -- sentiment service --------------------------------------------------

    pub async fn analyze(&self, text: String, images: Vec<String>) -> Result<AnalyzeResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/analyze", self.sentiment_base))
            .json(&AnalyzeRequest { text, images })
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn mood_history(&self) -> Result<Vec<HistoryRecord>, AppError> {
        let response = self
            .http
            .get(format!("{}/history", self.sentiment_base))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn community_posts(&self) -> Result<Vec<CommunityPost>, AppError> {
        let response = self
            .http
            .get(format!("{}/community", self.sentiment_base))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn share_post(&self, post: &SharePost) -> Result<(), AppError> {
        self.http
            .post(format!("{}/community", self.sentiment_base))
            .json(post)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn post_comment(&self, post_id: i64, comment: &CommunityComment) -> Result<(), AppError> {
        self.http
            .post(format!("{}/community/{post_id}/comments", self.sentiment_base))
            .json(comment)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    // -- assessment backend -------------------------------------------------

    /// Asks the backend for the next question; any failure falls back to a
    /// built-in question so the assessment always proceeds.
    pub async fn generate_question(
        &self,
        history: &[ConversationTurn],
        question_index: usize,
    ) -> Question {
        match self.request_question(history, question_index).await {
            Ok(question) => question,
            Err(err) => {
                warn!("question generation failed, using backup question: {}", err.message);
                quiz::fallback_question(question_index)
            }
        }
    }

    async fn request_question(
        &self,
        history: &[ConversationTurn],
        question_index: usize,
    ) -> Result<Question, AppError> {
        let response = self
            .http
            .post(format!("{}/api/generate-question/", self.backend_base))
            .json(&GenerateQuestionRequest {
                conversation_history: history,
                question_number: question_index + 1,
                total_questions: quiz::TOTAL_QUESTIONS,
            })
            .send()
            .await?
            .error_for_status()?;
        let generated: GeneratedQuestion = response.json().await?;
        if !generated.success {
            return Err(AppError::bad_gateway(
                generated.error.unwrap_or_else(|| "question generation failed".to_string()),
            ));
        }
        Ok(Question {
            id: format!("ai_q_{}", question_index + 1),
            question: generated.question,
            kind: generated.kind.unwrap_or_else(|| "scale".to_string()),
            options: generated.options.unwrap_or_else(quiz::default_options),
            follow_up_areas: generated.follow_up_areas.unwrap_or_default(),
        })
    }

    /// Cooldown check before an assessment starts. Allowed on error: an
    /// unreachable backend must not lock people out of the quiz.
    pub async fn check_eligibility(&self) -> EligibilityResponse {
        let attempt = async {
            let response = self
                .http
                .post(format!("{}/api/check-eligibility/", self.backend_base))
                .json(&serde_json::json!({}))
                .send()
                .await?
                .error_for_status()?;
            Ok::<EligibilityResponse, AppError>(response.json().await?)
        };
        match attempt.await {
            Ok(eligibility) => eligibility,
            Err(err) => {
                warn!("eligibility check failed, allowing submission: {}", err.message);
                EligibilityResponse {
                    can_submit: true,
                    days_remaining: 0,
                }
            }
        }
    }

    pub async fn submit_assessment(
        &self,
        request: &SubmitAssessmentRequest<'_>,
    ) -> Result<SubmissionOutcome, AppError> {
        let response = self
            .http
            .post(format!("{}/api/submit-assessment/", self.backend_base))
            .json(request)
            .send()
            .await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let data: SubmissionData = response.json().await.unwrap_or_default();
            return Ok(SubmissionOutcome::RateLimited(
                data.message
                    .unwrap_or_else(|| "Rate limit exceeded. Please try again later.".to_string()),
            ));
        }
        let response = response.error_for_status()?;
        Ok(SubmissionOutcome::Accepted(response.json().await?))
    }

    pub async fn pincode_from_location(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<PincodeLookup, AppError> {
        let response = self
            .http
            .post(format!("{}/api/get-pincode-from-location/", self.backend_base))
            .json(&LocateRequest { latitude, longitude })
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn map_data(&self) -> Result<MapData, AppError> {
        let response = self
            .http
            .get(format!("{}/api/map-data/", self.backend_base))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn doctors(&self, specialty: &str) -> Result<DoctorsResponse, AppError> {
        let response = self
            .http
            .get(format!(
                "{}/api/doctors/{}/",
                self.backend_base,
                encode_segment(specialty)
            ))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

fn base_url(var: &str, default: &str) -> String {
    let base = env::var(var).unwrap_or_else(|_| default.to_string());
    base.trim_end_matches('/').to_string()
}

/// Percent-encodes a single path segment (specialty names carry spaces).
fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

//! Demo question and comparison handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use adsdemo_common::{
    errors::{AppError, Result},
    ComparisonResult, FALLBACK_QUESTION,
};

/// Longest question accepted by `/demo/run`, in characters
pub const MAX_QUESTION_CHARS: usize = 2000;

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<String>,
}

/// Demo run request
#[derive(Debug, Deserialize)]
pub struct DemoRequest {
    #[serde(default)]
    pub question: String,
}

/// List the demo questions
pub async fn questions(State(state): State<AppState>) -> Json<QuestionsResponse> {
    Json(QuestionsResponse {
        questions: state.comparator.store().questions.clone(),
    })
}

/// Run the baseline vs augmented comparison
pub async fn run_demo(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DemoRequest>, JsonRejection>,
) -> Result<Json<ComparisonResult>> {
    let Json(request) = payload.map_err(|rejection| AppError::Validation {
        message: rejection.body_text(),
        field: None,
    })?;
    let mut question = request.question.trim().to_string();

    if question.chars().count() > MAX_QUESTION_CHARS {
        return Err(AppError::Validation {
            message: format!("question must be at most {MAX_QUESTION_CHARS} characters"),
            field: Some("question".to_string()),
        });
    }

    if question.is_empty() {
        question = state
            .comparator
            .store()
            .questions
            .first()
            .cloned()
            .unwrap_or_else(|| FALLBACK_QUESTION.to_string());
        tracing::debug!(question = %question, "Blank question replaced by demo default");
    }

    let result = state.comparator.compare(&question).await;
    Ok(Json(result))
}

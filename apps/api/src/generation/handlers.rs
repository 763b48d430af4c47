//! Axum route handlers for the AI proxy.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::generation::prompts::{
    fill_template, COVER_LETTER_PARAMS, COVER_LETTER_TEMPLATE, RESUME_PARAMS, RESUME_TEMPLATE,
    WRITER_SYSTEM,
};
use crate::llm_client::GenerationParams;
use crate::state::AppState;

const MISSING_DESCRIPTION: &str = "Missing job description";

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
}

/// `{ success, content?, error? }` envelope shared by both endpoints.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateResponse {
    fn content(content: String) -> Self {
        Self {
            success: true,
            content: Some(content),
            error: None,
        }
    }

    fn failure(error: &str) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Document {
    CoverLetter,
    Resume,
}

impl Document {
    fn label(self) -> &'static str {
        match self {
            Document::CoverLetter => "cover letter",
            Document::Resume => "resume",
        }
    }

    fn template(self) -> &'static str {
        match self {
            Document::CoverLetter => COVER_LETTER_TEMPLATE,
            Document::Resume => RESUME_TEMPLATE,
        }
    }

    fn params(self) -> GenerationParams {
        match self {
            Document::CoverLetter => COVER_LETTER_PARAMS,
            Document::Resume => RESUME_PARAMS,
        }
    }
}

/// POST /ai/generate-cover-letter
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> (StatusCode, Json<GenerateResponse>) {
    generate_document(&state, Document::CoverLetter, payload).await
}

/// POST /ai/generate-resume
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> (StatusCode, Json<GenerateResponse>) {
    generate_document(&state, Document::Resume, payload).await
}

async fn generate_document(
    state: &AppState,
    document: Document,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> (StatusCode, Json<GenerateResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected {} request body: {rejection}", document.label());
            return (
                StatusCode::BAD_REQUEST,
                Json(GenerateResponse::failure(MISSING_DESCRIPTION)),
            );
        }
    };

    let Some(description) = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(GenerateResponse::failure(MISSING_DESCRIPTION)),
        );
    };

    let prompt = fill_template(document.template(), description, request.profile.as_deref());

    match state
        .generator
        .generate(WRITER_SYSTEM, &prompt, document.params())
        .await
    {
        Ok(content) => (StatusCode::OK, Json(GenerateResponse::content(content))),
        Err(e) => {
            error!("{} generation failed: {e}", document.label());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GenerateResponse::failure("Server error")),
            )
        }
    }
}

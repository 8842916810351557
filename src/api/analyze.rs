//! The analyze endpoint: decides, from two optional inputs, which pipeline
//! branch to run and maps every failure to a structured JSON body.
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse, response::Response};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{app::AppState, clients::bookstore::extract_book_id, pipeline::AnalysisError};

const BOTH_INPUTS_ERROR: &str = "Please provide either a review text or a URL, not both.";
const INVALID_URL_ERROR: &str = "Invalid Rokomari URL. Please provide a valid book URL like: \
                                 https://www.rokomari.com/book/123456/book-name";
const NOTHING_PROVIDED_MESSAGE: &str =
    "Please enter some review text or a valid Rokomari book URL.";

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeRequest {
    #[serde(default)]
    review_text: Option<String>,
    #[serde(default)]
    book_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct InfoResponse {
    message: &'static str,
}

pub(crate) async fn analyze(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Response {
    let review_text = payload.review_text.as_deref().unwrap_or("").trim();
    let book_url = payload.book_url.as_deref().unwrap_or("").trim();

    match (!review_text.is_empty(), !book_url.is_empty()) {
        (true, true) => {
            state.telemetry().metrics().analyze_input_errors_total.inc();
            error_response(StatusCode::BAD_REQUEST, BOTH_INPUTS_ERROR)
        }
        (true, false) => {
            state.telemetry().metrics().analyze_single_total.inc();
            match state.analyzer().analyze_text(review_text).await {
                Ok(report) => (StatusCode::OK, Json(report)).into_response(),
                Err(error) => analysis_error_response(&error),
            }
        }
        (false, true) => {
            let Some(book_id) = extract_book_id(book_url) else {
                state.telemetry().metrics().analyze_input_errors_total.inc();
                warn!(url = %book_url, "book id extraction failed");
                return error_response(StatusCode::BAD_REQUEST, INVALID_URL_ERROR);
            };
            state.telemetry().metrics().analyze_bulk_total.inc();
            match state.analyzer().analyze_book(&book_id).await {
                Ok(report) => (StatusCode::OK, Json(report)).into_response(),
                Err(error) => analysis_error_response(&error),
            }
        }
        (false, false) => (
            StatusCode::OK,
            Json(InfoResponse {
                message: NOTHING_PROVIDED_MESSAGE,
            }),
        )
            .into_response(),
    }
}

fn analysis_error_response(error: &AnalysisError) -> Response {
    let status = match error {
        AnalysisError::Fetch(_) => StatusCode::BAD_GATEWAY,
        AnalysisError::NoReviews => StatusCode::NOT_FOUND,
        AnalysisError::Classify(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!(%status, error = %error, "analysis failed");
    error_response(status, &error.to_string())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = Json(ErrorResponse {
        error: message.to_string(),
    });
    (status, body).into_response()
}

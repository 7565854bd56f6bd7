//! Wire shapes of the backend's JSON bodies.

use serde::{Deserialize, Serialize};

/// Body of `POST /tts`.
#[derive(Debug, Serialize)]
pub struct TtsBody<'a> {
    pub text: &'a str,
    pub voice: &'a str,
}

/// Body of `GET /chapter`.
#[derive(Debug, Deserialize)]
pub struct ChapterContentBody {
    pub content: Vec<String>,
}

/// FastAPI error body (`HTTPException`).
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Pull the `detail` message out of an error body, if it has one.
pub fn error_detail(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| b.detail)
}

//! Extraction Orchestrator: page images in, normalized `ResumeData` out.
//!
//! The vision model and the rotation counter are traits so the rotation
//! policy in `orchestrator` can be driven by scripted fakes in tests.

pub mod handlers;
pub mod keys;
pub mod orchestrator;
pub mod prompts;
pub mod response;

use async_trait::async_trait;
use thiserror::Error;

use crate::llm_client::VisionError;

pub use keys::{KeyRing, RedisRotationCounter, RotationCounter};
pub use orchestrator::ResumeExtractor;

/// Shown to callers when the model output cannot be reduced to JSON.
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "Failed to parse AI response. Please retry with a clearer PDF or try again in a moment.";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Vision service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("{0}")]
    MalformedResponse(String),

    #[error("All {attempts} API keys exhausted (last error: {last})")]
    AllKeysExhausted {
        attempts: usize,
        last: Box<ExtractionError>,
    },
}

/// A chat model that can read page images.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Sends `prompt` plus one image part per base64 PNG payload and returns
    /// the model's raw reply text.
    async fn complete(
        &self,
        api_key: &str,
        prompt: &str,
        images: &[String],
    ) -> Result<String, VisionError>;
}

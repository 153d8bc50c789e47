//! Key-rotating extraction loop.

use std::sync::Arc;

use tracing::{info, warn};

use super::keys::{KeyRing, RotationCounter, ROTATION_KEY};
use super::prompts::EXTRACTION_PROMPT;
use super::response::parse_resume;
use super::{ExtractionError, VisionModel};
use crate::models::resume::ResumeData;

/// Turns page images into `ResumeData`, rotating through the configured keys
/// when a key is rate limited or rejected.
pub struct ResumeExtractor {
    model: Arc<dyn VisionModel>,
    keys: KeyRing,
    counter: Option<Arc<dyn RotationCounter>>,
}

impl ResumeExtractor {
    pub fn new(
        model: Arc<dyn VisionModel>,
        keys: KeyRing,
        counter: Option<Arc<dyn RotationCounter>>,
    ) -> Self {
        Self {
            model,
            keys,
            counter,
        }
    }

    /// One sequential attempt per configured key, starting at the shared
    /// rotation index. Non-rotatable failures abort immediately; no partial
    /// result is ever returned.
    pub async fn extract(&self, images: &[String]) -> Result<ResumeData, ExtractionError> {
        let payloads = image_payloads(images)?;
        if self.keys.is_empty() {
            return Err(ExtractionError::UpstreamUnavailable(
                "no vision API keys are configured".to_string(),
            ));
        }

        let key_count = self.keys.len();
        let start = self.start_slot().await;
        let mut last: Option<ExtractionError> = None;

        for attempt in 0..key_count {
            let slot = (start + attempt) % key_count;
            let Some(api_key) = self.keys.get(slot) else {
                break;
            };

            match self.model.complete(api_key, EXTRACTION_PROMPT, &payloads).await {
                Ok(text) => {
                    let data = parse_resume(&text)?;
                    info!(
                        "Resume extracted with key slot {slot} on attempt {}",
                        attempt + 1
                    );
                    self.advance((slot + 1) % key_count).await;
                    return Ok(data);
                }
                Err(e) if e.is_rotatable() => {
                    warn!(
                        "Vision key slot {slot} is rate limited or rejected ({}), rotating",
                        e.class()
                    );
                    last = Some(ExtractionError::RateLimited(e.to_string()));
                }
                Err(e) => {
                    warn!("Vision call on key slot {slot} failed ({}): {e}", e.class());
                    return Err(ExtractionError::UpstreamUnavailable(e.to_string()));
                }
            }
        }

        Err(ExtractionError::AllKeysExhausted {
            attempts: key_count,
            last: Box::new(last.unwrap_or_else(|| {
                ExtractionError::RateLimited("no attempt was made".to_string())
            })),
        })
    }

    async fn start_slot(&self) -> usize {
        let Some(counter) = &self.counter else {
            return 0;
        };
        match counter.get(ROTATION_KEY).await {
            Ok(Some(index)) => index.rem_euclid(self.keys.len() as i64) as usize,
            Ok(None) => 0,
            Err(e) => {
                warn!("Rotation counter read failed, starting at slot 0: {e}");
                0
            }
        }
    }

    async fn advance(&self, next: usize) {
        let Some(counter) = &self.counter else {
            return;
        };
        if let Err(e) = counter.set(ROTATION_KEY, next as i64).await {
            warn!("Rotation counter write failed: {e}");
        }
    }
}

/// Strips any data-URL prefix (everything up to the first comma) and rejects
/// an empty list or an empty payload.
pub fn image_payloads(images: &[String]) -> Result<Vec<String>, ExtractionError> {
    if images.is_empty() {
        return Err(ExtractionError::InvalidInput("No images provided".to_string()));
    }
    images
        .iter()
        .enumerate()
        .map(|(index, image)| {
            let payload = match image.split_once(',') {
                Some((_, data)) => data,
                None => image.as_str(),
            }
            .trim();
            if payload.is_empty() {
                return Err(ExtractionError::InvalidInput(format!(
                    "image {} has no data",
                    index + 1
                )));
            }
            Ok(payload.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::VisionError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const GOOD_REPLY: &str = r#"{"name": "Key Two", "skills": ["Rust"]}"#;

    /// Replays scripted outcomes and records which key each call used.
    struct ScriptedModel {
        outcomes: Mutex<VecDeque<Result<String, VisionError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(outcomes: Vec<Result<String, VisionError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn keys_used(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VisionModel for ScriptedModel {
        async fn complete(
            &self,
            api_key: &str,
            _prompt: &str,
            _images: &[String],
        ) -> Result<String, VisionError> {
            self.calls.lock().unwrap().push(api_key.to_string());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(VisionError::EmptyContent))
        }
    }

    #[derive(Default)]
    struct MemoryCounter {
        value: Mutex<Option<i64>>,
        broken: bool,
    }

    #[async_trait]
    impl RotationCounter for MemoryCounter {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<i64>> {
            if self.broken {
                anyhow::bail!("connection refused");
            }
            Ok(*self.value.lock().unwrap())
        }

        async fn set(&self, _key: &str, value: i64) -> anyhow::Result<()> {
            if self.broken {
                anyhow::bail!("connection refused");
            }
            *self.value.lock().unwrap() = Some(value);
            Ok(())
        }
    }

    fn rate_limited() -> Result<String, VisionError> {
        Err(VisionError::Api {
            status: 429,
            message: "Rate limit exceeded".to_string(),
        })
    }

    fn pages() -> Vec<String> {
        vec!["data:image/png;base64,AAAA".to_string()]
    }

    #[tokio::test]
    async fn test_all_keys_rate_limited_exhausts_after_one_call_each() {
        let model = ScriptedModel::new(vec![rate_limited(), rate_limited(), rate_limited()]);
        let extractor = ResumeExtractor::new(model.clone(), KeyRing::parse("k1,k2,k3"), None);

        let err = extractor.extract(&pages()).await.unwrap_err();

        assert_eq!(model.keys_used(), vec!["k1", "k2", "k3"]);
        match err {
            ExtractionError::AllKeysExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, ExtractionError::RateLimited(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_second_key_succeeds_after_first_is_rate_limited() {
        let model = ScriptedModel::new(vec![rate_limited(), Ok(GOOD_REPLY.to_string())]);
        let extractor = ResumeExtractor::new(model.clone(), KeyRing::parse("k1,k2,k3"), None);

        let data = extractor.extract(&pages()).await.unwrap();

        assert_eq!(model.keys_used(), vec!["k1", "k2"]);
        assert_eq!(data.name.as_deref(), Some("Key Two"));
        assert_eq!(data.skills, vec!["Rust"]);
    }

    #[tokio::test]
    async fn test_non_rotatable_error_aborts_immediately() {
        let model = ScriptedModel::new(vec![Err(VisionError::Api {
            status: 500,
            message: "internal error".to_string(),
        })]);
        let extractor = ResumeExtractor::new(model.clone(), KeyRing::parse("k1,k2"), None);

        let err = extractor.extract(&pages()).await.unwrap_err();

        assert_eq!(model.keys_used().len(), 1);
        assert!(matches!(err, ExtractionError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_malformed_and_not_retried() {
        let model = ScriptedModel::new(vec![Ok("sorry, no JSON today".to_string())]);
        let extractor = ResumeExtractor::new(model.clone(), KeyRing::parse("k1,k2"), None);

        let err = extractor.extract(&pages()).await.unwrap_err();

        assert_eq!(model.keys_used().len(), 1);
        assert!(matches!(err, ExtractionError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_empty_image_list_is_invalid_input() {
        let model = ScriptedModel::new(vec![]);
        let extractor = ResumeExtractor::new(model.clone(), KeyRing::parse("k1"), None);

        let err = extractor.extract(&[]).await.unwrap_err();

        assert!(matches!(err, ExtractionError::InvalidInput(_)));
        assert!(model.keys_used().is_empty());
    }

    #[tokio::test]
    async fn test_counter_sets_start_slot_and_advances_on_success() {
        let model = ScriptedModel::new(vec![rate_limited(), Ok(GOOD_REPLY.to_string())]);
        let counter = Arc::new(MemoryCounter {
            value: Mutex::new(Some(1)),
            broken: false,
        });
        let extractor = ResumeExtractor::new(
            model.clone(),
            KeyRing::parse("k1,k2,k3"),
            Some(counter.clone()),
        );

        extractor.extract(&pages()).await.unwrap();

        assert_eq!(model.keys_used(), vec!["k2", "k3"]);
        assert_eq!(*counter.value.lock().unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_broken_counter_falls_back_to_first_key() {
        let model = ScriptedModel::new(vec![Ok(GOOD_REPLY.to_string())]);
        let counter = Arc::new(MemoryCounter {
            broken: true,
            ..Default::default()
        });
        let extractor = ResumeExtractor::new(model.clone(), KeyRing::parse("k1,k2"), Some(counter));

        assert!(extractor.extract(&pages()).await.is_ok());
        assert_eq!(model.keys_used(), vec!["k1"]);
    }

    #[test]
    fn test_image_payloads_strip_data_url_prefix() {
        let payloads = image_payloads(&[
            "data:image/png;base64,QUJD".to_string(),
            "REVG".to_string(),
        ])
        .unwrap();
        assert_eq!(payloads, vec!["QUJD", "REVG"]);

        assert!(matches!(
            image_payloads(&["data:image/png;base64,".to_string()]),
            Err(ExtractionError::InvalidInput(_))
        ));
    }
}

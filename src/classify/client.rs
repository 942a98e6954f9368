use anyhow::Result;
use std::sync::Arc;

use crate::classify::backend::ClassifierBackend;
use crate::classify::backends::GeminiBackend;
use crate::classify::error::ClassificationFailed;
use crate::classify::result::ClassificationResult;
use crate::config::ClassifierConfig;
use crate::payload::ImagePayload;

/// Entry point for food image classification.
///
/// Built once from configuration. Without a credential the client is
/// degraded: `classify` returns `ClassificationResult::fallback()` and never
/// touches the network. With a backend, failures are reported, never
/// replaced by the fallback.
#[derive(Clone)]
pub struct ClassificationClient {
    backend: Option<Arc<dyn ClassifierBackend>>,
}

impl ClassificationClient {
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        match &config.api_key {
            Some(api_key) => {
                let backend = GeminiBackend::new(config, api_key.clone())?;
                log::info!(
                    "classifier: {} via {}",
                    config.model,
                    backend.url().origin().ascii_serialization()
                );
                Ok(Self::with_backend(backend))
            }
            None => {
                log::warn!("classifier: no API key configured; using fallback results");
                Ok(Self::degraded())
            }
        }
    }

    pub fn with_backend<B: ClassifierBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Some(Arc::new(backend)),
        }
    }

    pub fn degraded() -> Self {
        Self { backend: None }
    }

    pub fn is_degraded(&self) -> bool {
        self.backend.is_none()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend
            .as_ref()
            .map(|backend| backend.name())
            .unwrap_or("fallback")
    }

    /// Classify one image. Blocks for at most the configured timeout.
    pub fn classify(&self, image: &ImagePayload) -> Result<ClassificationResult, ClassificationFailed> {
        let Some(backend) = self.backend.as_ref() else {
            return Ok(ClassificationResult::fallback());
        };
        match backend.classify(image) {
            Ok(result) => {
                log::debug!(
                    "classified {} as '{}' ({}), freshness={}",
                    image.digest_hex(),
                    result.title,
                    result.category,
                    result.freshness_score
                );
                Ok(result)
            }
            Err(err) => {
                log::error!("classification failed ({}): {}", backend.name(), err);
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for ClassificationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationClient")
            .field("backend", &self.backend_name())
            .finish()
    }
}

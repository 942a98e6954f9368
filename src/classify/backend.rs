use crate::classify::error::ClassificationFailed;
use crate::classify::result::ClassificationResult;
use crate::payload::ImagePayload;

/// Classifier backend trait.
///
/// A backend performs exactly one classification attempt per call: no retry,
/// no fallback substitution. The degraded mode is decided by
/// `ClassificationClient`, never by a backend.
pub trait ClassifierBackend: Send + Sync {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Classify one image.
    fn classify(&self, image: &ImagePayload) -> Result<ClassificationResult, ClassificationFailed>;
}

use crate::classify::backend::ClassifierBackend;
use crate::classify::error::ClassificationFailed;
use crate::classify::result::ClassificationResult;
use crate::payload::ImagePayload;

/// Offline backend that answers every image with a preset outcome.
///
/// Useful for demos and for exercising callers against both outcomes
/// without a network.
pub struct StaticBackend {
    outcome: Result<ClassificationResult, ClassificationFailed>,
}

impl StaticBackend {
    pub fn new(result: ClassificationResult) -> Self {
        Self {
            outcome: Ok(result),
        }
    }

    pub fn failing(error: ClassificationFailed) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

impl ClassifierBackend for StaticBackend {
    fn name(&self) -> &'static str {
        "static"
    }

    fn classify(&self, _image: &ImagePayload) -> Result<ClassificationResult, ClassificationFailed> {
        self.outcome.clone()
    }
}

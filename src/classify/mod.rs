mod analysis;
mod backend;
pub mod backends;
mod client;
mod error;
mod result;

pub use analysis::{Analysis, AnalysisState};
pub use backend::ClassifierBackend;
pub use backends::{GeminiBackend, StaticBackend};
pub use client::ClassificationClient;
pub use error::ClassificationFailed;
pub use result::ClassificationResult;

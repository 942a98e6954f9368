pub mod gemini;
pub mod fixed;

pub use fixed::StaticBackend;
pub use gemini::GeminiBackend;

/// A classification attempt that reached the upstream service (or tried to)
/// and did not yield a usable result.
///
/// This is distinct from the degraded mode: a missing credential never
/// produces this error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassificationFailed {
    /// Connection, DNS, TLS or timeout failure.
    Transport(String),
    /// Upstream answered with a non-2xx status.
    Status { code: u16, body: String },
    /// Upstream answered without any candidate text.
    EmptyResponse,
    /// Body or candidate text was not the expected JSON.
    MalformedResponse(String),
    /// JSON parsed but violates the result contract.
    InvalidShape(String),
}

impl ClassificationFailed {
    pub fn code(&self) -> &'static str {
        match self {
            ClassificationFailed::Transport(_) => "CLASSIFY_TRANSPORT",
            ClassificationFailed::Status { .. } => "CLASSIFY_STATUS",
            ClassificationFailed::EmptyResponse => "CLASSIFY_EMPTY",
            ClassificationFailed::MalformedResponse(_) => "CLASSIFY_MALFORMED",
            ClassificationFailed::InvalidShape(_) => "CLASSIFY_SHAPE",
        }
    }
}

impl std::fmt::Display for ClassificationFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassificationFailed::Transport(msg) => {
                write!(f, "{}: transport error: {}", self.code(), msg)
            }
            ClassificationFailed::Status { code, body } => {
                write!(f, "{}: upstream returned {}: {}", self.code(), code, body)
            }
            ClassificationFailed::EmptyResponse => {
                write!(f, "{}: empty response from classifier", self.code())
            }
            ClassificationFailed::MalformedResponse(msg) => {
                write!(f, "{}: malformed response: {}", self.code(), msg)
            }
            ClassificationFailed::InvalidShape(msg) => {
                write!(f, "{}: invalid result: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for ClassificationFailed {}

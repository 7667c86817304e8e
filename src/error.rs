use std::{error::Error as StdError, fmt, io, result::Result as StdResult};

/// Per-theorem extraction failures. All of these are recoverable: the
/// theorem is dropped with a diagnostic and processing continues.
#[derive(Debug, Clone)]
pub enum ExtractError {
    MissingProof { module: String, theorem: String },
    MissingOperator { module: String, theorem: String },
    NoGoalEvidence { module: String, theorem: String },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingProof { module, theorem } => {
                write!(f, "no proof text for {theorem} in {module}")
            }
            Self::MissingOperator { module, theorem } => {
                write!(f, "no proof operator for {theorem} in {module}")
            }
            Self::NoGoalEvidence { module, theorem } => {
                write!(
                    f,
                    "no tactic or term evidence recovers a goal state for {theorem} in {module}"
                )
            }
        }
    }
}

impl StdError for ExtractError {}

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Json(serde_json::Error),
    Extract(ExtractError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Extract(e) => write!(f, "Extraction error: {e}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Extract(e) => Some(e),
        }
    }
}

impl From<ExtractError> for Error {
    fn from(e: ExtractError) -> Self {
        Self::Extract(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

pub type Result<T> = StdResult<T, Error>;

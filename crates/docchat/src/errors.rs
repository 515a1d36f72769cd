use thiserror::Error;

/// Which side of the conversation a part belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PartSide {
    #[strum(serialize = "ModelRequest")]
    Request,
    #[strum(serialize = "ModelResponse")]
    Response,
}

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    #[error("{side} {kind} part not supported yet")]
    UnsupportedPart { side: PartSide, kind: String },

    #[error("Invalid part: {0}")]
    UnknownPartKind(String),

    #[error("Could not decode: {0}")]
    Decode(String),

    #[error("Request turn has no parts to take a timestamp from")]
    EmptyTurn,

    #[error("Tool call arguments must be a JSON object: {0}")]
    InvalidToolArgs(String),

    #[error("Invalid turn: {0}")]
    InvalidTurn(String),
}

impl TranslationError {
    pub(crate) fn unsupported(side: PartSide, kind: impl Into<String>) -> Self {
        TranslationError::UnsupportedPart {
            side,
            kind: kind.into(),
        }
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(err: serde_json::Error) -> Self {
        TranslationError::Decode(err.to_string())
    }
}

pub type TranslationResult<T> = Result<T, TranslationError>;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Provider request failed: {0}")]
    Provider(#[source] anyhow::Error),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("Tool loop exceeded {0} rounds")]
    TooManyToolRounds(usize),
}

pub type AgentResult<T> = Result<T, AgentError>;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

//! Error taxonomy shared by every pipeline stage.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Any of these aborts evaluation at the point of detection and is returned
/// to the embedding host unchanged. Control-flow signals are not errors and
/// never appear here, except `break`/`continue` reaching the top level,
/// which convert into [`Error::Runtime`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("lex error: {0}")]
    Lex(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("name error: {0}")]
    Name(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("range error: {0}")]
    Range(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

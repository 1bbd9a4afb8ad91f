use thiserror::Error;

/// Why a pattern could not be parsed. Columns are 0-based character offsets
/// into the pattern after escape decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("Unterminated character class")]
    UnterminatedClass,
    #[error("Nothing to repeat at column {0}")]
    NothingToRepeat(usize),
    #[error("Unmatched ) at column {0}")]
    UnmatchedParen(usize),
    #[error("Unterminated group")]
    UnterminatedGroup,
    #[error("Invalid group, character '{character}' after '?' at column {column}")]
    InvalidGroup { character: char, column: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid regular expression: /{pattern}/: {kind}")]
pub struct ParseError {
    pub pattern: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(pattern: &str, kind: ParseErrorKind) -> Self {
        Self {
            pattern: pattern.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Unknown token found")]
    UnknownToken,
    #[error("Could not find a valid codepoint")]
    NoValidCodepoint,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

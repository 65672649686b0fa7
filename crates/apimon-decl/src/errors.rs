use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while extracting declarations
#[derive(Error, Debug)]
pub enum ParserError {
    /// Failed to read file
    #[error("IO error reading {0}: {1}")]
    IoError(PathBuf, #[source] std::io::Error),

    /// Syntax error in source code
    #[error("Syntax error in {0}:{1}:{2}: {3}")]
    SyntaxError(PathBuf, usize, usize, String),

    /// File too large
    #[error("File {0} exceeds maximum size ({1} bytes)")]
    FileTooLarge(PathBuf, usize),

    /// Generic parsing error
    #[error("Parse error in {0}: {1}")]
    ParseError(PathBuf, String),
}

/// Result type for parser operations
pub type ParserResult<T> = Result<T, ParserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = ParserError::SyntaxError(PathBuf::from("api.h"), 3, 7, "missing ;".to_string());
        assert_eq!(err.to_string(), "Syntax error in api.h:3:7: missing ;");
    }

    #[test]
    fn test_file_too_large_display() {
        let err = ParserError::FileTooLarge(PathBuf::from("big.h"), 1024);
        assert_eq!(
            err.to_string(),
            "File big.h exceeds maximum size (1024 bytes)"
        );
    }
}

//! Error types for header conversion.
//!
//! All fallible operations return [`Result<T>`]. Unknown types are never
//! errors; they are collected in the [`EmitReport`](crate::EmitReport).

use apimon_decl::ParserError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Every way a conversion can fail.
#[derive(Error, Debug)]
pub enum Error {
    /// A referenced monitor header definition does not exist
    #[error("API Monitor header '{name}' not found at {path}")]
    HeaderNotFound {
        /// Header name as requested (`common.h`)
        name: String,
        /// Resolved location
        path: PathBuf,
    },

    /// No installation directory was given and none could be derived
    #[error("API Monitor installation directory not given and ChocolateyInstall is not set")]
    MissingInstallDir,

    /// Malformed monitor definition XML
    #[error("XML error in {path}: {message}")]
    Xml {
        /// Document the error was found in
        path: PathBuf,
        /// Reader error details
        message: String,
    },

    /// Reading an input file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The C front-end rejected the header
    #[error(transparent)]
    Parser(#[from] ParserError),

    /// A parameter shape the monitor format cannot express
    #[error("unsupported type for parameter '{parameter}' of {function} (line {line}): {shape}")]
    UnsupportedParameter {
        /// Function being emitted
        function: String,
        /// Header line of the declaration
        line: usize,
        /// Declared or synthesized parameter name
        parameter: String,
        /// Description of the declared shape
        shape: String,
    },

    /// A return shape the monitor format cannot express
    #[error("unsupported return type of {function} (line {line}): {shape}")]
    UnsupportedReturn {
        /// Function being emitted
        function: String,
        /// Header line of the declaration
        line: usize,
        /// Description of the declared shape
        shape: String,
    },

    /// Writing the output document failed
    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),
}

impl Error {
    /// Create an I/O error for `path`.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an XML error for the document at `path`.
    pub fn xml(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Xml {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}

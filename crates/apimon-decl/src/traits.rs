use crate::{config::ParserConfig, errors::ParserError, ir::HeaderIR};
use std::path::Path;

/// Contract every C front-end implements
///
/// The emitter only needs function declarations with a name, ordered
/// parameters with a resolved [`TypeShape`](crate::TypeShape), and a return
/// shape. Any front-end producing a [`HeaderIR`] satisfies it.
pub trait DeclParser {
    /// Returns the language identifier (lowercase, e.g. "c")
    fn language(&self) -> &str;

    /// Extract declarations from an in-memory source string
    ///
    /// # Arguments
    /// * `source` - Header source text
    /// * `file_path` - Logical path for this source (used in errors and the IR)
    fn parse_source(&self, source: &str, file_path: &Path) -> Result<HeaderIR, ParserError>;

    /// Get parser configuration
    fn config(&self) -> &ParserConfig;

    /// Read a header from disk and extract its declarations
    ///
    /// # Errors
    /// Returns `ParserError` if:
    /// - File cannot be read
    /// - File exceeds `max_file_size`
    /// - Source code has syntax errors (strict mode)
    fn parse_file(&self, path: &Path) -> Result<HeaderIR, ParserError> {
        let metadata =
            std::fs::metadata(path).map_err(|e| ParserError::IoError(path.to_path_buf(), e))?;
        let max = self.config().max_file_size;
        if metadata.len() as usize > max {
            return Err(ParserError::FileTooLarge(path.to_path_buf(), max));
        }

        let source = std::fs::read_to_string(path)
            .map_err(|e| ParserError::IoError(path.to_path_buf(), e))?;
        self.parse_source(&source, path)
    }

    /// Check if this parser can handle the given file
    fn can_parse(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext, "h" | "hpp" | "hh" | "c"))
            .unwrap_or(false)
    }
}

use apimon_decl::{DeclParser, HeaderIR, ParserConfig, ParserError};
use std::path::Path;

use crate::extractor;

/// tree-sitter backed C front-end
#[derive(Debug, Clone, Default)]
pub struct CParser {
    config: ParserConfig,
}

impl CParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }
}

impl DeclParser for CParser {
    fn language(&self) -> &str {
        "c"
    }

    fn parse_source(&self, source: &str, file_path: &Path) -> Result<HeaderIR, ParserError> {
        let ir = extractor::extract(source, file_path, &self.config)?.ir;
        if ir.is_partial() {
            log::warn!(
                "{}: skipped {} syntax error node(s), output may be incomplete",
                file_path.display(),
                ir.error_count
            );
        }
        Ok(ir)
    }

    fn config(&self) -> &ParserConfig {
        &self.config
    }
}

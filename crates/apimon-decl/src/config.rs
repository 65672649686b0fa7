/// Configuration for front-end behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Keep extracting declarations when the header has syntax errors
    pub tolerant: bool,

    /// Run the header preprocessing pass (calling-convention macros,
    /// SAL annotations, `#define` lines) before parsing
    pub preprocess: bool,

    /// Maximum header size to parse (in bytes)
    pub max_file_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            tolerant: false,
            preprocess: true,
            max_file_size: 10 * 1024 * 1024, // 10 MB
        }
    }
}

impl ParserConfig {
    /// Create config that extracts what it can from broken headers
    pub fn tolerant() -> Self {
        Self {
            tolerant: true,
            ..Default::default()
        }
    }

    /// Enable or disable tolerant parsing
    pub fn with_tolerant(mut self, tolerant: bool) -> Self {
        self.tolerant = tolerant;
        self
    }

    /// Enable or disable preprocessing
    pub fn with_preprocess(mut self, preprocess: bool) -> Self {
        self.preprocess = preprocess;
        self
    }

    /// Set maximum file size
    pub fn with_max_file_size(mut self, size: usize) -> Self {
        self.max_file_size = size;
        self
    }
}

use crate::decl::FunctionDecl;
use std::path::PathBuf;

/// Intermediate representation of a parsed header
///
/// This is the bridge between a front-end's syntax tree and the emitter.
/// Front-ends extract function declarations into this IR; the emitter walks it
/// in order.
#[derive(Debug, Default, Clone)]
pub struct HeaderIR {
    /// Source file path
    pub file_path: PathBuf,

    /// Function declarations in source order
    pub functions: Vec<FunctionDecl>,

    /// Number of syntax error nodes the front-end skipped (0 = clean parse)
    pub error_count: usize,
}

impl HeaderIR {
    /// Create a new empty IR
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            ..Default::default()
        }
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn is_partial(&self) -> bool {
        self.error_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::TypeShape;

    #[test]
    fn test_function_lookup() {
        let mut ir = HeaderIR::new(PathBuf::from("a.h"));
        ir.functions
            .push(FunctionDecl::new("Foo", TypeShape::named("int")));
        assert!(ir.function("Foo").is_some());
        assert!(ir.function("Bar").is_none());
        assert!(!ir.is_partial());
    }
}

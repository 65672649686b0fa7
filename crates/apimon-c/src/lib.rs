//! # apimon-c
//!
//! C header front-end for header2apimonitor - extracts function declarations
//! from C headers with tree-sitter.
//!
//! ## Features
//!
//! - Parse C header files (.h) and sources (.c)
//! - Resolve every parameter and return declarator into a [`TypeShape`]
//! - **Header preprocessing** for Windows SDK style headers (calling
//!   convention macros, `__declspec`, SAL annotations)
//! - **Tolerant parsing mode** for headers tree-sitter cannot fully parse
//! - Implements [`DeclParser`] from apimon-decl
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apimon_c::CParser;
//! use apimon_decl::DeclParser;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let parser = CParser::new();
//! let ir = parser.parse_file(Path::new("kernel32.h"))?;
//! println!("Found {} functions", ir.functions.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Tolerant Parsing
//!
//! ```rust
//! use apimon_c::extractor::extract;
//! use apimon_decl::ParserConfig;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = r#"
//! BOOL WINAPI CloseHandle(_In_ HANDLE hObject);
//! int broken( ;
//! "#;
//!
//! let result = extract(source, Path::new("api.h"), &ParserConfig::tolerant())?;
//! println!("Extracted {} functions (partial: {})", result.ir.functions.len(), result.is_partial);
//! # Ok(())
//! # }
//! ```
//!
//! [`TypeShape`]: apimon_decl::TypeShape
//! [`DeclParser`]: apimon_decl::DeclParser

pub mod extractor;
mod parser_impl;
pub mod preprocessor;
pub mod visitor;

// Re-export decl-api types for convenience
pub use apimon_decl::{
    DeclParser, FunctionDecl, HeaderIR, ParamDecl, ParserConfig, ParserError, TypeShape,
};

// Export the C parser implementation
pub use parser_impl::CParser;

// Export key types from submodules
pub use extractor::ExtractionResult;
pub use preprocessor::{CPreprocessor, MacroKind};
pub use visitor::DeclVisitor;

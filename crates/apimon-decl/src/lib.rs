//! header2apimonitor declaration API
//!
//! Shared contract between C front-ends and the API Monitor emitter.
//!
//! The emitter never looks at a concrete syntax tree. A front-end only has to
//! hand over the function declarations of a header in this crate's shape:
//!
//! - **Declaration IR**: [`FunctionDecl`], [`ParamDecl`] and the [`TypeShape`]
//!   tree each declarator resolves to
//! - **DeclParser trait**: the interface a front-end implements
//! - **Configuration**: strict/tolerant parsing and preprocessing switches
//! - **Error handling**: [`ParserError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use apimon_decl::{DeclParser, HeaderIR, ParserConfig, ParserError};
//! use std::path::Path;
//!
//! struct MyFrontEnd {
//!     config: ParserConfig,
//! }
//!
//! impl DeclParser for MyFrontEnd {
//!     fn language(&self) -> &str {
//!         "c"
//!     }
//!
//!     fn parse_source(&self, source: &str, file_path: &Path) -> Result<HeaderIR, ParserError> {
//!         todo!()
//!     }
//!
//!     fn config(&self) -> &ParserConfig {
//!         &self.config
//!     }
//! }
//! ```

pub mod config;
pub mod decl;
pub mod errors;
pub mod ir;
pub mod traits;

// Re-export commonly used types
pub use config::ParserConfig;
pub use decl::{FunctionDecl, NamedType, ParamDecl, TypeShape};
pub use errors::{ParserError, ParserResult};
pub use ir::HeaderIR;
pub use traits::DeclParser;

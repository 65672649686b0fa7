//! # header2apimonitor
//!
//! Convert C header files into definition files for rohitab's API Monitor.
//!
//! ## Architecture
//!
//! ```text
//! C header ──► apimon-c (preprocess, tree-sitter) ──► HeaderIR
//!                                                       │
//! API/Headers/*.xml ──► KnownTypes ──► ApiEmitter ◄──────┘
//!                                          │
//!                                          ▼
//!                                  <ApiMonitor> document
//! ```
//!
//! ## Example
//!
//! ```rust
//! use apimon_decl::{FunctionDecl, ParamDecl, TypeShape};
//! use header2apimonitor::{HeaderDescriptor, KnownTypes};
//! use std::path::Path;
//!
//! # fn main() -> header2apimonitor::Result<()> {
//! let known = KnownTypes::from_xml(r#"<ApiMonitor><Variable Name="HANDLE" /></ApiMonitor>"#)?;
//! let header = HeaderDescriptor::for_header(Path::new("handleapi.h"))
//!     .with_calling_convention("STDCALL");
//! let functions = vec![FunctionDecl::new("CloseHandle", TypeShape::named("BOOL"))
//!     .with_param(ParamDecl::new("hObject", TypeShape::named("HANDLE")))];
//!
//! let mut out = Vec::new();
//! let report = header.write_document(&mut out, &known, &functions)?;
//! assert_eq!(report.functions, 1);
//! assert!(report.unknown_types.is_empty());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod convert;
pub mod emitter;
pub mod error;
pub mod header;
pub mod registry;
pub mod xml;

// Re-export main types
pub use config::{ConvertOptions, SuccessPolarity};
pub use emitter::{type_string, ApiEmitter, ApiEntry, SuccessHint};
pub use error::{Error, Result};
pub use header::{CustomDefinitions, EmitReport, HeaderDescriptor};
pub use registry::{KnownTypes, RegistryLoader};

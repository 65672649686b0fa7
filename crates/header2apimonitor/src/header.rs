//! Header descriptor and the output document.

use apimon_decl::FunctionDecl;
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::SuccessPolarity;
use crate::emitter::ApiEmitter;
use crate::error::{Error, Result};
use crate::registry::{KnownTypes, RegistryLoader};
use crate::xml::{escape_attr, variable_fragments};

/// User supplied `<Variable>` definitions copied into the module.
#[derive(Debug, Clone, Default)]
pub struct CustomDefinitions {
    fragments: Vec<String>,
}

impl CustomDefinitions {
    /// Read `path`, register its names (and includes) with `loader`, and
    /// keep its `<Variable>` elements.
    pub fn load(path: &Path, loader: &mut RegistryLoader) -> Result<Self> {
        let xml = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_xml(&xml, path, loader)
    }

    pub fn from_xml(xml: &str, origin: &Path, loader: &mut RegistryLoader) -> Result<Self> {
        loader.parse_document(xml, origin)?;
        let fragments = variable_fragments(xml, origin)?;
        log::debug!(
            "{}: {} custom definition(s)",
            origin.display(),
            fragments.len()
        );
        Ok(Self { fragments })
    }

    /// Verbatim `<Variable>` elements in document order.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }
}

/// Summary of a written document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Number of `<Api>` elements written
    pub functions: usize,
    /// Parameter types missing from the registry, sorted
    pub unknown_types: BTreeSet<String>,
}

/// Module-level settings of one output document.
#[derive(Debug, Clone)]
pub struct HeaderDescriptor {
    /// `Name` of the `<Module>` element
    pub module: String,
    /// `CallingConvention` of the `<Module>` element; `None` omits it
    pub calling_convention: Option<String>,
    pub success: SuccessPolarity,
    /// Functions whose return value is not an error indicator
    pub returns_not_error: BTreeSet<String>,
    /// Monitor headers referenced by `<Include>`
    pub includes: Vec<String>,
    pub custom: CustomDefinitions,
}

impl HeaderDescriptor {
    /// Defaults for `path`: module `<stem>.dll`, no calling convention,
    /// zero means success.
    pub fn for_header(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");
        Self {
            module: format!("{stem}.dll"),
            calling_convention: None,
            success: SuccessPolarity::Zero,
            returns_not_error: BTreeSet::new(),
            includes: Vec::new(),
            custom: CustomDefinitions::default(),
        }
    }

    /// Module name, used verbatim.
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// An empty string omits the attribute.
    pub fn with_calling_convention(mut self, convention: impl Into<String>) -> Self {
        let convention = convention.into();
        self.calling_convention = (!convention.is_empty()).then_some(convention);
        self
    }

    pub fn with_success(mut self, success: SuccessPolarity) -> Self {
        self.success = success;
        self
    }

    pub fn with_returns_not_error(mut self, functions: impl IntoIterator<Item = String>) -> Self {
        self.returns_not_error.extend(functions);
        self
    }

    pub fn with_includes(mut self, includes: impl IntoIterator<Item = String>) -> Self {
        self.includes.extend(includes);
        self
    }

    pub fn with_custom_definitions(mut self, custom: CustomDefinitions) -> Self {
        self.custom = custom;
        self
    }

    /// Write the complete `<ApiMonitor>` document for `functions`.
    pub fn write_document<W: Write>(
        &self,
        out: &mut W,
        known_types: &KnownTypes,
        functions: &[FunctionDecl],
    ) -> Result<EmitReport> {
        writeln!(out, "<ApiMonitor>")?;
        for include in &self.includes {
            writeln!(
                out,
                "\t<Include Filename=\"Headers\\{}\" />",
                escape_attr(&include_file_name(include))
            )?;
        }

        write!(out, "\t<Module Name=\"{}\"", escape_attr(&self.module))?;
        if let Some(convention) = &self.calling_convention {
            write!(out, " CallingConvention=\"{}\"", escape_attr(convention))?;
        }
        writeln!(out, ">")?;
        writeln!(out, "\t\t<Category Name=\"Custom\" />")?;
        for fragment in self.custom.fragments() {
            writeln!(out, "\t\t{fragment}")?;
        }

        let mut emitter = ApiEmitter::new(known_types, self);
        let functions = emitter.emit(out, functions)?;

        writeln!(out, "\t</Module>")?;
        writeln!(out, "</ApiMonitor>")?;

        Ok(EmitReport {
            functions,
            unknown_types: emitter.into_unknown_types(),
        })
    }
}

fn include_file_name(include: &str) -> String {
    if include.ends_with(".xml") {
        include.to_string()
    } else {
        format!("{include}.xml")
    }
}

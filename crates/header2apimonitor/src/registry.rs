//! Known-type registry.
//!
//! API Monitor ships its type definitions as XML documents below
//! `API/Headers`. Each `<Variable Name="...">` element names a type the
//! monitor already understands; `<Include Filename="Headers\...">` pulls in
//! another document. Loading is a depth-first walk over those includes, and
//! every document is read at most once.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_INCLUDE;
use crate::error::{Error, Result};
use crate::xml::{attribute, system_header_name};

/// Read-only set of type names known to API Monitor.
#[derive(Debug, Clone, Default)]
pub struct KnownTypes {
    names: HashSet<String>,
}

impl KnownTypes {
    /// Load `includes` (or [`DEFAULT_INCLUDE`] when empty) from the
    /// installation at `base`, following nested includes.
    pub fn load<S: AsRef<str>>(includes: &[S], base: &Path) -> Result<Self> {
        let mut loader = RegistryLoader::new(base);
        loader.load_includes(includes)?;
        Ok(loader.finish())
    }

    /// Build a registry from one in-memory document.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut loader = RegistryLoader::new(PathBuf::new());
        loader.parse_document(xml, Path::new("<memory>"))?;
        Ok(loader.finish())
    }

    pub fn is_defined(&self, type_name: &str) -> bool {
        self.names.contains(type_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Mutable builder for [`KnownTypes`].
#[derive(Debug)]
pub struct RegistryLoader {
    base: PathBuf,
    names: HashSet<String>,
    visited: HashSet<PathBuf>,
}

impl RegistryLoader {
    /// `base` is the API Monitor installation directory.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            names: HashSet::new(),
            visited: HashSet::new(),
        }
    }

    /// `<base>/API/Headers/<name>`, with `.xml` appended unless present.
    pub fn header_path(&self, name: &str) -> PathBuf {
        let file_name = if name.ends_with(".xml") {
            name.to_string()
        } else {
            format!("{name}.xml")
        };
        self.base.join("API").join("Headers").join(file_name)
    }

    /// Load every header in `includes`, or [`DEFAULT_INCLUDE`] when empty.
    pub fn load_includes<S: AsRef<str>>(&mut self, includes: &[S]) -> Result<()> {
        if includes.is_empty() {
            return self.load_header(DEFAULT_INCLUDE);
        }
        for include in includes {
            self.load_header(include.as_ref())?;
        }
        Ok(())
    }

    /// Load one monitor header and everything it includes.
    pub fn load_header(&mut self, name: &str) -> Result<()> {
        let path = self.header_path(name);
        if !path.exists() {
            return Err(Error::HeaderNotFound {
                name: name.to_string(),
                path,
            });
        }
        if !self.visited.insert(path.clone()) {
            log::debug!("include {name} already loaded");
            return Ok(());
        }

        log::info!("include {name}");
        let xml = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        self.parse_document(&xml, &path)
    }

    /// Register the names in `xml` and load the headers it includes.
    ///
    /// `origin` is only used in error messages.
    pub fn parse_document(&mut self, xml: &str, origin: &Path) -> Result<()> {
        let mut reader = Reader::from_str(xml);
        let mut includes = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"Variable" => {
                        if let Some(name) = attribute(&e, b"Name", origin)? {
                            self.names.insert(name);
                        }
                    }
                    b"Include" => {
                        if let Some(filename) = attribute(&e, b"Filename", origin)? {
                            if let Some(header) = system_header_name(&filename) {
                                includes.push(header.to_string());
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::xml(origin, e.to_string())),
                _ => {}
            }
        }

        for header in includes {
            self.load_header(&header)?;
        }
        Ok(())
    }

    pub fn finish(self) -> KnownTypes {
        KnownTypes { names: self.names }
    }
}

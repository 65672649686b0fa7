//! Conversion settings and installation-directory resolution.

use apimon_decl::ParserConfig;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Calling convention written when none is given.
pub const DEFAULT_CALLING_CONVENTION: &str = "STDCALL";

/// Output path written when none is given.
pub const DEFAULT_OUTPUT: &str = "api.xml";

/// Header loaded into the registry when no includes are given.
pub const DEFAULT_INCLUDE: &str = "common.h";

/// Environment variable pointing at the Chocolatey root.
pub const INSTALL_ENV_VAR: &str = "ChocolateyInstall";

/// Location of API Monitor below the Chocolatey root.
pub const CHOCOLATEY_SUBDIR: &str = "lib/apimonitor/tools/API Monitor (rohitab.com)";

/// Which comparison against zero marks a successful return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuccessPolarity {
    /// A return value equal to zero is success
    #[default]
    Zero,
    /// A return value different from zero is success
    NonZero,
}

impl SuccessPolarity {
    /// `0` selects [`SuccessPolarity::Zero`], anything else `NonZero`.
    pub fn from_value(value: i64) -> Self {
        if value == 0 {
            SuccessPolarity::Zero
        } else {
            SuccessPolarity::NonZero
        }
    }

    /// Value of the `Return` attribute of `<Success>`.
    pub fn comparison(&self) -> &'static str {
        match self {
            SuccessPolarity::Zero => "Equal",
            SuccessPolarity::NonZero => "NotEqual",
        }
    }
}

/// Everything one conversion run needs.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// C header to convert
    pub header_file: PathBuf,
    /// Destination of the generated document
    pub output: PathBuf,
    /// API Monitor installation directory (falls back to Chocolatey)
    pub installation_base: Option<PathBuf>,
    /// Custom definitions file copied into the module
    pub custom_types: Option<PathBuf>,
    /// Monitor headers to include; empty loads [`DEFAULT_INCLUDE`] only
    pub includes: Vec<String>,
    /// Calling convention; empty omits the attribute
    pub calling_convention: String,
    /// Module name override, used verbatim
    pub module: Option<String>,
    pub success: SuccessPolarity,
    /// Functions whose return value is not an error indicator
    pub returns_not_error: BTreeSet<String>,
    pub parser: ParserConfig,
}

impl ConvertOptions {
    pub fn new(header_file: impl Into<PathBuf>) -> Self {
        Self {
            header_file: header_file.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            installation_base: None,
            custom_types: None,
            includes: Vec::new(),
            calling_convention: DEFAULT_CALLING_CONVENTION.to_string(),
            module: None,
            success: SuccessPolarity::Zero,
            returns_not_error: BTreeSet::new(),
            parser: ParserConfig::default(),
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_installation_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.installation_base = Some(base.into());
        self
    }

    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.includes.push(include.into());
        self
    }

    pub fn with_returns_not_error(mut self, function: impl Into<String>) -> Self {
        self.returns_not_error.insert(function.into());
        self
    }

    /// Installation directory for this run.
    pub fn resolve_installation_base(&self) -> Result<PathBuf> {
        resolve_installation_base(self.installation_base.as_deref())
    }
}

/// Use `explicit` if given, else `$ChocolateyInstall/lib/apimonitor/...`.
pub fn resolve_installation_base(explicit: Option<&Path>) -> Result<PathBuf> {
    resolve_installation_base_from(explicit, std::env::var_os(INSTALL_ENV_VAR))
}

fn resolve_installation_base_from(
    explicit: Option<&Path>,
    chocolatey: Option<OsString>,
) -> Result<PathBuf> {
    if let Some(base) = explicit {
        return Ok(base.to_path_buf());
    }
    match chocolatey {
        Some(root) if !root.is_empty() => Ok(PathBuf::from(root).join(CHOCOLATEY_SUBDIR)),
        _ => Err(Error::MissingInstallDir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_polarity() {
        assert_eq!(SuccessPolarity::from_value(0), SuccessPolarity::Zero);
        assert_eq!(SuccessPolarity::from_value(1), SuccessPolarity::NonZero);
        assert_eq!(SuccessPolarity::from_value(-1), SuccessPolarity::NonZero);
        assert_eq!(SuccessPolarity::Zero.comparison(), "Equal");
        assert_eq!(SuccessPolarity::NonZero.comparison(), "NotEqual");
    }

    #[test]
    fn test_convert_options_defaults() {
        let options = ConvertOptions::new("winapi.h");
        assert_eq!(options.output, PathBuf::from("api.xml"));
        assert_eq!(options.calling_convention, "STDCALL");
        assert_eq!(options.success, SuccessPolarity::Zero);
        assert!(options.includes.is_empty());
        assert!(options.module.is_none());
    }

    #[test]
    fn test_explicit_installation_base_wins() {
        let base = resolve_installation_base_from(
            Some(Path::new("/opt/apimon")),
            Some(OsString::from("C:\\ProgramData\\chocolatey")),
        )
        .unwrap();
        assert_eq!(base, PathBuf::from("/opt/apimon"));
    }

    #[test]
    fn test_chocolatey_installation_base() {
        let base =
            resolve_installation_base_from(None, Some(OsString::from("/choco"))).unwrap();
        assert_eq!(
            base,
            PathBuf::from("/choco/lib/apimonitor/tools/API Monitor (rohitab.com)")
        );
    }

    #[test]
    fn test_missing_installation_base() {
        assert!(matches!(
            resolve_installation_base_from(None, None),
            Err(Error::MissingInstallDir)
        ));
        assert!(matches!(
            resolve_installation_base_from(None, Some(OsString::new())),
            Err(Error::MissingInstallDir)
        ));
    }
}

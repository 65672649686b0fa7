//! CLI argument parsing for header2apimonitor

use apimon_decl::ParserConfig;
use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConvertOptions, SuccessPolarity};

#[derive(Parser, Debug)]
#[command(name = "header2apimonitor")]
#[command(version)]
#[command(about = "Convert a C header file into an API Monitor definition", long_about = None)]
pub struct Cli {
    /// C header file to convert
    #[arg(value_name = "HEADER_FILE")]
    pub header_file: PathBuf,

    /// Accepted for compatibility, has no effect
    #[arg(long = "error-return-type", value_name = "TYPE", default_value = "int")]
    pub error_return_type: String,

    /// API Monitor installation directory (default: derived from $ChocolateyInstall)
    #[arg(long = "apimonitor-installation-base", value_name = "DIR")]
    pub installation_base: Option<PathBuf>,

    /// XML file with custom <Variable> definitions to copy into the module
    #[arg(long = "custom-types", value_name = "FILE")]
    pub custom_types: Option<PathBuf>,

    /// Function returning a BOOL that is not an error indicator (repeatable)
    #[arg(short = 'b', long = "returns-true-boolean", value_name = "NAME")]
    pub returns_true_boolean: Vec<String>,

    /// Function returning an int that is not an error indicator (repeatable)
    #[arg(short = 'i', long = "returns-true-int", value_name = "NAME")]
    pub returns_true_int: Vec<String>,

    /// Output file
    #[arg(short = 'o', long = "output", value_name = "PATH", default_value = "api.xml")]
    pub output: PathBuf,

    /// Calling convention of the module (empty to omit)
    #[arg(
        short = 'c',
        long = "calling-convention",
        value_name = "CONV",
        default_value = "STDCALL"
    )]
    pub calling_convention: String,

    /// 0: a return equal to 0 is success, otherwise a return different from 0
    #[arg(
        short = 'E',
        long = "success-is",
        value_name = "INT",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    pub success_is: i64,

    /// API Monitor header to include, e.g. windows.h (repeatable)
    #[arg(short = 'I', long = "include", value_name = "NAME")]
    pub include: Vec<String>,

    /// Module name (default: header file stem + .dll)
    #[arg(short = 'M', long = "module", value_name = "NAME")]
    pub module: Option<String>,

    /// Extract declarations even when the header has syntax errors
    #[arg(long = "tolerant")]
    pub tolerant: bool,

    /// Skip the Windows header preprocessing pass
    #[arg(long = "no-preprocess")]
    pub no_preprocess: bool,
}

impl Cli {
    /// Gather the arguments into [`ConvertOptions`].
    pub fn into_options(self) -> ConvertOptions {
        let parser = ParserConfig::default()
            .with_tolerant(self.tolerant)
            .with_preprocess(!self.no_preprocess);

        ConvertOptions {
            header_file: self.header_file,
            output: self.output,
            installation_base: self.installation_base,
            custom_types: self.custom_types,
            includes: self.include,
            calling_convention: self.calling_convention,
            module: self.module,
            success: SuccessPolarity::from_value(self.success_is),
            returns_not_error: self
                .returns_true_boolean
                .into_iter()
                .chain(self.returns_true_int)
                .collect(),
            parser,
        }
    }
}

//! One complete conversion run.

use apimon_c::CParser;
use apimon_decl::DeclParser;
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::config::ConvertOptions;
use crate::error::{Error, Result};
use crate::header::{CustomDefinitions, EmitReport, HeaderDescriptor};
use crate::registry::RegistryLoader;

/// Load the registry, parse the header and write the output document.
///
/// The registry is loaded first, so a missing monitor header fails the run
/// before the output file is created.
pub fn run(options: &ConvertOptions) -> Result<EmitReport> {
    let base = options.resolve_installation_base()?;
    let mut loader = RegistryLoader::new(&base);
    loader.load_includes(&options.includes)?;

    let custom = options
        .custom_types
        .as_deref()
        .map(|path| CustomDefinitions::load(path, &mut loader))
        .transpose()?;
    let known_types = loader.finish();
    log::debug!("registry holds {} known type(s)", known_types.len());

    let parser = CParser::with_config(options.parser.clone());
    if !parser.can_parse(&options.header_file) {
        log::warn!(
            "{}: not a C header extension, parsing as C anyway",
            options.header_file.display()
        );
    }
    let ir = parser.parse_file(&options.header_file)?;

    let mut header = HeaderDescriptor::for_header(&options.header_file)
        .with_calling_convention(options.calling_convention.as_str())
        .with_success(options.success)
        .with_returns_not_error(options.returns_not_error.iter().cloned())
        .with_includes(options.includes.iter().cloned());
    if let Some(module) = &options.module {
        header = header.with_module(module.as_str());
    }
    if let Some(custom) = custom {
        header = header.with_custom_definitions(custom);
    }

    let file = File::create(&options.output).map_err(|e| Error::io(&options.output, e))?;
    let mut out = BufWriter::new(file);
    let report = header.write_document(&mut out, &known_types, &ir.functions)?;
    out.flush()?;

    log::debug!(
        "{}: wrote {} api(s)",
        options.output.display(),
        report.functions
    );
    Ok(report)
}

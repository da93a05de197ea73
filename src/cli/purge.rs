//! `amp-purge purge`: one HTML file through the same pipeline as a response.

use crate::{
    log,
    purge::{Outcome, PurgeOptions, ResponseInterceptor, WriterSink},
};
use anyhow::{Context, Result};
use std::{
    fs,
    io::{self, Write},
    path::Path,
};

/// Purge `input` and write the document to `output` (stdout when `None`).
///
/// The output file is only written once the document is complete, so a
/// failed reduction leaves no partial file behind.
pub fn purge_file(input: &Path, output: Option<&Path>, options: &PurgeOptions) -> Result<Outcome> {
    let html = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let Some(output) = output else {
        return purge_to_stream(html, io::stdout().lock(), io::stderr().lock(), options)
            .with_context(|| format!("Failed to purge {}", input.display()));
    };

    let mut purified = Vec::with_capacity(html.len());
    let outcome = purge_into(html, &mut purified, options)
        .with_context(|| format!("Failed to purge {}", input.display()))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(output, &purified)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    log!("purge"; "{} -> {}", input.display(), output.display());
    Ok(outcome)
}

/// Purge into `document`, a stream the report must stay out of.
///
/// With `debug` set, the report line goes to `report` instead of the logger.
fn purge_to_stream<W: Write, E: Write>(
    html: Vec<u8>,
    document: W,
    mut report: E,
    options: &PurgeOptions,
) -> Result<Outcome> {
    let quiet = options.clone().with_debug(false);
    let outcome = purge_into(html, document, &quiet)?;

    if options.debug
        && let Some(line) = outcome.report()
    {
        writeln!(report, "[purge] {line}")?;
    }
    Ok(outcome)
}

fn purge_into<W: Write>(html: Vec<u8>, writer: W, options: &PurgeOptions) -> Result<Outcome> {
    let response = ResponseInterceptor::new(WriterSink::new(writer), options.clone());
    Ok(response.finish(html, ())?)
}

use std::path::Path;

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::info;

use crate::common;

#[derive(Serialize)]
struct Report<'a> {
    path: String,
    valid: bool,
    diagnostics: Vec<&'a str>,
}

pub fn run(path: &Path, json: bool) -> Result<()> {
    let (bytes, store) = common::load(path)?;
    let formatter = pnp::XmlFormatter::new(store);
    let report = formatter.validate(&bytes)?;
    let messages = report.messages();
    info!(path = %path.display(), diagnostics = messages.len(), "validated document");

    if json {
        common::print_json(&Report {
            path: path.display().to_string(),
            valid: report.is_valid(),
            diagnostics: messages.iter().map(String::as_str).collect(),
        })?;
    } else if report.is_valid() {
        println!("{}: valid", path.display());
    } else {
        for message in &messages {
            println!("{message}");
        }
    }

    if !report.is_valid() {
        bail!("{} is not a valid 2015-05 provisioning document", path.display());
    }
    Ok(())
}

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::common;

pub struct ConvertArgs {
    pub input: PathBuf,
    pub id: Option<String>,
    pub output: Option<PathBuf>,
    pub providers: Vec<String>,
}

/// Read one template and write it back as a `Provisioning` wrapper.
pub fn run(args: ConvertArgs) -> Result<()> {
    let (bytes, store) = common::load(&args.input)?;
    let formatter = common::formatter(store, &args.providers)?;
    let template = formatter
        .to_provisioning_template(&bytes, args.id.as_deref())
        .with_context(|| format!("read template from {}", args.input.display()))?;
    let output = formatter.to_formatted_template(&template)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &output).with_context(|| format!("write {}", path.display()))?;
            info!(template = %template.id, path = %path.display(), bytes = output.len(), "wrote template");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&output).context("write to stdout")?;
            stdout.write_all(b"\n").context("write to stdout")?;
        }
    }
    Ok(())
}

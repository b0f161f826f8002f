use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::common;

#[derive(Serialize)]
struct TemplateRow {
    container: Option<String>,
    id: String,
    file: Option<String>,
}

pub fn run(path: &Path, json: bool) -> Result<()> {
    let (bytes, store) = common::load(path)?;
    let entries = pnp::XmlFormatter::new(store).list_templates(&bytes)?;
    info!(count = entries.len(), "listed templates");

    if json {
        let rows: Vec<TemplateRow> = entries
            .into_iter()
            .map(|entry| TemplateRow {
                container: entry.container,
                id: entry.id,
                file: entry.file,
            })
            .collect();
        common::print_json(&rows)?;
        return Ok(());
    }

    println!("{:<24} {:<24} {}", "CONTAINER", "ID", "FILE");
    for entry in &entries {
        println!(
            "{:<24} {:<24} {}",
            entry.container.as_deref().unwrap_or("-"),
            entry.id,
            entry.file.as_deref().unwrap_or("(in place)"),
        );
    }
    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result};
use pnp::Template;

use crate::common;

pub fn run(path: &Path, id: Option<&str>, providers: &[String], json: bool) -> Result<()> {
    let (bytes, store) = common::load(path)?;
    let template = common::formatter(store, providers)?
        .to_provisioning_template(&bytes, id)
        .with_context(|| format!("read template from {}", path.display()))?;

    if json {
        return common::print_json(&template);
    }
    print_summary(&template);
    Ok(())
}

/// Root of the document content type hierarchy.
const DOCUMENT_CONTENT_TYPE: &str = "0x0101";

fn document_content_types(template: &Template) -> usize {
    template
        .content_types
        .iter()
        .filter(|ct| ct.inherits_from(DOCUMENT_CONTENT_TYPE))
        .count()
}

fn print_summary(template: &Template) {
    println!("Template {} (version {})", template.id, template.version);
    if let Some(policy) = &template.site_policy {
        println!("  site policy:    {policy}");
    }
    for (key, value) in &template.parameters {
        println!("  parameter:      {key} = {value}");
    }
    println!("  site fields:    {}", template.site_fields.len());
    println!(
        "  content types:  {} ({} document)",
        template.content_types.len(),
        document_content_types(template)
    );
    for list in &template.lists {
        println!(
            "  list:           {} ({}, type {}, {} rows)",
            list.title,
            list.url,
            list.template_type,
            list.data_rows.len()
        );
    }
    println!(
        "  features:       {} site, {} web",
        template.features.site_features.len(),
        template.features.web_features.len()
    );
    println!(
        "  custom actions: {} site, {} web",
        template.custom_actions.site_custom_actions.len(),
        template.custom_actions.web_custom_actions.len()
    );
    println!("  files:          {}", template.files.len());
    println!("  pages:          {}", template.pages.len());
    let terms: usize = template
        .term_groups
        .iter()
        .flat_map(|group| &group.term_sets)
        .flat_map(|set| &set.terms)
        .map(|term| term.subtree_len())
        .sum();
    println!(
        "  term groups:    {} ({terms} terms)",
        template.term_groups.len()
    );
    if let Some(look) = &template.composed_look {
        println!("  composed look:  {}", look.name);
    }
    for provider in &template.providers {
        println!(
            "  provider:       {} ({})",
            provider.type_name,
            if provider.enabled { "enabled" } else { "disabled" }
        );
    }
}

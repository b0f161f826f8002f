use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use pnp::{FileSystemStore, ProviderRegistry, XmlFormatter};
use serde::Serialize;
use tracing::debug;

/// Read an input document. File references inside it resolve relative to
/// the document's directory.
pub fn load(path: &Path) -> Result<(Vec<u8>, FileSystemStore)> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let root = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    debug!(path = %path.display(), bytes = bytes.len(), store = %root.display(), "loaded document");
    Ok((bytes, FileSystemStore::new(root)))
}

pub fn formatter(store: FileSystemStore, providers: &[String]) -> Result<XmlFormatter<FileSystemStore>> {
    Ok(XmlFormatter::new(store).with_providers(registry(providers)?))
}

/// Build a registry from `Type[, Assembly]` handler names.
pub fn registry(handlers: &[String]) -> Result<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();
    for handler in handlers {
        let (type_name, assembly) = pnp::formatter::providers::split_handler_type(handler);
        if type_name.is_empty() {
            bail!("invalid provider handler '{handler}'");
        }
        registry.register(type_name, assembly.unwrap_or_default());
    }
    Ok(registry)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_from_specs() {
        let specs = vec![
            "Contoso.Handler, Contoso".to_string(),
            "Fabrikam.Handler".to_string(),
        ];
        let handlers = registry(&specs).expect("registry");
        assert_eq!(handlers.len(), 2);
        assert!(handlers.resolve("Contoso.Handler, Contoso, Version=1.0.0.0").is_some());
        assert!(handlers.resolve("Fabrikam.Handler, Anything").is_some());
        assert!(registry(&[" , Contoso".to_string()]).is_err());
    }

    #[test]
    fn store_is_rooted_at_document_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("template.xml");
        fs::write(&path, b"<x/>").expect("write");
        let (bytes, store) = load(&path).expect("load");
        assert_eq!(bytes, b"<x/>");
        assert_eq!(store.root(), dir.path());
    }
}

//! Mapping file loading and the `check` command

use anyhow::{Context, Result};
use busline_core::MappingConfig;
use busline_marshal::TypeRegistry;
use std::path::Path;

/// Read a mapping file, as JSON when the extension is `.json` and TOML otherwise
pub fn load(path: &str) -> Result<MappingConfig> {
    let content =
        std::fs::read(path).with_context(|| format!("Failed to read mapping file: {path}"))?;
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let mapping = if is_json {
        MappingConfig::from_json(&content)
    } else {
        let text = std::str::from_utf8(&content)
            .with_context(|| format!("Mapping file is not UTF-8: {path}"))?;
        MappingConfig::from_toml(text)
    };
    mapping.with_context(|| format!("Failed to parse mapping file: {path}"))
}

/// Build a registry from a mapping file and check every referenced type resolves
pub fn registry(path: &str) -> Result<TypeRegistry> {
    let mapping = load(path)?;
    let registry = TypeRegistry::from_mapping(&mapping)
        .with_context(|| format!("Invalid mapping: {path}"))?;
    registry
        .check_references()
        .with_context(|| format!("Unresolved type in mapping: {path}"))?;
    Ok(registry)
}

/// Check command implementation
pub fn check(path: &str) -> Result<()> {
    println!("Checking mapping: {path}");

    let mapping = load(path)?;
    registry(path)?;

    println!("✓ Objects: {}", mapping.objects.len());
    println!("✓ Enums: {}", mapping.enums.len());
    println!("✓ Aliases: {}", mapping.aliases.len());
    println!("\nMapping is valid!");

    Ok(())
}

//! The `decode` command

use crate::mapping;
use anyhow::{Context, Result};
use busline_marshal::{Marshalling, TypeDescriptor};
use busline_transport::{Codec, Envelope, JsonCodec};
use std::fmt::Write;
use std::sync::Arc;
use tracing::info;

/// Decode command implementation
pub fn run(mapping_path: &str, wire_path: &str, pretty: bool) -> Result<()> {
    let registry = mapping::registry(mapping_path)?;
    let codec = if pretty {
        JsonCodec::pretty(Marshalling::new(Arc::new(registry)))
    } else {
        JsonCodec::new(Marshalling::new(Arc::new(registry)))
    };

    let data = std::fs::read(wire_path)
        .with_context(|| format!("Failed to read wire file: {wire_path}"))?;
    let envelope = codec
        .decode_envelope(&data)
        .with_context(|| format!("Failed to decode envelope: {wire_path}"))?;
    info!(messages = envelope.len(), wire = wire_path, "Envelope decoded");

    print!("{}", render(&codec, &envelope)?);
    Ok(())
}

/// One block per message: a header line, then the value re-encoded as JSON
pub fn render(codec: &JsonCodec, envelope: &Envelope) -> Result<String> {
    let mut out = String::new();
    for (index, message) in envelope.messages().iter().enumerate() {
        write!(out, "[{index}] {}", message.to_subject)?;
        if let Some(reply_to) = &message.reply_to {
            write!(out, " reply-to={reply_to}")?;
        }
        if let Some(command) = &message.command_type {
            write!(out, " command={command}")?;
        }
        let value = codec
            .encode_value(&message.value, &TypeDescriptor::Any)
            .with_context(|| format!("Failed to render message {index}"))?;
        let value = String::from_utf8(value).context("Rendered value is not UTF-8")?;
        writeln!(out, "\n{value}")?;
    }
    Ok(out)
}

// src/infrastructure/constraint_messages.rs
use crate::domain::constraint_messages::ConstraintMessages;
use anyhow::{Context, Result};
use std::{collections::HashMap, path::Path};

/// Parses a JSON object mapping constraint names to messages.
pub fn parse(json: &str) -> Result<ConstraintMessages> {
    let messages: HashMap<String, String> =
        serde_json::from_str(json).context("constraint messages must be a JSON object of strings")?;
    Ok(ConstraintMessages::new(messages))
}

pub fn load(path: &Path) -> Result<ConstraintMessages> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading constraint messages from {}", path.display()))?;
    parse(&raw)
}

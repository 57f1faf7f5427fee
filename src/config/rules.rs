use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::constants;

/// Static routing tables for incoming tasks.
///
/// Which lists trigger the attach action and which lists carry an entity are
/// kept as two separate sets: a list may be attached without having an entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListRules {
    /// Source list id → entity label
    pub list_entities: HashMap<String, String>,
    /// Entity label → dropdown option id on the entity field
    pub entity_options: HashMap<String, String>,
    /// Lists that are attached to the tracker but have no entity
    pub attach_only_lists: HashSet<String>,
}

impl ListRules {
    /// Build the tables from their raw `key=value;key=value` / `a,b,c` forms.
    pub fn parse(list_entities: &str, entity_options: &str, attach_only: &str) -> Result<Self> {
        Ok(Self {
            list_entities: parse_pairs(list_entities)?,
            entity_options: parse_pairs(entity_options)?,
            attach_only_lists: parse_list(attach_only).into_iter().collect(),
        })
    }

    /// Tables with the built-in fallback literals.
    pub fn fallback() -> Self {
        // The literal is a compile-time constant and always well formed.
        Self::parse(constants::rules::DEFAULT_LIST_ENTITY_MAP, "", "").unwrap_or_default()
    }

    pub fn entity_for(&self, list_id: &str) -> Option<&str> {
        self.list_entities.get(list_id).map(String::as_str)
    }

    pub fn option_for(&self, entity: &str) -> Option<&str> {
        self.entity_options.get(entity).map(String::as_str)
    }

    /// A list triggers the attach action when it has an entity or is in the attach-only set.
    pub fn should_attach(&self, list_id: &str) -> bool {
        self.list_entities.contains_key(list_id) || self.attach_only_lists.contains(list_id)
    }
}

/// Parse `key=value` pairs separated by `;`. Blank segments are ignored.
pub fn parse_pairs(raw: &str) -> Result<HashMap<String, String>> {
    let mut pairs = HashMap::new();
    for segment in raw.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let (key, value) = segment
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid mapping entry '{}': expected key=value", segment))?;
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            return Err(anyhow!(
                "Invalid mapping entry '{}': key and value must be non-empty",
                segment
            ));
        }

        pairs.insert(key.to_string(), value.to_string());
    }
    Ok(pairs)
}

/// Parse a comma-separated list, dropping blanks.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

//! `CITATION.cff` contributor extraction.
//!
//! People are read from the `authors` and `contact` lists. A person entry is
//! named from its `given-names`, `name-particle`, `family-names` and
//! `name-suffix` parts; an entity entry from `name`. Unknown keys are ignored.

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::models::{MetadataContributor, MetadataSource};

const CONTRIBUTOR_KEYS: [&str; 2] = ["authors", "contact"];
const NAME_PARTS: [&str; 4] = ["given-names", "name-particle", "family-names", "name-suffix"];

/// Parse `CITATION.cff` text into contributors.
pub fn parse(contents: &str) -> Result<Vec<MetadataContributor>, String> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let doc: Value = serde_yaml::from_str(contents).map_err(|e| e.to_string())?;
    let root = match doc {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(map) => map,
        _ => return Err("top level must be a mapping".into()),
    };

    let mut out: Vec<MetadataContributor> = Vec::new();
    for key in CONTRIBUTOR_KEYS {
        let entries = match root.get(key) {
            None | Some(Value::Null) => continue,
            Some(Value::Sequence(seq)) => seq,
            Some(_) => return Err(format!("'{key}' must be a list")),
        };

        for (idx, entry) in entries.iter().enumerate() {
            let contributor = match entry {
                Value::Mapping(map) => from_mapping(map),
                Value::String(name) => named(name.trim(), None, None),
                _ => return Err(format!("'{key}[{idx}]' must be a person or entity")),
            };
            match contributor {
                Some(c) if !out.contains(&c) => out.push(c),
                Some(_) => {}
                None => debug!(key, idx, "skipping CITATION.cff entry without name or email"),
            }
        }
    }

    Ok(out)
}

fn from_mapping(map: &Mapping) -> Option<MetadataContributor> {
    let parts: Vec<String> = NAME_PARTS
        .iter()
        .filter_map(|part| string_field(map, part))
        .collect();
    let name = if parts.is_empty() {
        string_field(map, "name")
            .or_else(|| string_field(map, "alias"))
            .unwrap_or_default()
    } else {
        parts.join(" ")
    };

    named(&name, string_field(map, "email"), string_field(map, "orcid"))
}

fn named(
    name: &str,
    email: Option<String>,
    identifier: Option<String>,
) -> Option<MetadataContributor> {
    if name.is_empty() && email.is_none() {
        return None;
    }
    Some(MetadataContributor {
        name: name.to_string(),
        email,
        identifier,
        source: MetadataSource::CitationCff,
    })
}

fn string_field(map: &Mapping, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

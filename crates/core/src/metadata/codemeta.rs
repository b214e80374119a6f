//! `codemeta.json` contributor extraction.
//!
//! Reads the `author`, `contributor` and `maintainer` properties. Each may
//! hold a single node, a list of nodes, or a JSON-LD `{"@list": [...]}`.

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{MetadataContributor, MetadataSource};

const CONTRIBUTOR_KEYS: [&str; 3] = ["author", "contributor", "maintainer"];

/// Parse `codemeta.json` text into contributors.
pub fn parse(contents: &str) -> Result<Vec<MetadataContributor>, String> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let doc: Value = serde_json::from_str(contents).map_err(|e| e.to_string())?;
    let root = match doc {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        _ => return Err("top level must be an object".into()),
    };

    let mut out: Vec<MetadataContributor> = Vec::new();
    for key in CONTRIBUTOR_KEYS {
        let Some(value) = root.get(key) else { continue };
        for node in nodes(key, value)? {
            match from_node(node) {
                Some(c) if !out.contains(&c) => out.push(c),
                Some(_) => {}
                None => debug!(key, "skipping codemeta node without name or email"),
            }
        }
    }

    Ok(out)
}

/// Flatten a property value into its person/organization nodes.
fn nodes<'v>(key: &str, value: &'v Value) -> Result<Vec<&'v Value>, String> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                match item {
                    Value::Object(_) | Value::String(_) => out.push(item),
                    Value::Null => {}
                    _ => return Err(format!("'{key}' entries must be objects or strings")),
                }
            }
            Ok(out)
        }
        Value::Object(map) => match map.get("@list") {
            Some(list) => nodes(key, list),
            None => Ok(vec![value]),
        },
        Value::String(_) => Ok(vec![value]),
        _ => Err(format!("'{key}' must be an object, a list or a string")),
    }
}

fn from_node(node: &Value) -> Option<MetadataContributor> {
    let (name, email, identifier) = match node {
        Value::String(name) => (name.trim().to_string(), None, None),
        Value::Object(map) => {
            let name = text(map, "name").unwrap_or_else(|| {
                [text(map, "givenName"), text(map, "familyName")]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ")
            });
            let email = text(map, "email")
                .map(|e| e.strip_prefix("mailto:").map(str::to_string).unwrap_or(e));
            let identifier = text(map, "@id").or_else(|| text(map, "identifier"));
            (name, email, identifier)
        }
        _ => return None,
    };

    if name.is_empty() && email.is_none() {
        return None;
    }
    Some(MetadataContributor {
        name,
        email,
        identifier,
        source: MetadataSource::CodemetaJson,
    })
}

/// A string property, or a list of strings joined with spaces.
fn text(map: &Map<String, Value>, key: &str) -> Option<String> {
    let joined = match map.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        _ => return None,
    };
    (!joined.is_empty()).then_some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
{
  "@context": "https://doi.org/10.5063/schema/codemeta-2.0",
  "@type": "SoftwareSourceCode",
  "name": "Test Project",
  "author": [
    {
      "@type": "Person",
      "@id": "https://orcid.org/0000-0001-2345-6789",
      "givenName": "John",
      "familyName": "Doe",
      "email": "john@example.com"
    },
    {
      "@type": "Person",
      "givenName": ["Jane", "Q."],
      "familyName": "Smith",
      "email": "mailto:jane@example.com"
    }
  ],
  "contributor": {
    "@type": "Person",
    "givenName": "Bob",
    "familyName": "Wilson",
    "email": "bob@example.com"
  },
  "maintainer": "Project Maintainers"
}
"#;

    #[test]
    fn test_parse_all_roles() {
        let people = parse(SAMPLE).unwrap();
        let names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["John Doe", "Jane Q. Smith", "Bob Wilson", "Project Maintainers"]
        );
        assert_eq!(
            people[0].identifier.as_deref(),
            Some("https://orcid.org/0000-0001-2345-6789")
        );
        assert_eq!(people[1].email.as_deref(), Some("jane@example.com"));
        assert!(people.iter().all(|p| p.source == MetadataSource::CodemetaJson));
    }

    #[test]
    fn test_jsonld_list_wrapper() {
        let people =
            parse(r#"{"author": {"@list": [{"name": "A"}, {"name": "B"}]}}"#).unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[1].name, "B");
    }

    #[test]
    fn test_empty_documents() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("{}").unwrap().is_empty());
        assert!(parse(r#"{"author": null}"#).unwrap().is_empty());
    }

    #[test]
    fn test_structural_errors() {
        assert!(parse("[1, 2]").is_err());
        assert!(parse(r#"{"author": 7}"#).is_err());
        assert!(parse(r#"{"author": [true]}"#).is_err());
        assert!(parse(r#"{"author": ["#).is_err());
    }
}

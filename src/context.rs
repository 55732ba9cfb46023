//! JSON-LD context processing and namespace extraction
//!
//! Processes inline `@context` values into term definitions, expands and
//! compacts IRIs against them, and derives the flat prefix map a Turtle
//! writer can consume.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

use crate::collect::PrefixMap;
use crate::error::ConvertError;
use crate::vocab::BLANK_NODE_PREFIX;

/// A processed term definition from a JSON-LD context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermDefinition {
    /// The expanded IRI the term maps to
    pub iri: Option<String>,
    /// `@type` coercion (`"@id"`, `"@vocab"`, or a datatype IRI)
    pub type_mapping: Option<String>,
    /// Whether this is a reverse-property mapping
    pub reverse: bool,
}

/// A processed JSON-LD context: term name → definition
#[derive(Debug, Default)]
pub struct ProcessedContext {
    mappings: BTreeMap<String, TermDefinition>,
    vocab: Option<String>,
}

impl ProcessedContext {
    /// Process an inline context value (object, array of objects, or null)
    ///
    /// Remote contexts (string URLs) are rejected: the core performs no
    /// network I/O. Cyclic term definitions fail with
    /// `ConvertError::Context`.
    pub fn process(local: &Value) -> Result<Self, ConvertError> {
        let mut ctx = ProcessedContext::default();
        let mut sources = Map::new();
        gather_sources(local, &mut sources, &mut ctx.vocab)?;

        let terms: Vec<String> = sources.keys().cloned().collect();
        for term in terms {
            ctx.define_term(&sources, &term, &mut HashSet::new())?;
        }
        Ok(ctx)
    }

    /// Look up a term definition by its (compacted) name
    pub fn term(&self, name: &str) -> Option<&TermDefinition> {
        self.mappings.get(name)
    }

    /// All processed term definitions, sorted by term name
    pub fn mappings(&self) -> &BTreeMap<String, TermDefinition> {
        &self.mappings
    }

    /// Whether the property named `term` is declared `@id`-typed
    pub fn is_id_typed(&self, term: &str) -> bool {
        self.mappings
            .get(term)
            .is_some_and(|def| def.type_mapping.as_deref() == Some("@id"))
    }

    /// Expand a term, prefixed name, or IRI to its full IRI form
    ///
    /// `vocab` enables term lookup and `@vocab`-relative expansion, used
    /// for property and type positions; `@id` positions expand with
    /// `vocab = false`.
    pub fn expand_iri(&self, value: &str, vocab: bool) -> String {
        if value.starts_with('@') || value.starts_with(BLANK_NODE_PREFIX) {
            return value.to_string();
        }
        if vocab {
            if let Some(def) = self.mappings.get(value) {
                if let Some(iri) = &def.iri {
                    return iri.clone();
                }
            }
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if suffix.starts_with("//") {
                return value.to_string();
            }
            if let Some(def) = self.mappings.get(prefix) {
                if let Some(namespace) = &def.iri {
                    return format!("{namespace}{suffix}");
                }
            }
            return value.to_string();
        }
        if vocab {
            if let Some(vocab_iri) = &self.vocab {
                return format!("{vocab_iri}{value}");
            }
        }
        value.to_string()
    }

    /// Compact an IRI to a term or prefixed name where the context allows
    ///
    /// Exact term matches (only considered with `vocab`) win over prefix
    /// shortening; among prefixes the longest namespace match wins, ties
    /// broken by term name. IRIs nothing matches are returned unchanged.
    pub fn compact_iri(&self, iri: &str, vocab: bool) -> String {
        if iri.starts_with(BLANK_NODE_PREFIX) {
            return iri.to_string();
        }

        if vocab {
            let exact = self
                .mappings
                .iter()
                .filter(|(_, def)| !def.reverse && def.iri.as_deref() == Some(iri))
                .map(|(term, _)| term)
                .min_by_key(|term| term.len());
            if let Some(term) = exact {
                return term.clone();
            }
        }

        let mut best: Option<(&str, &str)> = None;
        for (term, def) in &self.mappings {
            if def.reverse || def.type_mapping.is_some() {
                continue;
            }
            let Some(namespace) = def.iri.as_deref() else {
                continue;
            };
            if iri.len() > namespace.len() && iri.starts_with(namespace) {
                let longer = match best {
                    Some((_, current)) => namespace.len() > current.len(),
                    None => true,
                };
                if longer {
                    best = Some((term, namespace));
                }
            }
        }

        match best {
            Some((term, namespace)) => format!("{}:{}", term, &iri[namespace.len()..]),
            None => iri.to_string(),
        }
    }

    fn define_term(
        &mut self,
        sources: &Map<String, Value>,
        term: &str,
        visiting: &mut HashSet<String>,
    ) -> Result<(), ConvertError> {
        if self.mappings.contains_key(term) {
            return Ok(());
        }
        if !visiting.insert(term.to_string()) {
            return Err(ConvertError::Context(format!(
                "cyclic IRI mapping for term '{term}'"
            )));
        }

        let Some(raw) = sources.get(term) else {
            visiting.remove(term);
            return Ok(());
        };

        let definition = match raw {
            Value::String(iri) => TermDefinition {
                iri: Some(self.expand_definition_value(sources, iri, visiting)?),
                ..TermDefinition::default()
            },
            Value::Null => TermDefinition::default(),
            Value::Object(body) => {
                let mut definition = TermDefinition::default();
                if let Some(reverse) = body.get("@reverse").and_then(Value::as_str) {
                    definition.reverse = true;
                    definition.iri =
                        Some(self.expand_definition_value(sources, reverse, visiting)?);
                } else if let Some(id) = body.get("@id").and_then(Value::as_str) {
                    definition.iri = Some(self.expand_definition_value(sources, id, visiting)?);
                }
                if let Some(type_mapping) = body.get("@type").and_then(Value::as_str) {
                    definition.type_mapping = Some(if type_mapping.starts_with('@') {
                        type_mapping.to_string()
                    } else {
                        self.expand_definition_value(sources, type_mapping, visiting)?
                    });
                }
                definition
            }
            _ => {
                return Err(ConvertError::Context(format!(
                    "invalid term definition for '{term}'"
                )))
            }
        };

        self.mappings.insert(term.to_string(), definition);
        visiting.remove(term);
        Ok(())
    }

    /// Expand a value appearing inside the context itself, resolving
    /// prefixed names against sibling terms (which may not be processed
    /// yet, hence the recursion through `define_term`).
    fn expand_definition_value(
        &mut self,
        sources: &Map<String, Value>,
        raw: &str,
        visiting: &mut HashSet<String>,
    ) -> Result<String, ConvertError> {
        if raw.starts_with('@') || raw.starts_with(BLANK_NODE_PREFIX) {
            return Ok(raw.to_string());
        }
        let Some((prefix, suffix)) = raw.split_once(':') else {
            return Ok(raw.to_string());
        };
        if suffix.starts_with("//") {
            return Ok(raw.to_string());
        }
        if sources.contains_key(prefix) {
            self.define_term(sources, prefix, visiting)?;
            if let Some(TermDefinition { iri: Some(namespace), .. }) = self.mappings.get(prefix) {
                return Ok(format!("{namespace}{suffix}"));
            }
        }
        Ok(raw.to_string())
    }
}

fn gather_sources(
    local: &Value,
    sources: &mut Map<String, Value>,
    vocab: &mut Option<String>,
) -> Result<(), ConvertError> {
    match local {
        Value::Null => Ok(()),
        Value::Array(contexts) => {
            for context in contexts {
                gather_sources(context, sources, vocab)?;
            }
            Ok(())
        }
        Value::Object(entries) => {
            for (key, value) in entries {
                match key.as_str() {
                    "@vocab" => *vocab = value.as_str().map(String::from),
                    keyword if keyword.starts_with('@') => {}
                    _ => {
                        sources.insert(key.clone(), value.clone());
                    }
                }
            }
            Ok(())
        }
        Value::String(url) => Err(ConvertError::Context(format!(
            "remote contexts are not supported: {url}"
        ))),
        _ => Err(ConvertError::Context("invalid @context value".to_string())),
    }
}

/// Derive a Turtle prefix map from a JSON-LD context
///
/// Keeps only mappings that are not reverse properties, carry no `@type`
/// coercion, and have a plain `@id` value; nothing else is expressible as
/// a Turtle prefix declaration.
pub fn extract_namespaces(context: &Value) -> Result<PrefixMap, ConvertError> {
    let processed = ProcessedContext::process(context)?;

    let mut namespaces = PrefixMap::new();
    for (term, definition) in processed.mappings() {
        if definition.reverse || definition.type_mapping.is_some() {
            continue;
        }
        if let Some(iri) = &definition.iri {
            namespaces.insert(term.clone(), iri.clone());
        }
    }
    Ok(namespaces)
}

//! The conversion pipeline
//!
//! Orchestrates both directions: Turtle text to a rooted, compacted
//! JSON-LD document, and a JSON-LD document back to Turtle text. Every
//! call builds its own state from scratch; nothing is shared between
//! conversions.

use serde_json::{Map, Value};

use crate::collect::{self, ParseOutput, PrefixMap};
use crate::context;
use crate::error::ConvertError;
use crate::jsonld;
use crate::reorganize;
use crate::turtle;

/// Parse Turtle text into a classified dataset plus its prefix context
pub fn parse_turtle_to_dataset(turtle_text: &str) -> Result<ParseOutput, ConvertError> {
    collect::collect(turtle_text)
}

/// Convert Turtle text to a compacted JSON-LD document
///
/// Compaction uses `explicit_context` when given, otherwise a context
/// built from the prefixes declared in the Turtle itself. XSD-typed
/// literals compact to native JSON numbers and booleans. When `root_id`
/// is set and the result is a multi-node `@graph`, the document is
/// reorganized into a single tree rooted at that node (see
/// [`reorganize::reorganize`] for the non-fatal fallback cases).
pub fn compact_from_turtle(
    turtle_text: &str,
    explicit_context: Option<&Value>,
    root_id: Option<&str>,
) -> Result<Value, ConvertError> {
    let output = collect::collect(turtle_text)?;
    tracing::debug!(
        triples = output.dataset.default.len(),
        prefixes = output.context.len(),
        "parsed Turtle input"
    );

    let expanded = jsonld::from_rdf(&output.dataset, true);
    let context_value = match explicit_context {
        Some(context) => context.clone(),
        None => prefix_context(&output.context),
    };
    let compacted = jsonld::compact(&expanded, &context_value)?;

    Ok(reorganize::reorganize(root_id, compacted))
}

/// Convert a JSON-LD document to Turtle text
///
/// Prefix declarations are inferred from the document's `@context`;
/// only plain prefix mappings survive (reverse and `@type`-coerced terms
/// cannot be expressed as Turtle prefixes).
pub fn from_jsonld_to_turtle(jsonld_text: &str) -> Result<String, ConvertError> {
    let doc: Value = serde_json::from_str(jsonld_text)?;
    let context_value = doc.get("@context").cloned().unwrap_or(Value::Null);

    let namespaces = context::extract_namespaces(&context_value)?;
    let triples = jsonld::to_rdf(&doc)?;
    tracing::debug!(
        triples = triples.len(),
        prefixes = namespaces.len(),
        "expanded JSON-LD input"
    );

    turtle::write_turtle(&triples, &namespaces)
}

/// Build a JSON-LD context object from a Turtle prefix map
fn prefix_context(prefixes: &PrefixMap) -> Value {
    let mut context = Map::new();
    for (prefix, iri) in prefixes {
        context.insert(prefix.clone(), Value::String(iri.clone()));
    }
    Value::Object(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compact_from_turtle_single_subject() {
        let input = "@prefix dc: <http://purl.org/dc/terms/> .\n\
                     <https://example.com/titerito> dc:title \"Titerito\"@es .";

        let result = compact_from_turtle(input, None, None).unwrap();
        assert_eq!(
            result,
            json!({
                "@context": {"dc": "http://purl.org/dc/terms/"},
                "@id": "https://example.com/titerito",
                "dc:title": {"@language": "es", "@value": "Titerito"}
            })
        );
    }

    #[test]
    fn test_compact_from_turtle_with_graph() {
        let input = "@prefix foaf: <http://xmlns.com/foaf/0.1/> .\n\
                     @prefix test: <https://example.com/ns#> .\n\
                     \n\
                     test:titerito foaf:maker test:farruko .\n\
                     test:farruko foaf:familyName \"Reyes Rosado\" .";

        let result = compact_from_turtle(input, None, None).unwrap();
        assert_eq!(
            result["@context"],
            json!({
                "foaf": "http://xmlns.com/foaf/0.1/",
                "test": "https://example.com/ns#"
            })
        );

        let graph = result["@graph"].as_array().unwrap();
        let by_id = |id: &str| {
            graph
                .iter()
                .find(|node| node["@id"] == json!(id))
                .cloned()
                .unwrap()
        };
        assert_eq!(
            by_id("test:titerito"),
            json!({"@id": "test:titerito", "foaf:maker": {"@id": "test:farruko"}})
        );
        assert_eq!(
            by_id("test:farruko"),
            json!({"@id": "test:farruko", "foaf:familyName": "Reyes Rosado"})
        );
    }

    #[test]
    fn test_compact_from_turtle_native_datatypes() {
        let input = "@prefix ex: <https://example.com/> .\n\
                     @prefix hydra: <http://purl.org/hydra/core#> .\n\
                     @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .\n\
                     \n\
                     ex:statusOK hydra:statusCode \"200\"^^xsd:integer .\n\
                     ex:statusNotFound hydra:statusCode 404 .\n\
                     ex:prop hydra:readonly true .\n\
                     ex:prop hydra:writeonly \"true\"^^xsd:boolean .";

        let result = compact_from_turtle(input, None, None).unwrap();
        let graph = result["@graph"].as_array().unwrap();
        let by_id = |id: &str| {
            graph
                .iter()
                .find(|node| node["@id"] == json!(id))
                .cloned()
                .unwrap()
        };

        assert_eq!(
            by_id("ex:statusOK"),
            json!({"@id": "ex:statusOK", "hydra:statusCode": 200})
        );
        assert_eq!(
            by_id("ex:statusNotFound"),
            json!({"@id": "ex:statusNotFound", "hydra:statusCode": 404})
        );
        assert_eq!(
            by_id("ex:prop"),
            json!({
                "@id": "ex:prop",
                "hydra:readonly": true,
                "hydra:writeonly": true
            })
        );
    }

    #[test]
    fn test_compact_from_turtle_with_root() {
        let input = "@prefix foaf: <http://xmlns.com/foaf/0.1/> .\n\
                     @prefix test: <https://example.com/ns#> .\n\
                     \n\
                     test:titerito foaf:maker test:farruko .\n\
                     test:farruko foaf:familyName \"Reyes Rosado\" .";

        // root ids match the compacted @id form
        let result = compact_from_turtle(input, None, Some("test:titerito")).unwrap();
        assert!(result.get("@graph").is_none());
        assert_eq!(result["@id"], json!("test:titerito"));
        assert_eq!(
            result["foaf:maker"],
            json!({"@id": "test:farruko", "foaf:familyName": "Reyes Rosado"})
        );
    }

    #[test]
    fn test_compact_from_turtle_explicit_context() {
        let input = "@prefix dc: <http://purl.org/dc/terms/> .\n\
                     <https://example.com/titerito> dc:title \"Titerito\" .";
        let context = json!({"title": "http://purl.org/dc/terms/title"});

        let result = compact_from_turtle(input, Some(&context), None).unwrap();
        assert_eq!(result["title"], json!("Titerito"));
        assert_eq!(result["@context"], context);
    }

    #[test]
    fn test_compact_from_turtle_parse_error() {
        let result = compact_from_turtle("not turtle &&&", None, None);
        assert!(matches!(result, Err(ConvertError::Parse(_))));
    }

    #[test]
    fn test_from_jsonld_to_turtle() {
        let input = json!({
            "@context": {"dc": "http://purl.org/dc/terms/"},
            "@id": "https://example.com/titerito",
            "dc:title": {"@language": "es", "@value": "Titerito"}
        });

        let turtle = from_jsonld_to_turtle(&input.to_string()).unwrap();
        assert!(turtle.contains("@prefix dc: <http://purl.org/dc/terms/>"));
        assert!(turtle.contains("<https://example.com/titerito>"));
        assert!(turtle.contains("\"Titerito\"@es"));
        assert!(turtle.ends_with('\n'));
    }

    #[test]
    fn test_from_jsonld_to_turtle_rejects_bad_json() {
        let result = from_jsonld_to_turtle("{not json");
        assert!(matches!(result, Err(ConvertError::JsonParse(_))));
    }

    #[test]
    fn test_round_trip_preserves_triples() {
        let input = "@prefix dc: <http://purl.org/dc/terms/> .\n\
                     <https://example.com/titerito> dc:title \"Titerito\"@es ;\n\
                         dc:creator <https://example.com/farruko> .";

        let jsonld_doc = compact_from_turtle(input, None, None).unwrap();
        let turtle = from_jsonld_to_turtle(&jsonld_doc.to_string()).unwrap();

        let original = parse_turtle_to_dataset(input).unwrap();
        let round_tripped = parse_turtle_to_dataset(&turtle).unwrap();

        // same triple set, order modulo serialization
        assert_eq!(
            original.dataset.default.len(),
            round_tripped.dataset.default.len()
        );
        for triple in &original.dataset.default {
            assert!(
                round_tripped.dataset.default.contains(triple),
                "missing triple: {triple:?}"
            );
        }
    }
}

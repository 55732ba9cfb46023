//! Graph rooting: rebuild a nested document from a flat `@graph`
//!
//! Given a compacted document whose `@graph` holds flat node objects
//! referencing each other by `@id`, inline every node reachable from a
//! chosen root in place of its by-reference link, producing one nested
//! tree. Rooting is all-or-nothing: if any non-root node is left
//! unreferenced the original document is returned unchanged, so a caller
//! never silently loses nodes.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::context::ProcessedContext;
use crate::vocab::is_blank_node_id;

/// Root a compacted document at `root_id`
///
/// Returns the input unchanged when there is nothing to do (`root_id`
/// unset, no `@graph`) and when rooting cannot complete (root not found,
/// or nodes left over after traversal); the failure cases emit a warning
/// instead of an error, a non-rooted result being preferable to failing
/// the conversion.
///
/// Each pooled node is moved into the first reference that resolves it,
/// in document traversal order. Later references to the same node stay
/// bare, which also bounds the traversal on cyclic graphs: a cycle runs
/// out of pool entries instead of recursing forever.
pub fn reorganize(root_id: Option<&str>, compacted: Value) -> Value {
    let Some(root_id) = root_id else {
        return compacted;
    };
    if compacted.get("@graph").and_then(Value::as_array).is_none() {
        return compacted;
    }

    let original = compacted.clone();
    let Value::Object(mut doc) = compacted else {
        return original;
    };
    let Some(Value::Array(graph)) = doc.remove("@graph") else {
        return original;
    };

    let mut root_node: Option<Map<String, Value>> = None;
    let mut pool: HashMap<String, Value> = HashMap::new();
    for node in graph {
        let id = node.get("@id").and_then(Value::as_str).map(String::from);
        match id {
            Some(id) if id == root_id => match node {
                Value::Object(fields) => root_node = Some(fields),
                _ => return original,
            },
            Some(id) => {
                pool.insert(id, node);
            }
            None => {
                tracing::warn!(
                    root = root_id,
                    "graph contains a node without @id; returning compacted document unchanged"
                );
                return original;
            }
        }
    }

    let Some(mut root_fields) = root_node else {
        tracing::warn!(
            root = root_id,
            "root node not found in @graph; returning compacted document unchanged"
        );
        return original;
    };

    let ctx = match ProcessedContext::process(doc.get("@context").unwrap_or(&Value::Null)) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::warn!(error = %e, "could not process @context while rooting");
            ProcessedContext::default()
        }
    };

    for (key, value) in root_fields.iter_mut() {
        inline_references(value, Some(key.as_str()), &mut pool, root_id, &ctx);
    }

    if !pool.is_empty() {
        let mut remaining: Vec<&str> = pool.keys().map(String::as_str).collect();
        remaining.sort_unstable();
        tracing::warn!(
            root = root_id,
            unresolved = ?remaining,
            "unresolved references remain after rooting; returning compacted document unchanged"
        );
        return original;
    }

    let mut result = Map::new();
    if let Some(context) = doc.remove("@context") {
        result.insert("@context".to_string(), context);
    }
    for (key, value) in root_fields {
        result.insert(key, value);
    }
    Value::Object(result)
}

/// Resolve references inside one value, consuming pool entries
///
/// `key` is the property holding the value (inherited through arrays);
/// it decides whether a plain string may be treated as a node reference:
/// only properties the context declares `@id`-typed qualify, anything
/// else is a literal and stays untouched.
fn inline_references(
    value: &mut Value,
    key: Option<&str>,
    pool: &mut HashMap<String, Value>,
    root_id: &str,
    ctx: &ProcessedContext,
) {
    match value {
        Value::Object(fields) => {
            let reference = fields
                .get("@id")
                .and_then(Value::as_str)
                .filter(|id| *id != root_id && pool.contains_key(*id))
                .map(String::from);
            if let Some(id) = reference {
                if let Some(Value::Object(node)) = pool.remove(&id) {
                    // the pooled node is the fuller definition: its
                    // properties win on key conflicts
                    let mut merged = std::mem::take(fields);
                    for (k, v) in node {
                        merged.insert(k, v);
                    }
                    if is_blank_node_id(&id) {
                        merged.remove("@id");
                    }
                    *fields = merged;
                }
            }
            for (k, v) in fields.iter_mut() {
                inline_references(v, Some(k.as_str()), pool, root_id, ctx);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                inline_references(item, key, pool, root_id, ctx);
            }
        }
        Value::String(reference) => {
            let id_typed = key.is_some_and(|k| ctx.is_id_typed(k));
            if id_typed && pool.contains_key(reference.as_str()) {
                if let Some(node) = pool.remove(reference.as_str()) {
                    *value = node;
                    inline_references(value, key, pool, root_id, ctx);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_root_returns_input_unchanged() {
        let doc = json!({"@graph": [{"@id": "a"}]});
        assert_eq!(reorganize(None, doc.clone()), doc);
    }

    #[test]
    fn test_no_graph_returns_input_unchanged() {
        let doc = json!({
            "@context": {"dc": "http://purl.org/dc/terms/"},
            "@id": "https://example.com/titerito",
            "dc:title": "Titerito"
        });
        assert_eq!(reorganize(Some("https://example.com/titerito"), doc.clone()), doc);
    }

    #[test]
    fn test_root_not_found_returns_input_unchanged() {
        let doc = json!({
            "@graph": [
                {"@id": "test:a", "test:p": "x"},
                {"@id": "test:b", "test:p": "y"}
            ]
        });
        assert_eq!(reorganize(Some("test:missing"), doc.clone()), doc);
    }

    #[test]
    fn test_roots_two_node_graph() {
        let doc = json!({
            "@context": {
                "foaf": "http://xmlns.com/foaf/0.1/",
                "test": "https://example.com/ns#"
            },
            "@graph": [
                {"@id": "test:titerito", "foaf:maker": {"@id": "test:farruko"}},
                {"@id": "test:farruko", "foaf:familyName": "Reyes Rosado"}
            ]
        });

        let rooted = reorganize(Some("test:titerito"), doc);
        assert_eq!(
            rooted,
            json!({
                "@context": {
                    "foaf": "http://xmlns.com/foaf/0.1/",
                    "test": "https://example.com/ns#"
                },
                "@id": "test:titerito",
                "foaf:maker": {
                    "@id": "test:farruko",
                    "foaf:familyName": "Reyes Rosado"
                }
            })
        );
    }

    #[test]
    fn test_pooled_node_wins_key_conflicts() {
        let doc = json!({
            "@graph": [
                {"@id": "test:a", "test:link": {"@id": "test:b", "test:note": "stub"}},
                {"@id": "test:b", "test:note": "full definition"}
            ]
        });

        let rooted = reorganize(Some("test:a"), doc);
        assert_eq!(rooted["test:link"]["test:note"], json!("full definition"));
    }

    #[test]
    fn test_blank_node_inlined_anonymously() {
        let doc = json!({
            "@graph": [
                {"@id": "test:a", "test:link": {"@id": "_:b0"}},
                {"@id": "_:b0", "test:note": "anonymous"}
            ]
        });

        let rooted = reorganize(Some("test:a"), doc);
        assert_eq!(
            rooted["test:link"],
            json!({"test:note": "anonymous"})
        );
    }

    #[test]
    fn test_id_typed_string_reference_is_resolved() {
        let doc = json!({
            "@context": {
                "maker": {"@id": "http://xmlns.com/foaf/0.1/maker", "@type": "@id"}
            },
            "@graph": [
                {"@id": "test:a", "maker": "test:b"},
                {"@id": "test:b", "name": "Farruko"}
            ]
        });

        let rooted = reorganize(Some("test:a"), doc);
        assert_eq!(
            rooted["maker"],
            json!({"@id": "test:b", "name": "Farruko"})
        );
    }

    #[test]
    fn test_plain_string_is_never_treated_as_reference() {
        // "title" carries no @type: @id, so its value stays a literal even
        // though a node with that id exists; that node then blocks rooting
        let doc = json!({
            "@context": {"title": "http://purl.org/dc/terms/title"},
            "@graph": [
                {"@id": "test:a", "title": "test:b"},
                {"@id": "test:b", "name": "x"}
            ]
        });

        let rooted = reorganize(Some("test:a"), doc.clone());
        assert_eq!(rooted, doc);
    }

    #[test]
    fn test_id_typed_array_elements_are_resolved() {
        let doc = json!({
            "@context": {
                "knows": {"@id": "http://xmlns.com/foaf/0.1/knows", "@type": "@id"}
            },
            "@graph": [
                {"@id": "test:a", "knows": ["test:b", "https://unresolved.example/x", "test:c"]},
                {"@id": "test:b", "name": "B"},
                {"@id": "test:c", "name": "C"}
            ]
        });

        let rooted = reorganize(Some("test:a"), doc);
        let knows = rooted["knows"].as_array().unwrap();
        assert_eq!(knows[0], json!({"@id": "test:b", "name": "B"}));
        // non-matching elements stay untouched
        assert_eq!(knows[1], json!("https://unresolved.example/x"));
        assert_eq!(knows[2], json!({"@id": "test:c", "name": "C"}));
    }

    #[test]
    fn test_unresolved_remainder_aborts_rooting() {
        let doc = json!({
            "@graph": [
                {"@id": "test:a", "test:p": "x"},
                {"@id": "test:b", "test:p": "y"},
                {"@id": "test:c", "test:p": "z"}
            ]
        });

        let rooted = reorganize(Some("test:a"), doc.clone());
        assert_eq!(rooted, doc);
    }

    #[test]
    fn test_chain_is_inlined_transitively() {
        let doc = json!({
            "@graph": [
                {"@id": "test:a", "test:next": {"@id": "test:b"}},
                {"@id": "test:b", "test:next": {"@id": "test:c"}},
                {"@id": "test:c", "test:end": true}
            ]
        });

        let rooted = reorganize(Some("test:a"), doc);
        assert_eq!(
            rooted["test:next"]["test:next"],
            json!({"@id": "test:c", "test:end": true})
        );
    }

    #[test]
    fn test_self_loop_on_root_is_not_an_external_reference() {
        let doc = json!({
            "@graph": [
                {"@id": "test:a", "test:self": {"@id": "test:a"}, "test:next": {"@id": "test:b"}},
                {"@id": "test:b", "test:p": "y"}
            ]
        });

        let rooted = reorganize(Some("test:a"), doc);
        assert_eq!(rooted["test:self"], json!({"@id": "test:a"}));
        assert_eq!(rooted["test:next"], json!({"@id": "test:b", "test:p": "y"}));
    }

    #[test]
    fn test_cyclic_graph_terminates_with_bare_back_reference() {
        let doc = json!({
            "@graph": [
                {"@id": "test:a", "test:next": {"@id": "test:b"}},
                {"@id": "test:b", "test:next": {"@id": "test:c"}},
                {"@id": "test:c", "test:next": {"@id": "test:b"}}
            ]
        });

        let rooted = reorganize(Some("test:a"), doc);
        // b and c are inlined once; the cycle back to b stays a bare reference
        assert_eq!(
            rooted["test:next"]["test:next"]["test:next"],
            json!({"@id": "test:b"})
        );
    }

    #[test]
    fn test_node_referenced_twice_is_inlined_once() {
        let doc = json!({
            "@graph": [
                {
                    "@id": "test:a",
                    "test:first": {"@id": "test:b"},
                    "test:second": {"@id": "test:b"}
                },
                {"@id": "test:b", "test:p": "y"}
            ]
        });

        let rooted = reorganize(Some("test:a"), doc);
        // document order: "test:first" resolves, "test:second" dangles
        assert_eq!(rooted["test:first"], json!({"@id": "test:b", "test:p": "y"}));
        assert_eq!(rooted["test:second"], json!({"@id": "test:b"}));
    }
}

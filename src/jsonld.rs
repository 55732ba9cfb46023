//! JSON-LD processing boundary
//!
//! The subset of the standard JSON-LD algorithms the conversion pipeline
//! exercises: RDF dataset to expanded node objects, compaction against a
//! context, and document expansion back to RDF triples. Only the default
//! graph is handled; `@list`, `@reverse` and `@index` node-map features
//! are out of scope and rejected where they would otherwise lose data.

use serde_json::{json, Map, Number, Value};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::collect::{Dataset, Triple};
use crate::context::{ProcessedContext, TermDefinition};
use crate::error::ConvertError;
use crate::term::Term;
use crate::vocab::{
    is_blank_node_id, RDF_TYPE, XSD_BOOLEAN, XSD_DOUBLE, XSD_INTEGER, XSD_STRING,
};

/// Convert an RDF dataset into expanded JSON-LD node objects
///
/// Nodes appear in first-seen subject order; `rdf:type` folds into
/// `@type`. With `use_native_types`, XSD integer/double/boolean literals
/// become JSON numbers and booleans, falling back to a typed value object
/// when the lexical form does not parse.
pub fn from_rdf(dataset: &Dataset, use_native_types: bool) -> Vec<Value> {
    let mut order: Vec<String> = Vec::new();
    let mut nodes: HashMap<String, Map<String, Value>> = HashMap::new();

    for triple in &dataset.default {
        let Some(subject_id) = triple.subject.id() else {
            continue;
        };
        let Term::Iri { value: predicate } = &triple.predicate else {
            continue;
        };

        let node = match nodes.entry(subject_id.to_string()) {
            Entry::Vacant(entry) => {
                order.push(subject_id.to_string());
                let mut node = Map::new();
                node.insert("@id".to_string(), Value::String(subject_id.to_string()));
                entry.insert(node)
            }
            Entry::Occupied(entry) => entry.into_mut(),
        };

        if predicate == RDF_TYPE {
            if let Some(type_id) = triple.object.id() {
                push_value(node, "@type", Value::String(type_id.to_string()));
                continue;
            }
        }

        let object = match &triple.object {
            Term::Iri { value } | Term::BlankNode { value } => json!({ "@id": value }),
            Term::Literal {
                value,
                datatype,
                language,
            } => expand_literal(value, datatype, language.as_deref(), use_native_types),
        };
        push_value(node, predicate, object);
    }

    order
        .into_iter()
        .filter_map(|id| nodes.remove(&id))
        .map(Value::Object)
        .collect()
}

fn push_value(node: &mut Map<String, Value>, key: &str, value: Value) {
    match node.get_mut(key) {
        Some(Value::Array(values)) => values.push(value),
        _ => {
            node.insert(key.to_string(), Value::Array(vec![value]));
        }
    }
}

fn expand_literal(
    value: &str,
    datatype: &str,
    language: Option<&str>,
    use_native_types: bool,
) -> Value {
    if let Some(language) = language {
        return json!({ "@value": value, "@language": language });
    }

    if use_native_types {
        match datatype {
            XSD_BOOLEAN => match value {
                "true" => return json!({ "@value": true }),
                "false" => return json!({ "@value": false }),
                _ => {}
            },
            XSD_INTEGER => {
                if let Ok(number) = value.parse::<i64>() {
                    return json!({ "@value": number });
                }
            }
            XSD_DOUBLE => {
                if let Some(number) = value.parse::<f64>().ok().and_then(Number::from_f64) {
                    return json!({ "@value": Value::Number(number) });
                }
            }
            _ => {}
        }
    }

    if datatype == XSD_STRING {
        json!({ "@value": value })
    } else {
        json!({ "@value": value, "@type": datatype })
    }
}

/// Compact expanded node objects against a context
///
/// A single node merges into the top-level document; several nodes go
/// under `@graph`. The caller's context value is echoed as `@context`
/// unless it is empty.
pub fn compact(expanded: &[Value], context: &Value) -> Result<Value, ConvertError> {
    let ctx = match ProcessedContext::process(context) {
        Ok(ctx) => ctx,
        Err(ConvertError::Context(message)) => return Err(ConvertError::Compaction(message)),
        Err(other) => return Err(other),
    };

    let mut nodes = Vec::with_capacity(expanded.len());
    for node in expanded {
        nodes.push(compact_node(node, &ctx)?);
    }

    let mut doc = Map::new();
    if !context_is_empty(context) {
        doc.insert("@context".to_string(), context.clone());
    }

    if nodes.len() == 1 {
        if let Some(Value::Object(node)) = nodes.into_iter().next() {
            for (key, value) in node {
                doc.insert(key, value);
            }
        }
    } else if !nodes.is_empty() {
        doc.insert("@graph".to_string(), Value::Array(nodes));
    }

    Ok(Value::Object(doc))
}

fn context_is_empty(context: &Value) -> bool {
    match context {
        Value::Null => true,
        Value::Object(entries) => entries.is_empty(),
        Value::Array(contexts) => contexts.iter().all(context_is_empty),
        _ => false,
    }
}

fn compact_node(node: &Value, ctx: &ProcessedContext) -> Result<Value, ConvertError> {
    let Some(entries) = node.as_object() else {
        return Err(ConvertError::Compaction(
            "expanded node must be an object".to_string(),
        ));
    };

    let mut out = Map::new();
    for (key, value) in entries {
        match key.as_str() {
            "@id" => {
                if let Some(id) = value.as_str() {
                    out.insert(
                        "@id".to_string(),
                        Value::String(ctx.compact_iri(id, false)),
                    );
                }
            }
            "@type" => {
                let types: Vec<Value> = as_array(value)
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|t| Value::String(ctx.compact_iri(t, true)))
                    .collect();
                out.insert("@type".to_string(), unwrap_single(types));
            }
            _ => {
                let term = ctx.compact_iri(key, true);
                let definition = ctx.term(&term).cloned().unwrap_or_default();
                let values: Vec<Value> = as_array(value)
                    .iter()
                    .map(|v| compact_value(v, &definition, ctx))
                    .collect();
                out.insert(term, unwrap_single(values));
            }
        }
    }
    Ok(Value::Object(out))
}

fn compact_value(value: &Value, definition: &TermDefinition, ctx: &ProcessedContext) -> Value {
    let Some(entries) = value.as_object() else {
        return value.clone();
    };

    if let Some(id) = entries.get("@id").and_then(Value::as_str) {
        if entries.len() == 1 {
            let compacted = ctx.compact_iri(id, false);
            if definition.type_mapping.as_deref() == Some("@id") {
                return Value::String(compacted);
            }
            return json!({ "@id": compacted });
        }
    }

    if entries.contains_key("@value") {
        let body = entries.get("@value").cloned().unwrap_or(Value::Null);
        if let Some(language) = entries.get("@language").and_then(Value::as_str) {
            return json!({ "@language": language, "@value": body });
        }
        if let Some(datatype) = entries.get("@type").and_then(Value::as_str) {
            if definition.type_mapping.as_deref() == Some(datatype) {
                return body;
            }
            return json!({ "@type": ctx.compact_iri(datatype, true), "@value": body });
        }
        return body;
    }

    value.clone()
}

fn as_array(value: &Value) -> &[Value] {
    match value {
        Value::Array(values) => values,
        other => std::slice::from_ref(other),
    }
}

fn unwrap_single(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.pop().unwrap()
    } else {
        Value::Array(values)
    }
}

/// Expand a JSON-LD document into RDF triples
///
/// The document's own `@context` drives term and IRI expansion. A
/// top-level `@graph` is walked node by node; nested `@graph`s collapse
/// into the default graph. Anonymous nested node objects get generated
/// `_:b{n}` labels.
pub fn to_rdf(doc: &Value) -> Result<Vec<Triple>, ConvertError> {
    let Some(entries) = doc.as_object() else {
        return Err(ConvertError::Expansion(
            "document must be a JSON object".to_string(),
        ));
    };

    let context = entries.get("@context").cloned().unwrap_or(Value::Null);
    let ctx = match ProcessedContext::process(&context) {
        Ok(ctx) => ctx,
        Err(ConvertError::Context(message)) => return Err(ConvertError::Expansion(message)),
        Err(other) => return Err(other),
    };

    let mut expander = Expander {
        ctx: &ctx,
        triples: Vec::new(),
        blank_counter: 0,
    };
    expander.expand_node(entries)?;
    Ok(expander.triples)
}

struct Expander<'a> {
    ctx: &'a ProcessedContext,
    triples: Vec<Triple>,
    blank_counter: usize,
}

impl Expander<'_> {
    fn expand_node(&mut self, entries: &Map<String, Value>) -> Result<Term, ConvertError> {
        let subject = match entries.get("@id").and_then(Value::as_str) {
            Some(id) => self.reference_term(id, false),
            None => self.new_blank(),
        };

        for (key, value) in entries {
            match key.as_str() {
                "@id" | "@context" | "@index" => {}
                "@graph" => {
                    for node in as_array(value) {
                        if let Some(nested) = node.as_object() {
                            self.expand_node(nested)?;
                        }
                    }
                }
                "@type" => {
                    for type_value in as_array(value) {
                        if let Some(type_name) = type_value.as_str() {
                            self.triples.push(Triple {
                                subject: subject.clone(),
                                predicate: Term::iri(RDF_TYPE),
                                object: self.reference_term(type_name, true),
                            });
                        }
                    }
                }
                "@value" | "@list" | "@reverse" => {
                    return Err(ConvertError::Expansion(format!(
                        "{key} is not supported in node objects"
                    )));
                }
                other if other.starts_with('@') => {}
                _ => {
                    let predicate = self.ctx.expand_iri(key, true);
                    if !predicate.contains(':') {
                        // unmapped term with no @vocab: dropped, as expansion defines
                        continue;
                    }
                    let definition = self.ctx.term(key).cloned().unwrap_or_default();
                    for item in as_array(value) {
                        if let Some(object) = self.expand_value(item, &definition)? {
                            self.triples.push(Triple {
                                subject: subject.clone(),
                                predicate: Term::iri(predicate.clone()),
                                object,
                            });
                        }
                    }
                }
            }
        }

        Ok(subject)
    }

    fn expand_value(
        &mut self,
        value: &Value,
        definition: &TermDefinition,
    ) -> Result<Option<Term>, ConvertError> {
        match value {
            Value::Null => Ok(None),
            Value::String(body) => match definition.type_mapping.as_deref() {
                Some("@id") => Ok(Some(self.reference_term(body, false))),
                Some("@vocab") => Ok(Some(self.reference_term(body, true))),
                Some(datatype) => Ok(Some(Term::typed_literal(body, datatype))),
                None => Ok(Some(Term::literal(body))),
            },
            Value::Bool(flag) => Ok(Some(Term::typed_literal(flag.to_string(), XSD_BOOLEAN))),
            Value::Number(number) => Ok(Some(number_literal(number))),
            Value::Array(_) => Err(ConvertError::Expansion(
                "nested arrays are not valid JSON-LD".to_string(),
            )),
            Value::Object(entries) => {
                if entries.contains_key("@value") {
                    self.expand_value_object(entries)
                } else if entries.contains_key("@list") {
                    Err(ConvertError::Expansion(
                        "@list is not supported".to_string(),
                    ))
                } else {
                    Ok(Some(self.expand_node(entries)?))
                }
            }
        }
    }

    fn expand_value_object(
        &mut self,
        entries: &Map<String, Value>,
    ) -> Result<Option<Term>, ConvertError> {
        let body = entries.get("@value").cloned().unwrap_or(Value::Null);
        if body.is_null() {
            return Ok(None);
        }

        if let Some(language) = entries.get("@language").and_then(Value::as_str) {
            let Some(text) = body.as_str() else {
                return Err(ConvertError::Expansion(
                    "@value with @language must be a string".to_string(),
                ));
            };
            return Ok(Some(Term::lang_literal(text, language)));
        }

        if let Some(datatype) = entries.get("@type").and_then(Value::as_str) {
            let datatype = self.ctx.expand_iri(datatype, true);
            return Ok(Some(Term::typed_literal(lexical_form(&body)?, datatype)));
        }

        match body {
            Value::String(text) => Ok(Some(Term::literal(text))),
            Value::Bool(flag) => Ok(Some(Term::typed_literal(flag.to_string(), XSD_BOOLEAN))),
            Value::Number(number) => Ok(Some(number_literal(&number))),
            other => Err(ConvertError::Expansion(format!(
                "invalid @value: {other}"
            ))),
        }
    }

    fn reference_term(&self, value: &str, vocab: bool) -> Term {
        let expanded = self.ctx.expand_iri(value, vocab);
        if is_blank_node_id(&expanded) {
            Term::blank(expanded)
        } else {
            Term::iri(expanded)
        }
    }

    fn new_blank(&mut self) -> Term {
        let term = Term::blank(format!("_:b{}", self.blank_counter));
        self.blank_counter += 1;
        term
    }
}

fn number_literal(number: &Number) -> Term {
    if number.is_i64() || number.is_u64() {
        Term::typed_literal(number.to_string(), XSD_INTEGER)
    } else {
        Term::typed_literal(number.to_string(), XSD_DOUBLE)
    }
}

fn lexical_form(body: &Value) -> Result<String, ConvertError> {
    match body {
        Value::String(text) => Ok(text.clone()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(ConvertError::Expansion(format!("invalid @value: {other}"))),
    }
}

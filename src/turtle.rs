//! Turtle parsing and writing boundary
//!
//! Wraps `oxttl` for both directions. Parsing yields raw triples in
//! N-Triples-style term syntax (bare IRIs, `_:label` blank nodes, quoted
//! literals with their suffix) together with the prefix declarations seen,
//! which is the form the term classifier consumes. Writing turns typed
//! triples back into Turtle text with prefix declarations.

use oxrdf::{BlankNode, Literal, NamedNode, Triple as RdfTriple};
use oxttl::{TurtleParser, TurtleSerializer};

use crate::collect::{PrefixMap, Triple};
use crate::error::ConvertError;
use crate::term::Term;
use crate::vocab::{BLANK_NODE_PREFIX, XSD_STRING};

/// A triple as three raw term strings, prior to classification
#[derive(Debug, Clone)]
pub struct RawTriple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

/// Parse Turtle text into raw triples plus the prefix declarations seen
///
/// The two are returned as one value: a parse either yields the complete
/// dataset with its prefix table or fails with `ConvertError::Parse`.
pub fn parse_raw(turtle_text: &str) -> Result<(Vec<RawTriple>, PrefixMap), ConvertError> {
    let mut parser = TurtleParser::new().for_reader(turtle_text.as_bytes());

    let mut triples = Vec::new();
    for result in &mut parser {
        let triple = result.map_err(|e| ConvertError::Parse(e.to_string()))?;
        triples.push(RawTriple {
            subject: subject_to_raw(&triple),
            predicate: triple.predicate.as_str().to_string(),
            object: object_to_raw(&triple.object),
        });
    }

    let prefixes = parser
        .prefixes()
        .map(|(prefix, iri)| (prefix.to_string(), iri.to_string()))
        .collect();

    Ok((triples, prefixes))
}

/// Serialize triples as Turtle text using the given prefix declarations
///
/// Prefixes are emitted in map order (sorted); the serializer terminates
/// its output with a trailing newline.
pub fn write_turtle(triples: &[Triple], prefixes: &PrefixMap) -> Result<String, ConvertError> {
    let mut serializer = TurtleSerializer::new();
    for (prefix, iri) in prefixes {
        serializer = serializer
            .with_prefix(prefix.as_str(), iri.as_str())
            .map_err(|e| ConvertError::Serialization(format!("invalid prefix {prefix}: {e}")))?;
    }

    let mut writer = serializer.for_writer(Vec::new());
    for triple in triples {
        let rdf_triple = to_rdf_triple(triple)?;
        writer
            .serialize_triple(&rdf_triple)
            .map_err(|e| ConvertError::Serialization(e.to_string()))?;
    }

    let bytes = writer
        .finish()
        .map_err(|e| ConvertError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ConvertError::Serialization(e.to_string()))
}

/// Raw form of a triple's subject (bare IRI or `_:label`)
fn subject_to_raw(triple: &RdfTriple) -> String {
    // NamedNode renders as <iri>, blank nodes as _:label
    let rendered = triple.subject.to_string();
    match rendered
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
    {
        Some(iri) => iri.to_string(),
        None => rendered,
    }
}

/// Raw form of an object term; literal bodies are kept verbatim
fn object_to_raw(term: &oxrdf::Term) -> String {
    match term {
        oxrdf::Term::NamedNode(n) => n.as_str().to_string(),
        oxrdf::Term::BlankNode(b) => b.to_string(),
        oxrdf::Term::Literal(lit) => literal_to_raw(lit),
    }
}

fn literal_to_raw(lit: &Literal) -> String {
    if let Some(language) = lit.language() {
        format!("\"{}\"@{}", lit.value(), language)
    } else if lit.datatype().as_str() == XSD_STRING {
        format!("\"{}\"", lit.value())
    } else {
        format!("\"{}\"^^<{}>", lit.value(), lit.datatype().as_str())
    }
}

/// Convert a typed triple into oxrdf terms for serialization
///
/// IRIs and language tags are validated here; an invalid term surfaces as
/// `ConvertError::Serialization`, matching the writer's own failure mode.
fn to_rdf_triple(triple: &Triple) -> Result<RdfTriple, ConvertError> {
    let predicate = match &triple.predicate {
        Term::Iri { value } => named_node(value)?,
        other => {
            return Err(ConvertError::Serialization(format!(
                "predicate must be an IRI, got {other:?}"
            )))
        }
    };
    let object = object_term(&triple.object)?;

    match &triple.subject {
        Term::Iri { value } => Ok(RdfTriple::new(named_node(value)?, predicate, object)),
        Term::BlankNode { value } => Ok(RdfTriple::new(blank_node(value)?, predicate, object)),
        Term::Literal { .. } => Err(ConvertError::Serialization(
            "subject must not be a literal".to_string(),
        )),
    }
}

fn object_term(term: &Term) -> Result<oxrdf::Term, ConvertError> {
    match term {
        Term::Iri { value } => Ok(named_node(value)?.into()),
        Term::BlankNode { value } => Ok(blank_node(value)?.into()),
        Term::Literal {
            value,
            datatype,
            language,
        } => {
            let literal = match language {
                Some(language) => Literal::new_language_tagged_literal(value, language)
                    .map_err(|e| ConvertError::Serialization(e.to_string()))?,
                None if datatype == XSD_STRING => Literal::new_simple_literal(value),
                None => Literal::new_typed_literal(value, named_node(datatype)?),
            };
            Ok(literal.into())
        }
    }
}

fn named_node(iri: &str) -> Result<NamedNode, ConvertError> {
    NamedNode::new(iri)
        .map_err(|e| ConvertError::Serialization(format!("invalid IRI <{iri}>: {e}")))
}

fn blank_node(value: &str) -> Result<BlankNode, ConvertError> {
    let label = value.strip_prefix(BLANK_NODE_PREFIX).unwrap_or(value);
    BlankNode::new(label)
        .map_err(|e| ConvertError::Serialization(format!("invalid blank node {value}: {e}")))
}

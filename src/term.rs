//! RDF term classification
//!
//! Maps raw term strings in N-Triples/Turtle syntax to typed terms.
//! Classification is total: every input maps to exactly one variant,
//! with literal recognition taking priority over blank-node shape.

use serde::Serialize;

use crate::vocab::{BLANK_NODE_PREFIX, RDF_LANG_STRING, XSD_STRING};

/// An RDF term: IRI, blank node, or literal
///
/// Serializes to the flat record shape used throughout the pipeline:
/// `{"type": "IRI", "value": ...}`, `{"type": "blank node", ...}` or
/// `{"type": "literal", "value": ..., "datatype": ..., "language": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Term {
    #[serde(rename = "IRI")]
    Iri { value: String },

    #[serde(rename = "blank node")]
    BlankNode { value: String },

    #[serde(rename = "literal")]
    Literal {
        value: String,
        datatype: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

impl Term {
    /// Create an IRI term
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri {
            value: value.into(),
        }
    }

    /// Create a blank node term; `value` keeps its `_:` prefix
    pub fn blank(value: impl Into<String>) -> Self {
        Term::BlankNode {
            value: value.into(),
        }
    }

    /// Create a plain string literal (xsd:string)
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: XSD_STRING.to_string(),
            language: None,
        }
    }

    /// Create a language-tagged literal (rdf:langString)
    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: RDF_LANG_STRING.to_string(),
            language: Some(language.into()),
        }
    }

    /// Create a literal with an explicit datatype IRI
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: datatype.into(),
            language: None,
        }
    }

    /// Check if this is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    /// The identifier of an IRI or blank node term (None for literals)
    pub fn id(&self) -> Option<&str> {
        match self {
            Term::Iri { value } | Term::BlankNode { value } => Some(value),
            Term::Literal { .. } => None,
        }
    }
}

/// Classify a raw term string into a typed term
///
/// Rules, in priority order:
/// 1. `"..."` (optionally suffixed `@lang` or `^^<iri>`) is a literal.
///    The quoted body is taken verbatim, multi-line bodies included.
/// 2. A `_:` prefix marks a blank node.
/// 3. Everything else is an IRI, value unchanged.
///
/// A malformed literal suffix (e.g. `"a"@1x`) fails the literal match
/// entirely and the string falls through to the IRI rule. Upstream
/// parsing has already validated term shape, so there is no error path.
pub fn classify(raw: &str) -> Term {
    if let Some(term) = match_literal(raw) {
        return term;
    }

    if raw.starts_with(BLANK_NODE_PREFIX) {
        Term::blank(raw)
    } else {
        Term::iri(raw)
    }
}

/// Try to match the literal pattern `"body"` + optional suffix.
///
/// The body is greedy: the closing quote is the last `"` whose remainder
/// forms a complete suffix (empty, `@lang`, or `^^<iri>`), so quotes and
/// `@` inside the body never terminate it early.
fn match_literal(raw: &str) -> Option<Term> {
    let bytes = raw.as_bytes();
    if bytes.first() != Some(&b'"') || bytes.len() < 2 {
        return None;
    }

    for close in (1..bytes.len()).rev() {
        if bytes[close] != b'"' {
            continue;
        }
        let body = &raw[1..close];
        let suffix = &raw[close + 1..];

        if suffix.is_empty() {
            return Some(Term::literal(body));
        }
        if let Some(tag) = match_language_tag(suffix) {
            return Some(Term::lang_literal(body, tag));
        }
        if let Some(datatype) = match_datatype(suffix) {
            return Some(Term::typed_literal(body, datatype));
        }
    }

    None
}

/// Match `@letters` optionally followed by `-alphanumerics` (e.g. `@fy-NL`)
fn match_language_tag(suffix: &str) -> Option<&str> {
    let tag = suffix.strip_prefix('@')?;
    let (primary, subtag) = match tag.split_once('-') {
        Some((p, s)) => (p, Some(s)),
        None => (tag, None),
    };

    if primary.is_empty() || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    if let Some(sub) = subtag {
        if sub.is_empty() || !sub.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
    }
    Some(tag)
}

/// Match `^^<iri>`
fn match_datatype(suffix: &str) -> Option<&str> {
    suffix.strip_prefix("^^<")?.strip_suffix('>')
}

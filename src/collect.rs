//! Triple collection from Turtle input
//!
//! Consumes the raw triple stream produced by the Turtle parsing boundary,
//! classifies every term position, and assembles the default-graph dataset
//! together with the prefix table discovered during the parse.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::ConvertError;
use crate::term::{classify, Term};
use crate::turtle;

/// Mapping from prefix label to namespace IRI
pub type PrefixMap = BTreeMap<String, String>;

/// A subject–predicate–object statement
///
/// The subject is never a literal and the predicate is always an IRI;
/// both are guaranteed by the Turtle grammar upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

/// An RDF dataset holding only the default graph
///
/// Triples keep their parse order; no deduplication is performed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    #[serde(rename = "@default")]
    pub default: Vec<Triple>,
}

/// The complete result of parsing one Turtle document
///
/// Dataset and prefix context are produced as a single value so that a
/// conversion can never observe another conversion's prefixes: there is
/// no shared holder to race on, each parse returns its own output.
#[derive(Debug)]
pub struct ParseOutput {
    pub dataset: Dataset,
    pub context: PrefixMap,
}

/// Parse Turtle text into a classified dataset plus its prefix context
///
/// Fails with `ConvertError::Parse` on malformed input; no partial
/// dataset is ever returned.
pub fn collect(turtle_text: &str) -> Result<ParseOutput, ConvertError> {
    let (raw_triples, prefixes) = turtle::parse_raw(turtle_text)?;

    let mut triples = Vec::with_capacity(raw_triples.len());
    for raw in raw_triples {
        triples.push(Triple {
            subject: classify(&raw.subject),
            predicate: classify(&raw.predicate),
            object: classify(&raw.object),
        });
    }

    Ok(ParseOutput {
        dataset: Dataset { default: triples },
        context: prefixes,
    })
}

//! Turtle / JSON-LD Conversion Library
//!
//! This library converts between two RDF serializations: Turtle text and
//! JSON-LD documents. Going from Turtle, the resulting JSON-LD is
//! compacted against the prefixes declared in the input (or a context the
//! caller supplies), and can optionally be reorganized into a single
//! nested tree rooted at a chosen node. Going from JSON-LD, prefix
//! declarations for the Turtle output are inferred from the document's
//! `@context`.
//!
//! # Overview
//!
//! A conversion runs through these stages:
//!
//! 1. Parsing Turtle into raw triples and classifying every term
//!    (IRI, blank node, or literal with datatype/language)
//! 2. Assembling the default-graph dataset plus the discovered prefixes
//! 3. Crossing the JSON-LD boundary: dataset → expanded node objects →
//!    compacted document (or document → triples for the reverse)
//! 4. Optionally rooting a multi-node `@graph` into one nested document,
//!    inlining every node reachable from the root
//!
//! # Usage
//!
//! ## Turtle to JSON-LD
//!
//! ```ignore
//! use turtle_jsonld::compact_from_turtle;
//!
//! let turtle = r#"
//! @prefix dc: <http://purl.org/dc/terms/> .
//! <https://example.com/titerito> dc:title "Titerito"@es .
//! "#;
//!
//! let doc = compact_from_turtle(turtle, None, None)?;
//! println!("{}", serde_json::to_string_pretty(&doc)?);
//! ```
//!
//! ## JSON-LD to Turtle
//!
//! ```ignore
//! use turtle_jsonld::from_jsonld_to_turtle;
//!
//! let turtle = from_jsonld_to_turtle(r#"{
//!     "@context": {"dc": "http://purl.org/dc/terms/"},
//!     "@id": "https://example.com/titerito",
//!     "dc:title": {"@language": "es", "@value": "Titerito"}
//! }"#)?;
//! ```

pub mod collect;
pub mod context;
pub mod error;
pub mod jsonld;
pub mod pipeline;
pub mod reorganize;
pub mod term;
pub mod turtle;
pub mod vocab;

// Re-export main types for convenience
pub use crate::collect::{Dataset, ParseOutput, PrefixMap, Triple};
pub use crate::context::{extract_namespaces, ProcessedContext, TermDefinition};
pub use crate::error::ConvertError;
pub use crate::pipeline::{compact_from_turtle, from_jsonld_to_turtle, parse_turtle_to_dataset};
pub use crate::reorganize::reorganize;
pub use crate::term::{classify, Term};

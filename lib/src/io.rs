//! Reading and writing quads through oxigraph's RDF parsers and serializers.
//!
//! Only compiled with the `oxigraph` feature. Parsing happens on a producer
//! thread that feeds a [`QuadStream`]; a statement the parser rejects is
//! logged and forwarded as a hole so lenient consumers keep going and strict
//! ones can stop.

use crate::quad::Quad;
use crate::stream::{Capacity, QuadStream};
use crate::term::{BlankNode, Literal, NamedNode, Term};
use anyhow::{anyhow, Result};
use log::{debug, trace, warn};
use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model as ox;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

fn named_node_from_oxigraph(node: ox::NamedNode) -> NamedNode {
    NamedNode::new(node.into_string())
}

fn blank_node_from_oxigraph(node: ox::BlankNode) -> Term {
    // oxigraph labels are never empty
    BlankNode::from_generated(node.into_string()).into()
}

// Language-tagged literals keep no datatype; everything else keeps the one
// oxigraph reports, which is xsd:string for simple literals.
fn literal_from_oxigraph(literal: &ox::Literal) -> Literal {
    match literal.language() {
        Some(language) => Literal::new(literal.value(), Some(language), None),
        None => Literal::new(
            literal.value(),
            None,
            Some(NamedNode::new(literal.datatype().as_str())),
        ),
    }
}

pub fn term_from_oxigraph(term: ox::Term) -> Term {
    match term {
        ox::Term::NamedNode(n) => named_node_from_oxigraph(n).into(),
        ox::Term::BlankNode(b) => blank_node_from_oxigraph(b),
        ox::Term::Literal(l) => literal_from_oxigraph(&l).into(),
    }
}

fn subject_from_oxigraph(subject: ox::NamedOrBlankNode) -> Term {
    match subject {
        ox::NamedOrBlankNode::NamedNode(n) => named_node_from_oxigraph(n).into(),
        ox::NamedOrBlankNode::BlankNode(b) => blank_node_from_oxigraph(b),
    }
}

fn graph_from_oxigraph(graph: ox::GraphName) -> Term {
    match graph {
        ox::GraphName::NamedNode(n) => named_node_from_oxigraph(n).into(),
        ox::GraphName::BlankNode(b) => blank_node_from_oxigraph(b),
        ox::GraphName::DefaultGraph => Term::DefaultGraph,
    }
}

/// Converts a parsed quad. Fails only if oxigraph produced a term this crate
/// cannot place in the same position, which well-formed input never does.
pub fn quad_from_oxigraph(quad: ox::Quad) -> Result<Quad> {
    let quad = Quad::new(
        subject_from_oxigraph(quad.subject),
        named_node_from_oxigraph(quad.predicate),
        term_from_oxigraph(quad.object),
        Some(graph_from_oxigraph(quad.graph_name)),
    )?;
    Ok(quad)
}

fn named_node_to_oxigraph(node: &NamedNode) -> Result<ox::NamedNode> {
    ox::NamedNode::new(node.as_str()).map_err(|e| anyhow!("invalid IRI <{}>: {}", node.as_str(), e))
}

fn blank_node_to_oxigraph(node: &BlankNode) -> Result<ox::BlankNode> {
    ox::BlankNode::new(node.as_str())
        .map_err(|e| anyhow!("invalid blank node label {}: {}", node, e))
}

fn subject_to_oxigraph(term: &Term) -> Result<ox::NamedOrBlankNode> {
    match term {
        Term::NamedNode(n) => Ok(named_node_to_oxigraph(n)?.into()),
        Term::BlankNode(b) => Ok(blank_node_to_oxigraph(b)?.into()),
        other => Err(anyhow!("cannot write {} subject {}", other.kind(), other)),
    }
}

fn object_to_oxigraph(term: &Term) -> Result<ox::Term> {
    match term {
        Term::NamedNode(n) => Ok(named_node_to_oxigraph(n)?.into()),
        Term::BlankNode(b) => Ok(blank_node_to_oxigraph(b)?.into()),
        Term::Literal(l) => {
            // the language tag wins over any datatype
            let literal = if let Some(language) = l.language() {
                ox::Literal::new_language_tagged_literal(l.value(), language)
                    .map_err(|e| anyhow!("invalid language tag {}: {}", language, e))?
            } else if let Some(datatype) = l.datatype() {
                ox::Literal::new_typed_literal(l.value(), named_node_to_oxigraph(datatype)?)
            } else {
                ox::Literal::new_simple_literal(l.value())
            };
            Ok(literal.into())
        }
        other => Err(anyhow!("cannot write {} object {}", other.kind(), other)),
    }
}

fn graph_to_oxigraph(term: &Term) -> Result<ox::GraphName> {
    match term {
        Term::NamedNode(n) => Ok(named_node_to_oxigraph(n)?.into()),
        Term::BlankNode(b) => Ok(blank_node_to_oxigraph(b)?.into()),
        Term::DefaultGraph => Ok(ox::GraphName::DefaultGraph),
        other => Err(anyhow!("cannot write {} graph {}", other.kind(), other)),
    }
}

/// Converts a quad for serialization. Patterns, nested quads and values
/// oxigraph considers invalid are errors.
pub fn quad_to_oxigraph(quad: &Quad) -> Result<ox::Quad> {
    let predicate = match quad.predicate() {
        Term::NamedNode(n) => named_node_to_oxigraph(n)?,
        other => return Err(anyhow!("cannot write {} predicate {}", other.kind(), other)),
    };
    Ok(ox::Quad::new(
        subject_to_oxigraph(quad.subject())?,
        predicate,
        object_to_oxigraph(quad.object())?,
        graph_to_oxigraph(quad.graph())?,
    ))
}

/// Guesses the syntax of a file from its extension.
pub fn format_from_path(path: &Path) -> Option<RdfFormat> {
    let ext = path.extension().and_then(|ext| ext.to_str())?;
    match ext.to_ascii_lowercase().as_str() {
        "nq" | "nquads" => Some(RdfFormat::NQuads),
        "nt" | "ntriples" => Some(RdfFormat::NTriples),
        "ttl" | "turtle" | "n3" => Some(RdfFormat::Turtle),
        "trig" => Some(RdfFormat::TriG),
        "rdf" | "xml" | "owl" => Some(RdfFormat::RdfXml),
        _ => None,
    }
}

/// Opens `path` and parses it on a background thread. The file is opened
/// before returning, so a missing file is reported here rather than through
/// the stream.
///
/// Blank node labels are renamed per call, so the same label in two files
/// names two different nodes once both are loaded into one store.
pub fn read_file(path: &Path, format: Option<RdfFormat>, capacity: Capacity) -> Result<QuadStream> {
    let format = format
        .or_else(|| format_from_path(path))
        .ok_or_else(|| anyhow!("cannot guess RDF format of {}", path.display()))?;
    let file = File::open(path)
        .map_err(|e| anyhow!("failed to open {}: {}", path.display(), e))?;
    debug!("Reading {} as {:?}", path.display(), format);

    let name = path.display().to_string();
    Ok(QuadStream::spawn(capacity, move |sender| {
        let parser = RdfParser::from_format(format)
            .rename_blank_nodes()
            .for_reader(BufReader::new(file));
        for parsed in parser {
            let element = match parsed {
                Ok(quad) => match quad_from_oxigraph(quad) {
                    Ok(quad) => Some(quad),
                    Err(e) => {
                        warn!("Skipping statement in {}: {}", name, e);
                        None
                    }
                },
                Err(e) => {
                    warn!("Parse error in {}: {}", name, e);
                    None
                }
            };
            if sender.send(element).is_err() {
                trace!("Stopped reading {}: stream cancelled", name);
                return;
            }
        }
    }))
}

/// Writes every quad of `stream` as N-Quads and returns how many were written.
///
/// N-Quads cannot carry both a language tag and a datatype, so a literal with
/// both is written language-tagged and reads back without its datatype.
pub fn write_nquads<W: Write>(stream: QuadStream, writer: W) -> Result<usize> {
    let mut serializer = RdfSerializer::from_format(RdfFormat::NQuads).for_writer(writer);
    let mut written = 0;
    for quad in stream {
        serializer.serialize_quad(&quad_to_oxigraph(&quad)?)?;
        written += 1;
    }
    serializer.finish()?;
    Ok(written)
}

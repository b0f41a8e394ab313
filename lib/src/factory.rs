//! A factory for terms and quads that owns the blank node counter, so fresh
//! blank node labels are unique for as long as the factory lives.

use crate::consts::XSD_STRING;
use crate::errors::TermError;
use crate::quad::{Quad, QuadError};
use crate::term::{BlankNode, Literal, NamedNode, Term, Variable};
use std::sync::atomic::{AtomicU64, Ordering};

const FRESH_PREFIX: &str = "n3-";

#[derive(Debug, Default)]
pub struct DataFactory {
    blank_node_counter: AtomicU64,
}

impl DataFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named_node(&self, iri: impl Into<String>) -> NamedNode {
        NamedNode::new(iri)
    }

    /// Returns a blank node for `label`, or a freshly named one (`n3-<n>`) when
    /// the label is empty after stripping `_` and `:`.
    pub fn blank_node(&self, label: &str) -> BlankNode {
        BlankNode::new(label, self)
    }

    pub fn fresh_blank_node(&self) -> BlankNode {
        let n = self.blank_node_counter.fetch_add(1, Ordering::Relaxed);
        BlankNode::from_generated(format!("{}{}", FRESH_PREFIX, n))
    }

    // Moves the counter past an explicit label that looks generated.
    pub(crate) fn reserve_label(&self, label: &str) {
        let taken = label
            .strip_prefix(FRESH_PREFIX)
            .and_then(|n| n.parse::<u64>().ok());
        if let Some(n) = taken {
            self.blank_node_counter
                .fetch_max(n.saturating_add(1), Ordering::Relaxed);
        }
    }

    /// A literal typed as `xsd:string`.
    pub fn simple_literal(&self, value: impl Into<String>) -> Literal {
        Literal::new(value, None, Some(self.named_node(XSD_STRING)))
    }

    /// A literal whose datatype falls back to `xsd:string`.
    pub fn literal(
        &self,
        value: impl Into<String>,
        language: Option<&str>,
        datatype: Option<NamedNode>,
    ) -> Literal {
        let datatype = datatype.unwrap_or_else(|| self.named_node(XSD_STRING));
        Literal::new(value, language, Some(datatype))
    }

    pub fn variable(&self, name: &str) -> Result<Variable, TermError> {
        Variable::new(name)
    }

    pub fn default_graph(&self) -> Term {
        Term::DefaultGraph
    }

    pub fn quad(
        &self,
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
        graph: Option<Term>,
    ) -> Result<Quad, QuadError> {
        Quad::new(subject, predicate, object, graph)
    }
}

//! Defines the value types that can occupy a position of a quad: named nodes,
//! blank nodes, literals, variables, the default graph marker and nested quads.
//! Equality between terms is always structural.

use crate::consts::{XSD_BOOLEAN, XSD_DECIMAL, XSD_DOUBLE, XSD_INTEGER, XSD_STRING};
use crate::errors::TermError;
use crate::factory::DataFactory;
use crate::quad::Quad;
use std::fmt;

/// Printable form (and value) of the default graph marker.
///
/// Named nodes always print as `<...>` and blank nodes as `_:...`, so this can
/// never be mistaken for an explicit graph name.
pub const DEFAULT_GRAPH_VALUE: &str = "DEFAULT";

/// The kind of a [`Term`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TermKind {
    NamedNode,
    BlankNode,
    Literal,
    Variable,
    DefaultGraph,
    Quad,
}

impl TermKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TermKind::NamedNode => "NamedNode",
            TermKind::BlankNode => "BlankNode",
            TermKind::Literal => "Literal",
            TermKind::Variable => "Variable",
            TermKind::DefaultGraph => "DefaultGraph",
            TermKind::Quad => "Quad",
        }
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An IRI. Surrounding angle brackets are stripped on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamedNode {
    iri: String,
}

impl NamedNode {
    /// Builds a named node from `iri`, accepting both `http://ex/a` and
    /// `<http://ex/a>`. Each bracket is stripped on its own, so unbalanced
    /// input keeps whatever is left over.
    pub fn new(iri: impl Into<String>) -> Self {
        let mut iri = iri.into();
        if iri.starts_with('<') {
            iri.remove(0);
        }
        if iri.ends_with('>') {
            iri.pop();
        }
        Self { iri }
    }

    pub fn as_str(&self) -> &str {
        &self.iri
    }

    pub fn into_string(self) -> String {
        self.iri
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.iri)
    }
}

/// A blank node identified by a local label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlankNode {
    label: String,
}

impl BlankNode {
    /// Builds a blank node from `label`; leading `_` and `:` characters are
    /// removed, so `_:b`, `__b` and `b` all name the same node.
    ///
    /// An empty label gets a fresh `n3-<n>` label from `factory`'s counter.
    /// A non-empty label of that shape is reserved in `factory`, so no fresh
    /// label handed out later can name the same node.
    pub fn new(label: impl AsRef<str>, factory: &DataFactory) -> Self {
        let label = label
            .as_ref()
            .trim_start_matches(|c: char| c == '_' || c == ':');
        if label.is_empty() {
            return factory.fresh_blank_node();
        }
        factory.reserve_label(label);
        Self {
            label: label.to_string(),
        }
    }

    pub(crate) fn from_generated(label: String) -> Self {
        Self { label }
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.label)
    }
}

/// A literal value with an optional language tag and an optional datatype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    value: String,
    language: Option<String>,
    datatype: Option<NamedNode>,
}

impl Literal {
    /// Raw constructor. An empty language tag counts as no language tag and the
    /// datatype may be left out entirely.
    pub fn new(value: impl Into<String>, language: Option<&str>, datatype: Option<NamedNode>) -> Self {
        Self {
            value: value.into(),
            language: language.filter(|l| !l.is_empty()).map(str::to_string),
            datatype,
        }
    }

    /// A string literal typed as `xsd:string`.
    pub fn new_string(value: impl Into<String>, language: Option<&str>) -> Self {
        Self::new(value, language, Some(NamedNode::new(XSD_STRING)))
    }

    pub fn from_integer(value: i64) -> Self {
        Self::new(value.to_string(), None, Some(NamedNode::new(XSD_INTEGER)))
    }

    pub fn from_decimal(value: f64) -> Self {
        Self::new(value.to_string(), None, Some(NamedNode::new(XSD_DECIMAL)))
    }

    pub fn from_double(value: f64) -> Self {
        Self::new(value.to_string(), None, Some(NamedNode::new(XSD_DOUBLE)))
    }

    pub fn from_boolean(value: bool) -> Self {
        Self::new(value.to_string(), None, Some(NamedNode::new(XSD_BOOLEAN)))
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn datatype(&self) -> Option<&NamedNode> {
        self.datatype.as_ref()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for c in self.value.chars() {
            match c {
                '\\' => f.write_str("\\\\")?,
                '"' => f.write_str("\\\"")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                c => write!(f, "{}", c)?,
            }
        }
        f.write_str("\"")?;
        if let Some(language) = &self.language {
            write!(f, "@{}", language)?;
        }
        if let Some(datatype) = &self.datatype {
            write!(f, "^^{}", datatype)?;
        }
        Ok(())
    }
}

/// A query variable. Only meaningful inside patterns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    name: String,
}

impl Variable {
    /// Builds a variable, dropping one leading `?`. Fails if nothing is left.
    pub fn new(name: impl AsRef<str>) -> Result<Self, TermError> {
        let name = name.as_ref();
        let name = name.strip_prefix('?').unwrap_or(name);
        if name.is_empty() {
            return Err(TermError::EmptyVariableName);
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}

/// Any value that can appear in a quad position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
    Variable(Variable),
    DefaultGraph,
    Quad(Quad),
}

impl Term {
    pub fn default_graph() -> Self {
        Term::DefaultGraph
    }

    pub fn kind(&self) -> TermKind {
        match self {
            Term::NamedNode(_) => TermKind::NamedNode,
            Term::BlankNode(_) => TermKind::BlankNode,
            Term::Literal(_) => TermKind::Literal,
            Term::Variable(_) => TermKind::Variable,
            Term::DefaultGraph => TermKind::DefaultGraph,
            Term::Quad(_) => TermKind::Quad,
        }
    }

    /// The bare value: IRI, label, lexical form or variable name. Nested quads
    /// have no value of their own and return the empty string.
    pub fn value(&self) -> &str {
        match self {
            Term::NamedNode(n) => n.as_str(),
            Term::BlankNode(b) => b.as_str(),
            Term::Literal(l) => l.value(),
            Term::Variable(v) => v.as_str(),
            Term::DefaultGraph => DEFAULT_GRAPH_VALUE,
            Term::Quad(_) => "",
        }
    }

    /// Structural equality that treats a missing term as unequal to anything.
    pub fn equals(&self, other: Option<&Term>) -> bool {
        other.map_or(false, |other| self == other)
    }

    pub fn to_canonical_string(&self) -> String {
        self.to_string()
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    pub fn is_default_graph(&self) -> bool {
        matches!(self, Term::DefaultGraph)
    }

    /// True if this term is, or contains, a variable.
    pub fn has_variable(&self) -> bool {
        match self {
            Term::Variable(_) => true,
            Term::Quad(q) => q.is_pattern(),
            _ => false,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::NamedNode(n) => fmt::Display::fmt(n, f),
            Term::BlankNode(b) => fmt::Display::fmt(b, f),
            Term::Literal(l) => fmt::Display::fmt(l, f),
            Term::Variable(v) => fmt::Display::fmt(v, f),
            Term::DefaultGraph => f.write_str(DEFAULT_GRAPH_VALUE),
            Term::Quad(q) => fmt::Display::fmt(q, f),
        }
    }
}

impl From<NamedNode> for Term {
    fn from(node: NamedNode) -> Self {
        Term::NamedNode(node)
    }
}

impl From<BlankNode> for Term {
    fn from(node: BlankNode) -> Self {
        Term::BlankNode(node)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl From<Variable> for Term {
    fn from(variable: Variable) -> Self {
        Term::Variable(variable)
    }
}

impl From<Quad> for Term {
    fn from(quad: Quad) -> Self {
        Term::Quad(quad)
    }
}

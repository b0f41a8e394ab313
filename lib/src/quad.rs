//! Validated (subject, predicate, object, graph) tuples.
//!
//! A [`Quad`] checks the kind of every position when it is built, so a quad
//! that exists is always well formed. Quads are immutable and share their
//! payload, which makes cloning them cheap; the store keeps one allocation per
//! quad no matter how many indices reference it.

use crate::term::{Term, TermKind};
use std::fmt;
use std::sync::Arc;

/// One of the four positions of a quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    Subject,
    Predicate,
    Object,
    Graph,
}

const SUBJECT_KINDS: [TermKind; 4] = [
    TermKind::NamedNode,
    TermKind::BlankNode,
    TermKind::Quad,
    TermKind::Variable,
];
const PREDICATE_KINDS: [TermKind; 2] = [TermKind::NamedNode, TermKind::Variable];
const OBJECT_KINDS: [TermKind; 5] = [
    TermKind::NamedNode,
    TermKind::BlankNode,
    TermKind::Quad,
    TermKind::Literal,
    TermKind::Variable,
];
const GRAPH_KINDS: [TermKind; 4] = [
    TermKind::NamedNode,
    TermKind::BlankNode,
    TermKind::DefaultGraph,
    TermKind::Variable,
];

impl Position {
    /// Positions in the order the store considers them.
    pub const ALL: [Position; 4] = [
        Position::Subject,
        Position::Predicate,
        Position::Object,
        Position::Graph,
    ];

    pub fn allowed_kinds(self) -> &'static [TermKind] {
        match self {
            Position::Subject => &SUBJECT_KINDS,
            Position::Predicate => &PREDICATE_KINDS,
            Position::Object => &OBJECT_KINDS,
            Position::Graph => &GRAPH_KINDS,
        }
    }

    pub fn accepts(self, kind: TermKind) -> bool {
        self.allowed_kinds().contains(&kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Position::Subject => "subject",
            Position::Predicate => "predicate",
            Position::Object => "object",
            Position::Graph => "graph",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A term of the wrong kind was given for a quad position. Each variant keeps
/// the kind that was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadError {
    InvalidSubjectKind(TermKind),
    InvalidPredicateKind(TermKind),
    InvalidObjectKind(TermKind),
    InvalidGraphKind(TermKind),
}

impl QuadError {
    fn new(position: Position, found: TermKind) -> Self {
        match position {
            Position::Subject => QuadError::InvalidSubjectKind(found),
            Position::Predicate => QuadError::InvalidPredicateKind(found),
            Position::Object => QuadError::InvalidObjectKind(found),
            Position::Graph => QuadError::InvalidGraphKind(found),
        }
    }

    pub fn position(&self) -> Position {
        match self {
            QuadError::InvalidSubjectKind(_) => Position::Subject,
            QuadError::InvalidPredicateKind(_) => Position::Predicate,
            QuadError::InvalidObjectKind(_) => Position::Object,
            QuadError::InvalidGraphKind(_) => Position::Graph,
        }
    }

    pub fn found(&self) -> TermKind {
        match self {
            QuadError::InvalidSubjectKind(kind)
            | QuadError::InvalidPredicateKind(kind)
            | QuadError::InvalidObjectKind(kind)
            | QuadError::InvalidGraphKind(kind) => *kind,
        }
    }

    pub fn allowed(&self) -> &'static [TermKind] {
        self.position().allowed_kinds()
    }
}

impl fmt::Display for QuadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let allowed = self
            .allowed()
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "{} needs to be one of [{}], got {}",
            self.position(),
            allowed,
            self.found()
        )
    }
}

impl std::error::Error for QuadError {}

#[derive(Debug, PartialEq, Eq, Hash)]
struct QuadData {
    subject: Term,
    predicate: Term,
    object: Term,
    graph: Term,
}

/// A (subject, predicate, object, graph) tuple.
///
/// A quad holding a [`Term::Variable`] anywhere is a pattern: it can be used to
/// match but the store never keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quad {
    data: Arc<QuadData>,
}

impl Quad {
    /// Validates the kind of each term and assembles a quad. A missing graph
    /// means the default graph.
    ///
    /// ```
    /// use quadstore::{NamedNode, Quad, Term};
    ///
    /// let quad = Quad::new(
    ///     NamedNode::new("http://example.com/s"),
    ///     NamedNode::new("http://example.com/p"),
    ///     NamedNode::new("http://example.com/o"),
    ///     None,
    /// )
    /// .unwrap();
    /// assert_eq!(quad.graph(), &Term::DefaultGraph);
    /// ```
    pub fn new(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
        graph: Option<Term>,
    ) -> Result<Self, QuadError> {
        let subject = subject.into();
        let predicate = predicate.into();
        let object = object.into();
        let graph = graph.unwrap_or(Term::DefaultGraph);
        for (position, term) in Position::ALL
            .into_iter()
            .zip([&subject, &predicate, &object, &graph])
        {
            if !position.accepts(term.kind()) {
                return Err(QuadError::new(position, term.kind()));
            }
        }
        Ok(Self {
            data: Arc::new(QuadData {
                subject,
                predicate,
                object,
                graph,
            }),
        })
    }

    pub fn subject(&self) -> &Term {
        &self.data.subject
    }

    pub fn predicate(&self) -> &Term {
        &self.data.predicate
    }

    pub fn object(&self) -> &Term {
        &self.data.object
    }

    pub fn graph(&self) -> &Term {
        &self.data.graph
    }

    pub fn term(&self, position: Position) -> &Term {
        match position {
            Position::Subject => self.subject(),
            Position::Predicate => self.predicate(),
            Position::Object => self.object(),
            Position::Graph => self.graph(),
        }
    }

    /// True if any position, nested quads included, holds a variable.
    pub fn is_pattern(&self) -> bool {
        Position::ALL
            .into_iter()
            .any(|position| self.term(position).has_variable())
    }

    pub fn to_canonical_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.subject(),
            self.predicate(),
            self.object(),
            self.graph()
        )
    }
}

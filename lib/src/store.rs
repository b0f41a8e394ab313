//! The indexed in-memory quad store.
//!
//! Every stored quad is reachable through five indices: one per position and
//! one keyed by the whole quad. All five live in a single map whose keys are
//! tagged by index, guarded by one reader-writer lock together with the size
//! counter, so an `add` or `remove` is visible either completely or not at all.
//!
//! Matching never holds the lock while handing quads to a consumer: the
//! candidate bucket is copied under a read guard and a producer thread filters
//! and sends from the copy. A consumer can therefore mutate the store while it
//! drains a match (see [`Store::remove_matches`]); changes made after the copy
//! was taken are not reflected in the quads still to come.

use crate::config::StoreConfig;
use crate::errors::ImportError;
use crate::quad::{Position, Quad};
use crate::stream::{Capacity, QuadStream};
use crate::term::Term;
use log::{debug, trace};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Key of one bucket. The position variants are the single-field indices, the
/// `Quad` variant is the full-key index and always holds exactly one quad.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IndexKey {
    Subject(Term),
    Predicate(Term),
    Object(Term),
    Graph(Term),
    Quad(Quad),
}

impl IndexKey {
    fn position(position: Position, term: Term) -> Self {
        match position {
            Position::Subject => IndexKey::Subject(term),
            Position::Predicate => IndexKey::Predicate(term),
            Position::Object => IndexKey::Object(term),
            Position::Graph => IndexKey::Graph(term),
        }
    }

    fn positions_of(quad: &Quad) -> [IndexKey; 4] {
        Position::ALL.map(|position| IndexKey::position(position, quad.term(position).clone()))
    }
}

/// A match pattern with variables already folded into wildcards.
type Pattern = [Option<Term>; 4];

fn bound(term: Option<&Term>) -> Option<Term> {
    term.filter(|t| !t.is_variable()).cloned()
}

fn matches(quad: &Quad, pattern: &Pattern) -> bool {
    Position::ALL
        .into_iter()
        .zip(pattern)
        .all(|(position, term)| term.as_ref().map_or(true, |t| quad.term(position) == t))
}

#[derive(Debug, Default)]
struct Indexes {
    buckets: HashMap<IndexKey, Vec<Quad>>,
    size: usize,
}

impl Indexes {
    fn contains(&self, quad: &Quad) -> bool {
        self.buckets.contains_key(&IndexKey::Quad(quad.clone()))
    }

    fn insert(&mut self, quad: &Quad) -> bool {
        if self.contains(quad) {
            return false;
        }
        for key in IndexKey::positions_of(quad) {
            self.buckets.entry(key).or_default().push(quad.clone());
        }
        self.buckets
            .insert(IndexKey::Quad(quad.clone()), vec![quad.clone()]);
        self.size += 1;
        true
    }

    fn remove(&mut self, quad: &Quad) -> bool {
        if self.buckets.remove(&IndexKey::Quad(quad.clone())).is_none() {
            return false;
        }
        for key in IndexKey::positions_of(quad) {
            let now_empty = match self.buckets.get_mut(&key) {
                Some(bucket) => {
                    if let Some(i) = bucket.iter().position(|q| q == quad) {
                        bucket.remove(i);
                    }
                    bucket.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.buckets.remove(&key);
            }
        }
        self.size -= 1;
        true
    }

    fn all_quads(&self) -> Vec<Quad> {
        self.buckets
            .keys()
            .filter_map(|key| match key {
                IndexKey::Quad(quad) => Some(quad.clone()),
                _ => None,
            })
            .collect()
    }

    /// Picks the bound position with the smallest bucket; on a tie the earlier
    /// position in subject, predicate, object, graph order wins. Returns `None`
    /// when some bound position has no bucket, i.e. nothing can match.
    fn driving_index(&self, pattern: &Pattern) -> Option<(Position, &Vec<Quad>)> {
        let mut best: Option<(Position, &Vec<Quad>)> = None;
        for (position, term) in Position::ALL.into_iter().zip(pattern) {
            let Some(term) = term else { continue };
            let bucket = self
                .buckets
                .get(&IndexKey::position(position, term.clone()))?;
            if best.map_or(true, |(_, current)| bucket.len() < current.len()) {
                best = Some((position, bucket));
            }
        }
        best
    }
}

/// A shared, thread-safe quad store. Cloning a `Store` gives another handle to
/// the same quads.
#[derive(Debug, Clone)]
pub struct Store {
    indexes: Arc<RwLock<Indexes>>,
    config: StoreConfig,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            indexes: Arc::new(RwLock::new(Indexes::default())),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // Indexes are only mutated through `Indexes::insert`/`remove`, which cannot
    // panic halfway, so a poisoned lock still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Indexes> {
        self.indexes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Indexes> {
        self.indexes.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of quads in the store.
    pub fn size(&self) -> usize {
        self.read().size
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Adds `quad` unless an equal quad is already stored. Returns true iff the
    /// store changed. Patterns are never stored.
    pub fn add(&self, quad: &Quad) -> bool {
        if quad.is_pattern() {
            trace!("Not adding pattern {}", quad);
            return false;
        }
        self.write().insert(quad)
    }

    /// Builds a quad from loose terms and adds it. Returns false when a required
    /// term is missing, any term is a variable, or the terms do not form a
    /// valid quad. A missing graph means the default graph.
    pub fn add_terms(
        &self,
        subject: Option<Term>,
        predicate: Option<Term>,
        object: Option<Term>,
        graph: Option<Term>,
    ) -> bool {
        let (Some(subject), Some(predicate), Some(object)) = (subject, predicate, object) else {
            return false;
        };
        if [Some(&subject), Some(&predicate), Some(&object), graph.as_ref()]
            .into_iter()
            .flatten()
            .any(Term::is_variable)
        {
            return false;
        }
        match Quad::new(subject, predicate, object, graph) {
            Ok(quad) => self.add(&quad),
            Err(e) => {
                trace!("Not adding quad: {}", e);
                false
            }
        }
    }

    pub fn has(&self, quad: &Quad) -> bool {
        self.read().contains(quad)
    }

    /// Removes `quad` from every index. Returns false if it was not stored.
    pub fn remove(&self, quad: &Quad) -> bool {
        self.write().remove(quad)
    }

    /// Streams every stored quad that agrees with the bound positions. A
    /// missing term or a variable matches anything.
    ///
    /// ```
    /// use quadstore::{NamedNode, Quad, Store, Term};
    ///
    /// let store = Store::new();
    /// let s = Term::from(NamedNode::new("http://example.com/s"));
    /// let p = Term::from(NamedNode::new("http://example.com/p"));
    /// let o = Term::from(NamedNode::new("http://example.com/o"));
    /// store.add(&Quad::new(s.clone(), p, o, None).unwrap());
    /// assert_eq!(store.match_quads(Some(&s), None, None, None).count(), 1);
    /// ```
    pub fn match_quads(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
        graph: Option<&Term>,
    ) -> QuadStream {
        let pattern: Pattern = [bound(subject), bound(predicate), bound(object), bound(graph)];
        let capacity = self.config.match_capacity;

        if pattern.iter().all(Option::is_none) {
            let candidates = self.read().all_quads();
            debug!("Matching all {} quads", candidates.len());
            return stream_candidates(capacity, candidates, pattern);
        }

        if let [Some(s), Some(p), Some(o), Some(g)] = &pattern {
            return match Quad::new(s.clone(), p.clone(), o.clone(), Some(g.clone())) {
                Ok(quad) if self.has(&quad) => QuadStream::from_array([quad]),
                _ => QuadStream::empty(),
            };
        }

        let candidates = {
            let indexes = self.read();
            match indexes.driving_index(&pattern) {
                Some((position, bucket)) => {
                    debug!(
                        "Matching by {} index, {} candidates",
                        position,
                        bucket.len()
                    );
                    bucket.clone()
                }
                None => {
                    debug!("Pattern has an unknown term, nothing to match");
                    return QuadStream::empty();
                }
            }
        };
        stream_candidates(capacity, candidates, pattern)
    }

    /// Removes every quad matching the pattern and returns how many were removed.
    pub fn remove_matches(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
        graph: Option<&Term>,
    ) -> usize {
        self.remove_stream(self.match_quads(subject, predicate, object, graph))
    }

    /// Removes every quad yielded by `stream`. Quads that are not stored are
    /// ignored.
    pub fn remove_stream(&self, stream: QuadStream) -> usize {
        stream.filter(|quad| self.remove(quad)).count()
    }

    /// Removes all quads of one graph.
    pub fn delete_graph(&self, graph: &Term) -> usize {
        self.remove_matches(None, None, None, Some(graph))
    }

    /// Adds every quad from `stream`, skipping holes and patterns. Returns the
    /// number of quads that were not already stored.
    pub fn import(&self, mut stream: QuadStream) -> usize {
        let mut added = 0;
        let mut skipped = 0;
        while let Some(element) = stream.next_element() {
            match element {
                Some(quad) if self.add(&quad) => added += 1,
                Some(_) => {}
                None => {
                    trace!("Skipping missing stream element");
                    skipped += 1;
                }
            }
        }
        debug!("Imported {} new quads, skipped {} missing", added, skipped);
        added
    }

    /// Like [`Store::import`], but stops at the first hole or pattern. Quads
    /// added before the failure stay in the store.
    pub fn try_import(&self, mut stream: QuadStream) -> Result<usize, ImportError> {
        let mut added = 0;
        let mut index = 0;
        while let Some(element) = stream.next_element() {
            let quad = element.ok_or(ImportError::MissingElement { index })?;
            if quad.is_pattern() {
                return Err(ImportError::Rejected { index, quad });
            }
            if self.add(&quad) {
                added += 1;
            }
            index += 1;
        }
        debug!("Imported {} new quads", added);
        Ok(added)
    }

    /// Calls `callback` once per stored quad. The callback may modify the
    /// store; quads removed before they are reached are not visited.
    pub fn for_each<F>(&self, mut callback: F)
    where
        F: FnMut(&Quad),
    {
        for quad in self.quads() {
            if self.has(&quad) {
                callback(&quad);
            }
        }
    }

    /// A snapshot of every stored quad, in no particular order.
    pub fn quads(&self) -> Vec<Quad> {
        self.read().all_quads()
    }
}

fn stream_candidates(capacity: Capacity, candidates: Vec<Quad>, pattern: Pattern) -> QuadStream {
    QuadStream::spawn(capacity, move |sender| {
        for quad in candidates {
            if matches(&quad, &pattern) && sender.send(quad).is_err() {
                trace!("Match stream cancelled");
                return;
            }
        }
    })
}

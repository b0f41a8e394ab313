//! An in-memory RDF quad store with indexed pattern matching and streaming
//! bulk transfer.
//!
//! Quads are built from [`Term`]s, validated on construction and kept in a
//! [`Store`] that indexes them by subject, predicate, object, graph and by the
//! whole quad. Matching a pattern returns a [`QuadStream`] that is filled by a
//! producer thread, so results can be consumed while they are produced and the
//! store stays usable (even mutable) in the meantime.
//!
//! ```
//! use quadstore::{Literal, NamedNode, Quad, QuadStream, Term};
//!
//! let alice = Term::from(NamedNode::new("http://example.com/alice"));
//! let name = Term::from(NamedNode::new("http://xmlns.com/foaf/0.1/name"));
//! let quad = Quad::new(alice.clone(), name, Literal::new_string("Alice", None), None).unwrap();
//!
//! let store = QuadStream::from_array([quad.clone(), quad]).to_store();
//! assert_eq!(store.size(), 1);
//! assert_eq!(store.match_quads(Some(&alice), None, None, None).to_array().len(), 1);
//! ```

extern crate derive_builder;

pub mod config;
pub mod consts;
pub mod errors;
pub mod factory;
#[cfg(feature = "oxigraph")]
pub mod io;
pub mod quad;
pub mod store;
pub mod stream;
pub mod term;

pub use config::{StoreConfig, StoreConfigBuilder};
pub use errors::{ImportError, StreamClosed, TermError};
pub use factory::DataFactory;
pub use quad::{Position, Quad, QuadError};
pub use store::Store;
pub use stream::{channel, Capacity, QuadStream, StreamSender};
pub use term::{BlankNode, Literal, NamedNode, Term, TermKind, Variable, DEFAULT_GRAPH_VALUE};

/// Lets `QUADSTORE_LOG` take precedence over `RUST_LOG`. Call before
/// initializing a logger.
pub fn init_logging() {
    if let Ok(log_level) = std::env::var("QUADSTORE_LOG") {
        std::env::set_var("RUST_LOG", log_level);
    }
}

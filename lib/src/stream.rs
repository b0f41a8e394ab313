//! Single-producer, single-consumer quad streams.
//!
//! A stream is a channel with a [`StreamSender`] on one end and a
//! [`QuadStream`] on the other. The producer usually runs on its own thread;
//! with a bounded capacity it is throttled to the speed of the consumer. The
//! stream ends when the sender is closed or dropped, which is distinct from
//! "nothing received yet": receiving blocks until either a quad or the end
//! arrives.
//!
//! Elements travel as `Option<Quad>` so a producer can forward a missing
//! element (a hole), for example a parsed statement that did not form a valid
//! quad. Iterating a [`QuadStream`] skips holes; strict consumers such as
//! [`Store::try_import`](crate::store::Store::try_import) can see them.
//!
//! Consuming a stream takes it by value and closing a sender consumes the
//! sender, so a stream cannot be drained twice or written to after close.
//! Dropping a [`QuadStream`] cancels it: the producer's next send fails with
//! [`StreamClosed`] and the producer is expected to stop.

use crate::config::StoreConfig;
use crate::errors::StreamClosed;
use crate::quad::Quad;
use crate::store::Store;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::thread::{self, JoinHandle};

/// Buffering between the producer and the consumer of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capacity {
    Unbounded,
    /// At most this many quads in flight; `Bounded(0)` hands every quad over
    /// directly.
    Bounded(usize),
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Unbounded => write!(f, "unbounded"),
            Capacity::Bounded(n) => write!(f, "{}", n),
        }
    }
}

type Element = Option<Quad>;

/// Creates a connected sender/stream pair.
///
/// ```
/// use quadstore::stream::{channel, Capacity};
/// use quadstore::{NamedNode, Quad};
///
/// let (sender, stream) = channel(Capacity::Bounded(0));
/// std::thread::spawn(move || {
///     let quad = Quad::new(NamedNode::new("s"), NamedNode::new("p"), NamedNode::new("o"), None).unwrap();
///     sender.send(quad).unwrap();
/// });
/// assert_eq!(stream.count(), 1);
/// ```
pub fn channel(capacity: Capacity) -> (StreamSender, QuadStream) {
    let (tx, rx) = match capacity {
        Capacity::Unbounded => unbounded(),
        Capacity::Bounded(n) => bounded(n),
    };
    (StreamSender { tx }, QuadStream { rx })
}

/// The producing end of a stream.
#[derive(Debug)]
pub struct StreamSender {
    tx: Sender<Element>,
}

impl StreamSender {
    /// Sends a quad, or a hole when given `None`. Blocks while a bounded buffer
    /// is full.
    pub fn send(&self, quad: impl Into<Option<Quad>>) -> Result<(), StreamClosed> {
        self.tx.send(quad.into()).map_err(|_| StreamClosed)
    }

    /// Ends the stream. Dropping the sender has the same effect.
    pub fn close(self) {}

    /// Forwards every element of `source`, holes included, and returns how many
    /// elements were forwarded.
    pub fn pipe(&self, mut source: QuadStream) -> Result<usize, StreamClosed> {
        let mut forwarded = 0;
        while let Some(element) = source.next_element() {
            self.tx.send(element).map_err(|_| StreamClosed)?;
            forwarded += 1;
        }
        Ok(forwarded)
    }

    /// Forwards `source` on a background thread, then closes this stream.
    pub fn import(self, source: QuadStream) -> JoinHandle<()> {
        thread::spawn(move || {
            if self.pipe(source).is_err() {
                trace!("stream import stopped: consumer has gone away");
            }
        })
    }
}

/// The consuming end of a stream. Iterating it yields quads in the order they
/// were sent.
#[derive(Debug)]
pub struct QuadStream {
    rx: Receiver<Element>,
}

impl QuadStream {
    /// A stream that is already closed.
    pub fn empty() -> Self {
        let (_, stream) = channel(Capacity::Bounded(0));
        stream
    }

    /// A stream over an existing collection. Accepts quads or `Option<Quad>`s,
    /// where `None` is forwarded as a hole.
    pub fn from_array<I, T>(quads: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<Quad>>,
    {
        let (tx, rx) = unbounded();
        for quad in quads {
            // rx is alive for the whole loop, so the send cannot fail
            let _ = tx.send(quad.into());
        }
        Self { rx }
    }

    /// Runs `producer` on a new thread and returns the stream it writes to.
    pub fn spawn<F>(capacity: Capacity, producer: F) -> Self
    where
        F: FnOnce(StreamSender) + Send + 'static,
    {
        let (sender, stream) = channel(capacity);
        thread::spawn(move || producer(sender));
        stream
    }

    /// Receives the next element, hole or quad. `None` means the stream ended.
    pub fn next_element(&mut self) -> Option<Option<Quad>> {
        self.rx.recv().ok()
    }

    pub fn to_array(self) -> Vec<Quad> {
        self.collect()
    }

    pub fn to_store(self) -> Store {
        self.to_store_with_config(StoreConfig::default())
    }

    pub fn to_store_with_config(self, config: StoreConfig) -> Store {
        let store = Store::with_config(config);
        store.import(self);
        store
    }

    /// Yields everything in `self`, then everything in `next`. Holes are kept.
    pub fn concat(self, next: QuadStream) -> QuadStream {
        QuadStream::spawn(Capacity::Bounded(0), move |sender| {
            if sender.pipe(self).and_then(|_| sender.pipe(next)).is_err() {
                trace!("stream concatenation stopped: consumer has gone away");
            }
        })
    }

    /// Abandons the stream. The producer sees [`StreamClosed`] on its next send.
    pub fn cancel(self) {}
}

impl Iterator for QuadStream {
    type Item = Quad;

    fn next(&mut self) -> Option<Quad> {
        loop {
            match self.rx.recv() {
                Ok(Some(quad)) => return Some(quad),
                Ok(None) => continue,
                Err(_) => return None,
            }
        }
    }
}

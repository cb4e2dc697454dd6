//! Ordered byte-key/byte-value store with optimistic MVCC transactions.
//!
//! Keys and values are [`Bytes`](bytes::Bytes). Readers see a consistent
//! snapshot; writers buffer locally and validate their write set at commit,
//! so the first committer wins and the loser gets [`KvError::Conflict`].

pub mod error;
pub mod store;
pub mod txn;

pub use error::{KvError, Result};
pub use store::{Snapshot, Store};
pub use txn::Transaction;

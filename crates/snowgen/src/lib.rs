//! Coordination-free 64-bit Snowflake ID generation.
//!
//! Every [`SnowflakeWorker`] is bound to a worker ID assigned out-of-band and
//! combines the current time, that ID and a per-millisecond sequence into a
//! [`SnowflakeId`]:
//!
//! ```text
//!  Bit Index:  63           63 62            22 21            12 11             0
//!              +--------------+----------------+----------------+---------------+
//!  Field:      | reserved (1) | timestamp (41) | worker ID (10) | sequence (12) |
//!              +--------------+----------------+----------------+---------------+
//! ```
//!
//! # Example
//!
//! ```
//! use snowgen::{SnowflakeWorker, MAX_WORKER_ID};
//!
//! let worker = SnowflakeWorker::new(7).unwrap();
//! let a = worker.next_id().unwrap();
//! let b = worker.next_id().unwrap();
//!
//! assert!(a < b);
//! assert_eq!(a.worker_id(), 7);
//! assert!(SnowflakeWorker::new(MAX_WORKER_ID as i64 + 1).is_err());
//! ```
//!
//! # Features
//!
//! - `parking-lot`: guard worker state with `parking_lot::Mutex` (no lock
//!   poisoning).
//! - `cache-padded`: pad the worker state to a cache line.
//! - `tracing`: emit `tracing` events on the hot path, sequence exhaustion and
//!   clock regression.
//! - `serde`: serialize [`SnowflakeId`] as its raw integer.
//! - `random-baseline`: enables [`SequenceStart::Random`].
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod generator;
mod id;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;

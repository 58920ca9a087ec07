//! # tutorgraph
//!
//! Social-graph tutor discovery for a tutoring marketplace: a friendship
//! network among students, the friend-request workflow that changes it, and a
//! bounded breadth-first search that recommends tutors of a subject reachable
//! through a student's friends.
//!
//! ## Architecture
//!
//! ```text
//! TutorNetwork (caller-facing operations)
//!     ↓                         ↓
//! FriendRequestProtocol    TutorDiscoveryEngine ← TeachingIndex, ProfileStore
//!     ↓                         ↓ (snapshot)
//! RelationshipStore (transactions, copy-on-write snapshots)
//!     ↓
//! Storage Backend (RocksDB, memory)
//! ```
//!
//! Student and tutor records live in an external profile store. The core only
//! consumes the [`ProfileStore`] and [`TeachingIndex`] traits;
//! [`InMemoryProfiles`] implements both.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashSet;
//! use std::sync::Arc;
//! use tutorgraph::{InMemoryProfiles, TaughtSubject, TutorNetwork};
//!
//! let profiles = Arc::new(InMemoryProfiles::new());
//! let zigmas = profiles.add_student("Zigmas", "Zigmaitis", None).unwrap();
//! let network = TutorNetwork::in_memory(profiles).unwrap();
//!
//! // No friends yet, so nobody to recommend
//! let tutors = network.find_tutors(zigmas, "Math", 5, &HashSet::new()).unwrap();
//! assert!(tutors.is_empty());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod discovery;
pub mod error;
pub mod network;
pub mod profile;
pub mod social;
pub mod storage;
pub mod types;

// Re-export main types
pub use config::DiscoveryConfig;
pub use discovery::{DiscoveryPath, TutorDiscoveryEngine, TutorMatch};
pub use error::{GraphError, Result};
pub use network::TutorNetwork;
pub use profile::{InMemoryProfiles, ProfileStore, TeachingIndex};
pub use social::{
    FriendRequestProtocol, PairState, RelationshipStore, RequestInsert, RequestOutcome,
    SocialGraph,
};
#[cfg(feature = "rocksdb-backend")]
pub use storage::RocksDBBackend;
pub use storage::{MemoryBackend, StorageBackend};
pub use types::{FriendRequest, Friendship, PathNode, StudentId, TaughtSubject, TutorId};

//! Persistent store for friendships and pending friend requests.

use super::graph::{Change, SocialGraph};
use crate::error::{GraphError, Result};
use crate::storage::{BatchOperation, StorageBackend};
use crate::types::{FriendRequest, Friendship, StudentId};
use log::{debug, info, trace, warn};
use std::collections::BTreeSet;
#[cfg(feature = "rocksdb-backend")]
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

const FRIENDSHIP_PREFIX: &str = "friendship:";
const REQUEST_PREFIX: &str = "request:";

/// Outcome of [`Transaction::add_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestInsert {
    /// A new pending request was recorded
    Inserted,
    /// The same request was already pending
    AlreadyPending,
    /// The opposite request was pending, so both were resolved into a friendship
    Reciprocated,
}

struct StoreState {
    storage: Box<dyn StorageBackend>,
    graph: Arc<SocialGraph>,
}

/// Friendship edges and directed friend requests between students.
///
/// Writes are serialized by a store-wide lock and go through
/// [`RelationshipStore::transaction`], which persists every change made by the
/// closure as one atomic batch. Readers take a [`snapshot`](Self::snapshot):
/// a copy-on-write `Arc` of the graph that later writes never touch.
///
/// The store keeps these invariants after every committed transaction:
/// - at most one friendship per unordered pair, visible from both ends
/// - at most one pending request per ordered pair
/// - no request between two students who are friends
/// - never two opposite requests between the same pair
pub struct RelationshipStore {
    state: RwLock<StoreState>,
}

impl RelationshipStore {
    /// Create a store over the given backend, loading any persisted relationships.
    ///
    /// Persisted data that breaks an invariant is reconciled on load: opposite
    /// requests become a friendship, and requests between friends are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Storage`] or [`GraphError::Serialization`] if the
    /// persisted state cannot be read.
    pub fn with_backend(backend: Box<dyn StorageBackend>) -> Result<Self> {
        let mut state = StoreState {
            storage: backend,
            graph: Arc::new(SocialGraph::default()),
        };
        load(&mut state)?;

        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Open a persistent store at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Storage`] if the database cannot be opened.
    #[cfg(feature = "rocksdb-backend")]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        use crate::storage::RocksDBBackend;
        info!("Opening relationship store at path: {:?}", path.as_ref());
        let backend = RocksDBBackend::open(path)?;
        Self::with_backend(Box::new(backend))
    }

    /// Create a volatile store. All relationships are lost when it is dropped.
    pub fn in_memory() -> Result<Self> {
        use crate::storage::MemoryBackend;
        Self::with_backend(Box::new(MemoryBackend::new()))
    }

    /// A consistent, immutable view of the current graph.
    pub fn snapshot(&self) -> Result<Arc<SocialGraph>> {
        let state = self
            .state
            .read()
            .map_err(|_| GraphError::poisoned("relationship store"))?;
        Ok(Arc::clone(&state.graph))
    }

    /// Run `f` as one atomic unit against the store.
    ///
    /// The closure sees its own writes. If it returns an error, or the batch
    /// cannot be persisted, every change it made is rolled back and the error
    /// is returned. No other writer runs while `f` executes.
    pub fn transaction<T>(&self, f: impl FnOnce(&mut Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut guard = self.write_state()?;
        let StoreState { storage, graph } = &mut *guard;
        let mut tx = Transaction {
            graph: Arc::make_mut(graph),
            changes: Vec::new(),
        };

        let outcome = f(&mut tx);
        let Transaction { graph, changes } = tx;

        let value = match outcome {
            Ok(value) => value,
            Err(e) => {
                rollback(graph, &changes);
                return Err(e);
            }
        };

        if changes.is_empty() {
            return Ok(value);
        }

        let operations = changes
            .iter()
            .map(|change| to_batch_operation(*change))
            .collect::<Result<Vec<_>>>();
        let written = operations.and_then(|ops| storage.write_batch(ops));
        if let Err(e) = written {
            rollback(graph, &changes);
            return Err(e);
        }

        trace!("Committed transaction with {} change(s)", changes.len());
        Ok(value)
    }

    /// Create the friendship `{a, b}`, dropping any request between them.
    ///
    /// Idempotent. Returns whether a new friendship was created.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidOperation`] if `a == b`.
    pub fn add_friendship(&self, a: StudentId, b: StudentId) -> Result<bool> {
        self.transaction(|tx| tx.add_friendship(a, b))
    }

    /// Remove the friendship `{a, b}`. A no-op if it does not exist.
    pub fn remove_friendship(&self, a: StudentId, b: StudentId) -> Result<bool> {
        self.transaction(|tx| tx.remove_friendship(a, b))
    }

    /// Whether `a` and `b` are friends.
    pub fn has_friendship(&self, a: StudentId, b: StudentId) -> Result<bool> {
        Ok(self.snapshot()?.has_friendship(a, b))
    }

    /// Current friends of `student`.
    pub fn neighbors(&self, student: StudentId) -> Result<BTreeSet<StudentId>> {
        Ok(self.snapshot()?.neighbors(student).clone())
    }

    /// Record a pending request from `sender` to `receiver`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidOperation`] if `sender == receiver` or the
    /// two students are already friends.
    pub fn add_request(&self, sender: StudentId, receiver: StudentId) -> Result<RequestInsert> {
        self.transaction(|tx| tx.add_request(sender, receiver))
    }

    /// Remove the request from `sender` to `receiver`. A no-op if absent.
    pub fn remove_request(&self, sender: StudentId, receiver: StudentId) -> Result<bool> {
        self.transaction(|tx| tx.remove_request(sender, receiver))
    }

    /// Whether a request from `sender` to `receiver` is pending.
    pub fn has_request(&self, sender: StudentId, receiver: StudentId) -> Result<bool> {
        Ok(self.snapshot()?.has_request(sender, receiver))
    }

    /// Senders of requests pending for `student`.
    pub fn pending_incoming(&self, student: StudentId) -> Result<BTreeSet<StudentId>> {
        Ok(self.snapshot()?.pending_incoming(student).clone())
    }

    /// Receivers of requests `student` has sent.
    pub fn pending_outgoing(&self, student: StudentId) -> Result<BTreeSet<StudentId>> {
        Ok(self.snapshot()?.pending_outgoing(student).clone())
    }

    /// Explicitly flush buffered writes to durable storage.
    pub fn flush(&self) -> Result<()> {
        debug!("Flushing relationship store");
        self.write_state()?.storage.flush()
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| GraphError::poisoned("relationship store"))
    }
}

/// Mutable access to the graph inside [`RelationshipStore::transaction`].
///
/// Every mutator keeps the store invariants, so any sequence of calls leaves
/// the graph valid.
pub struct Transaction<'a> {
    graph: &'a mut SocialGraph,
    changes: Vec<Change>,
}

impl Transaction<'_> {
    /// The graph as modified so far by this transaction.
    pub fn graph(&self) -> &SocialGraph {
        self.graph
    }

    /// See [`RelationshipStore::add_friendship`].
    pub fn add_friendship(&mut self, a: StudentId, b: StudentId) -> Result<bool> {
        let friendship = Friendship::new(a, b)?;
        let request = FriendRequest { sender: a, receiver: b };
        self.record(Change::RequestRemoved(request));
        self.record(Change::RequestRemoved(request.reversed()));
        let created = self.record(Change::FriendshipAdded(friendship));
        if created {
            debug!("Friendship created: {a} <-> {b}");
        }
        Ok(created)
    }

    /// See [`RelationshipStore::remove_friendship`].
    pub fn remove_friendship(&mut self, a: StudentId, b: StudentId) -> Result<bool> {
        let Ok(friendship) = Friendship::new(a, b) else {
            return Ok(false);
        };
        let removed = self.record(Change::FriendshipRemoved(friendship));
        if removed {
            debug!("Friendship removed: {a} <-> {b}");
        }
        Ok(removed)
    }

    /// See [`RelationshipStore::add_request`].
    pub fn add_request(&mut self, sender: StudentId, receiver: StudentId) -> Result<RequestInsert> {
        let request = FriendRequest::new(sender, receiver)?;
        if self.graph.has_friendship(sender, receiver) {
            return Err(GraphError::invalid_operation(format!(
                "{sender} and {receiver} are already friends"
            )));
        }
        if self.graph.has_request(sender, receiver) {
            return Ok(RequestInsert::AlreadyPending);
        }
        if self.graph.has_request(receiver, sender) {
            warn!("Reciprocal friend requests between {sender} and {receiver}; resolving into friendship");
            self.add_friendship(sender, receiver)?;
            return Ok(RequestInsert::Reciprocated);
        }
        self.record(Change::RequestAdded(request));
        debug!("Friend request recorded: {sender} -> {receiver}");
        Ok(RequestInsert::Inserted)
    }

    /// See [`RelationshipStore::remove_request`].
    pub fn remove_request(&mut self, sender: StudentId, receiver: StudentId) -> Result<bool> {
        let removed = self.record(Change::RequestRemoved(FriendRequest { sender, receiver }));
        if removed {
            debug!("Friend request removed: {sender} -> {receiver}");
        }
        Ok(removed)
    }

    fn record(&mut self, change: Change) -> bool {
        let applied = self.graph.apply(change);
        if applied {
            self.changes.push(change);
        }
        applied
    }
}

fn rollback(graph: &mut SocialGraph, changes: &[Change]) {
    for change in changes.iter().rev() {
        graph.apply(change.inverse());
    }
}

fn friendship_key(friendship: &Friendship) -> Vec<u8> {
    let (low, high) = friendship.endpoints();
    format!("{FRIENDSHIP_PREFIX}{low}:{high}").into_bytes()
}

fn request_key(request: &FriendRequest) -> Vec<u8> {
    format!("{REQUEST_PREFIX}{}:{}", request.sender, request.receiver).into_bytes()
}

fn to_batch_operation(change: Change) -> Result<BatchOperation> {
    let op = match change {
        Change::FriendshipAdded(f) => BatchOperation::Put {
            key: friendship_key(&f),
            value: serde_json::to_vec(&f)
                .map_err(|e| GraphError::serialization("Failed to serialize friendship", Some(e)))?,
        },
        Change::FriendshipRemoved(f) => BatchOperation::Delete {
            key: friendship_key(&f),
        },
        Change::RequestAdded(r) => BatchOperation::Put {
            key: request_key(&r),
            value: serde_json::to_vec(&r)
                .map_err(|e| GraphError::serialization("Failed to serialize friend request", Some(e)))?,
        },
        Change::RequestRemoved(r) => BatchOperation::Delete {
            key: request_key(&r),
        },
    };
    Ok(op)
}

/// Rebuild `state.graph` from storage, repairing invariant violations.
///
/// Self-friendships and requests that are self-addressed or between friends
/// are dropped. Opposite requests between the same pair are resolved into a
/// friendship. Repairs are written back as one batch.
fn load(state: &mut StoreState) -> Result<()> {
    let graph = Arc::make_mut(&mut state.graph);

    let mut repairs = Vec::new();
    for (key, value) in state.storage.scan_prefix(FRIENDSHIP_PREFIX.as_bytes())? {
        let stored: Friendship = serde_json::from_slice(&value)
            .map_err(|e| GraphError::serialization("Failed to deserialize friendship", Some(e)))?;
        let (a, b) = stored.endpoints();
        match Friendship::new(a, b) {
            Ok(friendship) => {
                graph.apply(Change::FriendshipAdded(friendship));
            }
            Err(_) => {
                warn!("Dropping stale self-friendship of {a}");
                repairs.push(BatchOperation::Delete { key });
            }
        }
    }

    for (key, value) in state.storage.scan_prefix(REQUEST_PREFIX.as_bytes())? {
        let request: FriendRequest = serde_json::from_slice(&value).map_err(|e| {
            GraphError::serialization("Failed to deserialize friend request", Some(e))
        })?;
        let FriendRequest { sender, receiver } = request;

        if sender == receiver || graph.has_friendship(sender, receiver) {
            warn!("Dropping stale friend request {sender} -> {receiver}");
            repairs.push(BatchOperation::Delete { key });
        } else if graph.has_request(receiver, sender) {
            warn!("Reciprocal friend requests between {sender} and {receiver}; resolving into friendship");
            let friendship = Friendship::new(sender, receiver)?;
            graph.apply(Change::RequestRemoved(request.reversed()));
            graph.apply(Change::FriendshipAdded(friendship));
            repairs.push(BatchOperation::Delete { key });
            repairs.push(to_batch_operation(Change::RequestRemoved(request.reversed()))?);
            repairs.push(to_batch_operation(Change::FriendshipAdded(friendship))?);
        } else {
            graph.apply(Change::RequestAdded(request));
        }
    }

    if !repairs.is_empty() {
        state.storage.write_batch(repairs)?;
    }

    info!(
        "Loaded {} friendship(s) and {} pending request(s)",
        graph.friendship_count(),
        graph.request_count()
    );
    Ok(())
}

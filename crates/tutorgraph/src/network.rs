//! Caller-facing entry point combining the request protocol and discovery.

use crate::config::DiscoveryConfig;
use crate::discovery::{TutorDiscoveryEngine, TutorMatch};
use crate::error::Result;
use crate::profile::{ProfileStore, TeachingIndex};
use crate::social::{FriendRequestProtocol, RelationshipStore, RequestOutcome};
use crate::types::{StudentId, TutorId};
use std::collections::HashSet;
use std::sync::Arc;

/// The operations exposed to request handlers.
///
/// `TutorNetwork` is `Send + Sync`; share one instance behind an `Arc` across
/// handlers.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use std::sync::Arc;
/// use tutorgraph::{InMemoryProfiles, RequestOutcome, TaughtSubject, TutorNetwork};
///
/// # fn example() -> tutorgraph::Result<()> {
/// let profiles = Arc::new(InMemoryProfiles::new());
/// let zigmas = profiles.add_student("Zigmas", "Zigmaitis", None)?;
/// let petras = profiles.add_student("Petras", "Petraitis", None)?;
/// let ona = profiles.add_tutor("Ona", "Onaite", vec![TaughtSubject::new("Math", 12)])?;
/// profiles.assign(petras, ona, "Math")?;
///
/// let network = TutorNetwork::in_memory(profiles)?;
/// assert_eq!(network.send_friend_request(zigmas, petras)?, RequestOutcome::RequestSent);
/// network.accept_friend_request(zigmas, petras)?;
///
/// let tutors = network.find_tutors(zigmas, "Math", 2, &HashSet::new())?;
/// assert_eq!(tutors[0].tutor_id, ona);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct TutorNetwork {
    store: Arc<RelationshipStore>,
    requests: FriendRequestProtocol,
    discovery: TutorDiscoveryEngine,
}

impl TutorNetwork {
    /// Wire the network over injected stores.
    pub fn new(
        store: Arc<RelationshipStore>,
        profiles: Arc<dyn ProfileStore>,
        teaching: Arc<dyn TeachingIndex>,
        config: DiscoveryConfig,
    ) -> Self {
        let requests = FriendRequestProtocol::new(Arc::clone(&store), Arc::clone(&profiles));
        let discovery = TutorDiscoveryEngine::new(Arc::clone(&store), profiles, teaching, config);
        Self {
            store,
            requests,
            discovery,
        }
    }

    /// A network over a volatile relationship store and one directory that
    /// serves as both profile store and teaching index.
    pub fn in_memory<P>(directory: Arc<P>) -> Result<Self>
    where
        P: ProfileStore + TeachingIndex + 'static,
    {
        let store = Arc::new(RelationshipStore::in_memory()?);
        Ok(Self::new(
            store,
            directory.clone(),
            directory,
            DiscoveryConfig::default(),
        ))
    }

    /// The underlying relationship store.
    pub fn store(&self) -> &Arc<RelationshipStore> {
        &self.store
    }

    /// The discovery engine, for deadline-bound searches and path rendering.
    pub fn discovery(&self) -> &TutorDiscoveryEngine {
        &self.discovery
    }

    /// See [`FriendRequestProtocol::send_request`].
    pub fn send_friend_request(&self, from: StudentId, to: StudentId) -> Result<RequestOutcome> {
        self.requests.send_request(from, to)
    }

    /// See [`FriendRequestProtocol::accept_request`].
    pub fn accept_friend_request(&self, sender: StudentId, receiver: StudentId) -> Result<()> {
        self.requests.accept_request(sender, receiver)
    }

    /// See [`FriendRequestProtocol::decline_request`].
    pub fn decline_friend_request(&self, sender: StudentId, receiver: StudentId) -> Result<()> {
        self.requests.decline_request(sender, receiver)
    }

    /// See [`FriendRequestProtocol::cancel_request`].
    pub fn cancel_friend_request(&self, sender: StudentId, receiver: StudentId) -> Result<()> {
        self.requests.cancel_request(sender, receiver)
    }

    /// See [`FriendRequestProtocol::remove_friend`].
    pub fn remove_friend(&self, a: StudentId, b: StudentId) -> Result<()> {
        self.requests.remove_friend(a, b)
    }

    /// See [`FriendRequestProtocol::list_friends`].
    pub fn list_friends(&self, student: StudentId) -> Result<Vec<StudentId>> {
        self.requests.list_friends(student)
    }

    /// See [`FriendRequestProtocol::list_pending_incoming`].
    pub fn list_pending_incoming(&self, student: StudentId) -> Result<Vec<StudentId>> {
        self.requests.list_pending_incoming(student)
    }

    /// See [`FriendRequestProtocol::list_pending_outgoing`].
    pub fn list_pending_outgoing(&self, student: StudentId) -> Result<Vec<StudentId>> {
        self.requests.list_pending_outgoing(student)
    }

    /// See [`TutorDiscoveryEngine::find_tutors`].
    pub fn find_tutors(
        &self,
        student: StudentId,
        subject: &str,
        max_hops: usize,
        exclude: &HashSet<TutorId>,
    ) -> Result<Vec<TutorMatch>> {
        self.discovery.find_tutors(student, subject, max_hops, exclude)
    }
}

//! Friend-request workflow on top of the [`RelationshipStore`].

use super::graph::SocialGraph;
use super::store::RelationshipStore;
use crate::error::{GraphError, Result};
use crate::profile::ProfileStore;
use crate::types::StudentId;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Relationship state of an ordered pair `(a, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairState {
    /// No friendship and no pending request
    None,
    /// `a` has asked `b`
    ARequestedB,
    /// `b` has asked `a`
    BRequestedA,
    /// `a` and `b` are friends
    Friends,
}

impl PairState {
    /// Read the state of `(a, b)` from a graph.
    pub fn of(graph: &SocialGraph, a: StudentId, b: StudentId) -> Self {
        if graph.has_friendship(a, b) {
            PairState::Friends
        } else if graph.has_request(a, b) {
            PairState::ARequestedB
        } else if graph.has_request(b, a) {
            PairState::BRequestedA
        } else {
            PairState::None
        }
    }
}

/// Successful outcome of [`FriendRequestProtocol::send_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestOutcome {
    /// The students were already friends; nothing changed
    AlreadyFriends,
    /// The same request was already pending; nothing changed
    RequestAlreadySent,
    /// The receiver had already asked the sender, so they are now friends
    AutoAccepted,
    /// A new request is pending
    RequestSent,
}

/// State machine governing friend requests.
///
/// Every read-decide-write step runs inside a single store transaction, so
/// concurrent calls on the same pair cannot interleave.
pub struct FriendRequestProtocol {
    store: Arc<RelationshipStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl FriendRequestProtocol {
    /// Build the protocol over a relationship store and a profile store.
    pub fn new(store: Arc<RelationshipStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { store, profiles }
    }

    /// Ask `to` to become friends with `from`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::SelfRequest`] if `from == to`
    /// - [`GraphError::StudentNotFound`] if either student is unknown
    pub fn send_request(&self, from: StudentId, to: StudentId) -> Result<RequestOutcome> {
        if from == to {
            return Err(GraphError::SelfRequest {
                student_id: from.to_string(),
            });
        }
        self.require_student(from)?;
        self.require_student(to)?;

        let outcome = self.store.transaction(|tx| {
            let outcome = match PairState::of(tx.graph(), from, to) {
                PairState::Friends => RequestOutcome::AlreadyFriends,
                PairState::ARequestedB => RequestOutcome::RequestAlreadySent,
                PairState::BRequestedA => {
                    tx.remove_request(to, from)?;
                    tx.add_friendship(from, to)?;
                    RequestOutcome::AutoAccepted
                }
                PairState::None => {
                    tx.add_request(from, to)?;
                    RequestOutcome::RequestSent
                }
            };
            Ok(outcome)
        })?;

        debug!("send_request {from} -> {to}: {outcome:?}");
        Ok(outcome)
    }

    /// `receiver` accepts the request `sender` sent, making them friends.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::RequestNotFound`] if no such request is pending.
    pub fn accept_request(&self, sender: StudentId, receiver: StudentId) -> Result<()> {
        self.store.transaction(|tx| {
            if !tx.remove_request(sender, receiver)? {
                return Err(request_not_found(sender, receiver));
            }
            tx.add_friendship(sender, receiver)?;
            Ok(())
        })?;
        debug!("Friend request accepted: {sender} -> {receiver}");
        Ok(())
    }

    /// `receiver` turns down the request `sender` sent.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::RequestNotFound`] if no such request is pending.
    pub fn decline_request(&self, sender: StudentId, receiver: StudentId) -> Result<()> {
        self.delete_request(sender, receiver)?;
        debug!("Friend request declined by receiver: {sender} -> {receiver}");
        Ok(())
    }

    /// `sender` withdraws a request they sent.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::RequestNotFound`] if no such request is pending.
    pub fn cancel_request(&self, sender: StudentId, receiver: StudentId) -> Result<()> {
        self.delete_request(sender, receiver)?;
        debug!("Friend request cancelled by sender: {sender} -> {receiver}");
        Ok(())
    }

    /// End the friendship between `a` and `b`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::FriendshipNotFound`] if they are not friends.
    pub fn remove_friend(&self, a: StudentId, b: StudentId) -> Result<()> {
        self.store.transaction(|tx| {
            if tx.remove_friendship(a, b)? {
                Ok(())
            } else {
                Err(GraphError::FriendshipNotFound {
                    a: a.to_string(),
                    b: b.to_string(),
                })
            }
        })
    }

    /// Friends of `student`, in ascending identifier order.
    pub fn list_friends(&self, student: StudentId) -> Result<Vec<StudentId>> {
        self.require_student(student)?;
        Ok(self.store.snapshot()?.neighbors(student).iter().copied().collect())
    }

    /// Students waiting for `student` to answer their request.
    pub fn list_pending_incoming(&self, student: StudentId) -> Result<Vec<StudentId>> {
        self.require_student(student)?;
        Ok(self
            .store
            .snapshot()?
            .pending_incoming(student)
            .iter()
            .copied()
            .collect())
    }

    /// Students `student` has asked and who have not answered yet.
    pub fn list_pending_outgoing(&self, student: StudentId) -> Result<Vec<StudentId>> {
        self.require_student(student)?;
        Ok(self
            .store
            .snapshot()?
            .pending_outgoing(student)
            .iter()
            .copied()
            .collect())
    }

    fn delete_request(&self, sender: StudentId, receiver: StudentId) -> Result<()> {
        self.store.transaction(|tx| {
            if tx.remove_request(sender, receiver)? {
                Ok(())
            } else {
                Err(request_not_found(sender, receiver))
            }
        })
    }

    fn require_student(&self, id: StudentId) -> Result<()> {
        if self.profiles.student_exists(id)? {
            Ok(())
        } else {
            Err(GraphError::StudentNotFound {
                student_id: id.to_string(),
            })
        }
    }
}

fn request_not_found(sender: StudentId, receiver: StudentId) -> GraphError {
    GraphError::RequestNotFound {
        sender: sender.to_string(),
        receiver: receiver.to_string(),
    }
}

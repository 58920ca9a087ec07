//! Immutable view of the friendship network and its pending requests.

use crate::types::{FriendRequest, Friendship, StudentId};
use std::collections::{BTreeSet, HashMap};

/// Adjacency indexes for friendships and pending requests.
///
/// A `SocialGraph` is what readers get from
/// [`RelationshipStore::snapshot`](super::RelationshipStore::snapshot): it never
/// changes after it is handed out, so a traversal sees one consistent graph.
/// Neighbor sets are ordered, which makes traversal order deterministic.
#[derive(Debug, Clone, Default)]
pub struct SocialGraph {
    friends: HashMap<StudentId, BTreeSet<StudentId>>,
    outgoing: HashMap<StudentId, BTreeSet<StudentId>>,
    incoming: HashMap<StudentId, BTreeSet<StudentId>>,
    friendship_count: usize,
    request_count: usize,
}

/// A primitive edit to the graph, recorded so it can be persisted or undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Change {
    FriendshipAdded(Friendship),
    FriendshipRemoved(Friendship),
    RequestAdded(FriendRequest),
    RequestRemoved(FriendRequest),
}

impl Change {
    pub(crate) fn inverse(self) -> Self {
        match self {
            Change::FriendshipAdded(f) => Change::FriendshipRemoved(f),
            Change::FriendshipRemoved(f) => Change::FriendshipAdded(f),
            Change::RequestAdded(r) => Change::RequestRemoved(r),
            Change::RequestRemoved(r) => Change::RequestAdded(r),
        }
    }
}

static EMPTY: BTreeSet<StudentId> = BTreeSet::new();

impl SocialGraph {
    /// Whether `a` and `b` are friends. Symmetric.
    pub fn has_friendship(&self, a: StudentId, b: StudentId) -> bool {
        self.friends.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// Whether a request from `sender` to `receiver` is pending.
    pub fn has_request(&self, sender: StudentId, receiver: StudentId) -> bool {
        self.outgoing
            .get(&sender)
            .is_some_and(|set| set.contains(&receiver))
    }

    /// Current friends of `student`, in ascending identifier order.
    pub fn neighbors(&self, student: StudentId) -> &BTreeSet<StudentId> {
        self.friends.get(&student).unwrap_or(&EMPTY)
    }

    /// Students who have a pending request addressed to `student`.
    pub fn pending_incoming(&self, student: StudentId) -> &BTreeSet<StudentId> {
        self.incoming.get(&student).unwrap_or(&EMPTY)
    }

    /// Students to whom `student` has a pending request.
    pub fn pending_outgoing(&self, student: StudentId) -> &BTreeSet<StudentId> {
        self.outgoing.get(&student).unwrap_or(&EMPTY)
    }

    /// Number of friendships (each unordered pair counted once).
    pub fn friendship_count(&self) -> usize {
        self.friendship_count
    }

    /// Number of pending requests.
    pub fn request_count(&self) -> usize {
        self.request_count
    }

    /// Every friendship, each pair reported once.
    pub fn friendships(&self) -> impl Iterator<Item = Friendship> + '_ {
        self.friends.iter().flat_map(|(a, set)| {
            set.iter()
                .filter(move |b| a < *b)
                .filter_map(move |b| Friendship::new(*a, *b).ok())
        })
    }

    /// Every pending request.
    pub fn requests(&self) -> impl Iterator<Item = FriendRequest> + '_ {
        self.outgoing.iter().flat_map(|(sender, set)| {
            set.iter().map(move |receiver| FriendRequest {
                sender: *sender,
                receiver: *receiver,
            })
        })
    }

    /// Apply a primitive change. Returns `false` if it was already in effect.
    pub(crate) fn apply(&mut self, change: Change) -> bool {
        match change {
            Change::FriendshipAdded(f) => {
                let (a, b) = f.endpoints();
                let inserted = self.friends.entry(a).or_default().insert(b);
                self.friends.entry(b).or_default().insert(a);
                if inserted {
                    self.friendship_count += 1;
                }
                inserted
            }
            Change::FriendshipRemoved(f) => {
                let (a, b) = f.endpoints();
                let removed = remove_link(&mut self.friends, a, b);
                remove_link(&mut self.friends, b, a);
                if removed {
                    self.friendship_count -= 1;
                }
                removed
            }
            Change::RequestAdded(r) => {
                let inserted = self
                    .outgoing
                    .entry(r.sender)
                    .or_default()
                    .insert(r.receiver);
                self.incoming
                    .entry(r.receiver)
                    .or_default()
                    .insert(r.sender);
                if inserted {
                    self.request_count += 1;
                }
                inserted
            }
            Change::RequestRemoved(r) => {
                let removed = remove_link(&mut self.outgoing, r.sender, r.receiver);
                remove_link(&mut self.incoming, r.receiver, r.sender);
                if removed {
                    self.request_count -= 1;
                }
                removed
            }
        }
    }
}

fn remove_link(
    index: &mut HashMap<StudentId, BTreeSet<StudentId>>,
    from: StudentId,
    to: StudentId,
) -> bool {
    let Some(set) = index.get_mut(&from) else {
        return false;
    };
    let removed = set.remove(&to);
    if set.is_empty() {
        index.remove(&from);
    }
    removed
}

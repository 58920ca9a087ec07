//! Identifiers and relationship records shared by every component.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(Uuid);

/// Opaque identifier of a tutor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TutorId(Uuid);

macro_rules! uuid_id {
    ($ty:ident, $label:literal) => {
        impl $ty {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $ty {
            type Err = GraphError;

            fn from_str(s: &str) -> Result<Self> {
                Uuid::parse_str(s).map(Self).map_err(|e| {
                    GraphError::invalid_argument(format!(
                        "malformed {} identifier '{s}': {e}",
                        $label
                    ))
                })
            }
        }
    };
}

uuid_id!(StudentId, "student");
uuid_id!(TutorId, "tutor");

/// A node on a discovery path, or any identity known to the profile store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathNode {
    /// A student in the friendship network
    Student(StudentId),
    /// The terminal tutor
    Tutor(TutorId),
}

impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathNode::Student(id) => write!(f, "student:{id}"),
            PathNode::Tutor(id) => write!(f, "tutor:{id}"),
        }
    }
}

/// An undirected friendship, stored with its endpoints in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Friendship {
    low: StudentId,
    high: StudentId,
}

impl Friendship {
    /// Normalize the unordered pair `{a, b}`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidOperation`] if `a == b`.
    pub fn new(a: StudentId, b: StudentId) -> Result<Self> {
        if a == b {
            return Err(GraphError::invalid_operation(format!(
                "student {a} cannot be friends with themselves"
            )));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    /// Both endpoints, lower identifier first.
    pub fn endpoints(&self) -> (StudentId, StudentId) {
        (self.low, self.high)
    }

    /// The endpoint opposite `student`, if `student` is part of this friendship.
    pub fn other(&self, student: StudentId) -> Option<StudentId> {
        if student == self.low {
            Some(self.high)
        } else if student == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

/// A pending, directed friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FriendRequest {
    /// Student who asked
    pub sender: StudentId,
    /// Student who was asked
    pub receiver: StudentId,
}

impl FriendRequest {
    /// Create a request from `sender` to `receiver`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidOperation`] if both ends are the same student.
    pub fn new(sender: StudentId, receiver: StudentId) -> Result<Self> {
        if sender == receiver {
            return Err(GraphError::invalid_operation(format!(
                "student {sender} cannot request friendship with themselves"
            )));
        }
        Ok(Self { sender, receiver })
    }

    /// The same pair in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            sender: self.receiver,
            receiver: self.sender,
        }
    }
}

/// A subject a tutor teaches, up to a maximum class level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaughtSubject {
    /// Subject name, matched exactly
    pub subject: String,
    /// Highest class level the tutor accepts
    pub max_level: u8,
}

impl TaughtSubject {
    /// Create a taught-subject record.
    pub fn new(subject: impl Into<String>, max_level: u8) -> Self {
        Self {
            subject: subject.into(),
            max_level,
        }
    }
}

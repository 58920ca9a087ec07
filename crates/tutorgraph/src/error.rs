//! Error types for tutorgraph operations.
//!
//! All fallible operations return [`Result<T>`] with context-rich error messages.

use thiserror::Error;

/// Result type alias for tutorgraph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Error type for relationship, request-protocol and discovery operations.
///
/// Errors are reported synchronously and are never retried internally.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Storage backend error (RocksDB, lock poisoning, etc.)
    #[error("Storage error: {message}")]
    Storage {
        /// Detailed error message
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error details
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A student tried to befriend themselves
    #[error("Student {student_id} cannot send a friend request to themselves")]
    SelfRequest {
        /// The student on both ends of the request
        student_id: String,
    },

    /// Student not known to the profile store
    #[error("Student not found: {student_id}")]
    StudentNotFound {
        /// ID of the missing student
        student_id: String,
    },

    /// Tutor not known to the profile store
    #[error("Tutor not found: {tutor_id}")]
    TutorNotFound {
        /// ID of the missing tutor
        tutor_id: String,
    },

    /// School not registered in the profile directory
    #[error("School not found: {name}")]
    SchoolNotFound {
        /// Name of the missing school
        name: String,
    },

    /// No friendship between the two students
    #[error("Friendship not found between {a} and {b}")]
    FriendshipNotFound {
        /// One endpoint
        a: String,
        /// The other endpoint
        b: String,
    },

    /// No pending request in the given direction
    #[error("Friend request not found: {sender} -> {receiver}")]
    RequestNotFound {
        /// Student who would have sent the request
        sender: String,
        /// Student who would have received it
        receiver: String,
    },

    /// Caller supplied an out-of-range or malformed argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the bad argument
        message: String,
    },

    /// Store-level operation that would break a graph invariant
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Description of what went wrong
        message: String,
    },

    /// Discovery ran past its wall-clock budget
    #[error("Discovery deadline exceeded after {elapsed_ms} ms")]
    DeadlineExceeded {
        /// Time spent before the search was abandoned
        elapsed_ms: u128,
    },
}

impl GraphError {
    /// Create a storage error from a message and optional source.
    pub fn storage<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Create a serialization error from a message and optional source.
    pub fn serialization<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Serialization {
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an invalid-operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Error raised when a lock guarding shared state was poisoned by a panic.
    pub(crate) fn poisoned(what: &str) -> Self {
        Self::storage(format!("{what} lock poisoned"), None::<std::io::Error>)
    }

    /// Whether this error reports a missing student, tutor, friendship or request.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::StudentNotFound { .. }
                | Self::TutorNotFound { .. }
                | Self::SchoolNotFound { .. }
                | Self::FriendshipNotFound { .. }
                | Self::RequestNotFound { .. }
        )
    }
}

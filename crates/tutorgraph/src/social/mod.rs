//! The student friendship network.
//!
//! - [`RelationshipStore`]: friendships and pending requests, persisted and
//!   transactional
//! - [`SocialGraph`]: the immutable snapshot readers traverse
//! - [`FriendRequestProtocol`]: send/accept/decline/cancel workflow

mod graph;
mod requests;
mod store;

pub use graph::SocialGraph;
pub use requests::{FriendRequestProtocol, PairState, RequestOutcome};
pub use store::{RelationshipStore, RequestInsert, Transaction};

//! Tests for RelationshipStore: symmetry, idempotence and request bookkeeping.

use tutorgraph::{GraphError, RelationshipStore, RequestInsert, StudentId};

fn students<const N: usize>() -> [StudentId; N] {
    std::array::from_fn(|_| StudentId::new())
}

#[test]
fn test_friendship_is_symmetric() {
    let store = RelationshipStore::in_memory().unwrap();
    let [a, b] = students();

    store.add_friendship(a, b).unwrap();

    assert!(store.has_friendship(a, b).unwrap());
    assert!(store.has_friendship(b, a).unwrap());
    assert!(store.neighbors(a).unwrap().contains(&b));
    assert!(store.neighbors(b).unwrap().contains(&a));
}

#[test]
fn test_add_friendship_twice_leaves_one_edge() {
    let store = RelationshipStore::in_memory().unwrap();
    let [a, b] = students();

    assert!(store.add_friendship(a, b).unwrap());
    assert!(!store.add_friendship(b, a).unwrap());

    assert_eq!(store.snapshot().unwrap().friendship_count(), 1);
    assert_eq!(store.neighbors(a).unwrap().len(), 1);
}

#[test]
fn test_self_friendship_rejected() {
    let store = RelationshipStore::in_memory().unwrap();
    let [a] = students();

    let err = store.add_friendship(a, a).unwrap_err();
    assert!(matches!(err, GraphError::InvalidOperation { .. }));
    assert!(store.neighbors(a).unwrap().is_empty());
}

#[test]
fn test_remove_friendship_is_idempotent() {
    let store = RelationshipStore::in_memory().unwrap();
    let [a, b, c] = students();
    store.add_friendship(a, b).unwrap();
    store.add_friendship(a, c).unwrap();

    assert!(store.remove_friendship(b, a).unwrap());
    assert!(!store.remove_friendship(a, b).unwrap());

    assert!(!store.has_friendship(a, b).unwrap());
    assert!(store.has_friendship(a, c).unwrap());
    assert_eq!(store.snapshot().unwrap().friendship_count(), 1);
}

#[test]
fn test_remove_absent_friendship_is_noop() {
    let store = RelationshipStore::in_memory().unwrap();
    let [a, b] = students();
    assert!(!store.remove_friendship(a, b).unwrap());
    assert!(!store.remove_friendship(a, a).unwrap());
}

#[test]
fn test_pending_views() {
    let store = RelationshipStore::in_memory().unwrap();
    let [a, b, c] = students();

    store.add_request(a, b).unwrap();
    store.add_request(c, b).unwrap();

    assert!(store.has_request(a, b).unwrap());
    assert!(!store.has_request(b, a).unwrap());
    assert_eq!(store.pending_incoming(b).unwrap().len(), 2);
    assert!(store.pending_outgoing(a).unwrap().contains(&b));
    assert!(store.pending_outgoing(b).unwrap().is_empty());
}

#[test]
fn test_duplicate_request_is_reported() {
    let store = RelationshipStore::in_memory().unwrap();
    let [a, b] = students();

    assert_eq!(store.add_request(a, b).unwrap(), RequestInsert::Inserted);
    assert_eq!(store.add_request(a, b).unwrap(), RequestInsert::AlreadyPending);
    assert_eq!(store.snapshot().unwrap().request_count(), 1);
}

#[test]
fn test_request_between_friends_rejected() {
    let store = RelationshipStore::in_memory().unwrap();
    let [a, b] = students();
    store.add_friendship(a, b).unwrap();

    let err = store.add_request(a, b).unwrap_err();
    assert!(matches!(err, GraphError::InvalidOperation { .. }));
    assert!(!store.has_request(a, b).unwrap());
}

#[test]
fn test_friendship_clears_pending_requests() {
    let store = RelationshipStore::in_memory().unwrap();
    let [a, b] = students();
    store.add_request(a, b).unwrap();

    store.add_friendship(b, a).unwrap();

    assert!(store.has_friendship(a, b).unwrap());
    assert!(!store.has_request(a, b).unwrap());
    assert_eq!(store.snapshot().unwrap().request_count(), 0);
}

#[test]
fn test_remove_request_is_idempotent() {
    let store = RelationshipStore::in_memory().unwrap();
    let [a, b] = students();
    store.add_request(a, b).unwrap();

    assert!(store.remove_request(a, b).unwrap());
    assert!(!store.remove_request(a, b).unwrap());
    assert!(store.pending_incoming(b).unwrap().is_empty());
}

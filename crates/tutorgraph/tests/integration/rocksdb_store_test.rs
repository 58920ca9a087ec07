//! Relationship state survives closing and reopening a RocksDB store.

use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;
use tutorgraph::{
    DiscoveryConfig, InMemoryProfiles, RelationshipStore, StudentId, TaughtSubject, TutorNetwork,
};

#[test]
fn test_relationships_persist_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("social.graph");
    let [a, b, c] = [StudentId::new(), StudentId::new(), StudentId::new()];

    {
        let store = RelationshipStore::open(&path).unwrap();
        store.add_friendship(a, b).unwrap();
        store.add_request(c, a).unwrap();
        store.flush().unwrap();
    }

    let store = RelationshipStore::open(&path).unwrap();
    assert!(store.has_friendship(b, a).unwrap());
    assert!(store.has_request(c, a).unwrap());
    assert_eq!(store.snapshot().unwrap().friendship_count(), 1);
    assert_eq!(store.snapshot().unwrap().request_count(), 1);
}

#[test]
fn test_removals_persist() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("social.graph");
    let [a, b] = [StudentId::new(), StudentId::new()];

    {
        let store = RelationshipStore::open(&path).unwrap();
        store.add_friendship(a, b).unwrap();
        store.remove_friendship(a, b).unwrap();
        store.add_request(a, b).unwrap();
        store.remove_request(a, b).unwrap();
    }

    let store = RelationshipStore::open(&path).unwrap();
    assert!(!store.has_friendship(a, b).unwrap());
    assert!(!store.has_request(a, b).unwrap());
}

#[test]
fn test_discovery_over_reopened_store() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("social.graph");
    let profiles = Arc::new(InMemoryProfiles::new());
    let z = profiles.add_student("Zigmas", "Zigmaitis", None).unwrap();
    let p = profiles.add_student("Petras", "Petraitis", None).unwrap();
    let t = profiles
        .add_tutor("Ona", "Onaite", vec![TaughtSubject::new("Math", 12)])
        .unwrap();
    profiles.assign(p, t, "Math").unwrap();

    {
        let store = Arc::new(RelationshipStore::open(&path).unwrap());
        let network = TutorNetwork::new(
            store,
            profiles.clone(),
            profiles.clone(),
            DiscoveryConfig::default(),
        );
        network.send_friend_request(z, p).unwrap();
        network.accept_friend_request(z, p).unwrap();
    }

    let store = Arc::new(RelationshipStore::open(&path).unwrap());
    let network = TutorNetwork::new(
        store,
        profiles.clone(),
        profiles,
        DiscoveryConfig::default(),
    );
    let results = network.find_tutors(z, "Math", 2, &HashSet::new()).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].tutor_id, t);
}

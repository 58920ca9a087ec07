//! Concurrent callers racing on the same pair.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use tutorgraph::{InMemoryProfiles, RequestOutcome, StudentId, TaughtSubject, TutorNetwork};

fn network_with_pair() -> (Arc<TutorNetwork>, StudentId, StudentId) {
    let profiles = Arc::new(InMemoryProfiles::new());
    let a = profiles.add_student("Zigmas", "Zigmaitis", None).unwrap();
    let b = profiles.add_student("Petras", "Petraitis", None).unwrap();
    (Arc::new(TutorNetwork::in_memory(profiles).unwrap()), a, b)
}

#[test]
fn test_crossed_requests_always_end_as_friends() {
    for _ in 0..50 {
        let (network, a, b) = network_with_pair();
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = [(a, b), (b, a)]
            .into_iter()
            .map(|(from, to)| {
                let network = Arc::clone(&network);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    network.send_friend_request(from, to).unwrap()
                })
            })
            .collect();
        let mut outcomes: Vec<RequestOutcome> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        outcomes.sort_by_key(|o| *o as u8);

        assert_eq!(
            outcomes,
            vec![RequestOutcome::AutoAccepted, RequestOutcome::RequestSent]
        );
        let store = network.store();
        assert!(store.has_friendship(a, b).unwrap());
        assert!(!store.has_request(a, b).unwrap());
        assert!(!store.has_request(b, a).unwrap());
    }
}

#[test]
fn test_accept_and_cancel_race_has_one_winner() {
    for _ in 0..50 {
        let (network, a, b) = network_with_pair();
        network.send_friend_request(a, b).unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let accept = {
            let network = Arc::clone(&network);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                network.accept_friend_request(a, b).is_ok()
            })
        };
        let cancel = {
            let network = Arc::clone(&network);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                network.cancel_friend_request(a, b).is_ok()
            })
        };
        let accepted = accept.join().unwrap();
        let cancelled = cancel.join().unwrap();

        assert!(accepted ^ cancelled, "exactly one of accept/cancel must win");
        let store = network.store();
        assert_eq!(store.has_friendship(a, b).unwrap(), accepted);
        assert!(!store.has_request(a, b).unwrap());
    }
}

#[test]
fn test_discovery_runs_alongside_writers() {
    let profiles = Arc::new(InMemoryProfiles::new());
    let root = profiles.add_student("Zigmas", "Zigmaitis", None).unwrap();
    let friends: Vec<StudentId> = (0..20)
        .map(|i| profiles.add_student(format!("Friend{i}"), "Draugas", None).unwrap())
        .collect();
    let tutor = profiles
        .add_tutor("Ona", "Onaite", vec![TaughtSubject::new("Math", 12)])
        .unwrap();
    profiles.assign(friends[0], tutor, "Math").unwrap();
    let network = Arc::new(TutorNetwork::in_memory(profiles).unwrap());
    network.store().add_friendship(root, friends[0]).unwrap();

    let writer = {
        let network = Arc::clone(&network);
        let friends = friends.clone();
        thread::spawn(move || {
            for pair in friends.windows(2).cycle().take(400) {
                let store = network.store();
                if store.has_friendship(pair[0], pair[1]).unwrap() {
                    store.remove_friendship(pair[0], pair[1]).unwrap();
                } else {
                    store.add_friendship(pair[0], pair[1]).unwrap();
                }
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let network = Arc::clone(&network);
            thread::spawn(move || {
                for _ in 0..100 {
                    let results = network
                        .find_tutors(root, "Math", 4, &HashSet::new())
                        .unwrap();
                    assert_eq!(results.len(), 1);
                    assert_eq!(results[0].min_path_length, 2);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

//! Property tests: graph invariants hold after arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tutorgraph::{InMemoryProfiles, StudentId, TaughtSubject, TutorId, TutorNetwork};

const STUDENTS: usize = 6;

#[derive(Debug, Clone)]
enum Op {
    Send(usize, usize),
    Accept(usize, usize),
    Decline(usize, usize),
    Cancel(usize, usize),
    Unfriend(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let pair = (0..STUDENTS, 0..STUDENTS);
    prop_oneof![
        3 => pair.clone().prop_map(|(a, b)| Op::Send(a, b)),
        2 => pair.clone().prop_map(|(a, b)| Op::Accept(a, b)),
        1 => pair.clone().prop_map(|(a, b)| Op::Decline(a, b)),
        1 => pair.clone().prop_map(|(a, b)| Op::Cancel(a, b)),
        1 => pair.prop_map(|(a, b)| Op::Unfriend(a, b)),
    ]
}

fn setup() -> (TutorNetwork, Arc<InMemoryProfiles>, Vec<StudentId>) {
    let profiles = Arc::new(InMemoryProfiles::new());
    let ids = (0..STUDENTS)
        .map(|i| profiles.add_student(format!("S{i}"), "Prop", None).unwrap())
        .collect();
    let network = TutorNetwork::in_memory(Arc::clone(&profiles)).unwrap();
    (network, profiles, ids)
}

fn apply(network: &TutorNetwork, ids: &[StudentId], op: &Op) {
    // Errors (self requests, missing requests) are expected and must not mutate
    let _ = match *op {
        Op::Send(a, b) => network.send_friend_request(ids[a], ids[b]).map(|_| ()),
        Op::Accept(a, b) => network.accept_friend_request(ids[a], ids[b]),
        Op::Decline(a, b) => network.decline_friend_request(ids[a], ids[b]),
        Op::Cancel(a, b) => network.cancel_friend_request(ids[a], ids[b]),
        Op::Unfriend(a, b) => network.remove_friend(ids[a], ids[b]),
    };
}

proptest! {
    #[test]
    fn prop_relationship_invariants(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let (network, _profiles, ids) = setup();
        for op in &ops {
            apply(&network, &ids, op);

            let graph = network.store().snapshot().unwrap();
            for &a in &ids {
                prop_assert!(!graph.has_friendship(a, a));
                prop_assert!(!graph.has_request(a, a));
                for &b in &ids {
                    // Symmetry
                    prop_assert_eq!(graph.has_friendship(a, b), graph.has_friendship(b, a));
                    // Friendship and requests never coexist
                    if graph.has_friendship(a, b) {
                        prop_assert!(!graph.has_request(a, b));
                    }
                    // Opposite requests are always resolved
                    prop_assert!(!(graph.has_request(a, b) && graph.has_request(b, a)));
                }
            }
        }
    }

    #[test]
    fn prop_discovery_bounds(
        edges in prop::collection::vec((0..STUDENTS, 0..STUDENTS), 0..20),
        teaching in prop::collection::vec((0..3usize, 0..STUDENTS), 0..10),
        max_hops in 1..6usize,
        excluded in 0..3usize,
    ) {
        let (network, profiles, ids) = setup();
        let tutors: Vec<TutorId> = (0..3)
            .map(|i| profiles.add_tutor(format!("T{i}"), "Prop", vec![TaughtSubject::new("Math", 12)]).unwrap())
            .collect();
        for (a, b) in edges {
            if a != b {
                network.store().add_friendship(ids[a], ids[b]).unwrap();
            }
        }
        for (t, s) in teaching {
            profiles.assign(ids[s], tutors[t], "Math").unwrap();
        }
        let exclude = HashSet::from([tutors[excluded]]);
        let root = ids[0];
        let assigned: HashSet<TutorId> = tutorgraph::TeachingIndex::assigned_tutors(profiles.as_ref(), root)
            .unwrap()
            .into_iter()
            .collect();

        let results = network.find_tutors(root, "Math", max_hops, &exclude).unwrap();
        let mut seen = HashSet::new();
        for result in &results {
            prop_assert!(seen.insert(result.tutor_id));
            prop_assert!(result.min_path_length <= max_hops);
            prop_assert!(!exclude.contains(&result.tutor_id));
            prop_assert!(!assigned.contains(&result.tutor_id));

            let students = &result.example_path.students;
            prop_assert_eq!(students[0], root);
            let unique: HashSet<_> = students.iter().collect();
            prop_assert_eq!(unique.len(), students.len());
            for pair in students.windows(2) {
                prop_assert!(network.store().has_friendship(pair[0], pair[1]).unwrap());
            }
        }
        for pair in results.windows(2) {
            prop_assert!(pair[0].min_path_length <= pair[1].min_path_length);
        }
    }
}

//! Friend-of-friend tutor discovery.
//!
//! A student asks for tutors of a subject. The engine walks the friendship
//! graph breadth-first from the student, looks at the tutors teaching each
//! friend it reaches, and returns the ones that teach the subject, ranked by
//! how far away they are.

use crate::config::DiscoveryConfig;
use crate::error::{GraphError, Result};
use crate::profile::{ProfileStore, TeachingIndex};
use crate::social::RelationshipStore;
use crate::types::{PathNode, StudentId, TutorId};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

/// A simple path from the searching student through friends to a tutor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryPath {
    /// Students in order, starting with the one searching
    pub students: Vec<StudentId>,
    /// The tutor at the end, who teaches the last student
    pub tutor: TutorId,
}

impl DiscoveryPath {
    /// Number of edges: friendships traversed plus the final teaching edge.
    pub fn hop_count(&self) -> usize {
        self.students.len()
    }

    /// All nodes of the path in order.
    pub fn nodes(&self) -> Vec<PathNode> {
        self.students
            .iter()
            .copied()
            .map(PathNode::Student)
            .chain(std::iter::once(PathNode::Tutor(self.tutor)))
            .collect()
    }
}

/// One recommended tutor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorMatch {
    /// The recommended tutor
    pub tutor_id: TutorId,
    /// Length of the shortest qualifying path
    pub min_path_length: usize,
    /// A shortest path, the first one found in breadth-first order
    pub example_path: DiscoveryPath,
}

/// Bounded breadth-first tutor search over a relationship snapshot.
pub struct TutorDiscoveryEngine {
    store: Arc<RelationshipStore>,
    profiles: Arc<dyn ProfileStore>,
    teaching: Arc<dyn TeachingIndex>,
    config: DiscoveryConfig,
}

impl TutorDiscoveryEngine {
    /// Create an engine over injected stores.
    pub fn new(
        store: Arc<RelationshipStore>,
        profiles: Arc<dyn ProfileStore>,
        teaching: Arc<dyn TeachingIndex>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            store,
            profiles,
            teaching,
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Recommend tutors of `subject` reachable through `student`'s friends.
    ///
    /// `max_hops` bounds the whole path, the final teaching edge included, so
    /// at most `max_hops - 1` friendships are traversed. Tutors in `exclude`
    /// and tutors already teaching `student` are never returned. Results are
    /// ordered by path length, then tutor display name.
    ///
    /// The configured time budget, if any, applies.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidArgument`] if `max_hops` is 0, or above
    ///   [`DiscoveryConfig::max_hops_limit`] when one is configured
    /// - [`GraphError::StudentNotFound`] if `student` is unknown
    /// - [`GraphError::DeadlineExceeded`] if the time budget runs out
    pub fn find_tutors(
        &self,
        student: StudentId,
        subject: &str,
        max_hops: usize,
        exclude: &HashSet<TutorId>,
    ) -> Result<Vec<TutorMatch>> {
        let deadline = self.config.time_budget().map(|budget| Instant::now() + budget);
        self.find_tutors_before(student, subject, max_hops, exclude, deadline)
    }

    /// Like [`find_tutors`](Self::find_tutors) with a caller-chosen deadline.
    ///
    /// Abandoning the search leaves no trace: discovery never writes.
    pub fn find_tutors_before(
        &self,
        student: StudentId,
        subject: &str,
        max_hops: usize,
        exclude: &HashSet<TutorId>,
        deadline: Option<Instant>,
    ) -> Result<Vec<TutorMatch>> {
        if max_hops == 0 {
            return Err(GraphError::invalid_argument("max_hops must be at least 1"));
        }
        if let Some(limit) = self.config.max_hops_limit {
            if max_hops > limit {
                return Err(GraphError::invalid_argument(format!(
                    "max_hops {max_hops} exceeds the limit of {limit}"
                )));
            }
        }
        if !self.profiles.student_exists(student)? {
            return Err(GraphError::StudentNotFound {
                student_id: student.to_string(),
            });
        }

        debug!("Finding '{subject}' tutors for {student} within {max_hops} hop(s)");
        let started = Instant::now();
        let graph = self.store.snapshot()?;
        if graph.neighbors(student).is_empty() {
            return Ok(Vec::new());
        }

        let mut excluded: HashSet<TutorId> = exclude.clone();
        excluded.extend(self.teaching.assigned_tutors(student)?);

        // Each student keeps the first path that reached it. In BFS order that
        // is a shortest simple path, and the first one that enumerating every
        // simple path would yield.
        let friend_depth_limit = max_hops - 1;
        let mut parents: HashMap<StudentId, StudentId> = HashMap::new();
        let mut visited: HashSet<StudentId> = HashSet::from([student]);
        let mut queue: VecDeque<(StudentId, usize)> = VecDeque::from([(student, 0)]);
        let mut teaches_subject: HashMap<TutorId, bool> = HashMap::new();
        let mut found: HashMap<TutorId, TutorMatch> = HashMap::new();

        while let Some((current, depth)) = queue.pop_front() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                debug!("Discovery for {student} abandoned at deadline");
                return Err(GraphError::DeadlineExceeded {
                    elapsed_ms: started.elapsed().as_millis(),
                });
            }

            if depth > 0 {
                for tutor in self.teaching.assigned_tutors(current)? {
                    if excluded.contains(&tutor) || found.contains_key(&tutor) {
                        continue;
                    }
                    let teaches = match teaches_subject.entry(tutor) {
                        Entry::Occupied(entry) => *entry.get(),
                        Entry::Vacant(entry) => {
                            let taught = self.teaching.subjects_taught(tutor)?;
                            *entry.insert(taught.contains(subject))
                        }
                    };
                    if !teaches {
                        continue;
                    }
                    let students = trace_back(&parents, student, current);
                    trace!("Tutor {tutor} reached via {current} at length {}", depth + 1);
                    found.insert(
                        tutor,
                        TutorMatch {
                            tutor_id: tutor,
                            min_path_length: depth + 1,
                            example_path: DiscoveryPath { students, tutor },
                        },
                    );
                }
            }

            if depth >= friend_depth_limit {
                continue;
            }
            for &friend in graph.neighbors(current) {
                if visited.insert(friend) {
                    parents.insert(friend, current);
                    queue.push_back((friend, depth + 1));
                }
            }
        }

        let mut ranked = Vec::with_capacity(found.len());
        for (tutor, matched) in found {
            let name = self
                .profiles
                .display_name(PathNode::Tutor(tutor))?
                .unwrap_or_else(|| tutor.to_string());
            ranked.push((name, matched));
        }
        ranked.sort_by(|(name_a, a), (name_b, b)| {
            a.min_path_length
                .cmp(&b.min_path_length)
                .then_with(|| name_a.cmp(name_b))
                .then_with(|| a.tutor_id.cmp(&b.tutor_id))
        });

        debug!(
            "Found {} tutor(s) for {student} in {:?}",
            ranked.len(),
            started.elapsed()
        );
        Ok(ranked.into_iter().map(|(_, matched)| matched).collect())
    }

    /// Display names along a path, with the raw identifier for unknown nodes.
    pub fn path_names(&self, path: &DiscoveryPath) -> Result<Vec<String>> {
        path.nodes()
            .into_iter()
            .map(|node| {
                Ok(self
                    .profiles
                    .display_name(node)?
                    .unwrap_or_else(|| node.to_string()))
            })
            .collect()
    }
}

fn trace_back(
    parents: &HashMap<StudentId, StudentId>,
    root: StudentId,
    end: StudentId,
) -> Vec<StudentId> {
    let mut path = vec![end];
    let mut current = end;
    while current != root {
        match parents.get(&current) {
            Some(&parent) => {
                path.push(parent);
                current = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

//! Contracts consumed from the external identity/profile store.
//!
//! The core never owns student or tutor records. It asks a [`ProfileStore`]
//! whether an identity exists and what it is called, and a [`TeachingIndex`]
//! which subjects a tutor teaches and which tutors a student already has.
//! [`InMemoryProfiles`] implements both for tests and embedded use.

use crate::error::{GraphError, Result};
use crate::types::{PathNode, StudentId, TaughtSubject, TutorId};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Maximum number of hits returned by [`InMemoryProfiles::search_students`].
pub const SEARCH_LIMIT: usize = 25;

/// Identity lookups supplied by the surrounding application.
pub trait ProfileStore: Send + Sync {
    /// Whether the student exists.
    fn student_exists(&self, id: StudentId) -> Result<bool>;

    /// Whether the tutor exists.
    ///
    /// Not consulted by the core: excluded tutor ids need not exist. Callers
    /// use it to validate ids before building an exclusion set.
    fn tutor_exists(&self, id: TutorId) -> Result<bool>;

    /// Human-readable name used for ordering and for rendering paths.
    ///
    /// Returns `Ok(None)` for unknown identities.
    fn display_name(&self, node: PathNode) -> Result<Option<String>>;
}

/// Read-only view of who teaches what, and whom.
pub trait TeachingIndex: Send + Sync {
    /// Names of the subjects `tutor` teaches. Empty for unknown tutors.
    fn subjects_taught(&self, tutor: TutorId) -> Result<BTreeSet<String>>;

    /// Tutors currently teaching `student` in any subject.
    ///
    /// Each returned tutor has a teaching edge to `student`.
    fn assigned_tutors(&self, student: StudentId) -> Result<BTreeSet<TutorId>>;
}

/// Profile of a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    /// Identity
    pub id: StudentId,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// School class the student attends, if known
    pub class_num: Option<u8>,
    /// School the student attends, if recorded
    #[serde(default)]
    pub school: Option<String>,
}

impl StudentProfile {
    /// "First Last"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Profile of a tutor and the subjects they teach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorProfile {
    /// Identity
    pub id: TutorId,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Subjects with the highest class level taught
    pub subjects: Vec<TaughtSubject>,
}

impl TutorProfile {
    /// "First Last"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A tutor teaching a student a subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Assignment {
    /// Student being taught
    pub student: StudentId,
    /// Tutor teaching
    pub tutor: TutorId,
    /// Subject of the lessons
    pub subject: String,
}

#[derive(Debug, Default)]
struct Directory {
    students: HashMap<StudentId, StudentProfile>,
    tutors: HashMap<TutorId, TutorProfile>,
    assignments: BTreeSet<Assignment>,
    schools: BTreeSet<String>,
}

/// Thread-safe in-memory profile directory.
#[derive(Debug, Default)]
pub struct InMemoryProfiles {
    inner: RwLock<Directory>,
}

impl InMemoryProfiles {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a student and return their new identifier.
    pub fn add_student(
        &self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        class_num: Option<u8>,
    ) -> Result<StudentId> {
        let profile = StudentProfile {
            id: StudentId::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            class_num,
            school: None,
        };
        let id = profile.id;
        debug!("Registering student {id} ({})", profile.display_name());
        self.write()?.students.insert(id, profile);
        Ok(id)
    }

    /// Register a tutor with the subjects they teach and return their identifier.
    pub fn add_tutor(
        &self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        subjects: Vec<TaughtSubject>,
    ) -> Result<TutorId> {
        let profile = TutorProfile {
            id: TutorId::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            subjects,
        };
        let id = profile.id;
        debug!("Registering tutor {id} ({})", profile.display_name());
        self.write()?.tutors.insert(id, profile);
        Ok(id)
    }

    /// Record that `tutor` teaches `student` the given subject.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if either party is unknown.
    pub fn assign(
        &self,
        student: StudentId,
        tutor: TutorId,
        subject: impl Into<String>,
    ) -> Result<()> {
        let mut dir = self.write()?;
        if !dir.students.contains_key(&student) {
            return Err(GraphError::StudentNotFound {
                student_id: student.to_string(),
            });
        }
        if !dir.tutors.contains_key(&tutor) {
            return Err(GraphError::TutorNotFound {
                tutor_id: tutor.to_string(),
            });
        }
        dir.assignments.insert(Assignment {
            student,
            tutor,
            subject: subject.into(),
        });
        Ok(())
    }

    /// Register a school. Registering the same name twice is a no-op.
    pub fn add_school(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.write()?.schools.insert(name.clone()) {
            debug!("Registering school '{name}'");
        }
        Ok(())
    }

    /// Names of all registered schools, in ascending order.
    pub fn schools(&self) -> Result<Vec<String>> {
        Ok(self.read()?.schools.iter().cloned().collect())
    }

    /// Record that `student` attends `school`, replacing any earlier school.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the student or the school is unknown.
    pub fn set_student_school(&self, student: StudentId, school: &str) -> Result<()> {
        let mut dir = self.write()?;
        if !dir.schools.contains(school) {
            return Err(GraphError::SchoolNotFound {
                name: school.to_string(),
            });
        }
        let profile = dir
            .students
            .get_mut(&student)
            .ok_or_else(|| GraphError::StudentNotFound {
                student_id: student.to_string(),
            })?;
        profile.school = Some(school.to_string());
        debug!("Student {student} attends '{school}'");
        Ok(())
    }

    /// Tutors teaching at least one student who attends `school`, ordered by
    /// display name.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::SchoolNotFound`] for an unregistered school.
    pub fn tutors_by_school(&self, school: &str) -> Result<Vec<TutorProfile>> {
        let dir = self.read()?;
        if !dir.schools.contains(school) {
            return Err(GraphError::SchoolNotFound {
                name: school.to_string(),
            });
        }
        let tutor_ids: BTreeSet<TutorId> = dir
            .assignments
            .iter()
            .filter(|a| {
                dir.students
                    .get(&a.student)
                    .is_some_and(|s| s.school.as_deref() == Some(school))
            })
            .map(|a| a.tutor)
            .collect();
        let mut tutors: Vec<TutorProfile> = tutor_ids
            .iter()
            .filter_map(|id| dir.tutors.get(id).cloned())
            .collect();
        tutors.sort_by(|a, b| {
            a.display_name()
                .cmp(&b.display_name())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(tutors)
    }

    /// Look up a student profile.
    pub fn student(&self, id: StudentId) -> Result<Option<StudentProfile>> {
        Ok(self.read()?.students.get(&id).cloned())
    }

    /// Look up a tutor profile.
    pub fn tutor(&self, id: TutorId) -> Result<Option<TutorProfile>> {
        Ok(self.read()?.tutors.get(&id).cloned())
    }

    /// Students whose first or last name contains `query`, ignoring case.
    ///
    /// At most [`SEARCH_LIMIT`] results, ordered by display name. `exclude`
    /// leaves one student out, typically the one searching.
    pub fn search_students(
        &self,
        query: &str,
        exclude: Option<StudentId>,
    ) -> Result<Vec<StudentProfile>> {
        let needle = query.to_lowercase();
        let dir = self.read()?;
        let mut hits: Vec<StudentProfile> = dir
            .students
            .values()
            .filter(|s| Some(s.id) != exclude)
            .filter(|s| {
                s.first_name.to_lowercase().contains(&needle)
                    || s.last_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| {
            a.display_name()
                .cmp(&b.display_name())
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(SEARCH_LIMIT);
        Ok(hits)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Directory>> {
        self.inner.read().map_err(|_| GraphError::poisoned("profile directory"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Directory>> {
        self.inner.write().map_err(|_| GraphError::poisoned("profile directory"))
    }
}

impl ProfileStore for InMemoryProfiles {
    fn student_exists(&self, id: StudentId) -> Result<bool> {
        Ok(self.read()?.students.contains_key(&id))
    }

    fn tutor_exists(&self, id: TutorId) -> Result<bool> {
        Ok(self.read()?.tutors.contains_key(&id))
    }

    fn display_name(&self, node: PathNode) -> Result<Option<String>> {
        let dir = self.read()?;
        let name = match node {
            PathNode::Student(id) => dir.students.get(&id).map(StudentProfile::display_name),
            PathNode::Tutor(id) => dir.tutors.get(&id).map(TutorProfile::display_name),
        };
        Ok(name)
    }
}

impl TeachingIndex for InMemoryProfiles {
    fn subjects_taught(&self, tutor: TutorId) -> Result<BTreeSet<String>> {
        let dir = self.read()?;
        Ok(dir
            .tutors
            .get(&tutor)
            .map(|t| t.subjects.iter().map(|s| s.subject.clone()).collect())
            .unwrap_or_default())
    }

    fn assigned_tutors(&self, student: StudentId) -> Result<BTreeSet<TutorId>> {
        let dir = self.read()?;
        Ok(dir
            .assignments
            .iter()
            .filter(|a| a.student == student)
            .map(|a| a.tutor)
            .collect())
    }
}

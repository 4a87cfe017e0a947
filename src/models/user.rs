//! Actor model for authorization checks.
//!
//! Authentication itself lives in the surrounding service layer; this core
//! only receives an already-identified actor and checks role and ownership.

use serde::{Deserialize, Serialize};

/// The role an actor holds in the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Casual academic claiming work sessions.
    Tutor,
    /// Lecturer responsible for one or more courses.
    Lecturer,
    /// Administrator (HR); grants final confirmation.
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Tutor => "TUTOR",
            Role::Lecturer => "LECTURER",
            Role::Admin => "ADMIN",
        };
        f.write_str(name)
    }
}

/// An identified user acting against the timesheet core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Unique identifier for the actor.
    pub id: String,
    /// Display name, echoed in approval responses.
    pub name: String,
    /// The actor's role.
    pub role: Role,
    /// Courses the actor is assigned to (lecturers and tutors).
    #[serde(default)]
    pub course_assignments: Vec<String>,
}

impl Actor {
    /// Returns true if the actor is assigned to the given course.
    ///
    /// Administrators are not course-scoped; this check is only meaningful
    /// for tutors and lecturers.
    pub fn is_assigned_to(&self, course_id: &str) -> bool {
        self.course_assignments.iter().any(|c| c == course_id)
    }
}

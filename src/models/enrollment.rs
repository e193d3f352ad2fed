use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Course;

pub type StudentId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnrollmentStatus {
    Enrolled,
    Dropped,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Enrolled => "Enrolled",
            EnrollmentStatus::Dropped => "Dropped",
        }
    }

    /// The status the single offered action moves to.
    pub fn toggled(self) -> Self {
        match self {
            EnrollmentStatus::Enrolled => EnrollmentStatus::Dropped,
            EnrollmentStatus::Dropped => EnrollmentStatus::Enrolled,
        }
    }

    pub fn action_label(&self) -> &'static str {
        match self {
            EnrollmentStatus::Enrolled => "drop",
            EnrollmentStatus::Dropped => "re-enroll",
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enrolled" => Ok(EnrollmentStatus::Enrolled),
            "dropped" => Ok(EnrollmentStatus::Dropped),
            other => Err(format!("Status must be 'Enrolled' or 'Dropped', got '{}'", other)),
        }
    }
}

/// One (student, course) enrollment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: StudentId,
    pub student_name: String,
    pub course: String,
    pub status: EnrollmentStatus,
}

/// Student listing row: the enrollment with a snapshot of its course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentEnrollment {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course_rel: Course,
}

impl StudentEnrollment {
    pub fn course_name(&self) -> &str {
        &self.course_rel.course_name
    }

    pub fn instructor_name(&self) -> &str {
        &self.course_rel.instructor_name
    }

    pub fn status(&self) -> EnrollmentStatus {
        self.enrollment.status
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEnrollmentRequest {
    pub student_id: StudentId,
    pub student_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: EnrollmentStatus,
}

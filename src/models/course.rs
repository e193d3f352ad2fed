use serde::{Deserialize, Serialize};

use super::Enrollment;

/// A course as returned by the enrollment service. `course_name` is the key.
///
/// The service has shipped two schemas: one with a numeric `instructor_id`,
/// one with an `instructor_email`. Both are optional here and passed through
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub course_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_id: Option<i64>,
    pub instructor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_email: Option<String>,
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub course_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_id: Option<i64>,
    pub instructor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_email: Option<String>,
    pub duration: u32,
}

impl From<NewCourseRequest> for Course {
    fn from(req: NewCourseRequest) -> Self {
        Self {
            course_name: req.course_name,
            instructor_id: req.instructor_id,
            instructor_name: req.instructor_name,
            instructor_email: req.instructor_email,
            duration: req.duration,
        }
    }
}

/// `GET /courses/{name}` response: the course plus its enrollments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
}

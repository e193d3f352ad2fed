use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::api::CourseApi;
use crate::error::FormError;
use crate::models::NewEnrollmentRequest;
use crate::views::{Change, ChangeFeed, Message, Submission, Task};

/// Enrollment form bound to one course.
pub struct EnrollStudent {
    api: Arc<dyn CourseApi>,
    feed: ChangeFeed,
    course_name: String,
    student_id: String,
    student_name: String,
    submission: Submission,
}

impl EnrollStudent {
    pub fn new(api: Arc<dyn CourseApi>, feed: ChangeFeed, course_name: impl Into<String>) -> Self {
        Self {
            api,
            feed,
            course_name: course_name.into(),
            student_id: String::new(),
            student_name: String::new(),
            submission: Submission::Idle,
        }
    }

    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    pub fn set_student_id(&mut self, value: impl Into<String>) {
        self.student_id = value.into();
    }

    pub fn set_student_name(&mut self, value: impl Into<String>) {
        self.student_name = value.into();
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn validate(&self) -> Result<NewEnrollmentRequest, FormError> {
        let raw_id = self.student_id.trim();
        if raw_id.is_empty() {
            return Err(FormError::Required("student_id"));
        }
        let student_id = raw_id.parse::<i64>().map_err(|_| FormError::NotANumber {
            field: "student_id",
            value: raw_id.to_string(),
        })?;
        let student_name = self.student_name.trim();
        if student_name.is_empty() {
            return Err(FormError::Required("student_name"));
        }
        Ok(NewEnrollmentRequest {
            student_id,
            student_name: student_name.to_string(),
        })
    }

    pub fn submit(&mut self) -> Option<Task> {
        if self.submission.is_submitting() {
            return None;
        }
        let req = match self.validate() {
            Ok(req) => req,
            Err(e) => {
                self.submission = Submission::Failed(e.to_string());
                return None;
            }
        };

        self.submission = Submission::Submitting;
        let api = self.api.clone();
        let course_name = self.course_name.clone();
        Some(Task::new(async move {
            let result = api.enroll_student(&course_name, &req).await;
            Message::StudentEnrolled { course_name, result }
        }))
    }

    /// Returns true when the enrollment was confirmed.
    pub fn apply(&mut self, message: &Message) -> bool {
        let Message::StudentEnrolled { course_name, result } = message else {
            return false;
        };
        if *course_name != self.course_name {
            return false;
        }
        match result {
            Ok(enrollment) => {
                info!(
                    "enrolled student {} in {}",
                    enrollment.student_id, enrollment.course
                );
                self.student_id.clear();
                self.student_name.clear();
                self.submission = Submission::Succeeded("Student enrolled successfully!".to_string());
                self.feed.publish(Change::Enrollments {
                    student_id: enrollment.student_id,
                    course_name: enrollment.course.clone(),
                });
                true
            }
            Err(e) => {
                self.submission = Submission::Failed(e.user_message().to_string());
                false
            }
        }
    }
}

impl fmt::Display for EnrollStudent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-- Enroll Student in {} --", self.course_name)?;
        match &self.submission {
            Submission::Idle => Ok(()),
            Submission::Submitting => writeln!(f, "Enrolling..."),
            Submission::Succeeded(msg) => writeln!(f, "{}", msg),
            Submission::Failed(msg) => writeln!(f, "error: {}", msg),
        }
    }
}

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::api::CourseApi;
use crate::error::ApiError;
use crate::models::{Enrollment, EnrollmentStatus, StudentEnrollment, StudentId};
use crate::views::filter::{self, InstructorFilter, StatusFilter};
use crate::views::{
    BoxFuture, Change, ChangeFeed, ChangeSubscription, Message, Phase, Remote, Task,
};

fn read_enrollments(
    api: Arc<dyn CourseApi>,
    student_id: StudentId,
) -> BoxFuture<Result<Vec<StudentEnrollment>, ApiError>> {
    Box::pin(async move { api.list_student_enrollments(student_id).await })
}

/// One student's enrollments with drop / re-enroll actions and the
/// status/instructor filters.
pub struct StudentEnrollments {
    enrollments: Remote<StudentId, Vec<StudentEnrollment>>,
    feed: ChangeFeed,
    changes: ChangeSubscription,
    status_filter: StatusFilter,
    instructor_filter: InstructorFilter,
    action_error: Option<String>,
}

impl StudentEnrollments {
    pub fn new(api: Arc<dyn CourseApi>, feed: ChangeFeed) -> Self {
        let changes = feed.subscribe();
        Self {
            enrollments: Remote::new(api, read_enrollments, Message::EnrollmentsLoaded),
            feed,
            changes,
            status_filter: StatusFilter::All,
            instructor_filter: InstructorFilter::All,
            action_error: None,
        }
    }

    /// Point the view at another student. Responses still in flight for the
    /// previous id are discarded when they arrive.
    pub fn set_student(&mut self, student_id: Option<StudentId>) -> Option<Task> {
        self.action_error = None;
        match student_id {
            Some(id) => Some(self.enrollments.fetch(id)),
            None => {
                self.enrollments.clear();
                None
            }
        }
    }

    pub fn student_id(&self) -> Option<StudentId> {
        self.enrollments.key().copied()
    }

    pub fn mount(&mut self) -> Option<Task> {
        self.changes.any(|_| true);
        self.enrollments.reload()
    }

    pub fn refresh(&mut self) -> Option<Task> {
        self.enrollments.reload()
    }

    pub fn poll_changes(&mut self) -> Option<Task> {
        let current = self.student_id();
        let relevant = self.changes.any(|change| match change {
            Change::Courses => true,
            Change::Enrollments { student_id, .. } => current == Some(*student_id),
        });
        if relevant { self.enrollments.reload() } else { None }
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
    }

    pub fn set_instructor_filter(&mut self, filter: InstructorFilter) {
        self.instructor_filter = filter;
    }

    pub fn phase(&self) -> &Phase {
        self.enrollments.phase()
    }

    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn enrollments(&self) -> &[StudentEnrollment] {
        self.enrollments.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn instructors(&self) -> Vec<String> {
        filter::instructors(self.enrollments())
    }

    pub fn visible(&self) -> Vec<&StudentEnrollment> {
        filter::filter(self.enrollments(), &self.status_filter, &self.instructor_filter)
    }

    /// The single action offered for `course_name`: the status it would move to.
    pub fn offered_transition(&self, course_name: &str) -> Option<EnrollmentStatus> {
        self.enrollments()
            .iter()
            .find(|row| row.enrollment.course == course_name)
            .map(|row| row.status().toggled())
    }

    pub fn drop_course(&mut self, course_name: &str) -> Option<Task> {
        self.set_status(course_name, EnrollmentStatus::Dropped)
    }

    pub fn re_enroll(&mut self, course_name: &str) -> Option<Task> {
        self.set_status(course_name, EnrollmentStatus::Enrolled)
    }

    fn set_status(&mut self, course_name: &str, status: EnrollmentStatus) -> Option<Task> {
        let student_id = self.student_id()?;
        self.action_error = None;
        let course = course_name.to_string();
        let target = course.clone();
        Some(self.enrollments.mutate(
            move |api: Arc<dyn CourseApi>| -> BoxFuture<Result<Enrollment, ApiError>> {
                Box::pin(async move { api.set_enrollment_status(student_id, &target, status).await })
            },
            move |result| Message::StatusChanged {
                student_id,
                course_name: course,
                status,
                result,
            },
        ))
    }

    pub fn update(&mut self, message: Message) -> Option<Task> {
        match message {
            Message::EnrollmentsLoaded(fetched) => {
                self.enrollments.resolve(fetched);
                None
            }
            Message::StatusChanged {
                student_id,
                course_name,
                status,
                result,
            } => match result {
                Ok(_) => {
                    info!("student {} is now {} in {}", student_id, status, course_name);
                    self.feed.publish(Change::Enrollments {
                        student_id,
                        course_name,
                    });
                    // the reload covers anything queued for this view
                    self.changes.any(|_| true);
                    self.enrollments.reload()
                }
                Err(e) => {
                    let verb = match status {
                        EnrollmentStatus::Dropped => "drop",
                        EnrollmentStatus::Enrolled => "re-enroll in",
                    };
                    self.action_error = Some(format!(
                        "Failed to {} {}: {}",
                        verb,
                        course_name,
                        e.user_message()
                    ));
                    None
                }
            },
            _ => None,
        }
    }
}

impl fmt::Display for StudentEnrollments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(student_id) = self.student_id() else {
            return writeln!(f, "Please enter a student ID to view enrollments");
        };
        writeln!(f, "== My Enrollments (Student ID: {}) ==", student_id)?;
        match self.enrollments.phase() {
            Phase::Loading if self.enrollments.data().is_none() => {
                return writeln!(f, "Loading enrollments...");
            }
            Phase::Failed(msg) => {
                writeln!(f, "error: {}", msg)?;
                if self.enrollments.data().is_none() {
                    return Ok(());
                }
            }
            _ => {}
        }
        if let Some(msg) = &self.action_error {
            writeln!(f, "error: {}", msg)?;
        }
        if let Some(updated) = self.enrollments.updated_label() {
            writeln!(f, "({})", updated)?;
        }
        let instructors = self.instructors();
        writeln!(
            f,
            "filters: status={} instructor={} (instructors: {})",
            self.status_filter,
            self.instructor_filter,
            if instructors.is_empty() { "-".to_string() } else { instructors.join(", ") }
        )?;

        if self.enrollments().is_empty() {
            return writeln!(f, "No enrollments found");
        }
        let visible = self.visible();
        if visible.is_empty() {
            return writeln!(f, "No enrollments match the current filters");
        }
        for row in visible {
            writeln!(
                f,
                "- {} | {} | {} hours | {} [{}]",
                row.course_name(),
                row.instructor_name(),
                row.course_rel.duration,
                row.status(),
                row.status().action_label()
            )?;
        }
        Ok(())
    }
}

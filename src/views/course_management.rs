use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::api::CourseApi;
use crate::error::ApiError;
use crate::models::CourseDetail;
use crate::views::{
    BoxFuture, Change, ChangeFeed, ChangeSubscription, EnrollStudent, Message, Phase, Remote,
    Resolution, Submission, Task,
};

fn message_course(message: &Message) -> Option<&str> {
    match message {
        Message::StudentEnrolled { course_name, .. } => Some(course_name.as_str()),
        _ => None,
    }
}

fn read_course(api: Arc<dyn CourseApi>, name: String) -> BoxFuture<Result<CourseDetail, ApiError>> {
    Box::pin(async move { api.get_course(&name).await })
}

/// Look up one course, list its students, enroll new ones or delete it.
pub struct CourseManagement {
    detail: Remote<String, CourseDetail>,
    feed: ChangeFeed,
    changes: ChangeSubscription,
    query: String,
    enroll: Option<EnrollStudent>,
    pending_delete: Option<String>,
    delete: Submission,
    background: Option<String>,
}

impl CourseManagement {
    pub fn new(api: Arc<dyn CourseApi>, feed: ChangeFeed) -> Self {
        let changes = feed.subscribe();
        Self {
            detail: Remote::new(api, read_course, Message::CourseLoaded),
            feed,
            changes,
            query: String::new(),
            enroll: None,
            pending_delete: None,
            delete: Submission::Idle,
            background: None,
        }
    }

    pub fn set_query(&mut self, name: impl Into<String>) {
        self.query = name.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn search(&mut self) -> Option<Task> {
        let name = self.query.trim().to_string();
        if name.is_empty() {
            return None;
        }
        self.pending_delete = None;
        self.delete = Submission::Idle;
        self.background = None;
        Some(self.detail.fetch(name))
    }

    pub fn mount(&mut self) -> Option<Task> {
        self.changes.any(|_| true);
        self.detail.reload()
    }

    pub fn refresh(&mut self) -> Option<Task> {
        self.detail.reload()
    }

    pub fn poll_changes(&mut self) -> Option<Task> {
        let current = self.detail.key().cloned();
        let relevant = self.changes.any(|change| match change {
            Change::Courses => true,
            Change::Enrollments { course_name, .. } => current.as_ref() == Some(course_name),
        });
        if relevant { self.detail.reload() } else { None }
    }

    pub fn detail(&self) -> Option<&CourseDetail> {
        self.detail.data()
    }

    pub fn phase(&self) -> &Phase {
        self.detail.phase()
    }

    pub fn enroll_form(&mut self) -> Option<&mut EnrollStudent> {
        self.enroll.as_mut()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn delete_outcome(&self) -> &Submission {
        &self.delete
    }

    /// Outcome of an enrollment that finished after the form moved to
    /// another course.
    pub fn background_notice(&self) -> Option<&str> {
        self.background.as_deref()
    }

    /// First half of the delete confirmation. Only a loaded course can be deleted.
    pub fn request_delete(&mut self) -> bool {
        match self.detail.data() {
            Some(detail) => {
                self.pending_delete = Some(detail.course.course_name.clone());
                true
            }
            None => false,
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn confirm_delete(&mut self) -> Option<Task> {
        let name = self.pending_delete.take()?;
        self.delete = Submission::Submitting;
        let target = name.clone();
        Some(self.detail.mutate(
            move |api: Arc<dyn CourseApi>| -> BoxFuture<Result<(), ApiError>> {
                Box::pin(async move { api.delete_course(&target).await })
            },
            move |result| Message::CourseDeleted {
                course_name: name,
                result,
            },
        ))
    }

    pub fn update(&mut self, message: Message) -> Option<Task> {
        match message {
            Message::CourseLoaded(fetched) => {
                if self.detail.resolve(fetched) == Resolution::Applied {
                    self.bind_enroll_form();
                }
                None
            }
            message @ Message::StudentEnrolled { .. } => {
                let bound = self
                    .enroll
                    .as_ref()
                    .is_some_and(|form| Some(form.course_name()) == message_course(&message));
                if !bound {
                    self.settle_unbound_enrollment(message);
                    return None;
                }
                let confirmed = self.enroll.as_mut().is_some_and(|form| form.apply(&message));
                if !confirmed {
                    return None;
                }
                // the reload covers anything queued for this view
                self.changes.any(|_| true);
                self.detail.reload()
            }
            Message::CourseDeleted { course_name, result } => {
                match result {
                    Ok(()) => {
                        info!("deleted course {}", course_name);
                        if self.detail.key() == Some(&course_name) {
                            self.detail.clear();
                            self.enroll = None;
                            self.query.clear();
                        }
                        self.delete = Submission::Succeeded("Course deleted successfully".to_string());
                        self.feed.publish(Change::Courses);
                    }
                    Err(e) => {
                        self.delete = Submission::Failed(e.user_message().to_string());
                    }
                }
                None
            }
            _ => None,
        }
    }

    /// The service has answered for a course the form is no longer bound to.
    /// A confirmed enrollment is still announced so other views catch up.
    fn settle_unbound_enrollment(&mut self, message: Message) {
        let Message::StudentEnrolled { course_name, result } = message else {
            return;
        };
        match result {
            Ok(enrollment) => {
                info!(
                    "enrolled student {} in {} after leaving the course",
                    enrollment.student_id, enrollment.course
                );
                self.background = Some(format!(
                    "Student {} enrolled in {}",
                    enrollment.student_id, enrollment.course
                ));
                self.feed.publish(Change::Enrollments {
                    student_id: enrollment.student_id,
                    course_name: enrollment.course,
                });
            }
            Err(e) => {
                self.background = Some(format!(
                    "Failed to enroll in {}: {}",
                    course_name,
                    e.user_message()
                ));
            }
        }
    }

    fn bind_enroll_form(&mut self) {
        let Some(detail) = self.detail.data() else {
            self.enroll = None;
            return;
        };
        let name = &detail.course.course_name;
        if self.enroll.as_ref().map(EnrollStudent::course_name) != Some(name.as_str()) {
            self.enroll = Some(EnrollStudent::new(
                self.detail.api().clone(),
                self.feed.clone(),
                name.clone(),
            ));
        }
    }
}

impl fmt::Display for CourseManagement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Course Management ==")?;
        writeln!(f, "search: {}", self.query)?;
        match self.detail.phase() {
            Phase::Loading => writeln!(f, "Searching...")?,
            Phase::Failed(msg) => writeln!(f, "error: {}", msg)?,
            Phase::Idle | Phase::Ready => {}
        }
        match &self.delete {
            Submission::Succeeded(msg) => writeln!(f, "{}", msg)?,
            Submission::Failed(msg) => writeln!(f, "error: {}", msg)?,
            Submission::Submitting => writeln!(f, "Deleting...")?,
            Submission::Idle => {}
        }
        if let Some(msg) = &self.background {
            writeln!(f, "{}", msg)?;
        }

        let Some(detail) = self.detail.data() else {
            return Ok(());
        };
        let course = &detail.course;
        writeln!(f, "{}", course.course_name)?;
        if let Some(updated) = self.detail.updated_label() {
            writeln!(f, "  ({})", updated)?;
        }
        writeln!(f, "  Instructor: {}", course.instructor_name)?;
        if let Some(id) = course.instructor_id {
            writeln!(f, "  Instructor ID: {}", id)?;
        }
        if let Some(email) = &course.instructor_email {
            writeln!(f, "  Instructor Email: {}", email)?;
        }
        writeln!(f, "  Duration: {} hours", course.duration)?;
        writeln!(f, "  Enrolled Students ({})", detail.enrollments.len())?;
        if detail.enrollments.is_empty() {
            writeln!(f, "    No students enrolled yet")?;
        }
        for enrollment in &detail.enrollments {
            writeln!(
                f,
                "    {} (ID: {}) - {}",
                enrollment.student_name, enrollment.student_id, enrollment.status
            )?;
        }
        if let Some(name) = &self.pending_delete {
            writeln!(f, "Delete {}? type 'yes' to confirm or 'no' to cancel", name)?;
        }
        if let Some(form) = &self.enroll {
            write!(f, "{}", form)?;
        }
        Ok(())
    }
}

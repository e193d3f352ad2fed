use std::fmt;
use std::sync::Arc;

use crate::api::CourseApi;
use crate::error::ApiError;
use crate::models::Course;
use crate::views::{
    BoxFuture, Change, ChangeFeed, ChangeSubscription, Message, Phase, Remote, Task,
};

fn read_courses(api: Arc<dyn CourseApi>, _: ()) -> BoxFuture<Result<Vec<Course>, ApiError>> {
    Box::pin(async move { api.list_courses().await })
}

/// All courses offered by the service.
pub struct CourseList {
    courses: Remote<(), Vec<Course>>,
    changes: ChangeSubscription,
}

impl CourseList {
    pub fn new(api: Arc<dyn CourseApi>, feed: &ChangeFeed) -> Self {
        Self {
            courses: Remote::new(api, read_courses, Message::CoursesLoaded),
            changes: feed.subscribe(),
        }
    }

    /// Mounting always re-reads, so anything published meanwhile is covered.
    pub fn mount(&mut self) -> Task {
        self.changes.any(|_| true);
        self.courses.fetch(())
    }

    pub fn refresh(&mut self) -> Task {
        self.courses.fetch(())
    }

    pub fn poll_changes(&mut self) -> Option<Task> {
        if self.changes.any(|c| *c == Change::Courses) {
            Some(self.courses.fetch(()))
        } else {
            None
        }
    }

    pub fn update(&mut self, message: Message) -> Option<Task> {
        if let Message::CoursesLoaded(fetched) = message {
            self.courses.resolve(fetched);
        }
        None
    }

    pub fn courses(&self) -> Option<&[Course]> {
        self.courses.data().map(Vec::as_slice)
    }

    pub fn phase(&self) -> &Phase {
        self.courses.phase()
    }
}

impl fmt::Display for CourseList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Available Courses ==")?;
        match self.courses.phase() {
            Phase::Idle | Phase::Loading => writeln!(f, "Loading courses...")?,
            Phase::Failed(msg) => writeln!(f, "error: {}", msg)?,
            Phase::Ready => {}
        }
        let Some(courses) = self.courses() else {
            return Ok(());
        };
        if let Some(updated) = self.courses.updated_label() {
            writeln!(f, "({})", updated)?;
        }
        if courses.is_empty() {
            return writeln!(f, "No courses available");
        }
        for course in courses {
            write!(f, "- {} | {} ", course.course_name, course.instructor_name)?;
            if let Some(id) = course.instructor_id {
                write!(f, "(id {}) ", id)?;
            }
            if let Some(email) = &course.instructor_email {
                write!(f, "<{}> ", email)?;
            }
            writeln!(f, "| {} hours", course.duration)?;
        }
        Ok(())
    }
}

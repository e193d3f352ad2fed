//! View state for each screen. Views never talk to the network directly:
//! they hand back [`Task`]s, the shell runs them, and the resulting
//! [`Message`]s are fed back through `update`.

pub mod changes;
pub mod course_list;
pub mod course_management;
pub mod create_course;
pub mod enroll_student;
pub mod filter;
pub mod remote;
pub mod student_enrollments;

use std::future::Future;
use std::pin::Pin;

use crate::error::ApiError;
use crate::models::{
    Course, CourseDetail, Enrollment, EnrollmentStatus, StudentEnrollment, StudentId,
};

pub use changes::{Change, ChangeFeed, ChangeSubscription};
pub use course_list::CourseList;
pub use course_management::CourseManagement;
pub use create_course::{CourseField, CreateCourse};
pub use enroll_student::EnrollStudent;
pub use filter::{InstructorFilter, StatusFilter};
pub use remote::{Fetched, Phase, Remote, RequestToken, Resolution};
pub use student_enrollments::StudentEnrollments;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// A pending gateway call that resolves to the message its view expects.
pub struct Task(BoxFuture<Message>);

impl Task {
    pub fn new(fut: impl Future<Output = Message> + Send + 'static) -> Self {
        Self(Box::pin(fut))
    }

    pub async fn run(self) -> Message {
        self.0.await
    }
}

/// Completion of a [`Task`], routed back to the view that issued it.
#[derive(Debug)]
pub enum Message {
    CoursesLoaded(Fetched<Vec<Course>>),
    CourseLoaded(Fetched<CourseDetail>),
    CourseCreated(Result<Course, ApiError>),
    CourseDeleted {
        course_name: String,
        result: Result<(), ApiError>,
    },
    StudentEnrolled {
        course_name: String,
        result: Result<Enrollment, ApiError>,
    },
    EnrollmentsLoaded(Fetched<Vec<StudentEnrollment>>),
    StatusChanged {
        student_id: StudentId,
        course_name: String,
        status: EnrollmentStatus,
        result: Result<Enrollment, ApiError>,
    },
}

/// Outcome of the last form submission or one-shot action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Submission {
    #[default]
    Idle,
    Submitting,
    Succeeded(String),
    Failed(String),
}

impl Submission {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Submission::Submitting)
    }
}

//! Gateway to the enrollment service: one method per domain operation, one
//! request per call, no retries and no caching.

pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{
    Course, CourseDetail, Enrollment, EnrollmentStatus, NewCourseRequest, NewEnrollmentRequest,
    StudentEnrollment, StudentId,
};

pub use http::HttpCourseApi;
pub use memory::InMemoryCourseApi;

#[async_trait]
pub trait CourseApi: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError>;
    async fn get_course(&self, course_name: &str) -> Result<CourseDetail, ApiError>;
    async fn create_course(&self, req: &NewCourseRequest) -> Result<Course, ApiError>;
    async fn delete_course(&self, course_name: &str) -> Result<(), ApiError>;
    async fn enroll_student(
        &self,
        course_name: &str,
        req: &NewEnrollmentRequest,
    ) -> Result<Enrollment, ApiError>;
    async fn list_student_enrollments(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<StudentEnrollment>, ApiError>;
    async fn set_enrollment_status(
        &self,
        student_id: StudentId,
        course_name: &str,
        status: EnrollmentStatus,
    ) -> Result<Enrollment, ApiError>;
}

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::api::CourseApi;
use crate::error::ApiError;
use crate::models::{
    Course, CourseDetail, Enrollment, EnrollmentStatus, NewCourseRequest, NewEnrollmentRequest,
    StudentEnrollment, StudentId,
};

#[derive(Default)]
struct Store {
    courses: Vec<Course>,
    enrollments: Vec<Enrollment>,
}

/// In-process stand-in for the enrollment service. Enforces the same rules
/// the service does and answers with the same error details.
#[derive(Default)]
pub struct InMemoryCourseApi {
    store: Mutex<Store>,
}

impl InMemoryCourseApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_courses(courses: impl IntoIterator<Item = Course>) -> Self {
        Self {
            store: Mutex::new(Store {
                courses: courses.into_iter().collect(),
                enrollments: Vec::new(),
            }),
        }
    }
}

fn course_not_found() -> ApiError {
    ApiError::NotFound("Course not found".to_string())
}

#[async_trait]
impl CourseApi for InMemoryCourseApi {
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        let store = self.store.lock().await;
        Ok(store.courses.clone())
    }

    async fn get_course(&self, course_name: &str) -> Result<CourseDetail, ApiError> {
        let store = self.store.lock().await;
        let course = store
            .courses
            .iter()
            .find(|c| c.course_name == course_name)
            .cloned()
            .ok_or_else(course_not_found)?;
        let enrollments = store
            .enrollments
            .iter()
            .filter(|e| e.course == course_name)
            .cloned()
            .collect();
        Ok(CourseDetail { course, enrollments })
    }

    async fn create_course(&self, req: &NewCourseRequest) -> Result<Course, ApiError> {
        let mut store = self.store.lock().await;
        if store.courses.iter().any(|c| c.course_name == req.course_name) {
            return Err(ApiError::Validation("Course already exists".to_string()));
        }
        if req.course_name.trim().is_empty() || req.duration == 0 {
            return Err(ApiError::Validation(
                "course_name and a positive duration are required".to_string(),
            ));
        }
        let course = Course::from(req.clone());
        store.courses.push(course.clone());
        debug!("stored course {}", course.course_name);
        Ok(course)
    }

    async fn delete_course(&self, course_name: &str) -> Result<(), ApiError> {
        let mut store = self.store.lock().await;
        let before = store.courses.len();
        store.courses.retain(|c| c.course_name != course_name);
        if store.courses.len() == before {
            return Err(course_not_found());
        }
        store.enrollments.retain(|e| e.course != course_name);
        Ok(())
    }

    async fn enroll_student(
        &self,
        course_name: &str,
        req: &NewEnrollmentRequest,
    ) -> Result<Enrollment, ApiError> {
        let mut store = self.store.lock().await;
        if !store.courses.iter().any(|c| c.course_name == course_name) {
            return Err(course_not_found());
        }
        if store
            .enrollments
            .iter()
            .any(|e| e.student_id == req.student_id && e.course == course_name)
        {
            return Err(ApiError::Validation("Student already enrolled".to_string()));
        }
        let enrollment = Enrollment {
            student_id: req.student_id,
            student_name: req.student_name.clone(),
            course: course_name.to_string(),
            status: EnrollmentStatus::Enrolled,
        };
        store.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn list_student_enrollments(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<StudentEnrollment>, ApiError> {
        let store = self.store.lock().await;
        let rows = store
            .enrollments
            .iter()
            .filter(|e| e.student_id == student_id)
            .filter_map(|e| {
                store
                    .courses
                    .iter()
                    .find(|c| c.course_name == e.course)
                    .map(|course| StudentEnrollment {
                        enrollment: e.clone(),
                        course_rel: course.clone(),
                    })
            })
            .collect();
        Ok(rows)
    }

    async fn set_enrollment_status(
        &self,
        student_id: StudentId,
        course_name: &str,
        status: EnrollmentStatus,
    ) -> Result<Enrollment, ApiError> {
        let mut store = self.store.lock().await;
        let enrollment = store
            .enrollments
            .iter_mut()
            .find(|e| e.student_id == student_id && e.course == course_name)
            .ok_or_else(|| ApiError::NotFound("Enrollment not found".to_string()))?;
        enrollment.status = status;
        Ok(enrollment.clone())
    }
}

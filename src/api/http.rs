use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::CourseApi;
use crate::config::ClientConfig;
use crate::error::{ApiError, AppError, extract_detail};
use crate::models::{
    Course, CourseDetail, Enrollment, EnrollmentStatus, NewCourseRequest, NewEnrollmentRequest,
    StatusUpdateRequest, StudentEnrollment, StudentId,
};

pub struct HttpCourseApi {
    client: Client,
    config: ClientConfig,
}

impl HttpCourseApi {
    pub fn new(config: ClientConfig) -> Result<Self, AppError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Join path segments onto the base url, percent-encoding each one.
    /// An empty trailing segment produces the trailing slash the collection
    /// routes expect.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.config.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn dispatch(&self, builder: RequestBuilder, fallback: &str) -> Result<Response, ApiError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!("{} {}", method, url);

        let response = self.client.execute(request).await.map_err(|e| {
            warn!("{} {} failed: {}", method, url, e);
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, extract_detail(&body), fallback);
            warn!("{} {} -> {}: {}", method, url, status, err);
            return Err(err);
        }

        debug!("{} {} -> {}", method, url, status);
        Ok(response)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let response = self.dispatch(builder, fallback).await?;
        response.json::<T>().await.map_err(|e| {
            warn!("failed to decode response: {}", e);
            ApiError::from(e)
        })
    }
}

#[async_trait]
impl CourseApi for HttpCourseApi {
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        let url = self.endpoint(&["courses", ""]);
        self.fetch_json(self.client.get(url), "Failed to fetch courses").await
    }

    async fn get_course(&self, course_name: &str) -> Result<CourseDetail, ApiError> {
        let url = self.endpoint(&["courses", course_name]);
        self.fetch_json(self.client.get(url), "Course not found").await
    }

    async fn create_course(&self, req: &NewCourseRequest) -> Result<Course, ApiError> {
        let url = self.endpoint(&["courses", ""]);
        self.fetch_json(self.client.post(url).json(req), "Failed to create course")
            .await
    }

    async fn delete_course(&self, course_name: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["courses", course_name]);
        self.dispatch(self.client.request(Method::DELETE, url), "Failed to delete course")
            .await?;
        Ok(())
    }

    async fn enroll_student(
        &self,
        course_name: &str,
        req: &NewEnrollmentRequest,
    ) -> Result<Enrollment, ApiError> {
        let url = self.endpoint(&["courses", course_name, "enroll"]);
        self.fetch_json(self.client.post(url).json(req), "Failed to enroll student")
            .await
    }

    async fn list_student_enrollments(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<StudentEnrollment>, ApiError> {
        let id = student_id.to_string();
        let url = self.endpoint(&["enrollments", "student", &id]);
        self.fetch_json(self.client.get(url), "Failed to fetch enrollments")
            .await
    }

    async fn set_enrollment_status(
        &self,
        student_id: StudentId,
        course_name: &str,
        status: EnrollmentStatus,
    ) -> Result<Enrollment, ApiError> {
        let id = student_id.to_string();
        let url = self.endpoint(&["enrollments", "student", &id, "course", course_name]);
        let body = StatusUpdateRequest { status };
        let fallback = match status {
            EnrollmentStatus::Dropped => "Failed to drop course",
            EnrollmentStatus::Enrolled => "Failed to re-enroll",
        };
        self.fetch_json(self.client.patch(url).json(&body), fallback)
            .await
    }
}

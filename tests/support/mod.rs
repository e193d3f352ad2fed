#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use frontend::api::{CourseApi, HttpCourseApi, InMemoryCourseApi};
use frontend::config::ClientConfig;
use frontend::error::ApiError;
use frontend::models::*;

/// Maps gateway errors back onto the service's wire format.
pub struct StubError(ApiError);

impl From<ApiError> for StubError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl IntoResponse for StubError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = Json(serde_json::json!({ "detail": self.0.user_message() }));
        (status, body).into_response()
    }
}

type Store = Arc<InMemoryCourseApi>;

pub fn router(store: Store) -> Router {
    Router::new()
        .route("/courses/", get(list_courses).post(create_course))
        .route("/courses/{name}", get(get_course).delete(delete_course))
        .route("/courses/{name}/enroll", post(enroll_student))
        .route("/enrollments/student/{id}", get(list_student_enrollments))
        .route("/enrollments/student/{id}/course/{name}", patch(update_status))
        .with_state(store)
}

async fn list_courses(State(store): State<Store>) -> Result<Json<Vec<Course>>, StubError> {
    Ok(Json(store.list_courses().await?))
}

async fn create_course(
    State(store): State<Store>,
    Json(req): Json<NewCourseRequest>,
) -> Result<(StatusCode, Json<Course>), StubError> {
    let course = store.create_course(&req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn get_course(
    State(store): State<Store>,
    Path(name): Path<String>,
) -> Result<Json<CourseDetail>, StubError> {
    Ok(Json(store.get_course(&name).await?))
}

async fn delete_course(
    State(store): State<Store>,
    Path(name): Path<String>,
) -> Result<StatusCode, StubError> {
    store.delete_course(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn enroll_student(
    State(store): State<Store>,
    Path(name): Path<String>,
    Json(req): Json<NewEnrollmentRequest>,
) -> Result<(StatusCode, Json<Enrollment>), StubError> {
    let enrollment = store.enroll_student(&name, &req).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

async fn list_student_enrollments(
    State(store): State<Store>,
    Path(id): Path<StudentId>,
) -> Result<Json<Vec<StudentEnrollment>>, StubError> {
    Ok(Json(store.list_student_enrollments(id).await?))
}

async fn update_status(
    State(store): State<Store>,
    Path((id, name)): Path<(StudentId, String)>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<Enrollment>, StubError> {
    Ok(Json(store.set_enrollment_status(id, &name, req.status).await?))
}

/// Serve the stub on an ephemeral port and return a client pointed at it,
/// plus the store behind it.
pub async fn spawn_stub() -> (HttpCourseApi, Store) {
    let store: Store = Arc::new(InMemoryCourseApi::new());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().expect("Failed to read stub address");

    let app = router(store.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    let config = ClientConfig::new(&format!("http://{}", addr)).expect("Failed to build config");
    let api = HttpCourseApi::new(config).expect("Failed to build client");
    (api, store)
}

pub fn new_course(name: &str, instructor: &str, duration: u32) -> NewCourseRequest {
    NewCourseRequest {
        course_name: name.to_string(),
        instructor_id: None,
        instructor_name: instructor.to_string(),
        instructor_email: Some(format!("{}@x.edu", instructor.to_ascii_lowercase())),
        duration,
    }
}

pub fn student(id: StudentId, name: &str) -> NewEnrollmentRequest {
    NewEnrollmentRequest {
        student_id: id,
        student_name: name.to_string(),
    }
}

/// Delegates to an in-memory service but fails every read while `failing`
/// is set.
#[derive(Default)]
pub struct FlakyApi {
    pub inner: InMemoryCourseApi,
    failing: AtomicBool,
}

impl FlakyApi {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), ApiError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(ApiError::Transport("Service unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CourseApi for FlakyApi {
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.check()?;
        self.inner.list_courses().await
    }

    async fn get_course(&self, course_name: &str) -> Result<CourseDetail, ApiError> {
        self.check()?;
        self.inner.get_course(course_name).await
    }

    async fn create_course(&self, req: &NewCourseRequest) -> Result<Course, ApiError> {
        self.inner.create_course(req).await
    }

    async fn delete_course(&self, course_name: &str) -> Result<(), ApiError> {
        self.inner.delete_course(course_name).await
    }

    async fn enroll_student(
        &self,
        course_name: &str,
        req: &NewEnrollmentRequest,
    ) -> Result<Enrollment, ApiError> {
        self.inner.enroll_student(course_name, req).await
    }

    async fn list_student_enrollments(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<StudentEnrollment>, ApiError> {
        self.check()?;
        self.inner.list_student_enrollments(student_id).await
    }

    async fn set_enrollment_status(
        &self,
        student_id: StudentId,
        course_name: &str,
        status: EnrollmentStatus,
    ) -> Result<Enrollment, ApiError> {
        self.inner
            .set_enrollment_status(student_id, course_name, status)
            .await
    }
}

pub mod course;
pub mod enrollment;

pub use course::{Course, CourseDetail, NewCourseRequest};
pub use enrollment::{
    Enrollment, EnrollmentStatus, NewEnrollmentRequest, StatusUpdateRequest, StudentEnrollment,
    StudentId,
};

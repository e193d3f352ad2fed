use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::api::CourseApi;
use crate::error::FormError;
use crate::models::NewCourseRequest;
use crate::views::{Change, ChangeFeed, Message, Submission, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseField {
    CourseName,
    InstructorId,
    InstructorName,
    InstructorEmail,
    Duration,
}

impl CourseField {
    pub const ALL: [CourseField; 5] = [
        CourseField::CourseName,
        CourseField::InstructorId,
        CourseField::InstructorName,
        CourseField::InstructorEmail,
        CourseField::Duration,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CourseField::CourseName => "course_name",
            CourseField::InstructorId => "instructor_id",
            CourseField::InstructorName => "instructor_name",
            CourseField::InstructorEmail => "instructor_email",
            CourseField::Duration => "duration",
        }
    }
}

impl FromStr for CourseField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" | "course_name" => Ok(CourseField::CourseName),
            "id" | "instructor_id" => Ok(CourseField::InstructorId),
            "instructor" | "instructor_name" => Ok(CourseField::InstructorName),
            "email" | "instructor_email" => Ok(CourseField::InstructorEmail),
            "duration" | "hours" => Ok(CourseField::Duration),
            other => Err(format!("unknown course field '{}'", other)),
        }
    }
}

/// Raw text of the create-course form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseForm {
    pub course_name: String,
    pub instructor_id: String,
    pub instructor_name: String,
    pub instructor_email: String,
    pub duration: String,
}

impl CourseForm {
    pub fn get(&self, field: CourseField) -> &str {
        match field {
            CourseField::CourseName => &self.course_name,
            CourseField::InstructorId => &self.instructor_id,
            CourseField::InstructorName => &self.instructor_name,
            CourseField::InstructorEmail => &self.instructor_email,
            CourseField::Duration => &self.duration,
        }
    }

    pub fn set(&mut self, field: CourseField, value: impl Into<String>) {
        let slot = match field {
            CourseField::CourseName => &mut self.course_name,
            CourseField::InstructorId => &mut self.instructor_id,
            CourseField::InstructorName => &mut self.instructor_name,
            CourseField::InstructorEmail => &mut self.instructor_email,
            CourseField::Duration => &mut self.duration,
        };
        *slot = value.into();
    }

    /// Only the checks a native form control would make: required text and
    /// numeric input. Uniqueness and the rest are the service's call.
    pub fn validate(&self) -> Result<NewCourseRequest, FormError> {
        let course_name = required(&self.course_name, "course_name")?;
        let instructor_name = required(&self.instructor_name, "instructor_name")?;
        let duration_text = required(&self.duration, "duration")?;
        let duration = duration_text
            .parse::<u32>()
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| FormError::NotANumber {
                field: "duration",
                value: duration_text.clone(),
            })?;

        let instructor_id = match self.instructor_id.trim() {
            "" => None,
            raw => Some(raw.parse::<i64>().map_err(|_| FormError::NotANumber {
                field: "instructor_id",
                value: raw.to_string(),
            })?),
        };
        let instructor_email = Some(self.instructor_email.trim())
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        Ok(NewCourseRequest {
            course_name,
            instructor_id,
            instructor_name,
            instructor_email,
            duration,
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::Required(field))
    } else {
        Ok(value.to_string())
    }
}

pub struct CreateCourse {
    api: Arc<dyn CourseApi>,
    feed: ChangeFeed,
    form: CourseForm,
    submission: Submission,
}

impl CreateCourse {
    pub fn new(api: Arc<dyn CourseApi>, feed: ChangeFeed) -> Self {
        Self {
            api,
            feed,
            form: CourseForm::default(),
            submission: Submission::Idle,
        }
    }

    pub fn set_field(&mut self, field: CourseField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    pub fn form(&self) -> &CourseForm {
        &self.form
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Send the form. Returns `None` while a submission is in flight or when
    /// the local checks fail (the failure is recorded on the view).
    pub fn submit(&mut self) -> Option<Task> {
        if self.submission.is_submitting() {
            return None;
        }
        let req = match self.form.validate() {
            Ok(req) => req,
            Err(e) => {
                self.submission = Submission::Failed(e.to_string());
                return None;
            }
        };

        self.submission = Submission::Submitting;
        let api = self.api.clone();
        Some(Task::new(async move {
            Message::CourseCreated(api.create_course(&req).await)
        }))
    }

    pub fn update(&mut self, message: Message) -> Option<Task> {
        if let Message::CourseCreated(result) = message {
            match result {
                Ok(course) => {
                    info!("created course {}", course.course_name);
                    self.form = CourseForm::default();
                    self.submission = Submission::Succeeded("Course created successfully!".to_string());
                    self.feed.publish(Change::Courses);
                }
                Err(e) => {
                    self.submission = Submission::Failed(e.user_message().to_string());
                }
            }
        }
        None
    }
}

impl fmt::Display for CreateCourse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Create New Course ==")?;
        match &self.submission {
            Submission::Idle => {}
            Submission::Submitting => writeln!(f, "Creating...")?,
            Submission::Succeeded(msg) => writeln!(f, "{}", msg)?,
            Submission::Failed(msg) => writeln!(f, "error: {}", msg)?,
        }
        for field in CourseField::ALL {
            writeln!(f, "  {:<16} {}", field.label(), self.form.get(field))?;
        }
        Ok(())
    }
}

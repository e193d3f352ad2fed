use std::str::FromStr;

use thiserror::Error;

use crate::views::{CourseField, InstructorFilter, StatusFilter};

pub const HELP: &str = "\
commands:
  courses                        list all courses
  create                         open the create-course form
  set <field> <value>            fill a form field (name, id, instructor, email, duration)
  submit                         create the course
  manage [course]                open course management, optionally searching
  search <course>                look up a course
  enroll <student id> <name>     enroll a student in the loaded course
  delete                         delete the loaded course (asks for confirmation)
  yes | no                       answer a confirmation
  student [id]                   show a student's enrollments
  drop <course>                  drop an enrolled course
  reenroll <course>              re-enroll in a dropped course
  filter status <all|enrolled|dropped>
  filter instructor <all|name>   lowercase 'all' clears; other text is an exact name
  refresh                        reload the current view
  help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Courses,
    Create,
    Manage,
    Student,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Courses, Tab::Create, Tab::Manage, Tab::Student];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Courses => "All Courses",
            Tab::Create => "Create Course",
            Tab::Manage => "Manage Course",
            Tab::Student => "Student View",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Switch(Tab),
    Manage(Option<String>),
    Student(Option<String>),
    SetField(CourseField, String),
    Submit,
    Search(String),
    Enroll {
        student_id: String,
        student_name: String,
    },
    Delete,
    Confirm(bool),
    Drop(String),
    ReEnroll(String),
    FilterStatus(StatusFilter),
    FilterInstructor(InstructorFilter),
    Refresh,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("{0}")]
    Invalid(String),
}

fn rest_of(line: &str, word: &str) -> String {
    line.trim_start()[word.len()..].trim().to_string()
}

fn non_empty(value: String, usage: &'static str) -> Result<String, CommandError> {
    if value.is_empty() { Err(CommandError::Usage(usage)) } else { Ok(value) }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Err(CommandError::Empty);
        };
        let rest = rest_of(line, word);

        let command = match word.to_ascii_lowercase().as_str() {
            "courses" | "list" => Command::Switch(Tab::Courses),
            "create" | "new" => Command::Switch(Tab::Create),
            "manage" => Command::Manage(Some(rest).filter(|r| !r.is_empty())),
            "student" => Command::Student(Some(rest).filter(|r| !r.is_empty())),
            "set" => {
                let name = words.next().ok_or(CommandError::Usage("set <field> <value>"))?;
                let field: CourseField = name.parse().map_err(CommandError::Invalid)?;
                Command::SetField(field, rest_of(&rest, name))
            }
            "submit" => Command::Submit,
            "search" => Command::Search(non_empty(rest, "search <course>")?),
            "enroll" => {
                let student_id = words
                    .next()
                    .ok_or(CommandError::Usage("enroll <student id> <name>"))?
                    .to_string();
                let student_name = non_empty(
                    rest_of(&rest, &student_id),
                    "enroll <student id> <name>",
                )?;
                Command::Enroll {
                    student_id,
                    student_name,
                }
            }
            "delete" => Command::Delete,
            "yes" | "y" => Command::Confirm(true),
            "no" | "n" => Command::Confirm(false),
            "drop" => Command::Drop(non_empty(rest, "drop <course>")?),
            "reenroll" | "re-enroll" => Command::ReEnroll(non_empty(rest, "reenroll <course>")?),
            "filter" => {
                let kind = words
                    .next()
                    .ok_or(CommandError::Usage("filter <status|instructor> <value>"))?;
                let value = non_empty(
                    rest_of(&rest, kind),
                    "filter <status|instructor> <value>",
                )?;
                match kind.to_ascii_lowercase().as_str() {
                    "status" => {
                        Command::FilterStatus(value.parse().map_err(CommandError::Invalid)?)
                    }
                    "instructor" => Command::FilterInstructor(InstructorFilter::from(value.as_str())),
                    _ => return Err(CommandError::Usage("filter <status|instructor> <value>")),
                }
            }
            "refresh" | "reload" => Command::Refresh,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

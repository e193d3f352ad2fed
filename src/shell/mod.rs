//! Composition of the views behind a line-oriented shell.
//!
//! The shell owns the only event loop: user input and task completions are
//! both handled here, one at a time, so view state is never touched from
//! more than one place.

pub mod command;

use std::fmt::Write as _;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::CourseApi;
use crate::models::{EnrollmentStatus, StudentId};
use crate::views::{
    ChangeFeed, CourseList, CourseManagement, CreateCourse, Message, StudentEnrollments, Task,
};

pub use command::{Command, CommandError, HELP, Tab};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

enum Event {
    Line(String),
    Completion(Message),
}

pub struct Shell {
    tab: Tab,
    course_list: CourseList,
    create_course: CreateCourse,
    course_management: CourseManagement,
    student_enrollments: StudentEnrollments,
    notice: Option<String>,
    in_flight: usize,
    completions_tx: mpsc::UnboundedSender<Message>,
    completions_rx: mpsc::UnboundedReceiver<Message>,
}

impl Shell {
    pub fn new(api: Arc<dyn CourseApi>) -> Self {
        let feed = ChangeFeed::new();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            tab: Tab::Courses,
            course_list: CourseList::new(api.clone(), &feed),
            create_course: CreateCourse::new(api.clone(), feed.clone()),
            course_management: CourseManagement::new(api.clone(), feed.clone()),
            student_enrollments: StudentEnrollments::new(api, feed),
            notice: None,
            in_flight: 0,
            completions_tx,
            completions_rx,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn course_list(&self) -> &CourseList {
        &self.course_list
    }

    pub fn create_course(&self) -> &CreateCourse {
        &self.create_course
    }

    pub fn course_management(&self) -> &CourseManagement {
        &self.course_management
    }

    pub fn student_enrollments(&self) -> &StudentEnrollments {
        &self.student_enrollments
    }

    /// Mount `tab`, re-reading whatever it shows.
    pub fn switch(&mut self, tab: Tab) {
        self.tab = tab;
        let task = match tab {
            Tab::Courses => Some(self.course_list.mount()),
            Tab::Create => None,
            Tab::Manage => self.course_management.mount(),
            Tab::Student => self.student_enrollments.mount(),
        };
        self.spawn(task);
    }

    fn spawn(&mut self, task: Option<Task>) {
        let Some(task) = task else {
            return;
        };
        self.in_flight += 1;
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let message = task.run().await;
            // the receiver lives as long as the shell
            let _ = tx.send(message);
        });
    }

    pub fn handle_line(&mut self, line: &str) -> Flow {
        match line.parse::<Command>() {
            Ok(command) => self.handle_command(command),
            Err(CommandError::Empty) => Flow::Continue,
            Err(e) => {
                self.notice = Some(e.to_string());
                Flow::Continue
            }
        }
    }

    pub fn handle_command(&mut self, command: Command) -> Flow {
        debug!("command {:?}", command);
        self.notice = None;

        match command {
            Command::Switch(tab) => self.switch(tab),
            Command::Manage(name) => match name {
                Some(name) => self.search(name),
                None => self.switch(Tab::Manage),
            },
            Command::Student(raw) => match raw {
                Some(raw) => {
                    self.tab = Tab::Student;
                    let id = parse_student_id(&raw);
                    if id.is_none() {
                        self.notice = Some(format!("'{}' is not a student ID", raw));
                    }
                    let task = self.student_enrollments.set_student(id);
                    self.spawn(task);
                }
                None => self.switch(Tab::Student),
            },
            Command::SetField(field, value) => {
                self.tab = Tab::Create;
                self.create_course.set_field(field, value);
            }
            Command::Submit => {
                self.tab = Tab::Create;
                let task = self.create_course.submit();
                self.spawn(task);
            }
            Command::Search(name) => self.search(name),
            Command::Enroll {
                student_id,
                student_name,
            } => {
                self.tab = Tab::Manage;
                let task = match self.course_management.enroll_form() {
                    Some(form) => {
                        form.set_student_id(student_id);
                        form.set_student_name(student_name);
                        form.submit()
                    }
                    None => {
                        self.notice = Some("Search for a course first".to_string());
                        None
                    }
                };
                self.spawn(task);
            }
            Command::Delete => {
                self.tab = Tab::Manage;
                if !self.course_management.request_delete() {
                    self.notice = Some("Search for a course first".to_string());
                }
            }
            Command::Confirm(true) => {
                let task = self.course_management.confirm_delete();
                if task.is_none() {
                    self.notice = Some("Nothing to confirm".to_string());
                }
                self.spawn(task);
            }
            Command::Confirm(false) => self.course_management.cancel_delete(),
            Command::Drop(course) => self.transition(&course, true),
            Command::ReEnroll(course) => self.transition(&course, false),
            Command::FilterStatus(filter) => {
                self.tab = Tab::Student;
                self.student_enrollments.set_status_filter(filter);
            }
            Command::FilterInstructor(filter) => {
                self.tab = Tab::Student;
                self.student_enrollments.set_instructor_filter(filter);
            }
            Command::Refresh => {
                let task = match self.tab {
                    Tab::Courses => Some(self.course_list.refresh()),
                    Tab::Create => None,
                    Tab::Manage => self.course_management.refresh(),
                    Tab::Student => self.student_enrollments.refresh(),
                };
                self.spawn(task);
            }
            Command::Show => {}
            Command::Help => self.notice = Some(HELP.to_string()),
            Command::Quit => return Flow::Quit,
        }

        self.poll_changes();
        Flow::Continue
    }

    fn search(&mut self, name: String) {
        self.tab = Tab::Manage;
        self.course_management.set_query(name);
        let task = self.course_management.search();
        self.spawn(task);
    }

    /// Only the action matching the record's current status is offered.
    fn transition(&mut self, course: &str, dropping: bool) {
        self.tab = Tab::Student;
        let Some(target) = self.student_enrollments.offered_transition(course) else {
            self.notice = Some(format!("No enrollment in '{}'", course));
            return;
        };
        let offered_drop = target == EnrollmentStatus::Dropped;
        if offered_drop != dropping {
            self.notice = Some(format!(
                "'{}' only offers {}",
                course,
                target.toggled().action_label()
            ));
            return;
        }
        let task = if dropping {
            self.student_enrollments.drop_course(course)
        } else {
            self.student_enrollments.re_enroll(course)
        };
        self.spawn(task);
    }

    pub fn handle_message(&mut self, message: Message) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let follow_up = match message {
            m @ Message::CoursesLoaded(_) => self.course_list.update(m),
            m @ Message::CourseCreated(_) => self.create_course.update(m),
            m @ (Message::CourseLoaded(_)
            | Message::CourseDeleted { .. }
            | Message::StudentEnrolled { .. }) => self.course_management.update(m),
            m @ (Message::EnrollmentsLoaded(_) | Message::StatusChanged { .. }) => {
                self.student_enrollments.update(m)
            }
        };
        self.spawn(follow_up);
        self.poll_changes();
    }

    /// Let the mounted view react to changes published by its siblings.
    fn poll_changes(&mut self) {
        let task = match self.tab {
            Tab::Courses => self.course_list.poll_changes(),
            Tab::Create => None,
            Tab::Manage => self.course_management.poll_changes(),
            Tab::Student => self.student_enrollments.poll_changes(),
        };
        self.spawn(task);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub async fn next_message(&mut self) -> Option<Message> {
        self.completions_rx.recv().await
    }

    /// Handle completions until no task is outstanding.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.next_message().await {
                Some(message) => self.handle_message(message),
                None => break,
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let tabs: Vec<String> = Tab::ALL
            .iter()
            .map(|tab| {
                if *tab == self.tab {
                    format!("[{}]", tab.title())
                } else {
                    tab.title().to_string()
                }
            })
            .collect();
        let _ = writeln!(out, "Student Course Enrollment System | {}", tabs.join(" | "));
        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "{}", notice);
        }
        let _ = match self.tab {
            Tab::Courses => write!(out, "{}", self.course_list),
            Tab::Create => write!(out, "{}", self.create_course),
            Tab::Manage => write!(out, "{}", self.course_management),
            Tab::Student => write!(out, "{}", self.student_enrollments),
        };
        out
    }

    /// Run until `quit` or the input closes, printing the mounted view after
    /// every event.
    pub async fn run(mut self, mut input: mpsc::Receiver<String>) {
        self.switch(self.tab);
        print!("{}", self.render());

        loop {
            let event = tokio::select! {
                line = input.recv() => match line {
                    Some(line) => Event::Line(line),
                    None => break,
                },
                Some(message) = self.completions_rx.recv() => Event::Completion(message),
            };

            match event {
                Event::Line(line) => {
                    if self.handle_line(&line) == Flow::Quit {
                        break;
                    }
                }
                Event::Completion(message) => self.handle_message(message),
            }
            print!("{}", self.render());
        }

        if self.in_flight > 0 {
            warn!("exiting with {} requests still in flight", self.in_flight);
        }
    }
}

fn parse_student_id(raw: &str) -> Option<StudentId> {
    raw.trim().parse::<StudentId>().ok().filter(|id| *id > 0)
}

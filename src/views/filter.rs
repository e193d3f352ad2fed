//! Network-free projections over a student's fetched enrollments.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::models::{EnrollmentStatus, StudentEnrollment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(EnrollmentStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: EnrollmentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("All"),
            StatusFilter::Only(status) => write!(f, "{}", status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InstructorFilter {
    #[default]
    All,
    Only(String),
}

impl InstructorFilter {
    pub fn matches(&self, instructor: &str) -> bool {
        match self {
            InstructorFilter::All => true,
            InstructorFilter::Only(wanted) => wanted == instructor,
        }
    }
}

/// Lowercase `all` clears the instructor filter. Any other text, including
/// `All`, names an instructor exactly.
pub const ALL_INSTRUCTORS: &str = "all";

impl From<&str> for InstructorFilter {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s == ALL_INSTRUCTORS {
            InstructorFilter::All
        } else {
            InstructorFilter::Only(s.to_string())
        }
    }
}

impl fmt::Display for InstructorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructorFilter::All => f.write_str(ALL_INSTRUCTORS),
            InstructorFilter::Only(name) => f.write_str(name),
        }
    }
}

/// Distinct instructor names, sorted.
pub fn instructors(rows: &[StudentEnrollment]) -> Vec<String> {
    rows.iter()
        .map(|row| row.instructor_name().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Rows matching both filters, in their original order.
pub fn filter<'a>(
    rows: &'a [StudentEnrollment],
    status: &StatusFilter,
    instructor: &InstructorFilter,
) -> Vec<&'a StudentEnrollment> {
    rows.iter()
        .filter(|row| status.matches(row.status()) && instructor.matches(row.instructor_name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, Enrollment};

    fn row(course: &str, instructor: &str, status: EnrollmentStatus) -> StudentEnrollment {
        StudentEnrollment {
            enrollment: Enrollment {
                student_id: 7,
                student_name: "Bob".to_string(),
                course: course.to_string(),
                status,
            },
            course_rel: Course {
                course_name: course.to_string(),
                instructor_id: None,
                instructor_name: instructor.to_string(),
                instructor_email: None,
                duration: 30,
            },
        }
    }

    fn sample() -> Vec<StudentEnrollment> {
        vec![
            row("CS101", "Turing", EnrollmentStatus::Enrolled),
            row("MA201", "Ada", EnrollmentStatus::Dropped),
            row("CS102", "Turing", EnrollmentStatus::Dropped),
            row("PH110", "Curie", EnrollmentStatus::Enrolled),
            row("MA202", "Ada", EnrollmentStatus::Enrolled),
        ]
    }

    fn names(rows: &[&StudentEnrollment]) -> Vec<String> {
        rows.iter().map(|r| r.course_name().to_string()).collect()
    }

    #[test]
    fn all_all_is_identity() {
        let rows = sample();
        let out = filter(&rows, &StatusFilter::All, &InstructorFilter::All);
        let cloned: Vec<StudentEnrollment> = out.into_iter().cloned().collect();
        assert_eq!(cloned, rows);
    }

    #[test]
    fn filters_combine_and_preserve_order() {
        let rows = sample();
        let status = StatusFilter::Only(EnrollmentStatus::Enrolled);
        assert_eq!(
            names(&filter(&rows, &status, &InstructorFilter::All)),
            vec!["CS101", "PH110", "MA202"]
        );

        let ada = InstructorFilter::from("Ada");
        assert_eq!(names(&filter(&rows, &StatusFilter::All, &ada)), vec!["MA201", "MA202"]);
        assert_eq!(names(&filter(&rows, &status, &ada)), vec!["MA202"]);

        let nobody = InstructorFilter::from("Hopper");
        assert!(filter(&rows, &StatusFilter::All, &nobody).is_empty());
    }

    #[test]
    fn every_selected_row_matches_and_every_match_is_selected() {
        let rows = sample();
        for status in [
            StatusFilter::All,
            StatusFilter::Only(EnrollmentStatus::Enrolled),
            StatusFilter::Only(EnrollmentStatus::Dropped),
        ] {
            for instructor in ["all", "Ada", "Turing", "Curie"] {
                let instructor = InstructorFilter::from(instructor);
                let out = filter(&rows, &status, &instructor);
                let expected = rows
                    .iter()
                    .filter(|r| status.matches(r.status()) && instructor.matches(r.instructor_name()))
                    .count();
                assert_eq!(out.len(), expected);
            }
        }
    }

    #[test]
    fn instructors_are_sorted_and_distinct() {
        let rows = sample();
        let first = instructors(&rows);
        assert_eq!(first, vec!["Ada", "Curie", "Turing"]);
        assert_eq!(instructors(&rows), first);
        assert!(instructors(&[]).is_empty());
    }

    #[test]
    fn only_lowercase_all_clears_instructor_filter() {
        assert_eq!(InstructorFilter::from(" all "), InstructorFilter::All);
        assert_eq!(InstructorFilter::from("All"), InstructorFilter::Only("All".to_string()));
        assert_eq!(InstructorFilter::from("ALL"), InstructorFilter::Only("ALL".to_string()));

        let mut rows = sample();
        rows.push(row("LA100", "All", EnrollmentStatus::Enrolled));
        let named_all = InstructorFilter::from("All");
        assert_eq!(names(&filter(&rows, &StatusFilter::All, &named_all)), vec!["LA100"]);
        assert_eq!(InstructorFilter::All.to_string(), "all");
    }

    #[test]
    fn status_filter_parses_user_text() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "Dropped".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(EnrollmentStatus::Dropped))
        );
        assert!("pending".parse::<StatusFilter>().is_err());
    }
}

use std::sync::Arc;

use frontend::api::InMemoryCourseApi;
use frontend::models::Course;
use frontend::shell::{Flow, Shell, Tab};

async fn run_line(shell: &mut Shell, line: &str) -> String {
    assert_eq!(shell.handle_line(line), Flow::Continue, "unexpected quit on '{}'", line);
    shell.settle().await;
    shell.render()
}

fn catalog() -> Vec<Course> {
    vec![
        Course {
            course_name: "CS101".to_string(),
            instructor_id: None,
            instructor_name: "Ada".to_string(),
            instructor_email: Some("ada@x.edu".to_string()),
            duration: 40,
        },
        Course {
            course_name: "MA201".to_string(),
            instructor_id: Some(12),
            instructor_name: "Turing".to_string(),
            instructor_email: None,
            duration: 30,
        },
    ]
}

#[tokio::test]
async fn test_full_enrollment_session() {
    let mut shell = Shell::new(Arc::new(InMemoryCourseApi::new()));

    let screen = run_line(&mut shell, "courses").await;
    assert!(screen.contains("[All Courses]"));
    assert!(screen.contains("No courses available"));

    for line in [
        "set name CS101",
        "set instructor Ada",
        "set email ada@x.edu",
        "set duration 40",
    ] {
        run_line(&mut shell, line).await;
    }
    let screen = run_line(&mut shell, "submit").await;
    assert_eq!(shell.tab(), Tab::Create);
    assert!(screen.contains("Course created successfully!"));

    let screen = run_line(&mut shell, "courses").await;
    assert!(screen.contains("- CS101 | Ada <ada@x.edu> | 40 hours"));

    let screen = run_line(&mut shell, "manage CS101").await;
    assert!(screen.contains("Enrolled Students (0)"));
    assert!(screen.contains("No students enrolled yet"));

    let screen = run_line(&mut shell, "enroll 7 Bob").await;
    assert!(screen.contains("Student enrolled successfully!"));
    assert!(screen.contains("Enrolled Students (1)"));
    assert!(screen.contains("Bob (ID: 7) - Enrolled"));

    let screen = run_line(&mut shell, "student 7").await;
    assert!(screen.contains("My Enrollments (Student ID: 7)"));
    assert!(screen.contains("- CS101 | Ada | 40 hours | Enrolled [drop]"));

    let screen = run_line(&mut shell, "reenroll CS101").await;
    assert!(screen.contains("'CS101' only offers drop"));
    assert!(screen.contains("Enrolled [drop]"));

    let screen = run_line(&mut shell, "drop CS101").await;
    assert!(screen.contains("- CS101 | Ada | 40 hours | Dropped [re-enroll]"));

    let screen = run_line(&mut shell, "manage CS101").await;
    assert!(screen.contains("Bob (ID: 7) - Dropped"));
    assert!(screen.contains("Enrolled Students (1)"));

    let screen = run_line(&mut shell, "delete").await;
    assert!(screen.contains("Delete CS101? type 'yes' to confirm or 'no' to cancel"));
    let screen = run_line(&mut shell, "yes").await;
    assert!(screen.contains("Course deleted successfully"));

    let screen = run_line(&mut shell, "courses").await;
    assert!(screen.contains("No courses available"));

    let screen = run_line(&mut shell, "student 7").await;
    assert!(screen.contains("No enrollments found"));

    assert_eq!(shell.handle_line("quit"), Flow::Quit);
    assert_eq!(shell.in_flight(), 0);
}

#[tokio::test]
async fn test_unknown_course_and_bad_input_are_reported() {
    let mut shell = Shell::new(Arc::new(InMemoryCourseApi::with_courses(catalog())));

    let screen = run_line(&mut shell, "manage NoSuchCourse").await;
    assert!(screen.contains("error: Course not found"));
    assert!(!screen.contains("Enrolled Students"));

    let screen = run_line(&mut shell, "enroll 7 Bob").await;
    assert!(screen.contains("Search for a course first"));

    let screen = run_line(&mut shell, "dance").await;
    assert!(screen.contains("unknown command 'dance'"));

    let screen = run_line(&mut shell, "student abc").await;
    assert!(screen.contains("'abc' is not a student ID"));
    assert!(screen.contains("Please enter a student ID to view enrollments"));

    let screen = run_line(&mut shell, "drop CS101").await;
    assert!(screen.contains("No enrollment in 'CS101'"));
}

#[tokio::test]
async fn test_filters_apply_to_student_view() {
    let api = Arc::new(InMemoryCourseApi::with_courses(catalog()));
    let mut shell = Shell::new(api);

    run_line(&mut shell, "manage CS101").await;
    run_line(&mut shell, "enroll 3 Cleo").await;
    run_line(&mut shell, "manage MA201").await;
    run_line(&mut shell, "enroll 3 Cleo").await;
    run_line(&mut shell, "student 3").await;
    run_line(&mut shell, "drop MA201").await;

    let screen = run_line(&mut shell, "filter status dropped").await;
    assert!(screen.contains("instructors: Ada, Turing"));
    assert!(screen.contains("MA201 | Turing"));
    assert!(!screen.contains("CS101 | Ada"));

    let screen = run_line(&mut shell, "filter instructor Ada").await;
    assert!(screen.contains("No enrollments match the current filters"));

    let screen = run_line(&mut shell, "filter status all").await;
    assert!(screen.contains("CS101 | Ada"));
    assert!(!screen.contains("MA201 | Turing"));
}

#[tokio::test]
async fn test_cancelled_delete_keeps_course() {
    let mut shell = Shell::new(Arc::new(InMemoryCourseApi::with_courses(catalog())));

    run_line(&mut shell, "manage MA201").await;
    run_line(&mut shell, "delete").await;
    let screen = run_line(&mut shell, "no").await;
    assert!(!screen.contains("Delete MA201?"));
    assert!(screen.contains("Instructor ID: 12"));

    let screen = run_line(&mut shell, "yes").await;
    assert!(screen.contains("Nothing to confirm"));

    let screen = run_line(&mut shell, "courses").await;
    assert!(screen.contains("MA201 | Turing (id 12) | 30 hours"));
}

// tests/workflow_tests.rs

mod common;

use chrono::{Duration, Utc};
use common::{TestApp, flash, location, spawn_app};

/// A faculty with a searchable profile and a named college, both logged in.
struct Parties {
    faculty: String,
    faculty_id: i64,
    faculty_user_id: i64,
    college: String,
    college_user_id: i64,
}

async fn faculty_and_college(app: &TestApp) -> Parties {
    let faculty = app.sign_up("rao@example.edu", "faculty").await;
    let response = app
        .post_form(
            "/faculty/profile",
            &faculty,
            &[
                ("full_name", "Dr. Meera Rao"),
                ("qualification", "PhD Mathematics"),
                ("subjects", "Mathematics, Statistics"),
                ("location", "Pune"),
                ("experience_years", "12"),
                ("availability", "Available"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/faculty/dashboard");

    let college = app.sign_up("dean@example.edu", "college").await;
    let response = app
        .post_form(
            "/college/profile",
            &college,
            &[("college_name", "St. Xavier's College"), ("city", "Pune")],
        )
        .await;
    assert_eq!(location(&response), "/college/dashboard");

    Parties {
        faculty,
        faculty_id: app.profile_id("faculty_profiles", "rao@example.edu").await,
        faculty_user_id: app.user_id("rao@example.edu").await,
        college,
        college_user_id: app.user_id("dean@example.edu").await,
    }
}

async fn connect(app: &TestApp, parties: &Parties) -> i64 {
    app.post_form(
        &format!("/college/send-request/{}", parties.faculty_id),
        &parties.college,
        &[("message", "We need a statistics lecturer.")],
    )
    .await;

    let request_id: i64 = sqlx::query_scalar("SELECT id FROM connection_requests")
        .fetch_one(&app.pool)
        .await
        .unwrap();

    let response = app
        .get(
            &format!("/faculty/respond-request/{request_id}/accept"),
            &parties.faculty,
        )
        .await;
    assert_eq!(location(&response), "/faculty/requests");
    request_id
}

async fn schedule(app: &TestApp, parties: &Parties, subject: &str, start: chrono::DateTime<Utc>) -> String {
    let date = start.format("%Y-%m-%d").to_string();
    let time = start.format("%H:%M").to_string();
    let response = app
        .post_form(
            &format!("/college/schedule-class/{}", parties.faculty_id),
            &parties.college,
            &[("subject", subject), ("date", &date), ("time", &time), ("duration", "")],
        )
        .await;
    assert_eq!(location(&response), "/classes");

    sqlx::query_scalar("SELECT secure_token FROM online_classes WHERE subject = ?")
        .bind(subject)
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

async fn class_status(app: &TestApp, token: &str) -> String {
    sqlx::query_scalar("SELECT status FROM online_classes WHERE secure_token = ?")
        .bind(token)
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn search_matches_subject_fragment() {
    let app = spawn_app().await;
    let parties = faculty_and_college(&app).await;
    // Registered but never named: hidden from search.
    app.sign_up("blank@example.edu", "faculty").await;

    let page = app
        .get_json("/college/search-faculty?subject=Math&location=", &parties.college)
        .await;
    let faculties = page["data"]["faculties"].as_array().unwrap();
    assert_eq!(faculties.len(), 1);
    assert_eq!(faculties[0]["full_name"], "Dr. Meera Rao");

    let page = app
        .get_json("/college/search-faculty?subject=Chemistry", &parties.college)
        .await;
    assert!(page["data"]["faculties"].as_array().unwrap().is_empty());

    let page = app
        .get_json("/college/search-faculty?qualification=PhD&location=Pune", &parties.college)
        .await;
    assert_eq!(page["data"]["faculties"].as_array().unwrap().len(), 1);

    let student = app.sign_up("learner@example.edu", "student").await;
    let page = app
        .get_json("/student/search-faculty?subject=Statistics", &student)
        .await;
    assert_eq!(page["data"]["faculties"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn repeated_requests_leave_one_row() {
    let app = spawn_app().await;
    let parties = faculty_and_college(&app).await;
    let path = format!("/college/send-request/{}", parties.faculty_id);

    let first = app.post_form(&path, &parties.college, &[("message", "")]).await;
    assert_eq!(location(&first), "/college/search-faculty");
    assert_eq!(flash(&first).map(|(level, _)| level).as_deref(), Some("success"));

    let second = app.post_form(&path, &parties.college, &[("message", "again")]).await;
    assert_eq!(
        flash(&second),
        Some(("info".to_string(), "Request already sent!".to_string()))
    );

    let (count, message): (i64, String) =
        sqlx::query_as("SELECT COUNT(*), MAX(message) FROM connection_requests")
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
    assert_eq!(message, "I am interested in your profile.");

    let page = app
        .get_json(&format!("/college/view-faculty/{}", parties.faculty_id), &parties.college)
        .await;
    assert_eq!(page["data"]["connection_status"], "Pending");
}

#[tokio::test]
async fn only_the_target_faculty_can_respond() {
    let app = spawn_app().await;
    let parties = faculty_and_college(&app).await;
    app.post_form(
        &format!("/college/send-request/{}", parties.faculty_id),
        &parties.college,
        &[],
    )
    .await;
    let request_id: i64 = sqlx::query_scalar("SELECT id FROM connection_requests")
        .fetch_one(&app.pool)
        .await
        .unwrap();

    let outsider = app.sign_up("other@example.edu", "faculty").await;
    let response = app
        .get(&format!("/faculty/respond-request/{request_id}/accept"), &outsider)
        .await;
    assert_eq!(location(&response), "/dashboard");
    assert_eq!(
        flash(&response),
        Some(("error".to_string(), "Unauthorized!".to_string()))
    );

    let status: String = sqlx::query_scalar("SELECT status FROM connection_requests")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(status, "Pending");

    let page = app.get_json("/faculty/requests", &parties.faculty).await;
    assert_eq!(page["data"]["requests"][0]["college_name"], "St. Xavier's College");

    let response = app
        .get(&format!("/faculty/respond-request/{request_id}/reject"), &parties.faculty)
        .await;
    assert_eq!(
        flash(&response),
        Some(("info".to_string(), "Request rejected.".to_string()))
    );

    // Settled requests stay settled.
    let response = app
        .get(&format!("/faculty/respond-request/{request_id}/accept"), &parties.faculty)
        .await;
    assert_eq!(location(&response), "/faculty/requests");
    assert_eq!(flash(&response).map(|(level, _)| level).as_deref(), Some("error"));

    let status: String = sqlx::query_scalar("SELECT status FROM connection_requests")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(status, "Rejected");
}

#[tokio::test]
async fn chat_opens_after_acceptance() {
    let app = spawn_app().await;
    let parties = faculty_and_college(&app).await;
    let chat_with_faculty = format!("/chat/{}", parties.faculty_user_id);

    let response = app.get(&chat_with_faculty, &parties.college).await;
    assert_eq!(location(&response), "/dashboard");

    connect(&app, &parties).await;

    let response = app
        .post_form(&chat_with_faculty, &parties.college, &[("content", "Hello <b>Dr. Rao</b><script>x</script>")])
        .await;
    assert_eq!(location(&response), chat_with_faculty);

    // Blank messages are dropped.
    app.post_form(&chat_with_faculty, &parties.college, &[("content", "   ")])
        .await;

    let page = app.get_json("/messages", &parties.faculty).await;
    assert_eq!(page["data"]["connections"][0]["display_name"], "St. Xavier's College");
    assert_eq!(page["data"]["connections"][0]["unread"], 1);

    let page = app
        .get_json(&format!("/chat/{}", parties.college_user_id), &parties.faculty)
        .await;
    let messages = page["data"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    let content = messages[0]["content"].as_str().unwrap();
    assert!(content.starts_with("Hello <b>Dr. Rao</b>"));
    assert!(!content.contains("script"));

    let unread: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_messages WHERE is_read = 0")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(unread, 0);

    let student = app.sign_up("learner@example.edu", "student").await;
    let response = app.get(&chat_with_faculty, &student).await;
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn scheduling_requires_an_accepted_connection() {
    let app = spawn_app().await;
    let parties = faculty_and_college(&app).await;
    let path = format!("/college/schedule-class/{}", parties.faculty_id);

    let response = app
        .post_form(
            &path,
            &parties.college,
            &[("subject", "Algebra"), ("date", "2030-01-01"), ("time", "10:00")],
        )
        .await;
    assert_eq!(location(&response), "/dashboard");

    connect(&app, &parties).await;

    let response = app
        .post_form(
            &path,
            &parties.college,
            &[("subject", "Algebra"), ("date", "01/01/2030"), ("time", "10:00")],
        )
        .await;
    assert_eq!(location(&response), path);
    assert_eq!(
        flash(&response),
        Some((
            "error".to_string(),
            "Invalid date or time format. Please try again.".to_string()
        ))
    );

    let classes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM online_classes")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(classes, 0);

    let page = app.get_json(&path, &parties.college).await;
    assert_eq!(page["data"]["default_duration"], 60);
}

#[tokio::test]
async fn join_follows_the_class_window() {
    let app = spawn_app().await;
    let parties = faculty_and_college(&app).await;
    connect(&app, &parties).await;

    let now = Utc::now();
    let live = schedule(&app, &parties, "Live Algebra", now).await;
    let future = schedule(&app, &parties, "Future Algebra", now + Duration::days(2)).await;
    let past = schedule(&app, &parties, "Past Algebra", now - Duration::days(2)).await;

    let (duration, link): (i64, String) = sqlx::query_as(
        "SELECT duration_minutes, meeting_link FROM online_classes WHERE secure_token = ?",
    )
    .bind(&live)
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(duration, 60);
    assert_eq!(link, format!("http://localhost:5000/join-class/{live}"));

    let page = app.get_json(&format!("/join-class/{live}"), &parties.faculty).await;
    assert_eq!(page["data"]["online_class"]["subject"], "Live Algebra");
    assert_eq!(class_status(&app, &live).await, "Scheduled");

    let response = app.get(&format!("/join-class/{future}"), &parties.college).await;
    assert_eq!(location(&response), "/classes");
    assert_eq!(
        flash(&response),
        Some(("info".to_string(), "Class has not started yet.".to_string()))
    );
    assert_eq!(class_status(&app, &future).await, "Scheduled");

    let response = app.get(&format!("/join-class/{past}"), &parties.college).await;
    assert_eq!(
        flash(&response),
        Some(("error".to_string(), "This class link has expired.".to_string()))
    );
    assert_eq!(class_status(&app, &past).await, "Completed");

    let response = app.get("/join-class/no-such-token", &parties.college).await;
    assert_eq!(response.status().as_u16(), 404);

    let page = app.get_json("/classes", &parties.faculty).await;
    assert_eq!(page["data"]["classes"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn students_join_by_institution() {
    let app = spawn_app().await;
    let parties = faculty_and_college(&app).await;
    connect(&app, &parties).await;
    let live = schedule(&app, &parties, "Live Algebra", Utc::now()).await;
    let join = format!("/join-class/{live}");

    let unaffiliated = app.sign_up("free@example.edu", "student").await;
    let response = app.get(&join, &unaffiliated).await;
    assert_eq!(response.status().as_u16(), 200);

    let enrolled = app.sign_up("enrolled@example.edu", "student").await;
    app.post_form(
        "/student/profile",
        &enrolled,
        &[("full_name", "Asha"), ("college_name", " st. xavier's college")],
    )
    .await;
    let response = app.get(&join, &enrolled).await;
    assert_eq!(response.status().as_u16(), 200);

    let elsewhere = app.sign_up("elsewhere@example.edu", "student").await;
    app.post_form(
        "/student/profile",
        &elsewhere,
        &[("full_name", "Ravi"), ("college_name", "Loyola College")],
    )
    .await;
    let response = app.get(&join, &elsewhere).await;
    assert_eq!(location(&response), "/dashboard");
    assert_eq!(
        flash(&response),
        Some((
            "error".to_string(),
            "You are not authorized to join this class.".to_string()
        ))
    );

    let page = app.get_json("/classes", &elsewhere).await;
    assert_eq!(page["data"]["classes"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn posted_requirements_reach_faculty() {
    let app = spawn_app().await;
    let parties = faculty_and_college(&app).await;

    let response = app
        .post_form(
            "/college/post-requirement",
            &parties.college,
            &[
                ("subject", "Mathematics"),
                ("description", "Evening batch <em>only</em>"),
                ("experience_required", "3"),
                ("location", "Pune"),
                ("employment_type", "Part-time"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/college/dashboard");

    let page = app.get_json("/faculty/dashboard", &parties.faculty).await;
    assert_eq!(page["data"]["is_complete"], true);
    let requirements = page["data"]["requirements"].as_array().unwrap();
    assert_eq!(requirements.len(), 1);
    assert_eq!(requirements[0]["subject"], "Mathematics");
    assert_eq!(requirements[0]["college_name"], "St. Xavier's College");
    assert_eq!(requirements[0]["status"], "Open");

    // The public board needs no session.
    let board: serde_json::Value = app
        .client
        .get(format!("{}/requirements", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(board["data"]["requirements"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn chat_stays_closed_until_accepted() {
    let app = spawn_app().await;
    let parties = faculty_and_college(&app).await;
    let chat_with_faculty = format!("/chat/{}", parties.faculty_user_id);
    let chat_with_college = format!("/chat/{}", parties.college_user_id);

    app.post_form(
        &format!("/college/send-request/{}", parties.faculty_id),
        &parties.college,
        &[("message", "Open to a term?")],
    )
    .await;
    let request_id: i64 = sqlx::query_scalar("SELECT id FROM connection_requests")
        .fetch_one(&app.pool)
        .await
        .unwrap();

    // Pending: closed from both sides.
    let response = app.get(&chat_with_faculty, &parties.college).await;
    assert_eq!(location(&response), "/dashboard");
    let response = app.get(&chat_with_college, &parties.faculty).await;
    assert_eq!(location(&response), "/dashboard");
    let response = app
        .post_form(&chat_with_college, &parties.faculty, &[("content", "Hello")])
        .await;
    assert_eq!(location(&response), "/dashboard");

    app.get(&format!("/faculty/respond-request/{request_id}/reject"), &parties.faculty)
        .await;

    // Rejected: still closed.
    let response = app.get(&chat_with_faculty, &parties.college).await;
    assert_eq!(location(&response), "/dashboard");
    assert_eq!(flash(&response).map(|(level, _)| level).as_deref(), Some("error"));
    let response = app.get(&chat_with_college, &parties.faculty).await;
    assert_eq!(location(&response), "/dashboard");

    let messages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_messages")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(messages, 0);
}

#[tokio::test]
async fn listings_show_newest_first() {
    let app = spawn_app().await;
    let parties = faculty_and_college(&app).await;

    for subject in ["Algebra", "Geometry"] {
        let response = app
            .post_form("/college/post-requirement", &parties.college, &[("subject", subject)])
            .await;
        assert_eq!(location(&response), "/college/dashboard");
    }

    for (path, session) in [
        ("/college/dashboard", &parties.college),
        ("/faculty/dashboard", &parties.faculty),
    ] {
        let page = app.get_json(path, session).await;
        let requirements = page["data"]["requirements"].as_array().unwrap();
        assert_eq!(requirements.len(), 2, "{path}");
        assert_eq!(requirements[0]["subject"], "Geometry", "{path}");
        assert_eq!(requirements[1]["subject"], "Algebra", "{path}");
    }

    let student = app.sign_up("learner@example.edu", "student").await;
    for subject in ["Chemistry", "Biology"] {
        let response = app
            .post_form("/student/post-request", &student, &[("subject", subject)])
            .await;
        assert_eq!(location(&response), "/student/dashboard");
    }

    let page = app.get_json("/student/dashboard", &student).await;
    let requests = page["data"]["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["subject"], "Biology");
    assert_eq!(requests[1]["subject"], "Chemistry");

    let board: serde_json::Value = app
        .client
        .get(format!("{}/student-requests", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let requests = board["data"]["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["subject"], "Biology");
}

#[tokio::test]
async fn subject_search_is_case_sensitive() {
    let app = spawn_app().await;
    let parties = faculty_and_college(&app).await;

    let physicist = app.sign_up("sen@example.edu", "faculty").await;
    let response = app
        .post_form(
            "/faculty/profile",
            &physicist,
            &[
                ("full_name", "Dr. Arun Sen"),
                ("qualification", "MSc Physics"),
                ("subjects", "Physics"),
                ("location", "Pune"),
                ("experience_years", "5"),
                ("availability", "Available"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/faculty/dashboard");

    let page = app
        .get_json("/college/search-faculty?subject=Math", &parties.college)
        .await;
    let faculties = page["data"]["faculties"].as_array().unwrap();
    assert_eq!(faculties.len(), 1);
    assert_eq!(faculties[0]["full_name"], "Dr. Meera Rao");

    let page = app
        .get_json("/college/search-faculty?subject=math", &parties.college)
        .await;
    assert!(page["data"]["faculties"].as_array().unwrap().is_empty());

    let page = app
        .get_json("/college/search-faculty?location=Pune", &parties.college)
        .await;
    assert_eq!(page["data"]["faculties"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn bodyless_request_sends_default_message() {
    let app = spawn_app().await;
    let parties = faculty_and_college(&app).await;

    let response = app
        .client
        .post(format!(
            "{}/college/send-request/{}",
            app.address, parties.faculty_id
        ))
        .header(reqwest::header::COOKIE, format!("session={}", parties.college))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(location(&response), "/college/search-faculty");
    assert_eq!(flash(&response).map(|(level, _)| level).as_deref(), Some("success"));

    let (count, message): (i64, String) =
        sqlx::query_as("SELECT COUNT(*), MAX(message) FROM connection_requests")
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
    assert_eq!(message, "I am interested in your profile.");
}

#[tokio::test]
async fn whitespace_only_required_fields_are_rejected() {
    let app = spawn_app().await;
    let parties = faculty_and_college(&app).await;

    let response = app
        .post_form(
            "/college/post-requirement",
            &parties.college,
            &[("subject", "   "), ("location", "Pune")],
        )
        .await;
    assert_eq!(location(&response), "/college/post-requirement");
    assert_eq!(flash(&response).map(|(level, _)| level).as_deref(), Some("error"));
    let requirements: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM requirements")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(requirements, 0);

    let newcomer = app.sign_up("new@example.edu", "faculty").await;
    let response = app
        .post_form("/faculty/profile", &newcomer, &[("full_name", "  "), ("subjects", "Art")])
        .await;
    assert_eq!(location(&response), "/faculty/profile");
    assert_eq!(flash(&response).map(|(level, _)| level).as_deref(), Some("error"));
    let full_name: String = sqlx::query_scalar(
        "SELECT p.full_name FROM faculty_profiles p JOIN users u ON u.id = p.user_id WHERE u.email = ?",
    )
    .bind("new@example.edu")
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(full_name, "");

    // Surrounding whitespace is dropped from what is stored.
    app.post_form("/college/post-requirement", &parties.college, &[("subject", "  Algebra ")])
        .await;
    let subject: String = sqlx::query_scalar("SELECT subject FROM requirements")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(subject, "Algebra");
}

#[tokio::test]
async fn malformed_ids_are_not_found() {
    let app = spawn_app().await;
    let parties = faculty_and_college(&app).await;

    for path in ["/chat/abc", "/college/view-faculty/xyz", "/college/schedule-class/1.5"] {
        let response = app.get(path, &parties.college).await;
        assert_eq!(response.status().as_u16(), 404, "{path}");
    }

    let response = app.get("/faculty/respond-request/x/accept", &parties.faculty).await;
    assert_eq!(response.status().as_u16(), 404);
}

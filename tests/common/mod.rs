// tests/common/mod.rs

#![allow(dead_code)]

use guest_faculty::{config::Config, routes, state::AppState};
use reqwest::{Response, header};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port backed by a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    // A single connection that never expires keeps the in-memory
    // database alive for the whole test.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        session_secret: "test_secret_for_integration_tests".to_string(),
        session_ttl: 600,
        public_base_url: "http://localhost:5000/".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        schedule_offset: chrono::FixedOffset::east_opt(0).unwrap(),
        allow_unaffiliated_student_join: true,
        rust_log: "error".to_string(),
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address,
        pool,
        client,
    }
}

/// Value of a cookie set by the response, if any.
pub fn set_cookie(response: &Response, name: &str) -> Option<String> {
    response
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// (level, message) of the flash the response leaves behind.
pub fn flash(response: &Response) -> Option<(String, String)> {
    let value = set_cookie(response, "flash")?;
    let mut level = None;
    let mut message = None;
    for (key, val) in url::form_urlencoded::parse(value.as_bytes()) {
        match key.as_ref() {
            "level" => level = Some(val.into_owned()),
            "message" => message = Some(val.into_owned()),
            _ => {}
        }
    }
    Some((level?, message?))
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

impl TestApp {
    pub async fn register(&self, email: &str, password: &str, role: &str) -> Response {
        self.client
            .post(format!("{}/register", self.address))
            .form(&[("email", email), ("password", password), ("role", role)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str, role: &str) -> Response {
        self.client
            .post(format!("{}/login", self.address))
            .form(&[("email", email), ("password", password), ("role", role)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Registers and logs in, returning the session token.
    pub async fn sign_up(&self, email: &str, role: &str) -> String {
        let response = self.register(email, "password123", role).await;
        assert_eq!(response.status().as_u16(), 303);
        assert_eq!(location(&response), "/login");

        let response = self.login(email, "password123", role).await;
        assert_eq!(location(&response), "/dashboard");
        set_cookie(&response, "session").expect("login did not set a session cookie")
    }

    pub async fn get(&self, path: &str, session: &str) -> Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .header(header::COOKIE, format!("session={session}"))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_form(&self, path: &str, session: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .header(header::COOKIE, format!("session={session}"))
            .form(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_json(&self, path: &str, session: &str) -> serde_json::Value {
        let response = self.get(path, session).await;
        assert_eq!(response.status().as_u16(), 200, "GET {path}");
        response.json().await.expect("page was not JSON")
    }

    pub async fn user_id(&self, email: &str) -> i64 {
        sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn profile_id(&self, table: &str, email: &str) -> i64 {
        sqlx::query_scalar(&format!(
            "SELECT p.id FROM {table} p JOIN users u ON u.id = p.user_id WHERE u.email = ?"
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }
}

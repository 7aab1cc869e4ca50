#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use diversity_tickets_server::auth::issue_token;
use diversity_tickets_server::config::Config;
use diversity_tickets_server::engine::{EventEngine, FixedClock};
use diversity_tickets_server::mailer::Outbox;
use diversity_tickets_server::models::{ApplicationProcess, Event, User};
use diversity_tickets_server::routes::create_routes;
use diversity_tickets_server::state::AppState;
use diversity_tickets_server::store::{EventStore, MemoryStore, UserStore};

pub const ADMIN_EMAIL: &str = "admin@woo.hoo";
const JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub outbox: Arc<Outbox>,
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

pub fn today() -> NaiveDate {
    now().date_naive()
}

pub fn days(n: i64) -> Duration {
    Duration::days(n)
}

/// Full router over in-memory collaborators and a clock frozen at [`now`].
pub fn build_test_app() -> TestApp {
    let config = Config {
        admin_email: ADMIN_EMAIL.to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        ..Config::default()
    };
    let store = Arc::new(MemoryStore::new());
    let outbox = Arc::new(Outbox::new());
    let engine = EventEngine::new(
        store.clone(),
        store.clone(),
        outbox.clone(),
        config.admin_email.clone(),
    );

    let state = AppState {
        config: Arc::new(config),
        engine: Arc::new(engine),
        users: store.clone(),
        clock: Arc::new(FixedClock(now())),
    };

    TestApp {
        router: create_routes(state),
        store,
        outbox,
    }
}

impl TestApp {
    pub async fn make_user(&self, email: &str, admin: bool) -> User {
        let user = User::new("Klaus", email, admin);
        self.store.save_user(&user).await.unwrap()
    }

    pub async fn make_admin(&self) -> User {
        self.make_user("admin@example.com", true).await
    }

    /// Save an event that is upcoming and open for applications, adjusted by `customize`.
    pub async fn make_event(&self, customize: impl FnOnce(&mut Event)) -> Event {
        let mut event = Event {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            name: "Event".to_string(),
            description: Some("Ruby conference".to_string()),
            website: Some("http://www.woo.hoo".to_string()),
            city: Some("Berlin".to_string()),
            country: Some("Germany".to_string()),
            number_of_tickets: Some(10),
            start_date: today() + days(14),
            end_date: today() + days(15),
            deadline: today() + days(7),
            application_process: ApplicationProcess::SelectionByTravis,
            application_link: None,
            data_protection_confirmation: false,
            approved: false,
            created_at: now(),
            updated_at: now(),
        };
        customize(&mut event);
        self.store.save(&event).await.unwrap()
    }

    pub async fn make_past_event(&self) -> Event {
        self.make_event(|e| {
            e.name = "Other".to_string();
            e.start_date = today() - days(7);
            e.end_date = today() - days(7);
            e.deadline = today() - days(14);
            e.approved = true;
        })
        .await
    }

    pub async fn reload(&self, event: &Event) -> Event {
        self.store.find(event.id).await.unwrap()
    }

    pub async fn get(&self, uri: &str, user: Option<&User>) -> Response<Body> {
        self.send(Method::GET, uri, user, None).await
    }

    pub async fn post(&self, uri: &str, user: Option<&User>, body: Value) -> Response<Body> {
        self.send(Method::POST, uri, user, Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: Option<&User>, body: Value) -> Response<Body> {
        self.send(Method::PUT, uri, user, Some(body)).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<&User>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            let token = issue_token(user.id, JWT_SECRET, Duration::hours(1)).unwrap();
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn event_form_params() -> Value {
    json!({
        "name": "Event",
        "description": "Ruby conference",
        "website": "http://www.woo.hoo",
        "city": "Berlin",
        "country": "Germany",
        "number_of_tickets": 10,
        "start_date": (today() + days(14)).to_string(),
        "end_date": (today() + days(15)).to_string(),
        "deadline": (today() + days(7)).to_string(),
        "application_process": "selection_by_travis",
    })
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(LOCATION)
        .expect("response should redirect")
        .to_str()
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

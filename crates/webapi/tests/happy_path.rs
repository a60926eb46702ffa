use std::sync::Arc;

use authn::SessionSecret;
use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use webapi::{AppState, Backend};

fn log_backend() -> (Backend, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = logdb::Store::open(dir.path().join("data.log")).unwrap();
    store.index::<domain::Course>("by_owner", |c| logdb::Id::new(&c.owner_id)).unwrap();
    store.index::<domain::Lesson>("by_course", |l| logdb::Id::new(&l.course_id)).unwrap();
    store.index::<domain::Enrolment>("by_course", |e| logdb::Id::new(&e.course_id)).unwrap();
    store.index::<domain::Enrolment>("by_user", |e| logdb::Id::new(&e.user_id)).unwrap();
    store.index::<domain::Homework>("by_learner", |h| logdb::Id::new(&h.learner_id)).unwrap();
    store.index::<domain::User>("by_email", |u| logdb::Id::new(&u.email)).unwrap();
    (Backend::Log(Arc::new(store)), dir)
}

fn state(backend: Backend) -> AppState {
    AppState { backend, jwt_secret: SessionSecret(Arc::new(authn::generate_secret())) }
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value, cookie: Option<&str>) -> Request<axum::body::Body> {
    let mut builder = Request::builder().method(method).uri(uri).header("content-type", "application/json");
    if let Some(c) = cookie {
        builder = builder.header("cookie", format!("session={c}"));
    }
    builder.body(axum::body::Body::from(body.to_string())).unwrap()
}

fn session_cookie(resp: &axum::response::Response) -> String {
    let set_cookie = resp.headers().get(axum::http::header::SET_COOKIE).unwrap().to_str().unwrap();
    set_cookie.split(';').next().unwrap().strip_prefix("session=").unwrap().to_string()
}

#[tokio::test]
async fn signup_login_create_course_enrol_and_submit_homework() {
    let (backend, _dir) = log_backend();
    let app = webapi::router(state(backend));

    let signup = json_request(
        "POST",
        "/auth/signup",
        json!({ "name": "Ada", "email": "ada@example.com", "password": "hunter2hunter" }),
        None,
    );
    let resp = app.clone().oneshot(signup).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = session_cookie(&resp);
    let signup_body = json_body(resp).await;
    let user_id = signup_body["id"].as_str().unwrap().to_string();

    let login = json_request("POST", "/auth/login", json!({ "email": "ada@example.com", "password": "hunter2hunter" }), None);
    let resp = app.clone().oneshot(login).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let create_course = json_request("POST", "/courses", json!({ "name": "Intro to Rust" }), Some(&cookie));
    let resp = app.clone().oneshot(create_course).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let course = json_body(resp).await;
    let course_id = course["id"].as_str().unwrap().to_string();
    assert_eq!(course["owner_id"], user_id);

    let enrol = json_request(
        "POST",
        &format!("/courses/{course_id}/enrolments"),
        json!({ "user_id": user_id }),
        Some(&cookie),
    );
    let resp = app.clone().oneshot(enrol).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let list_enrolments = Request::builder()
        .method("GET")
        .uri(format!("/courses/{course_id}/enrolments"))
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(list_enrolments).await.unwrap();
    let enrolments = json_body(resp).await;
    assert_eq!(enrolments.as_array().unwrap().len(), 1);

    let submit_homework = json_request(
        "POST",
        &format!("/users/{user_id}/homework"),
        json!({ "text": "fn main() {}" }),
        Some(&cookie),
    );
    let resp = app.clone().oneshot(submit_homework).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let list_homework =
        Request::builder().method("GET").uri(format!("/users/{user_id}/homework")).body(axum::body::Body::empty()).unwrap();
    let resp = app.oneshot(list_homework).await.unwrap();
    let homework = json_body(resp).await;
    assert_eq!(homework.as_array().unwrap().len(), 1);
    assert_eq!(homework[0]["text"], "fn main() {}");
}

#[tokio::test]
async fn duplicate_email_signup_is_rejected() {
    let (backend, _dir) = log_backend();
    let app = webapi::router(state(backend));

    let first = json_request("POST", "/auth/signup", json!({ "name": "Ada", "email": "ada@example.com", "password": "hunter2hunter" }), None);
    let resp = app.clone().oneshot(first).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let second = json_request(
        "POST",
        "/auth/signup",
        json!({ "name": "Someone Else", "email": "ada@example.com", "password": "different" }),
        None,
    );
    let resp = app.oneshot(second).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn homework_submission_requires_authentication() {
    let (backend, _dir) = log_backend();
    let app = webapi::router(state(backend));

    let req = json_request("POST", "/users/user-ghost1234/homework", json!({ "text": "x" }), None);
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, MoneyCents, Role};
use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> (Router, Arc<Engine>) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .platform_account("platform")
        .build()
        .await
        .unwrap();
    engine
        .create_user("platform", "Lectern", Role::Admin)
        .await
        .unwrap();
    engine
        .create_user("alice", "Alice", Role::Instructor)
        .await
        .unwrap();
    engine.create_user("bob", "Bob", Role::Student).await.unwrap();

    let engine = Arc::new(engine);
    let state = ServerState {
        engine: engine.clone(),
    };
    (router(state), engine)
}

fn request(method: &str, uri: &str, caller: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-caller-id", caller)
        .header("content-type", "application/json");
    let body = body.map_or_else(Body::empty, |v| Body::from(v.to_string()));
    builder.body(body).unwrap()
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn unknown_caller_is_unauthorized() {
    let (app, _engine) = app().await;

    let res = app
        .clone()
        .oneshot(request("GET", "/cart", "mallory", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .oneshot(
            Request::builder()
                .uri("/cart")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["kind"], "bad_request");
}

#[tokio::test]
async fn malformed_withdrawals_cursor_is_bad_request() {
    let (app, _engine) = app().await;

    let res = app
        .oneshot(request("GET", "/withdrawals?cursor=garbage", "alice", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["kind"], "invalid_cursor");
}

#[tokio::test]
async fn cart_checkout_and_withdraw_flow() {
    let (app, engine) = app().await;
    let course = engine
        .create_course("alice", "Rust", MoneyCents::new(100_00))
        .await
        .unwrap();

    let res = app
        .clone()
        .oneshot(request(
            "POST",
            "/cart",
            "bob",
            Some(json!({ "course_id": course.id })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .clone()
        .oneshot(request("POST", "/checkout", "bob", Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["total_charged_minor"], 100_00);
    assert_eq!(body["unsettled_platform_share_minor"], 0);
    assert_eq!(body["payments"][0]["instructor_share_minor"], 80_00);

    let res = app
        .clone()
        .oneshot(request(
            "POST",
            "/withdrawals",
            "alice",
            Some(json!({ "amount_minor": 90_00, "destination": "alice@example.com" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(res).await["kind"], "insufficient_balance");

    let res = app
        .clone()
        .oneshot(request(
            "POST",
            "/withdrawals",
            "alice",
            Some(json!({ "amount_minor": 30_00, "destination": "alice@example.com" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(json_body(res).await["new_balance_minor"], 50_00);

    let res = app
        .clone()
        .oneshot(request("GET", "/withdrawals?limit=10", "alice", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["withdrawals"].as_array().unwrap().len(), 1);
    assert!(body["next_cursor"].is_null());

    let res = app
        .oneshot(request("GET", "/earnings", "alice", None))
        .await
        .unwrap();
    let body = json_body(res).await;
    assert_eq!(body["balance_minor"], 50_00);
    assert_eq!(body["courses"][0]["student_count"], 1);
}

#[tokio::test]
async fn empty_checkout_reports_stable_kind() {
    let (app, _engine) = app().await;

    let res = app
        .oneshot(request("POST", "/checkout", "bob", Some(json!({}))))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(res).await;
    assert_eq!(body["kind"], "empty_cart");
}

#[tokio::test]
async fn paid_course_deletion_is_a_conflict() {
    let (app, engine) = app().await;
    let course = engine
        .create_course("alice", "Sold", MoneyCents::new(10_00))
        .await
        .unwrap();
    engine.add_to_cart("bob", course.id).await.unwrap();
    engine
        .checkout(engine::CheckoutCmd::all("bob"))
        .await
        .unwrap();

    let res = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/courses/{}", course.id),
            "alice",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(res).await["kind"], "has_active_payments");

    let draft = engine
        .create_course("alice", "Draft", MoneyCents::new(10_00))
        .await
        .unwrap();
    let res = app
        .oneshot(request(
            "DELETE",
            &format!("/courses/{}", draft.id),
            "alice",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

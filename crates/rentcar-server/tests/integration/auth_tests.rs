use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{Method, StatusCode};
use axum::routing::get as get_route;
use serde_json::json;

use rentcar_core::{MemoryDenylist, TokenService};
use rentcar_server::auth::Guard;

use crate::integration::common::{
    Options, TEST_SECRET, get, post, request, sample_car, setup_test_app, setup_test_app_with,
};

#[tokio::test]
async fn missing_token_is_rejected_before_the_handler() {
    let app = setup_test_app();
    let (_, token) = app.admin();

    let (status, json) = app
        .send(request(
            Method::POST,
            "/api/car/add",
            None,
            Some(json!({"name": "Never stored"})),
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized: Token not provided");
    assert_eq!(json["status"]["code"], 401);
    assert_eq!(json["status"]["is_success"], false);
    assert_eq!(app.store.car_count(), 0);

    // A non-bearer scheme counts as no token at all.
    let mut basic = get("/api/car/all", &token);
    basic
        .headers_mut()
        .insert("authorization", "Basic YWRtaW46YWRtaW4=".parse().unwrap());
    let (status, json) = app.send(basic).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized: Token not provided");
}

#[tokio::test]
async fn garbage_token_could_not_be_parsed() {
    let app = setup_test_app();

    let (status, json) = app.send(get("/api/user/current-user", "not-a-jwt")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized: Token could not be parsed");
}

#[tokio::test]
async fn foreign_signature_is_invalid() {
    let app = setup_test_app();
    let (user, _) = app.customer();
    let forger = TokenService::new(
        b"somebody-elses-secret-0123456789abcdef",
        Duration::from_secs(3600),
        Arc::new(MemoryDenylist::new()),
    );
    let forged = forger.issue(user.id).unwrap().token;

    let (status, json) = app.send(get("/api/user/current-user", &forged)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized: Token is invalid");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = setup_test_app_with(Options {
        ttl: Duration::from_secs(1),
        ..Default::default()
    });
    let (_, token) = app.customer();

    let (status, _) = app.send(get("/api/user/current-user", &token)).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(2100)).await;

    let (status, json) = app.send(get("/api/user/current-user", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized: Token has expired");
}

#[tokio::test]
async fn deleted_user_is_unauthenticated() {
    let app = setup_test_app();
    let (user, token) = app.customer();
    app.store.remove_user(user.id);

    let (status, json) = app.send(get("/api/user/current-user", &token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized: User not found");
}

#[tokio::test]
async fn denylist_outage_is_an_internal_error() {
    let app = setup_test_app();
    let (_, token) = app.customer();
    app.denylist.set_failing(true);

    let (status, json) = app.send(get("/api/user/current-user", &token)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "An error occurred while parsing the token");
}

#[tokio::test]
async fn logout_invalidates_the_token() {
    let app = setup_test_app();
    let (_, token) = app.customer();

    let (status, json) = app.send(post("/api/user/logout", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "successfully logged out");
    assert!(json["data"].is_null());

    let (status, json) = app.send(get("/api/user/current-user", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized: Token is invalid");
}

#[tokio::test]
async fn logout_and_refresh_with_the_memory_denylist() {
    let app = setup_test_app_with(Options {
        refresh_revokes_previous: true,
        memory_denylist: true,
        ..Default::default()
    });
    let (user, token) = app.customer();

    let (status, json) = app.send(post("/api/user/refresh", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let fresh = json["data"]["token"].as_str().unwrap().to_string();

    let (status, json) = app.send(get("/api/user/current-user", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized: Token is invalid");

    let (status, json) = app.send(get("/api/user/current-user", &fresh)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], user.id);

    let (status, json) = app.send(post("/api/user/logout", Some(&fresh), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "successfully logged out");

    let (status, json) = app.send(get("/api/user/current-user", &fresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized: Token is invalid");
}

#[tokio::test]
async fn logout_reports_revocation_failure() {
    let app = setup_test_app();
    let (_, token) = app.customer();
    app.denylist.set_failing_writes(true);

    let (status, json) = app.send(post("/api/user/logout", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Failed to log out");

    app.denylist.set_failing_writes(false);
    let (status, _) = app.send(get("/api/user/current-user", &token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_issues_a_working_token_and_keeps_the_old_one_by_default() {
    let app = setup_test_app();
    let (user, token) = app.customer();

    let (status, json) = app.send(post("/api/user/refresh", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Success");
    assert_eq!(json["data"]["token_type"], "bearer");
    assert_eq!(json["data"]["expires_in"], 3600);
    assert_eq!(json["data"]["user"]["id"], user.id);

    let fresh = json["data"]["token"].as_str().unwrap().to_string();
    assert_ne!(fresh, token);
    let (status, json) = app.send(get("/api/user/current-user", &fresh)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], user.id);

    let (status, _) = app.send(get("/api/user/current-user", &token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_can_revoke_the_previous_token() {
    let app = setup_test_app_with(Options {
        refresh_revokes_previous: true,
        ..Default::default()
    });
    let (_, token) = app.customer();

    let (status, json) = app.send(post("/api/user/refresh", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let fresh = json["data"]["token"].as_str().unwrap().to_string();

    let (status, json) = app.send(get("/api/user/current-user", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized: Token is invalid");

    let (status, _) = app.send(get("/api/user/current-user", &fresh)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_routes_reject_other_roles() {
    let app = setup_test_app();
    let (_, customer) = app.customer();
    let body = json!({
        "name": "Honda Brio",
        "year": 2023,
        "plate_number": "B 7 BRI",
        "type_id": 3,
        "passenger_capacity": 5,
        "daily_rate": 250000,
        "status_id": 1,
        "transmission": "automatic"
    });

    let (status, json) = app.send(post("/api/car/add", Some(&customer), body)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "You are not authorized to access this endpoint");
    assert_eq!(app.store.car_count(), 0);
}

#[tokio::test]
async fn role_names_match_case_sensitively() {
    let app = setup_test_app();
    app.store.add_role(3, "Admin");
    let (_, shouty) = app.login_as("shouty@rentcar.io", 3);
    let (_, admin) = app.admin();
    let car = app.store.seed_car(sample_car(1, 1));
    let uri = format!("/api/car/delete/{}", car.id);

    let (status, _) = app
        .send(request(Method::DELETE, &uri, Some(&shouty), None))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.store.car_count(), 1);

    let (status, json) = app
        .send(request(Method::DELETE, &uri, Some(&admin), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Car deleted successfully");
    assert_eq!(app.store.car_count(), 0);
}

#[tokio::test]
async fn unknown_role_id_is_forbidden() {
    let app = setup_test_app();
    let (_, orphan) = app.login_as("orphan@rentcar.io", 42);

    let (status, json) = app
        .send(post("/api/car/add", Some(&orphan), json!({"name": "x"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "You are not authorized to access this endpoint");

    // Plain authenticated routes do not care about the role.
    let (status, _) = app.send(get("/api/car/all", &orphan)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[test]
#[should_panic(expected = "requires .authenticated()")]
fn role_guard_without_authentication_panics() {
    let app = setup_test_app();
    let routes = Router::new().route("/secret", get_route(|| async { "secret" }));

    let _ = Guard::new().role("admin").apply(routes, &app.state);
}

#[tokio::test]
async fn token_secret_matches_the_test_fixture() {
    let app = setup_test_app();
    let (user, token) = app.customer();
    let verifier = TokenService::new(
        TEST_SECRET,
        Duration::from_secs(3600),
        Arc::new(MemoryDenylist::new()),
    );

    assert_eq!(verifier.verify(&token).await.unwrap(), user.id);
    assert_eq!(app.state.tokens.verify(&token).await.unwrap(), user.id);
}

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::integration::common::{get, patch, post, request, sample_car, setup_test_app};

fn avanza() -> Value {
    json!({
        "name": "Toyota Avanza",
        "year": 2022,
        "plate_number": "D 1234 ABC",
        "type_id": 2,
        "passenger_capacity": 7,
        "daily_rate": 350000,
        "photo_url": "https://cdn.rentcar.io/avanza.jpg",
        "status_id": 1,
        "transmission": "manual"
    })
}

#[tokio::test]
async fn create_then_fetch_round_trips_every_field() {
    let app = setup_test_app();
    let (_, token) = app.admin();
    let input = avanza();

    let (status, json) = app.send(post("/api/car/add", Some(&token), input.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "New car added successfully");
    assert_eq!(json["status"]["code"], 201);
    let id = json["data"]["id"].as_str().unwrap().to_string();

    let (status, json) = app.send(get(&format!("/api/car/{id}"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Success");
    for (field, value) in input.as_object().unwrap() {
        assert_eq!(&json["data"][field], value, "field {field} differs");
    }
}

#[tokio::test]
async fn create_accepts_numeric_strings() {
    let app = setup_test_app();
    let (_, token) = app.admin();
    let mut input = avanza();
    input["year"] = json!("2019");
    input["daily_rate"] = json!("275000");

    let (status, json) = app.send(post("/api/car/add", Some(&token), input)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["year"], 2019);
    assert_eq!(json["data"]["daily_rate"], 275000);
}

#[tokio::test]
async fn create_reports_field_errors_without_writing() {
    let app = setup_test_app();
    let (_, token) = app.admin();
    let mut input = avanza();
    input["type_id"] = json!(99);
    input["transmission"] = json!("cvt");
    input.as_object_mut().unwrap().remove("name");

    let (status, json) = app.send(post("/api/car/add", Some(&token), input)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Validation Failed");
    assert_eq!(json["data"]["name"][0], "The name field is required.");
    assert_eq!(json["data"]["type_id"][0], "The selected type id is invalid.");
    assert_eq!(
        json["data"]["transmission"][0],
        "The selected transmission is invalid."
    );
    assert_eq!(app.store.car_count(), 0);
}

#[tokio::test]
async fn malformed_json_is_a_validation_failure() {
    let app = setup_test_app();
    let (_, token) = app.admin();
    let mut bad = request(Method::POST, "/api/car/add", Some(&token), None);
    *bad.body_mut() = axum::body::Body::from("{\"name\": ");

    let (status, json) = app.send(bad).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Validation Failed");
}

#[tokio::test]
async fn fetch_missing_car_is_not_found() {
    let app = setup_test_app();
    let (_, token) = app.customer();

    let (status, json) = app
        .send(get(&format!("/api/car/{}", Uuid::new_v4()), &token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Data not found");
    assert!(json["data"].is_null());

    let (status, json) = app.send(get("/api/car/not-a-uuid", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Data not found");
}

#[tokio::test]
async fn list_all_is_no_content_when_empty() {
    let app = setup_test_app();
    let (_, token) = app.customer();

    let (status, json) = app.send(get("/api/car/all", &token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(json.is_null());

    app.store.seed_car(sample_car(1, 1));
    app.store.seed_car(sample_car(2, 1));

    let (status, json) = app.send(get("/api/car/all", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn category_with_no_cars_is_success_with_null_data() {
    let app = setup_test_app();
    let (_, token) = app.customer();
    app.store.seed_car(sample_car(1, 1));

    let (status, json) = app.send(get("/api/car/category/3", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"]["is_success"], true);
    assert_eq!(json["message"], "There is no car in this category");
    assert!(json["data"].is_null());

    let (status, json) = app.send(get("/api/car/category/1", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn category_must_reference_an_existing_type() {
    let app = setup_test_app();
    let (_, token) = app.customer();

    let (status, json) = app.send(get("/api/car/category/abc", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid category ID");
    assert_eq!(json["data"]["id"][0], "The id must be an integer.");

    let (status, json) = app.send(get("/api/car/category/99", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid category ID");
    assert_eq!(json["data"]["id"][0], "The selected id is invalid.");
}

#[tokio::test]
async fn status_filter() {
    let app = setup_test_app();
    let (_, token) = app.customer();
    app.store.seed_car(sample_car(1, 2));

    let (status, json) = app.send(get("/api/car/status/2", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["status_id"], 2);

    let (status, json) = app.send(get("/api/car/status/3", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Currently there is no car with this status");
    assert!(json["data"].is_null());

    let (status, json) = app.send(get("/api/car/status/0", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid status ID");
}

#[tokio::test]
async fn update_with_empty_body_writes_nothing() {
    let app = setup_test_app();
    let (_, token) = app.admin();
    let car = app.store.seed_car(sample_car(1, 1));
    let uri = format!("/api/car/update/{}", car.id);

    let (status, json) = app
        .send(request(Method::PATCH, &uri, Some(&token), None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "No data provided to update");

    let (status, json) = app.send(patch(&uri, &token, json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "No data provided to update");

    let (_, json) = app.send(get(&format!("/api/car/{}", car.id), &token)).await;
    assert_eq!(json["data"]["updated_at"], serde_json::to_value(car.updated_at).unwrap());
}

#[tokio::test]
async fn update_checks_id_then_body_then_rules_then_existence() {
    let app = setup_test_app();
    let (_, token) = app.admin();

    let (status, json) = app
        .send(request(Method::PATCH, "/api/car/update/42", Some(&token), None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid ID format");
    assert_eq!(json["data"]["id"][0], "The id must be a valid UUID.");

    let missing = format!("/api/car/update/{}", Uuid::new_v4());
    let (status, json) = app
        .send(patch(&missing, &token, json!({"year": "new"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Validation Failed");
    assert_eq!(json["data"]["year"][0], "The year must be an integer.");

    let (status, json) = app.send(patch(&missing, &token, json!({"year": 2024}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "There is no car with this ID");
}

#[tokio::test]
async fn update_applies_only_supplied_fields() {
    let app = setup_test_app();
    let (_, token) = app.admin();
    let mut seeded = sample_car(1, 1);
    seeded.photo_url = Some("https://cdn.rentcar.io/old.jpg".into());
    let car = app.store.seed_car(seeded);
    let uri = format!("/api/car/update/{}", car.id);

    let (status, json) = app
        .send(patch(
            &uri,
            &token,
            json!({"daily_rate": 400000, "status_id": 2, "photo_url": null}),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Car updated successfully");
    assert_eq!(json["data"]["daily_rate"], 400000);
    assert_eq!(json["data"]["status_id"], 2);
    assert!(json["data"]["photo_url"].is_null());
    assert_eq!(json["data"]["name"], car.name);
    assert_eq!(json["data"]["plate_number"], car.plate_number);
}

#[tokio::test]
async fn delete_car() {
    let app = setup_test_app();
    let (_, token) = app.admin();
    let car = app.store.seed_car(sample_car(1, 1));
    let uri = format!("/api/car/delete/{}", car.id);

    let (status, json) = app
        .send(request(Method::DELETE, &uri, Some(&token), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Car deleted successfully");

    let (status, json) = app
        .send(request(Method::DELETE, &uri, Some(&token), None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "There is no car with this ID");

    let (status, json) = app
        .send(request(Method::DELETE, "/api/car/delete/xyz", Some(&token), None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid ID format");
}

//! Production orders, machines and scheduling board jobs over HTTP

mod common;

use axum::http::{StatusCode, header};
use axum_test::TestServer;
use serde_json::{Value, json};

use common::*;

async fn create_order(server: &TestServer, token: &str, customer: &str) -> Value {
    let response = server
        .post("/api/productionorders")
        .authorization_bearer(token)
        .json(&order_body(customer))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn first_machine_id(server: &TestServer, token: &str) -> i64 {
    let machines: Value = server
        .get("/api/machines")
        .authorization_bearer(token)
        .await
        .json();
    machines[0]["id"].as_i64().unwrap()
}

async fn create_job(server: &TestServer, token: &str, order_id: i64, name: &str) -> Value {
    let machine_id = first_machine_id(server, token).await;
    let response = server
        .post(&format!("/api/productionorders/{}/jobs", order_id))
        .authorization_bearer(token)
        .json(&json!({
            "jobName": name,
            "machineId": machine_id,
            "duration": 90.0,
            "operator": "J. Smith"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_scheduling_endpoints_require_auth() {
    let server = seeded_server().await;

    for path in [
        "/api/productionorders",
        "/api/productionorders/statistics",
        "/api/machines",
        "/api/machines/statistics",
    ] {
        server
            .get(path)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_seeded_orders_are_listed() {
    let server = seeded_server().await;
    let token = login_token(&server).await;

    let response = server
        .get("/api/productionorders")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let orders: Value = response.json();
    let numbers: Vec<&str> = orders
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["orderNumber"].as_str().unwrap())
        .collect();
    assert_eq!(numbers.len(), 3);
    assert!(numbers.contains(&"PO-2025-001"));
    assert!(orders[0]["productionJobs"].is_array());
}

#[tokio::test]
async fn test_create_order_sets_location_number_and_creator() {
    let server = empty_server().await;
    let token = login_token(&server).await;

    let response = server
        .post("/api/productionorders")
        .authorization_bearer(&token)
        .json(&order_body("Fleet Logistics"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["id"].as_i64().unwrap();
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        format!("/api/productionorders/{}", id).as_str()
    );
    assert!(body["orderNumber"].as_str().unwrap().starts_with("PO-"));
    assert!(body["orderNumber"].as_str().unwrap().ends_with("-001"));
    assert_eq!(body["status"], "pending");
    assert_eq!(body["priority"], "high");
    assert_eq!(body["progress"], 0);
    assert_eq!(body["createdBy"], "planner");
    assert_eq!(body["isOverdue"], false);
}

#[tokio::test]
async fn test_create_order_rejects_bad_fields() {
    let server = empty_server().await;
    let token = login_token(&server).await;

    let mut body = order_body("Fleet Logistics");
    body["quantity"] = json!(0);
    body["priority"] = json!("whenever");

    let response = server
        .post("/api/productionorders")
        .authorization_bearer(&token)
        .json(&body)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert!(!body["details"]["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_order_applies_only_given_fields() {
    let server = empty_server().await;
    let token = login_token(&server).await;
    let order = create_order(&server, &token, "Fleet Logistics").await;
    let id = order["id"].as_i64().unwrap();

    server
        .put(&format!("/api/productionorders/{}", id))
        .authorization_bearer(&token)
        .json(&json!({ "status": "in-progress", "progress": 40, "customerName": "" }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let updated: Value = server
        .get(&format!("/api/productionorders/{}", id))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(updated["status"], "in-progress");
    assert_eq!(updated["progress"], 40);
    assert_eq!(updated["customerName"], "Fleet Logistics");
    assert_eq!(updated["productName"], order["productName"]);
}

#[tokio::test]
async fn test_missing_order_is_404() {
    let server = empty_server().await;
    let token = login_token(&server).await;

    let response = server
        .get("/api/productionorders/9999")
        .authorization_bearer(&token)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    server
        .put("/api/productionorders/9999")
        .authorization_bearer(&token)
        .json(&json!({ "progress": 10 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_is_a_json_bad_request() {
    let server = empty_server().await;
    let token = login_token(&server).await;

    for path in [
        "/api/productionorders/abc",
        "/api/machines/abc",
        "/api/productionorders/abc/jobs",
    ] {
        let response = server.get(path).authorization_bearer(&token).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_REQUEST", "{path}");
    }

    let response = server
        .delete("/api/productionjobs/xyz")
        .authorization_bearer(&token)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_deleted_order_disappears_with_its_jobs() {
    let server = seeded_server().await;
    let token = login_token(&server).await;
    let order = create_order(&server, &token, "Fleet Logistics").await;
    let id = order["id"].as_i64().unwrap();
    let job = create_job(&server, &token, id, "Curing").await;

    server
        .delete(&format!("/api/productionorders/{}", id))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/productionorders/{}", id))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .put(&format!("/api/productionjobs/{}", job["id"]))
        .authorization_bearer(&token)
        .json(&json!({ "notes": "late" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_statistics_count_seeded_orders() {
    let server = seeded_server().await;
    let token = login_token(&server).await;

    let response = server
        .get("/api/productionorders/statistics")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let stats: Value = response.json();
    assert_eq!(stats["totalOrders"], 3);
    assert_eq!(stats["pendingOrders"], 3);
    assert_eq!(stats["completedOrders"], 0);
}

#[tokio::test]
async fn test_machines_are_listed_and_fetched() {
    let server = seeded_server().await;
    let token = login_token(&server).await;

    let machines: Value = server
        .get("/api/machines")
        .authorization_bearer(&token)
        .await
        .json();
    let machines = machines.as_array().unwrap();
    assert_eq!(machines.len(), 5);
    assert!(machines.iter().all(|m| m["status"] == "idle"));
    assert!(machines.iter().any(|m| m["type"] == "Molding Press"));

    let id = machines[0]["id"].as_i64().unwrap();
    let response = server
        .get(&format!("/api/machines/{}", id))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let machine: Value = response.json();
    assert_eq!(machine["id"], id);
    assert!(machine["currentJob"].is_null());

    server
        .get("/api/machines/9999")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_machine_status_update_feeds_statistics() {
    let server = seeded_server().await;
    let token = login_token(&server).await;
    let id = first_machine_id(&server, &token).await;

    server
        .put(&format!("/api/machines/{}/status", id))
        .authorization_bearer(&token)
        .json(&json!({ "status": "running", "utilization": 80 }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let stats: Value = server
        .get("/api/machines/statistics")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(stats["totalMachines"], 5);
    assert_eq!(stats["runningMachines"], 1);
    assert_eq!(stats["idleMachines"], 4);
    assert_eq!(stats["averageUtilization"], 16.0);
}

#[tokio::test]
async fn test_machine_status_update_validates_input() {
    let server = seeded_server().await;
    let token = login_token(&server).await;
    let id = first_machine_id(&server, &token).await;

    server
        .put(&format!("/api/machines/{}/status", id))
        .authorization_bearer(&token)
        .json(&json!({ "status": "broken", "utilization": 50 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .put(&format!("/api/machines/{}/status", id))
        .authorization_bearer(&token)
        .json(&json!({ "status": "idle", "utilization": 150 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_jobs_are_appended_in_board_order() {
    let server = seeded_server().await;
    let token = login_token(&server).await;
    let order = create_order(&server, &token, "Fleet Logistics").await;
    let order_id = order["id"].as_i64().unwrap();

    let first = create_job(&server, &token, order_id, "Mixing").await;
    let second = create_job(&server, &token, order_id, "Curing").await;
    assert_eq!(first["status"], "scheduled");
    assert!(second["sortOrder"].as_i64() > first["sortOrder"].as_i64());

    let jobs: Value = server
        .get(&format!("/api/productionorders/{}/jobs", order_id))
        .authorization_bearer(&token)
        .await
        .json();
    let names: Vec<&str> = jobs
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["jobName"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Mixing", "Curing"]);
}

#[tokio::test]
async fn test_job_creation_rejects_unknown_machine() {
    let server = seeded_server().await;
    let token = login_token(&server).await;
    let order = create_order(&server, &token, "Fleet Logistics").await;

    let response = server
        .post(&format!("/api/productionorders/{}/jobs", order["id"]))
        .authorization_bearer(&token)
        .json(&json!({ "jobName": "Curing", "machineId": 9999, "duration": 30.0 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNKNOWN_MACHINE");
}

#[tokio::test]
async fn test_reorder_rewrites_board_order() {
    let server = seeded_server().await;
    let token = login_token(&server).await;
    let order = create_order(&server, &token, "Fleet Logistics").await;
    let order_id = order["id"].as_i64().unwrap();
    let a = create_job(&server, &token, order_id, "Mixing").await["id"].clone();
    let b = create_job(&server, &token, order_id, "Curing").await["id"].clone();

    server
        .put(&format!("/api/productionorders/{}/jobs/order", order_id))
        .authorization_bearer(&token)
        .json(&json!({ "jobIds": [b, a] }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let jobs: Value = server
        .get(&format!("/api/productionorders/{}/jobs", order_id))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(jobs[0]["jobName"], "Curing");
    assert_eq!(jobs[1]["jobName"], "Mixing");

    let response = server
        .put(&format!("/api/productionorders/{}/jobs/order", order_id))
        .authorization_bearer(&token)
        .json(&json!({ "jobIds": [b, b] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_JOB_ORDER");
}

#[tokio::test]
async fn test_running_job_shows_on_its_machine() {
    let server = seeded_server().await;
    let token = login_token(&server).await;
    let order = create_order(&server, &token, "Fleet Logistics").await;
    let job = create_job(&server, &token, order["id"].as_i64().unwrap(), "Curing").await;

    server
        .put(&format!("/api/productionjobs/{}", job["id"]))
        .authorization_bearer(&token)
        .json(&json!({ "status": "in-progress" }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let machine: Value = server
        .get(&format!("/api/machines/{}", job["machineId"]))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(machine["currentJob"], "Curing");
}

#[tokio::test]
async fn test_deleted_job_leaves_the_board() {
    let server = seeded_server().await;
    let token = login_token(&server).await;
    let order = create_order(&server, &token, "Fleet Logistics").await;
    let order_id = order["id"].as_i64().unwrap();
    let job = create_job(&server, &token, order_id, "Curing").await;

    server
        .delete(&format!("/api/productionjobs/{}", job["id"]))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete(&format!("/api/productionjobs/{}", job["id"]))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let jobs: Value = server
        .get(&format!("/api/productionorders/{}/jobs", order_id))
        .authorization_bearer(&token)
        .await
        .json();
    assert!(jobs.as_array().unwrap().is_empty());
}

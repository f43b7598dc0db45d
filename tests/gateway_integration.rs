//! End-to-end tests for the proxy contract: JSON relay, binary downloads,
//! multipart pass-through, and Authorization handling.

use axum::http::StatusCode;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn post_json_create_is_relayed() {
    let (backend, seen) = common::start_mock_backend(
        StatusCode::CREATED,
        vec![("content-type", "application/json")],
        br#"{"id":5,"name":"Science"}"#.to_vec(),
    )
    .await;
    let (gateway, _shutdown) = common::start_gateway(backend).await;

    let res = common::client()
        .post(format!("http://{}/api/v1/departments", gateway))
        .json(&json!({ "name": "Science" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "id": 5, "name": "Science" }));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].uri, "/api/v1/departments");
    assert!(seen[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("application/json"));
    let forwarded: Value = serde_json::from_slice(&seen[0].body).unwrap();
    assert_eq!(forwarded, json!({ "name": "Science" }));
}

#[tokio::test]
async fn get_excel_export_streams_identical_bytes() {
    // PK zip magic plus some non-UTF8 noise, like a real xlsx.
    let payload = vec![0x50, 0x4b, 0x03, 0x04, 0xff, 0x00, 0x88, 0x19];
    let xlsx = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
    let (backend, _seen) = common::start_mock_backend(
        StatusCode::OK,
        vec![
            ("content-type", xlsx),
            ("content-disposition", "attachment; filename=students.xlsx"),
        ],
        payload.clone(),
    )
    .await;
    let (gateway, _shutdown) = common::start_gateway(backend).await;

    let res = common::client()
        .get(format!("http://{}/api/v1/students/excel/export", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("content-type").unwrap(), xlsx);
    assert_eq!(
        res.headers().get("content-disposition").unwrap(),
        "attachment; filename=students.xlsx"
    );
    assert_eq!(res.bytes().await.unwrap().to_vec(), payload);
}

#[tokio::test]
async fn get_pdf_report_takes_binary_branch() {
    let payload = b"%PDF-1.7 fake report".to_vec();
    let (backend, _seen) = common::start_mock_backend(
        StatusCode::OK,
        vec![("content-type", "application/pdf")],
        payload.clone(),
    )
    .await;
    let (gateway, _shutdown) = common::start_gateway(backend).await;

    let res = common::client()
        .get(format!("http://{}/api/v1/reports/42/pdf", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("content-type").unwrap(), "application/pdf");
    assert_eq!(res.bytes().await.unwrap().to_vec(), payload);
}

#[tokio::test]
async fn get_json_is_structurally_equal() {
    let upstream_body = json!({
        "students": [{ "id": 1, "name": "Ada" }, { "id": 2, "name": "Grace" }],
        "total": 2
    });
    let (backend, seen) = common::start_mock_backend(
        StatusCode::OK,
        vec![("content-type", "application/json; charset=utf-8")],
        serde_json::to_vec(&upstream_body).unwrap(),
    )
    .await;
    let (gateway, _shutdown) = common::start_gateway(backend).await;

    let res = common::client()
        .get(format!("http://{}/api/v1/students?limit=5&sort=name", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, upstream_body);

    // Path and query forwarded unchanged.
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].uri, "/api/v1/students?limit=5&sort=name");
}

#[tokio::test]
async fn upstream_error_status_is_propagated() {
    let (backend, _seen) = common::start_mock_backend(
        StatusCode::NOT_FOUND,
        vec![("content-type", "application/json")],
        br#"{"message":"not found"}"#.to_vec(),
    )
    .await;
    let (gateway, _shutdown) = common::start_gateway(backend).await;

    let res = common::client()
        .get(format!("http://{}/api/v1/students/999", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "not found" }));
}

#[tokio::test]
async fn multipart_post_preserves_boundary_and_bytes() {
    let (backend, seen) = common::start_mock_backend(
        StatusCode::OK,
        vec![("content-type", "application/json")],
        b"{}".to_vec(),
    )
    .await;
    let (gateway, _shutdown) = common::start_gateway(backend).await;

    let file_bytes = vec![0xde, 0xad, 0xbe, 0xef];
    let form = reqwest::multipart::Form::new()
        .text("title", "Term report")
        .part(
            "file",
            reqwest::multipart::Part::bytes(file_bytes.clone()).file_name("report.bin"),
        );

    let res = common::client()
        .post(format!("http://{}/api/v1/students/import", gateway))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let seen = seen.lock().unwrap();
    let content_type = seen[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
    assert!(content_type.contains("boundary="));
    assert!(!content_type.contains("application/json"));

    // The multipart payload streams through unaltered.
    let body = &seen[0].body;
    assert!(body
        .windows(file_bytes.len())
        .any(|window| window == file_bytes.as_slice()));
    assert!(body.windows(11).any(|window| window == b"Term report"));
}

#[tokio::test]
async fn put_forwards_authorization_byte_equal() {
    let (backend, seen) = common::start_mock_backend(
        StatusCode::OK,
        vec![("content-type", "application/json")],
        br#"{"updated":true}"#.to_vec(),
    )
    .await;
    let (gateway, _shutdown) = common::start_gateway(backend).await;

    let res = common::client()
        .put(format!("http://{}/api/v1/designations/3", gateway))
        .header("Authorization", "Bearer secret-token-1")
        .json(&json!({ "title": "Head of Science" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[0].headers.get("authorization").unwrap(),
        "Bearer secret-token-1"
    );
    assert!(seen[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("application/json"));
}

#[tokio::test]
async fn delete_without_authorization_sends_none() {
    let (backend, seen) = common::start_mock_backend(
        StatusCode::FORBIDDEN,
        vec![("content-type", "application/json")],
        br#"{"message":"unauthorized"}"#.to_vec(),
    )
    .await;
    let (gateway, _shutdown) = common::start_gateway(backend).await;

    let res = common::client()
        .delete(format!("http://{}/api/v1/departments/9", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "unauthorized" }));

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method, "DELETE");
    assert!(seen[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn get_non_json_body_falls_back_to_raw_relay() {
    let (backend, _seen) = common::start_mock_backend(
        StatusCode::OK,
        vec![("content-type", "text/plain")],
        b"pong".to_vec(),
    )
    .await;
    let (gateway, _shutdown) = common::start_gateway(backend).await;

    let res = common::client()
        .get(format!("http://{}/api/v1/ping", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("content-type").unwrap(), "text/plain");
    assert_eq!(res.text().await.unwrap(), "pong");
}

#[tokio::test]
async fn octet_stream_is_binary_for_post_responses() {
    let payload = vec![0x00, 0x01, 0x02, 0xfe];
    let (backend, _seen) = common::start_mock_backend(
        StatusCode::OK,
        vec![("content-type", "application/octet-stream")],
        payload.clone(),
    )
    .await;
    let (gateway, _shutdown) = common::start_gateway(backend).await;

    let res = common::client()
        .post(format!("http://{}/api/v1/reports/generate", gateway))
        .json(&json!({ "term": "fall" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "application/octet-stream"
    );
    assert_eq!(res.bytes().await.unwrap().to_vec(), payload);
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Endpoint tests for POST /ocr
//!
//! These tests drive the full router with `oneshot` and verify that:
//! - Upload problems are rejected with 400 and an `error` key
//! - The LLM strategy forwards the image and returns the model's JSON
//! - Model output problems come back as 200 diagnostics
//! - Hard failures map to 5xx status codes

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use doc_field_extractor::{
    api::http_server::{create_app, AppState},
    config::{ServiceConfig, StrategyKind},
    extraction::build_extractor,
    vision::{encode_png, MAX_IMAGE_SIZE},
};
use image::{DynamicImage, Rgb, RgbImage};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

const BOUNDARY: &str = "----docextractboundary7MA4YWxkTrZu0gW";
const CHAT_PATH: &str = "/api/v1/chat/completions";
const MODEL: &str = "vendor/test-vl:free";

// 1x1 GIF - minimal valid image in a non-PNG format
const TINY_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0xff, 0xff,
    0xff, 0x00, 0x00, 0x00, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
];

/// Helper: a small white PNG document
fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([255, 255, 255])));
    encode_png(&image).unwrap()
}

/// Helper: build a multipart body from (field name, optional filename, bytes)
fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn ocr_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/ocr")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Helper: router for the LLM strategy pointed at a mock server
fn llm_app(server_url: &str, api_key: Option<&str>) -> Router {
    let mut config = ServiceConfig::default();
    config.llm.api_url = format!("{}{}", server_url, CHAT_PATH);
    config.llm.api_key = api_key.map(str::to_string);
    config.llm.model_name = MODEL.to_string();
    let extractor = build_extractor(&config).unwrap();
    create_app(AppState::new(config, extractor))
}

/// Helper: router for the local OCR strategy with a binary that does not exist
fn local_ocr_app_without_engine() -> Router {
    let mut config = ServiceConfig::default();
    config.strategy = StrategyKind::LocalOcr;
    config.ocr.tesseract_path = Some("/definitely/not/here/tesseract".into());
    let extractor = build_extractor(&config).unwrap();
    create_app(AppState::new(config, extractor))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn chat_body(content: &str) -> String {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]}).to_string()
}

#[cfg(test)]
mod upload_validation_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_field_is_bad_request() {
        let app = local_ocr_app_without_engine();
        let body = multipart_body(&[("document", Some("doc.png"), png_bytes().as_slice())]);

        let (status, body) = send(app, ocr_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No image file provided"}));
    }

    #[tokio::test]
    async fn test_empty_file_is_bad_request() {
        let app = local_ocr_app_without_engine();
        let body = multipart_body(&[("file", Some("empty.png"), &b""[..])]);

        let (status, body) = send(app, ocr_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_undecodable_upload_is_bad_request() {
        let app = local_ocr_app_without_engine();
        let body = multipart_body(&[("file", Some("notes.txt"), &b"this is not an image at all"[..])]);

        let (status, body) = send(app, ocr_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid image"));
    }

    #[tokio::test]
    async fn test_truncated_png_is_bad_request() {
        let app = local_ocr_app_without_engine();
        let png = png_bytes();
        let body = multipart_body(&[("file", Some("doc.png"), &png[..png.len() / 2])]);

        let (status, body) = send(app, ocr_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_oversized_upload_is_bad_request() {
        let app = local_ocr_app_without_engine();
        let oversized = vec![0u8; MAX_IMAGE_SIZE + 1];
        let body = multipart_body(&[("file", Some("huge.png"), oversized.as_slice())]);

        let (status, body) = send(app, ocr_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("too large"));
    }

    #[tokio::test]
    async fn test_get_is_not_allowed() {
        let app = local_ocr_app_without_engine();
        let request = Request::builder()
            .method(Method::GET)
            .uri("/ocr")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}

#[cfg(test)]
mod local_ocr_endpoint_tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_engine_is_service_unavailable() {
        let app = local_ocr_app_without_engine();
        let body = multipart_body(&[("file", Some("doc.png"), png_bytes().as_slice())]);

        let (status, body) = send(app, ocr_request(body)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let error = body["error"].as_str().unwrap();
        assert!(error.starts_with("OCR engine unavailable"));
        assert!(error.contains("/definitely/not/here/tesseract"));
    }
}

#[cfg(test)]
mod llm_endpoint_tests {
    use super::*;

    #[tokio::test]
    async fn test_fenced_model_output_is_returned_as_object() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", CHAT_PATH)
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chat_body(
                "```json\n{\"name\": \"Asha Rao\", \"dob\": \"15/08/1995\"}\n```",
            ))
            .create_async()
            .await;

        let app = llm_app(&server.url(), Some("test-key"));
        let body = multipart_body(&[
            ("note", None, &b"ignored"[..]),
            ("file", Some("doc.png"), png_bytes().as_slice()),
        ]);

        let (status, body) = send(app, ocr_request(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"name": "Asha Rao", "dob": "15/08/1995"}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_png_upload_is_reencoded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", CHAT_PATH)
            .match_body(mockito::Matcher::Regex(
                "data:image/png;base64,".to_string(),
            ))
            .with_status(200)
            .with_body(chat_body("[1,2,3]"))
            .create_async()
            .await;

        let app = llm_app(&server.url(), Some("test-key"));
        let body = multipart_body(&[("file", Some("pixel.gif"), TINY_GIF)]);

        let (status, body) = send(app, ocr_request(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"extracted_data": [1, 2, 3]}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_api_key_makes_no_upstream_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let app = llm_app(&server.url(), None);
        let body = multipart_body(&[("file", Some("doc.png"), png_bytes().as_slice())]);

        let (status, body) = send(app, ocr_request(body)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("OPENROUTER_API_KEY"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upstream_error_is_bad_gateway_with_model() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", CHAT_PATH)
            .with_status(404)
            .with_body(r#"{"error":{"message":"No endpoints found"}}"#)
            .create_async()
            .await;

        let app = llm_app(&server.url(), Some("test-key"));
        let body = multipart_body(&[("file", Some("doc.png"), png_bytes().as_slice())]);

        let (status, body) = send(app, ocr_request(body)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "API error: 404");
        assert_eq!(body["status"], 404);
        assert_eq!(body["attempted_model"], MODEL);
    }

    #[tokio::test]
    async fn test_unparseable_model_output_is_ok_with_diagnostics() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", CHAT_PATH)
            .with_status(200)
            .with_body(chat_body("```\nThe image is too blurry to read.\n```"))
            .create_async()
            .await;

        let app = llm_app(&server.url(), Some("test-key"));
        let body = multipart_body(&[("file", Some("doc.png"), png_bytes().as_slice())]);

        let (status, body) = send(app, ocr_request(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "Failed to parse JSON response");
        assert_eq!(body["raw_content"], "The image is too blurry to read.");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_ok_with_raw_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", CHAT_PATH)
            .with_status(200)
            .with_body(r#"{"id": "gen-9", "object": "chat.completion"}"#)
            .create_async()
            .await;

        let app = llm_app(&server.url(), Some("test-key"));
        let body = multipart_body(&[("file", Some("doc.png"), png_bytes().as_slice())]);

        let (status, body) = send(app, ocr_request(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "Unexpected API response format");
        assert_eq!(body["raw_response"]["id"], "gen-9");
    }
}

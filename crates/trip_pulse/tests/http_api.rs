mod mocks;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use mocks::{
    generator::MockGenerator, transcript_fetcher::MockTranscriptFetcher,
    video_search::MockVideoSearch, video,
};
use std::time::Duration;

use serde_json::{json, Value};
use tower::ServiceExt;
use trip_pulse::{
    server::{router, HEALTH_PATH, ITINERARY_PATH},
    types::{DeliveryMode, EvidenceSource},
    ItineraryPipelineBuilder,
};

const TOKYO_QUERY: &str =
    "destination=Tokyo&startLocation=Seattle&duration=3&tripType=foodie&budget=%241000";

fn two_snippets() -> MockVideoSearch {
    MockVideoSearch::always(vec![
        video("a", "Tokyo food tour", "Tsukiji outer market"),
        video("b", "Tokyo on a budget", "Ramen and izakayas"),
    ])
}

fn app(search: MockVideoSearch, generator: MockGenerator, delivery: DeliveryMode) -> Router {
    router(
        ItineraryPipelineBuilder::new()
            .video_search(search)
            .transcript_fetcher(MockTranscriptFetcher::default())
            .generator(generator)
            .evidence_source(EvidenceSource::Snippets)
            .delivery(delivery)
            .build(),
    )
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::ORIGIN, "https://example.com")
        .body(Body::empty())
        .unwrap()
}

fn allow_origin(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_health() {
    let app = app(two_snippets(), MockGenerator::new("x"), DeliveryMode::Buffered);
    let (status, _, _) = send(app, get(HEALTH_PATH)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_end_to_end_buffered_returns_itinerary_json() {
    let app = app(
        two_snippets(),
        MockGenerator::new("MOCK_ITINERARY"),
        DeliveryMode::Buffered,
    );

    let (status, headers, body) = send(app, get(&format!("{ITINERARY_PATH}?{TOKYO_QUERY}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(allow_origin(&headers), Some("*"));
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, json!({ "itinerary": "MOCK_ITINERARY" }));
}

#[tokio::test]
async fn test_end_to_end_streaming_returns_plain_text() {
    let app = app(
        two_snippets(),
        MockGenerator::streaming(&["MOCK_", "ITINERARY"]),
        DeliveryMode::Streaming,
    );

    let (status, headers, body) = send(app, get(&format!("{ITINERARY_PATH}?{TOKYO_QUERY}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "text/plain; charset=utf-8"
    );
    assert_eq!(allow_origin(&headers), Some("*"));
    assert_eq!(body, "MOCK_ITINERARY");
}

#[tokio::test]
async fn test_post_reads_json_body() {
    let generator = MockGenerator::new("MOCK_ITINERARY");
    let prompts = generator.calls.clone();
    let app = app(two_snippets(), generator, DeliveryMode::Buffered);

    let req = Request::builder()
        .method(Method::POST)
        .uri(ITINERARY_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "destination": "Lisbon",
                "startLocation": "Boston",
                "duration": 4,
                "tripType": "budget",
                "budget": "$500"
            })
            .to_string(),
        ))
        .unwrap();

    let (status, _, body) = send(app, req).await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    let prompts = prompts.lock().unwrap();
    assert!(prompts[0].contains("4 days"));
    assert!(prompts[0].contains("Lisbon"));
}

#[tokio::test]
async fn test_post_with_malformed_body_is_bad_request() {
    let app = app(two_snippets(), MockGenerator::new("x"), DeliveryMode::Buffered);
    let req = Request::builder()
        .method(Method::POST)
        .uri(ITINERARY_PATH)
        .body(Body::from("{destination"))
        .unwrap();

    let (status, _, body) = send(app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_missing_parameters_is_bad_request() {
    let search = two_snippets();
    let search_calls = search.calls.clone();
    let app = app(search, MockGenerator::new("x"), DeliveryMode::Streaming);

    let (status, headers, body) = send(
        app,
        get(&format!("{ITINERARY_PATH}?destination=Tokyo&duration=3")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(allow_origin(&headers), Some("*"));
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        json,
        json!({ "error": "Missing required parameters: startLocation, tripType, budget" })
    );
    assert!(search_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_no_videos_is_not_found() {
    let app = app(
        MockVideoSearch::new(),
        MockGenerator::new("x"),
        DeliveryMode::Streaming,
    );

    let (status, _, body) = send(app, get(&format!("{ITINERARY_PATH}?{TOKYO_QUERY}"))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Could not find any relevant video data.");
}

#[tokio::test]
async fn test_generation_failure_reports_details() {
    let app = app(
        two_snippets(),
        MockGenerator::failing("upstream 503"),
        DeliveryMode::Streaming,
    );

    let (status, _, body) = send(app, get(&format!("{ITINERARY_PATH}?{TOKYO_QUERY}"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Failed to generate itinerary.");
    assert_eq!(json["details"], "upstream 503");
}

#[tokio::test]
async fn test_search_failure_reports_details() {
    let app = app(
        MockVideoSearch::failing("quotaExceeded"),
        MockGenerator::new("x"),
        DeliveryMode::Buffered,
    );

    let (status, _, body) = send(app, get(&format!("{ITINERARY_PATH}?{TOKYO_QUERY}"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["details"], "quotaExceeded");
}

#[tokio::test]
async fn test_preflight_is_answered_without_running_pipeline() {
    let search = two_snippets();
    let search_calls = search.calls.clone();
    let app = app(search, MockGenerator::new("x"), DeliveryMode::Streaming);

    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri(ITINERARY_PATH)
        .header(header::ORIGIN, "https://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let (status, headers, body) = send(app, req).await;

    assert!(status.is_success());
    assert!(body.is_empty());
    assert_eq!(allow_origin(&headers), Some("*"));
    let methods = headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap();
    for method in ["GET", "POST", "OPTIONS"] {
        assert!(methods.contains(method), "missing {method} in {methods}");
    }
    let allowed_headers = headers
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(allowed_headers.contains("content-type"));
    assert!(allowed_headers.contains("authorization"));
    assert!(search_calls.lock().unwrap().is_empty());
}

// ─── Deadline ───

fn app_with_deadline(
    search: MockVideoSearch,
    generator: MockGenerator,
    delivery: DeliveryMode,
    deadline: Duration,
) -> Router {
    router(
        ItineraryPipelineBuilder::new()
            .video_search(search)
            .transcript_fetcher(MockTranscriptFetcher::default())
            .generator(generator)
            .delivery(delivery)
            .deadline(deadline)
            .build(),
    )
}

#[tokio::test]
async fn test_stalled_generation_is_gateway_timeout() {
    let app = app_with_deadline(
        two_snippets(),
        MockGenerator::stalling(&[]),
        DeliveryMode::Buffered,
        Duration::from_millis(50),
    );

    let (status, _, body) = send(app, get(&format!("{ITINERARY_PATH}?{TOKYO_QUERY}"))).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Timed out generating itinerary.");
    assert!(json["details"].as_str().unwrap().contains("50ms"));
}

#[tokio::test]
async fn test_stalled_search_is_gateway_timeout() {
    let app = app_with_deadline(
        MockVideoSearch::stalling(),
        MockGenerator::new("x"),
        DeliveryMode::Streaming,
        Duration::from_millis(50),
    );

    let (status, _, body) = send(app, get(&format!("{ITINERARY_PATH}?{TOKYO_QUERY}"))).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["details"].is_string());
}

#[tokio::test]
async fn test_stream_cut_by_deadline_aborts_body() {
    let app = app_with_deadline(
        two_snippets(),
        MockGenerator::stalling(&["## Day 1\n"]),
        DeliveryMode::Streaming,
        Duration::from_millis(200),
    );

    let resp = app
        .oneshot(get(&format!("{ITINERARY_PATH}?{TOKYO_QUERY}")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(to_bytes(resp.into_body(), 1024 * 1024).await.is_err());
}

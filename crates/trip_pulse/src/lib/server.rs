//! # HTTP surface
//!
//! Exposes the itinerary pipeline over `GET`/`POST`, answers CORS preflight
//! requests and turns an [`ItineraryResult`] into either a JSON document or a
//! chunked `text/plain` body.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::Error,
    llm::generator::Generator,
    types::ItineraryResult,
    yt::{TranscriptFetcher, VideoSearch},
    ItineraryPipeline,
};

/// Health endpoint path.
pub const HEALTH_PATH: &str = "/health";
/// Itinerary generation endpoint path.
pub const ITINERARY_PATH: &str = "/api/generate-itinerary";

type SharedPipeline<S, T, G> = Arc<ItineraryPipeline<S, T, G>>;

/// Builds the service router around `pipeline`.
pub fn router<S, T, G>(pipeline: ItineraryPipeline<S, T, G>) -> Router
where
    S: VideoSearch + Send + Sync + 'static,
    T: TranscriptFetcher + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
{
    Router::new()
        .route(HEALTH_PATH, get(health))
        .route(
            ITINERARY_PATH,
            get(get_itinerary::<S, T, G>).post(post_itinerary::<S, T, G>),
        )
        .with_state(Arc::new(pipeline))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Any origin may call the API; preflight requests are answered here and never
/// reach a handler.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn get_itinerary<S, T, G>(
    State(pipeline): State<SharedPipeline<S, T, G>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response
where
    S: VideoSearch + Send + Sync + 'static,
    T: TranscriptFetcher + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
{
    emit(pipeline.run(&params).await)
}

async fn post_itinerary<S, T, G>(
    State(pipeline): State<SharedPipeline<S, T, G>>,
    Query(mut params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response
where
    S: VideoSearch + Send + Sync + 'static,
    T: TranscriptFetcher + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
{
    if let Err(e) = merge_body_params(&mut params, &body) {
        return emit(Err(e));
    }
    emit(pipeline.run(&params).await)
}

/// Overlays the fields of a JSON object body onto the query parameters.
/// Scalars are stringified; `null`, arrays and objects are ignored.
fn merge_body_params(params: &mut HashMap<String, String>, body: &[u8]) -> Result<(), Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }

    let fields = serde_json::from_slice::<serde_json::Map<String, Value>>(body)
        .map_err(|e| Error::InvalidBody(e.to_string()))?;

    for (key, value) in fields {
        let value = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => continue,
        };
        params.insert(key, value);
    }
    Ok(())
}

/// Single response routine for both delivery modes.
fn emit(result: Result<ItineraryResult, Error>) -> Response {
    match result {
        Ok(ItineraryResult::Complete(itinerary)) => {
            Json(serde_json::json!({ "itinerary": itinerary })).into_response()
        }
        Ok(ItineraryResult::Stream(fragments)) => (
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                ),
                (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            ],
            Body::from_stream(fragments),
        )
            .into_response(),
        Err(e) => {
            if e.status().is_server_error() {
                tracing::error!(error = %e, "Failed to generate itinerary");
            } else {
                tracing::info!(error = %e, status = %e.status(), "Itinerary request not fulfilled");
            }
            e.into_response()
        }
    }
}

use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use clap::Parser;
use trip_pulse::{
    gatherer::SearchLimits,
    gemini::GeminiClient,
    server::router,
    tracing::init_tracing_subscriber,
    types::{DeliveryMode, EvidenceSource},
    yt::{CaptionClient, YouTubeClient},
    ItineraryPipelineBuilder,
};

#[derive(Parser)]
#[command(
    name = "trip-pulse",
    about = "Travel itinerary generator grounded in YouTube travel videos"
)]
struct Cli {
    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY")]
    youtube_api_key: String,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY")]
    gemini_api_key: String,

    /// Gemini model used for generation
    #[arg(long, env = "GEMINI_MODEL", default_value = GeminiClient::DEFAULT_MODEL)]
    model: String,

    /// Address the HTTP server listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: SocketAddr,

    /// Where video evidence text comes from
    #[arg(long, env = "EVIDENCE_SOURCE", value_enum, default_value_t = EvidenceSource::Snippets)]
    evidence_source: EvidenceSource,

    /// How the itinerary is delivered to callers
    #[arg(long, env = "DELIVERY_MODE", value_enum, default_value_t = DeliveryMode::Streaming)]
    delivery: DeliveryMode,

    /// Videos requested for the specific trip query
    #[arg(long, env = "PRIMARY_MAX_RESULTS", default_value = "5", value_parser = clap::value_parser!(u32).range(1..=50))]
    primary_max_results: u32,

    /// Videos requested for the broad fallback query
    #[arg(long, env = "FALLBACK_MAX_RESULTS", default_value = "10", value_parser = clap::value_parser!(u32).range(1..=50))]
    fallback_max_results: u32,

    /// Transcripts fetched concurrently per request
    #[arg(long, env = "TRANSCRIPT_CONCURRENCY", default_value = "1")]
    transcript_concurrency: usize,

    /// Caption languages in order of preference
    #[arg(long, env = "TRANSCRIPT_LANGUAGES", value_delimiter = ',', default_value = "en")]
    transcript_languages: Vec<String>,

    /// Per-request deadline in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "60")]
    request_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let pipeline = ItineraryPipelineBuilder::new()
        .video_search(YouTubeClient::new(&cli.youtube_api_key))
        .transcript_fetcher(CaptionClient::new(&cli.transcript_languages)?)
        .generator(GeminiClient::new(&cli.gemini_api_key).with_model(&cli.model))
        .evidence_source(cli.evidence_source)
        .delivery(cli.delivery)
        .search_limits(SearchLimits {
            primary_max_results: cli.primary_max_results,
            fallback_max_results: cli.fallback_max_results,
        })
        .transcript_concurrency(cli.transcript_concurrency)
        .deadline(Duration::from_secs(cli.request_timeout_secs))
        .build();

    let listener = tokio::net::TcpListener::bind(cli.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind_addr))?;

    tracing::info!(
        addr = %cli.bind_addr,
        model = %cli.model,
        evidence_source = ?cli.evidence_source,
        delivery = ?cli.delivery,
        "Starting itinerary server..."
    );

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}

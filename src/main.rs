//! Reflection Coach server binary.
//!
//! Loads configuration from the environment, wires the OpenAI gateway behind
//! the retry wrapper, and serves the reflection API over HTTP.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reflection_coach::adapters::ai::{OpenAiConfig, OpenAiGateway, RetryGateway};
use reflection_coach::adapters::http::{reflection_router, ReflectionAppState};
use reflection_coach::config::AppConfig;
use reflection_coach::ports::AiGateway;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let gateway = build_gateway(&config)?;
    info!(
        gateway = %gateway.gateway_info().name,
        model = %gateway.gateway_info().model,
        "AI gateway initialized"
    );

    let app_state = ReflectionAppState::new(gateway, config.session.limits());

    let app = reflection_router()
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(build_cors_layer(&config));

    let addr = config.server.socket_addr()?;
    info!(%addr, "starting reflection coach server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn build_gateway(config: &AppConfig) -> Result<Arc<dyn AiGateway>, Box<dyn std::error::Error>> {
    // validate() has already required the key
    let api_key = config
        .ai
        .openai_api_key
        .clone()
        .ok_or("OPENAI_API_KEY missing")?;

    let openai = OpenAiGateway::new(
        OpenAiConfig::new(api_key)
            .with_model(&config.ai.model)
            .with_base_url(&config.ai.base_url)
            .with_timeout(config.ai.timeout()),
    )?;

    let gateway = RetryGateway::new(openai)
        .with_max_retries(config.ai.max_retries)
        .with_base_delay(config.ai.retry_base_delay());

    Ok(Arc::new(gateway))
}

fn build_cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = config.server.cors_origins_list();

    if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{GeminiAnalysisAdapter, InMemoryContentStore, OpenAiAnalysisAdapter},
    config::{AnalysisProvider, Config, ConfigError},
    error::ApiError,
    web::{api_router, cors_layer, refresh_task::spawn_initial_refresh, ApiDoc, AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{http::HeaderValue, Router};
use mirror_core::{gateway::AnalysisGateway, ports::StructuredGenerationService};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    // A missing credential fails here, before anything is served.
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(
        provider = ?config.provider,
        model = %config.analysis_model,
        "Configuration loaded. Starting server..."
    );

    // --- 2. Initialize Service Adapters ---
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    let backend: Arc<dyn StructuredGenerationService> = match config.provider {
        AnalysisProvider::Gemini => Arc::new(GeminiAnalysisAdapter::new(
            http,
            config.gemini_base_url.clone(),
            config.api_key.clone(),
            config.analysis_model.clone(),
        )),
        AnalysisProvider::OpenAi => {
            let openai_config = OpenAIConfig::new().with_api_key(config.api_key.clone());
            let openai_client = Client::with_config(openai_config).with_http_client(http);
            Arc::new(OpenAiAnalysisAdapter::new(
                openai_client,
                config.analysis_model.clone(),
            ))
        }
    };

    let store = Arc::new(InMemoryContentStore::seeded());

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(store, AnalysisGateway::new(backend)));

    // --- 4. Wire Up Shutdown & the Initial Refresh ---
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received.");
            shutdown.cancel();
        });
    }

    if config.refresh_on_start {
        spawn_initial_refresh(app_state.clone(), shutdown.clone());
    }

    // --- 5. Create the Web Router ---
    let allowed_origin = HeaderValue::from_str(&config.allowed_origin).map_err(|e| {
        ConfigError::InvalidValue("ALLOWED_ORIGIN".to_string(), e.to_string())
    })?;

    let app = Router::new()
        .merge(api_router(app_state))
        .layer(cors_layer(allowed_origin))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Server stopped.");
    Ok(())
}

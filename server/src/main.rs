mod config;
mod handlers;
mod notion;
mod pipeline;
mod routes;
mod scheduler;
mod state;
mod store;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use idea_pipeline_cli::extract::Extractor;
use idea_pipeline_cli::render::{ChromeRenderer, RenderOptions};
use idea_pipeline_cli::translate::{LibreTranslateClient, Translator, TranslatorConfig};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use notion::NotionClient;
use pipeline::Pipeline;
use routes::build_app;
use state::{AppState, RunGuard, Trigger};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,idea_pipeline_cli=debug,server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let extractor = Extractor::new(
        Arc::new(ChromeRenderer::new()),
        RenderOptions::default().with_timeout(config.render_timeout),
    );

    let backend = LibreTranslateClient::new(&config.translate_api_url, config.translate_api_key.clone())
        .context("failed to build translation client")?;
    let translator = Translator::new(
        Arc::new(backend),
        TranslatorConfig {
            source_lang: config.source_lang.clone(),
            target_lang: config.target_lang.clone(),
            request_interval: config.translate_interval,
            ..TranslatorConfig::default()
        },
    );

    let store = NotionClient::new(&config.notion_api_key, &config.notion_database_id)
        .context("failed to build Notion client")?;

    let pipeline = Pipeline::new(config.target_url.clone(), extractor, translator, Arc::new(store));
    let state = AppState::new(pipeline, RunGuard::new(), Some(config.cron_schedule.clone()));

    let _scheduler = scheduler::start_scheduler(state.clone(), &config.cron_schedule)
        .await
        .context("failed to start scheduler")?;

    if config.run_on_startup {
        if let Some(job_id) = state.try_start_run(Trigger::Startup) {
            tracing::info!(%job_id, "startup run queued");
        }
    }

    let mut app = build_app(state);
    if let Some(client_url) = &config.client_url {
        let origin = client_url
            .parse::<HeaderValue>()
            .context("CLIENT_URL must be a valid origin")?;
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);
        app = app.layer(cors);
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, target_url = %config.target_url, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}

//! Label Express — wine-label design pipeline service.
//!
//! Main entry point that wires the persistence gateway, the C2-C7 stage
//! adapters, and the C8 orchestrator behind the C9 HTTP surface.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use labelforge_core::config::AppConfig;
use labelforge_db::PgGateway;
use labelforge_image::{HttpImageAdapter, ImageAdapter};
use labelforge_llm::{HttpLlmClient, LlmClient, StructuredLlmHarness};
use labelforge_orchestrator::{Orchestrator, PipelineConfig, StageDeps};
use labelforge_render::{HttpRendererClient, RendererClient};
use labelforge_store::{ContentStore, LocalFsStore, ObjectStore, S3CompatibleStore};
use labelforge_vision::{LlmVisionRefiner, VisionRefiner};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "label-express")]
#[command(about = "Wine-label design pipeline service")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "LABELFORGE__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "LABELFORGE__API__HTTP_PORT")]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "label_express=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Label Express starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        "Configuration loaded"
    );

    let pool = connect_with_retry("Postgres", || labelforge_db::connect(&config.database.url)).await?;
    let db = Arc::new(PgGateway::new(pool));

    let text_harness = StructuredLlmHarness::new(build_llm_client(&config));
    let vision_harness = StructuredLlmHarness::new(build_llm_client(&config));

    let image_adapter: Arc<dyn ImageAdapter> = Arc::new(HttpImageAdapter::new(
        config.image.base_url.clone(),
        read_api_key(&config.image.api_key_env),
        config.image.model.clone(),
        Duration::from_millis(config.image.timeout_ms),
    ));

    let object_store: Arc<dyn ObjectStore> = if config.storage.backend == "s3" {
        Arc::new(S3CompatibleStore::new(
            config.storage.endpoint.clone(),
            config.storage.bucket.clone(),
            config.storage.public_base_url.clone(),
        ))
    } else {
        Arc::new(LocalFsStore::new(
            config.storage.local_root.clone(),
            config.storage.public_base_url.clone(),
        ))
    };
    let content_store = Arc::new(ContentStore::new(object_store, db.clone()));

    let renderer: Arc<dyn RendererClient> =
        Arc::new(HttpRendererClient::new(config.render.base_url.clone()));

    let vision_refiner: Arc<dyn VisionRefiner> = Arc::new(LlmVisionRefiner::new(
        vision_harness,
        config.vision.model.clone(),
    ));

    let pipeline_config = PipelineConfig {
        design_scheme_model: config.llm.design_scheme_model.clone(),
        image_prompts_model: config.llm.image_prompts_model.clone(),
        detailed_layout_model: config.llm.detailed_layout_model.clone(),
        refine_model: config.vision.model.clone(),
        max_image_concurrency: config.pipeline.max_image_concurrency,
        max_refine_iterations: config.pipeline.max_iterations as u32,
        llm_timeout: Duration::from_millis(config.llm.timeout_ms),
        render_timeout: Duration::from_millis(config.pipeline.render_timeout_ms),
        image_timeout: Duration::from_millis(config.pipeline.image_generate_timeout_ms),
        ..PipelineConfig::default()
    };

    let deps = StageDeps {
        harness: text_harness,
        image_adapter,
        content_store,
        renderer,
        vision_refiner,
        config: pipeline_config,
    };

    let orchestrator = Arc::new(Orchestrator::new(db.clone(), deps));
    let state = labelforge_api::AppState {
        db: db.clone(),
        orchestrator,
    };
    let app = labelforge_api::build_router(state);

    info!("Label Express is ready to serve traffic");

    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to register SIGTERM handler");
            tokio::select! {
                _ = ctrl_c => info!("Received SIGINT, shutting down"),
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
            info!("Received SIGINT, shutting down");
        }
    };

    let addr = SocketAddr::new(config.api.host.parse()?, config.api.http_port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Starting HTTP server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Label Express shut down cleanly");
    Ok(())
}

fn build_llm_client(config: &AppConfig) -> Arc<dyn LlmClient> {
    Arc::new(HttpLlmClient::new(
        config.llm.base_url.clone(),
        read_api_key(&config.llm.api_key_env),
        Duration::from_millis(config.llm.timeout_ms),
    ))
}

fn read_api_key(env_var: &str) -> String {
    std::env::var(env_var).unwrap_or_default()
}

/// Connect to an external service with exponential backoff (3 attempts).
async fn connect_with_retry<T, F, Fut>(service_name: &str, connect_fn: F) -> anyhow::Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = labelforge_core::LabelResult<T>>,
{
    let delays = [
        Duration::from_secs(0),
        Duration::from_secs(2),
        Duration::from_secs(4),
    ];
    let mut last_err = None;
    for (attempt, delay) in delays.iter().enumerate() {
        if attempt > 0 {
            warn!(service = service_name, attempt, "Retrying connection after {}s", delay.as_secs());
            tokio::time::sleep(*delay).await;
        }
        match connect_fn().await {
            Ok(conn) => {
                info!(service = service_name, "Connected successfully");
                return Ok(conn);
            }
            Err(e) => {
                error!(service = service_name, attempt, error = %e, "Connection failed");
                last_err = Some(e);
            }
        }
    }
    Err(last_err
        .map(anyhow::Error::from)
        .unwrap_or_else(|| anyhow::anyhow!("{} connection failed", service_name)))
}

mod routes;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use baurat_agent::{OllamaBackend, OpenAiBackend};
use baurat_core::{
    agent::AgentBackend,
    config::Config,
    pipeline::PipelineSettings,
    retrieval::DocumentSearch,
    types::RegulationQuery,
};
use baurat_domains::{regulation::index::HttpDocumentIndex, RegulationCrew};
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::routes::{chat, health, home, multi_agent, ping};

// ── AppState ──────────────────────────────────────────────────────────────

pub struct AppState {
    /// `None` until the crew is wired up; handlers answer 503 meanwhile.
    pub crew: Option<Arc<RegulationCrew>>,
    pub config: Arc<Config>,
    pub start_time: Instant,
}

// ── CLI ───────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Stuttgart building regulation analysis crew")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Start the web service (default)
    Serve,
    /// Run one analysis and print the report
    Analyze {
        /// The regulation question
        query: String,
        #[arg(long, default_value = "mixed-use")]
        project_type: String,
        #[arg(long, default_value = "Stuttgart")]
        location: String,
        #[arg(long, default_value = "general")]
        district: String,
        #[arg(long, default_value = "normal")]
        urgency: String,
        /// Print every stage output, not just the final report
        #[arg(short, long)]
        verbose: bool,
    },
}

// ── main ──────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(config.log_json);

    let crew = Arc::new(build_crew(&config));

    match args.command.unwrap_or(CliCommand::Serve) {
        CliCommand::Serve => serve(config, crew).await,
        CliCommand::Analyze {
            query,
            project_type,
            location,
            district,
            urgency,
            verbose,
        } => {
            let query = RegulationQuery::new(query)
                .with_project_type(project_type)
                .with_location(location)
                .with_district(district)
                .with_urgency(urgency);
            analyze(&crew, &query, verbose).await
        },
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "baurat_server=info,baurat_core=info,baurat_agent=info,baurat_domains=info,tower_http=info"
            .into()
    });
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_backend(config: &Config) -> Arc<dyn AgentBackend> {
    match config.backend.as_str() {
        "ollama" => Arc::new(
            OllamaBackend::new(&config.ollama_url).with_timeout(config.agent_timeout_s),
        ),
        _ => Arc::new(
            OpenAiBackend::new(&config.openai_api_key, &config.openai_base_url)
                .with_timeout(config.agent_timeout_s),
        ),
    }
}

fn build_crew(config: &Config) -> RegulationCrew {
    let search = if config.document_index_url.is_empty() {
        warn!("DOCUMENT_INDEX_URL not set; document research runs without retrieval");
        DocumentSearch::disabled()
    } else {
        DocumentSearch::new(Arc::new(HttpDocumentIndex::new(&config.document_index_url)))
    };
    let settings = PipelineSettings {
        model: config.model.clone(),
        temperature: config.temperature,
    };
    RegulationCrew::new(build_backend(config), search, settings).with_top_k(config.search_top_k)
}

async fn analyze(crew: &RegulationCrew, query: &RegulationQuery, verbose: bool) -> anyhow::Result<()> {
    if !verbose {
        println!("{}", crew.run(query).await);
        return Ok(());
    }
    let run = crew.try_run(query).await?;
    for stage in &run.stages {
        println!("==== [{}] {} ({}) ====", stage.task, stage.label, stage.agent_role);
        println!("{}\n", stage.output);
    }
    Ok(())
}

pub(crate) fn app(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .route("/", get(home))
        .route("/multi-agent", post(multi_agent))
        .route("/chat", post(chat))
        .route("/ping", get(ping))
        .route("/health", get(health));

    if let Some(dir) = static_dir.filter(|d| d.is_dir()) {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn serve(config: Config, crew: Arc<RegulationCrew>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.web_bind, config.web_port);
    let static_dir = config.static_dir.clone();
    info!(
        backend = crew.backend_name(),
        model = %config.model,
        document_index = crew.has_document_index(),
        "regulation crew initialized"
    );

    let state = Arc::new(AppState {
        crew: Some(crew),
        config: Arc::new(config),
        start_time: Instant::now(),
    });
    let app = app(state, Some(Path::new(&static_dir)));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {addr}");
    info!("  GET  /             main interface");
    info!("  POST /chat         single-message chat (legacy)");
    info!("  POST /multi-agent  multi-agent analysis");
    info!("  GET  /health       system health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

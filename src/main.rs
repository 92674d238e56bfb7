use std::future::ready;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::extract::{MatchedPath, Request};
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::response::IntoResponse;
use axum::routing::get;
use clap::Parser;
use console::{style, Term};
use fmcd_dashboard::client::FmcdClient;
use fmcd_dashboard::config::Config;
use fmcd_dashboard::metrics::{init_prometheus_metrics, record_api_request};
use fmcd_dashboard::observability::{init_logging, LoggingConfig};
use fmcd_dashboard::router::build_router;
use fmcd_dashboard::state::AppState;
use fmcd_dashboard::teams::{FileConfigStore, StaticTeamDirectory};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Parser)]
#[clap(version, about = "Team dashboard backend for a fedimint client daemon")]
struct Cli {
    /// Data directory path (contains config, team store and logs)
    #[clap(long, env = "FMCD_DASHBOARD_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Server address (overrides config)
    #[clap(long, env = "FMCD_DASHBOARD_ADDR")]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli: Cli = Cli::parse();

    let log_config = LoggingConfig {
        level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        log_dir: cli.data_dir.join("logs"),
        console_output: std::env::var("NO_CONSOLE_LOG").is_err(),
        file_output: std::env::var("NO_FILE_LOG").is_err(),
        ..Default::default()
    };
    init_logging(log_config)?;

    info!("Starting fmcd-dashboard");

    std::fs::create_dir_all(&cli.data_dir)?;
    let config_path = cli.data_dir.join("fmcd-dashboard.conf");

    let term = Term::stdout();
    let (mut config, user_generated) = Config::load_or_create(&config_path)?;

    if user_generated {
        term.write_line(&format!(
            "{}{}",
            style("Generating default admin user...").yellow(),
            style("done").white()
        ))?;
        term.write_line(&format!(
            "Bearer token for the '{}' team is stored in {}",
            fmcd_dashboard::config::BOOTSTRAP_TEAM_ID,
            config_path.display()
        ))?;
    }

    if let Some(addr) = cli.addr {
        if let Some((ip, port_str)) = addr.split_once(':') {
            config.http_bind_ip = ip.to_string();
            if let Ok(port) = port_str.parse::<u16>() {
                config.http_bind_port = port;
            }
        }
    }

    let store_path = config.resolved_store_path(&cli.data_dir);
    let store = FileConfigStore::open(&store_path)?;

    let directory = StaticTeamDirectory::new(config.users.clone());
    info!(users = directory.user_count(), "Loaded dashboard users");

    let client = FmcdClient::new(config.client.retry_policy())?;
    let state = AppState::new(client, Arc::new(store), Arc::new(directory));

    start_main_server(&config, state).await
}

async fn start_main_server(config: &Config, state: AppState) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_origin(Any)
        .allow_headers(Any);

    let metrics_handle = init_prometheus_metrics()?;

    let app = build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .route("/metrics", get(move || ready(metrics_handle.render())))
        .route_layer(middleware::from_fn(track_metrics));

    let addr = config.http_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("fmcd-dashboard listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn track_metrics(req: Request, next: Next) -> impl IntoResponse {
    let start = Instant::now();
    let path = if let Some(matched_path) = req.extensions().get::<MatchedPath>() {
        matched_path.as_str().to_owned()
    } else {
        req.uri().path().to_owned()
    };
    let method = req.method().clone();

    let response = next.run(req).await;

    record_api_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed(),
    );

    response
}

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use authn::SessionSecret;
use webapi::{AppState, Backend};

use crate::config::{BackendKind, Config};

#[derive(Parser, Debug)]
#[command(name = "eduloop", about = "e-learning backend over an embedded log-structured store")]
struct Args {
    /// Address the HTTP server binds to.
    #[arg(long)]
    listen_addr: Option<String>,

    /// Path to the data file (log backend) or database file (sql backend).
    #[arg(long)]
    db_path: Option<String>,

    /// Path to a TOML config file; defaults to ~/.eduloop/config.toml.
    #[arg(long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Storage backend to use.
    #[arg(long, value_enum)]
    backend: Option<BackendKind>,
}

struct ResolvedConfig {
    listen_addr: String,
    db_path: PathBuf,
    log_level: String,
    backend: BackendKind,
}

impl ResolvedConfig {
    fn from_args_and_config(args: &Args, config: &Config) -> Self {
        Self {
            listen_addr: args.listen_addr.clone().unwrap_or_else(|| config.server.listen_addr.clone()),
            db_path: args.db_path.as_ref().map(PathBuf::from).unwrap_or_else(|| config.db_path()),
            log_level: args.log_level.clone().or_else(|| std::env::var("EDULOOP_LOG").ok()).unwrap_or_else(|| config.logging.level.clone()),
            backend: args.backend.unwrap_or(config.storage.backend),
        }
    }
}

fn setup_logging(log_level: &str) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let log_dir = Config::log_dir();
    std::fs::create_dir_all(&log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "eduloop.log");

    let stdout_layer = fmt::layer().with_target(false).with_thread_ids(false);
    let file_layer = fmt::layer().json().with_writer(file_appender);

    tracing_subscriber::registry().with(filter).with(stdout_layer).with(file_layer).init();
}

/// Registers every secondary index the web layer depends on. `logdb` has no
/// schema of its own; these calls are the schema, and they must run before
/// any handler touches the store.
fn register_indexes(store: &logdb::Store) -> Result<(), logdb::Error> {
    store.index::<domain::Course>("by_owner", |c| logdb::Id::new(&c.owner_id))?;
    store.index::<domain::Lesson>("by_course", |l| logdb::Id::new(&l.course_id))?;
    store.index::<domain::Enrolment>("by_course", |e| logdb::Id::new(&e.course_id))?;
    store.index::<domain::Enrolment>("by_user", |e| logdb::Id::new(&e.user_id))?;
    store.index::<domain::Homework>("by_learner", |h| logdb::Id::new(&h.learner_id))?;
    store.index::<domain::User>("by_email", |u| logdb::Id::new(&u.email))?;
    Ok(())
}

fn open_backend(resolved: &ResolvedConfig) -> Backend {
    if let Some(parent) = resolved.db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    match resolved.backend {
        BackendKind::Log => {
            let store = logdb::Store::open(&resolved.db_path).unwrap_or_else(|e| {
                error!("failed to open store: {}", e);
                std::process::exit(1);
            });
            if let Err(e) = register_indexes(&store) {
                error!("failed to register indexes: {}", e);
                std::process::exit(1);
            }
            Backend::Log(Arc::new(store))
        }
        BackendKind::Sql => {
            let store = sqlstore::SqlStore::open(&resolved.db_path).unwrap_or_else(|e| {
                error!("failed to open database: {}", e);
                std::process::exit(1);
            });
            Backend::Sql(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT"),
        _ = terminate => info!("received SIGTERM"),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(std::path::Path::new(path)),
        None => Config::load(),
    };

    let resolved = ResolvedConfig::from_args_and_config(&args, &config);

    setup_logging(&resolved.log_level);
    info!("eduloop starting");

    info!(path = %resolved.db_path.display(), backend = ?resolved.backend, "opening storage");
    let backend = open_backend(&resolved);
    info!("storage ready");

    let state = AppState { backend, jwt_secret: SessionSecret(Arc::new(authn::generate_secret())) };

    info!(addr = %resolved.listen_addr, "listening");
    if let Err(e) = webapi::serve_with_shutdown(state, &resolved.listen_addr, shutdown_signal()).await {
        error!("server error: {}", e);
        std::process::exit(1);
    }

    info!("eduloop stopped");
}

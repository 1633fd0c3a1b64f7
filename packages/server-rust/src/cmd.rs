//! Entry points of the `ichor` subcommands.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use ichor_core::Delegate;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api;
use crate::auth::{AuthState, JwtAuthenticator};
use crate::config::{Cli, Command, DbArgs, ServeArgs, StorageKind, TokenArgs};
use crate::domain::{Domains, DOMAIN_NAMES};
use crate::network::NetworkModule;
use crate::sqldb::Db;
use crate::store::Backend;
use crate::telemetry;
use crate::workflow::{load_rules, Workflow};

/// Runs the parsed command line.
///
/// # Errors
///
/// Returns the first setup or runtime error of the chosen subcommand.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    telemetry::init_tracing(cli.log_format)?;
    match cli.command {
        Command::Serve(args) => serve(*args).await,
        Command::Migrate(args) => migrate(&args).await,
        Command::Token(args) => {
            println!("{}", token(&args)?);
            Ok(())
        }
    }
}

/// Serves the API until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if configuration is invalid, migrations fail, or the
/// listener cannot be bound.
pub async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    if let Some(addr) = args.metrics_addr {
        telemetry::install_metrics(addr)?;
    }

    let authenticator = Arc::new(
        JwtAuthenticator::new(&args.auth.to_config()).context("configuring authentication")?,
    );

    let backend = match args.storage {
        StorageKind::Postgres => {
            let db = Db::open(&args.db.to_config());
            if args.migrate {
                db.migrate().await.context("applying migrations")?;
            }
            Backend::Postgres(db)
        }
        StorageKind::Memory => {
            warn!("using in-memory storage; data is lost on exit");
            Backend::Memory
        }
    };

    let rules = match &args.workflow.workflow_rules {
        Some(path) => load_rules(path)?,
        None => Vec::new(),
    };

    let delegate = Arc::new(Delegate::new());
    let workflow = Workflow::start(
        rules,
        args.workflow.to_config(),
        &delegate,
        &DOMAIN_NAMES,
    );

    let domains = Domains::new(backend.clone(), delegate, args.cache.to_config());
    let router = api::router(&domains, AuthState::new(authenticator));

    let network = NetworkModule::new(args.web.to_config(), backend.clone(), router);
    info!(storage = backend.name(), "storage ready");
    listen(network, workflow, shutdown_signal()).await
}

/// Binds and serves `network` until `shutdown` resolves. The workflow
/// worker is stopped on every exit path, a failed bind included.
async fn listen(
    mut network: NetworkModule,
    workflow: Workflow,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let port = match network.start().await {
        Ok(port) => port,
        Err(e) => {
            workflow.stop().await;
            return Err(e);
        }
    };
    info!(port, "ichor listening");

    let served = network.serve(shutdown).await;
    workflow.stop().await;
    info!("ichor stopped");
    served
}

/// Applies pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn migrate(args: &DbArgs) -> anyhow::Result<()> {
    Db::open(&args.to_config())
        .migrate()
        .await
        .context("applying migrations")
}

/// Mints a development token.
///
/// # Errors
///
/// Returns an error if the secret is empty or signing fails.
pub fn token(args: &TokenArgs) -> anyhow::Result<String> {
    let auth = JwtAuthenticator::new(&args.auth.to_config())?;
    let user_id = args.user_id.unwrap_or_else(Uuid::new_v4);
    Ok(auth.issue(user_id, &args.roles)?)
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

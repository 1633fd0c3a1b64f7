//! Command-line and environment configuration.
//!
//! Every flag can also be set through the `ICHOR_*` variable named next to
//! it. Argument groups convert into the typed configs the modules take.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::auth::AuthConfig;
use crate::network::{NetworkConfig, TlsConfig, DEFAULT_MAX_BODY_BYTES};
use crate::sqldb::DbConfig;
use crate::store::CacheConfig;
use crate::workflow::WorkerConfig;

#[derive(Debug, Parser)]
#[command(name = "ichor", version, about = "ichor business backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log output format.
    #[arg(long, env = "ICHOR_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve(Box<ServeArgs>),
    /// Apply pending database migrations and exit.
    Migrate(DbArgs),
    /// Print a signed token for local development.
    Token(TokenArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    Postgres,
    /// Process-local storage; everything is lost on exit.
    Memory,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub web: WebArgs,
    #[command(flatten)]
    pub db: DbArgs,
    #[command(flatten)]
    pub auth: AuthArgs,
    #[command(flatten)]
    pub cache: CacheArgs,
    #[command(flatten)]
    pub workflow: WorkflowArgs,

    #[arg(long, env = "ICHOR_STORAGE", value_enum, default_value_t = StorageKind::Postgres)]
    pub storage: StorageKind,

    /// Apply migrations before serving (postgres only).
    #[arg(long, env = "ICHOR_MIGRATE_ON_START")]
    pub migrate: bool,

    /// Serve Prometheus metrics on this address.
    #[arg(long, env = "ICHOR_METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,
}

#[derive(Debug, Args)]
pub struct WebArgs {
    #[arg(long, env = "ICHOR_WEB_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "ICHOR_WEB_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Comma-separated allowed origins; `*` allows any.
    #[arg(long, env = "ICHOR_WEB_CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    pub cors_origins: Vec<String>,

    #[arg(long, env = "ICHOR_WEB_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "ICHOR_WEB_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    #[arg(long, env = "ICHOR_WEB_TLS_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    #[arg(long, env = "ICHOR_WEB_TLS_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,
}

impl WebArgs {
    #[must_use]
    pub fn to_config(&self) -> NetworkConfig {
        let tls = match (&self.tls_cert, &self.tls_key) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: cert.clone(),
                key_path: key.clone(),
            }),
            _ => None,
        };
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            tls,
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

#[derive(Debug, Args)]
pub struct DbArgs {
    #[arg(long, env = "ICHOR_DB_HOST", default_value = "localhost")]
    pub db_host: String,

    #[arg(long, env = "ICHOR_DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    #[arg(long, env = "ICHOR_DB_USER", default_value = "postgres")]
    pub db_user: String,

    #[arg(long, env = "ICHOR_DB_PASSWORD", default_value = "postgres", hide_env_values = true)]
    pub db_password: String,

    #[arg(long, env = "ICHOR_DB_NAME", default_value = "postgres")]
    pub db_name: String,

    #[arg(long, env = "ICHOR_DB_MAX_OPEN_CONNS", default_value_t = 10)]
    pub db_max_open_conns: u32,

    /// Require TLS on database connections.
    #[arg(long, env = "ICHOR_DB_REQUIRE_TLS")]
    pub db_require_tls: bool,
}

impl DbArgs {
    #[must_use]
    pub fn to_config(&self) -> DbConfig {
        DbConfig {
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            host: self.db_host.clone(),
            port: self.db_port,
            name: self.db_name.clone(),
            max_open_conns: self.db_max_open_conns,
            disable_tls: !self.db_require_tls,
            ..DbConfig::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct AuthArgs {
    /// HS256 signing secret.
    #[arg(long, env = "ICHOR_AUTH_SECRET", hide_env_values = true)]
    pub auth_secret: String,

    #[arg(long, env = "ICHOR_AUTH_ISSUER", default_value = "ichor")]
    pub auth_issuer: String,

    #[arg(long, env = "ICHOR_AUTH_TOKEN_TTL_SECS", default_value_t = 3600)]
    pub token_ttl_secs: u64,
}

impl AuthArgs {
    #[must_use]
    pub fn to_config(&self) -> AuthConfig {
        AuthConfig {
            secret: self.auth_secret.clone(),
            issuer: self.auth_issuer.clone(),
            token_ttl: Duration::from_secs(self.token_ttl_secs),
        }
    }
}

#[derive(Debug, Args)]
pub struct CacheArgs {
    #[arg(long, env = "ICHOR_CURRENCY_CACHE_CAPACITY", default_value_t = 10_000)]
    pub currency_cache_capacity: usize,

    #[arg(long, env = "ICHOR_CURRENCY_CACHE_TTL_SECS", default_value_t = 60)]
    pub currency_cache_ttl_secs: u64,
}

impl CacheArgs {
    #[must_use]
    pub fn to_config(&self) -> CacheConfig {
        CacheConfig {
            capacity: self.currency_cache_capacity,
            ttl: Duration::from_secs(self.currency_cache_ttl_secs),
        }
    }
}

#[derive(Debug, Args)]
pub struct WorkflowArgs {
    /// JSON file with automation rules.
    #[arg(long, env = "ICHOR_WORKFLOW_RULES")]
    pub workflow_rules: Option<PathBuf>,

    #[arg(long, env = "ICHOR_WORKFLOW_QUEUE_CAPACITY", default_value_t = 1024)]
    pub workflow_queue_capacity: usize,
}

impl WorkflowArgs {
    #[must_use]
    pub fn to_config(&self) -> WorkerConfig {
        WorkerConfig {
            capacity: self.workflow_queue_capacity,
            ..WorkerConfig::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[command(flatten)]
    pub auth: AuthArgs,

    /// Subject of the token; a random id when omitted.
    #[arg(long)]
    pub user_id: Option<Uuid>,

    /// Comma-separated roles.
    #[arg(long, value_delimiter = ',', default_value = "ADMIN")]
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["ichor", "serve", "--auth-secret", "s"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(cli.log_format, LogFormat::Text);
        assert_eq!(args.storage, StorageKind::Postgres);

        let web = args.web.to_config();
        assert_eq!(web.port, 3000);
        assert_eq!(web.cors_origins, vec!["*"]);
        assert!(web.tls.is_none());

        let db = args.db.to_config();
        assert!(db.disable_tls);
        assert_eq!(db.max_open_conns, 10);

        assert_eq!(args.cache.to_config(), CacheConfig::default());
        assert_eq!(args.workflow.to_config(), WorkerConfig::default());
        assert_eq!(args.auth.to_config().issuer, "ichor");
    }

    #[test]
    fn serve_overrides() {
        let cli = Cli::try_parse_from([
            "ichor",
            "--log-format",
            "json",
            "serve",
            "--auth-secret",
            "s",
            "--storage",
            "memory",
            "--port",
            "8080",
            "--cors-origins",
            "http://a.test,http://b.test",
            "--tls-cert",
            "cert.pem",
            "--tls-key",
            "key.pem",
            "--metrics-addr",
            "127.0.0.1:9090",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.storage, StorageKind::Memory);
        assert!(args.metrics_addr.is_some());

        let web = args.web.to_config();
        assert_eq!(web.port, 8080);
        assert_eq!(web.cors_origins.len(), 2);
        assert_eq!(web.tls.unwrap().key_path, PathBuf::from("key.pem"));
    }

    #[test]
    fn tls_cert_requires_key() {
        assert!(Cli::try_parse_from([
            "ichor",
            "serve",
            "--auth-secret",
            "s",
            "--tls-cert",
            "cert.pem",
        ])
        .is_err());
    }

    #[test]
    fn token_roles_are_split() {
        let cli = Cli::try_parse_from([
            "ichor",
            "token",
            "--auth-secret",
            "s",
            "--roles",
            "ADMIN,USER",
        ])
        .unwrap();
        let Command::Token(args) = cli.command else {
            panic!("expected token");
        };
        assert_eq!(args.roles, vec!["ADMIN", "USER"]);
        assert!(args.user_id.is_none());
    }
}

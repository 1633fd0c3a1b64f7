//! Listener, TLS and request-limit settings for the HTTP server.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

/// Request body cap applied when none is configured.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1 << 20;
/// Per-request deadline applied when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub host: String,
    /// 0 lets the OS pick; `NetworkModule::start` reports the bound port.
    pub port: u16,
    /// Serve HTTPS when set.
    pub tls: Option<TlsConfig>,
    /// `*` anywhere in the list allows every origin.
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
    /// Larger bodies are refused with 413 by the `Json` and `String`
    /// extractors.
    pub max_body_bytes: usize,
}

impl NetworkConfig {
    /// `host:port` in the form `TcpListener::bind` accepts. IPv6 literals
    /// are bracketed.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o.trim() == "*")
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            tls: None,
            cors_origins: vec!["*".to_string()],
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// PEM certificate chain and private key for HTTPS.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

impl TlsConfig {
    /// Confirms both PEM files exist and are regular files, so a bad path
    /// is reported by name instead of as a rustls parse error.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first path that cannot be used.
    pub async fn check_files(&self) -> anyhow::Result<()> {
        for path in [&self.cert_path, &self.key_path] {
            let meta = tokio::fs::metadata(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            anyhow::ensure!(meta.is_file(), "{} is not a file", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str, port: u16) -> NetworkConfig {
        NetworkConfig {
            host: host.to_string(),
            port,
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn bind_addr_brackets_ipv6() {
        assert_eq!(config("0.0.0.0", 3000).bind_addr(), "0.0.0.0:3000");
        assert_eq!(config("::1", 8080).bind_addr(), "[::1]:8080");
        assert_eq!(config("[::1]", 8080).bind_addr(), "[::1]:8080");
        assert_eq!(config("localhost", 0).bind_addr(), "localhost:0");
    }

    #[test]
    fn wildcard_origin_is_detected() {
        let mut cfg = NetworkConfig::default();
        assert!(cfg.allows_any_origin());
        cfg.cors_origins = vec!["http://a.test".to_string()];
        assert!(!cfg.allows_any_origin());
    }

    #[tokio::test]
    async fn tls_file_check_names_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("cert.pem");
        std::fs::write(&cert, "pem").unwrap();
        let tls = TlsConfig {
            cert_path: cert.clone(),
            key_path: dir.path().join("missing.pem"),
        };
        let err = tls.check_files().await.unwrap_err();
        assert!(format!("{err:#}").contains("missing.pem"));

        let tls = TlsConfig {
            cert_path: cert,
            key_path: dir.path().to_path_buf(),
        };
        assert!(tls.check_files().await.is_err());
    }
}

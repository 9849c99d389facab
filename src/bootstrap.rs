//! Shared bootstrap logic for the CLI and embedders
//!
//! Loads configuration, builds the gateway services as explicit instances
//! and runs the HTTP server.

use crate::api::{build_app, ApiState};
use crate::audit::ComplianceLog;
use crate::config::GatewayConfig;
use crate::gateway::Gateway;
use crate::privacy::{ChecksumMode, ContentInspector, PatternCatalog};
use crate::routing::RoutingEngine;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "sovereign-gateway.hcl";

fn read_config(path: &Path) -> Result<GatewayConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    GatewayConfig::from_hcl(&content).map_err(|e| anyhow::anyhow!("Config parse error: {e}"))
}

/// Load configuration with the discovery chain:
/// explicit path > `./sovereign-gateway.hcl` >
/// `<config_dir>/sovereign-gateway/config.hcl` > defaults.
///
/// Environment overrides are applied on top and the result is validated.
/// Runs before logging is initialized, so the path the configuration came
/// from is returned for the caller to report.
pub fn load_config(explicit_path: Option<&PathBuf>) -> Result<(GatewayConfig, Option<PathBuf>)> {
    let (mut config, config_path) = if let Some(path) = explicit_path {
        (read_config(path)?, Some(path.clone()))
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        let path = PathBuf::from(LOCAL_CONFIG_FILE);
        (read_config(&path)?, Some(path))
    } else if let Some(hcl_path) = dirs::config_dir()
        .map(|dir| dir.join("sovereign-gateway/config.hcl"))
        .filter(|p| p.exists())
    {
        (read_config(&hcl_path)?, Some(hcl_path))
    } else {
        (GatewayConfig::default(), None)
    };

    config
        .apply_process_env()
        .context("Invalid environment override")?;
    config.validate().context("Invalid configuration")?;
    Ok((config, config_path))
}

/// Build the content inspector described by the configuration
pub fn build_inspector(config: &GatewayConfig) -> Result<ContentInspector> {
    let mode = if config.inspector.strict_checksums {
        ChecksumMode::Strict
    } else {
        ChecksumMode::FormatOnly
    };
    let catalog = PatternCatalog::australian().context("Failed to compile detector catalog")?;
    Ok(ContentInspector::new(catalog, mode)
        .with_extra_keywords(&config.inspector.extra_keywords))
}

/// Build the full gateway: inspector, routing engine and audit log
pub async fn build_gateway(config: &GatewayConfig) -> Result<Gateway> {
    let inspector = build_inspector(config)?;
    let engine =
        RoutingEngine::from_config(&config.routing).context("Failed to build routing engine")?;
    let audit = ComplianceLog::open(&config.audit.log_file)
        .await
        .context("Failed to open compliance log")?;

    tracing::info!(
        threshold = config.routing.threshold,
        cloud_model = %config.routing.cloud.model,
        sovereign_model = %config.routing.sovereign.model,
        strict_checksums = config.inspector.strict_checksums,
        "Gateway initialized"
    );
    if !config.routing.cloud.has_api_key() {
        tracing::warn!("Cloud API key not configured; cloud-routed requests will return an error");
    }

    Ok(Gateway::new(
        inspector,
        engine,
        Arc::new(audit),
        config.server.max_request_size,
    ))
}

/// Bind a listener on `host` (IPv4, IPv6 or hostname) and `port`
pub async fn bind_listener(host: &str, port: u16) -> Result<tokio::net::TcpListener> {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {host} port {port}"))
}

/// Build, bind and serve the gateway until Ctrl-C.
pub async fn run_gateway(config: GatewayConfig, host: &str, port: u16) -> Result<()> {
    let gateway = build_gateway(&config).await?;
    let app = build_app(ApiState {
        gateway: Arc::new(gateway),
        config: Arc::new(config),
    });

    let listener = bind_listener(host, port).await?;
    let addr = listener.local_addr().context("Failed to read bound address")?;
    tracing::info!(%addr, "Sovereign gateway listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        tokio::signal::ctrl_c().await.ok();
    })
    .await
    .context("HTTP server error")?;

    tracing::info!("Shutting down...");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_explicit_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gateway.hcl");
        std::fs::write(&path, "routing {\n  threshold = 0.45\n}\n").unwrap();

        let (config, loaded_from) = load_config(Some(&path)).unwrap();
        assert_eq!(loaded_from, Some(path));
        // PII_THRESHOLD may be set in the environment running the tests
        if std::env::var("PII_THRESHOLD").is_err() {
            assert_eq!(config.routing.threshold, 0.45);
        }
    }

    #[tokio::test]
    async fn test_bind_listener_accepts_ip_and_hostname_forms() {
        for host in ["127.0.0.1", "localhost"] {
            let listener = bind_listener(host, 0).await.unwrap();
            assert!(listener.local_addr().unwrap().ip().is_loopback());
        }
    }

    #[tokio::test]
    async fn test_bind_listener_accepts_ipv6_literals() {
        // hosts without IPv6 fail at bind time, never at address parsing
        for host in ["::1", "[::1]", "::"] {
            match bind_listener(host, 0).await {
                Ok(listener) => assert!(listener.local_addr().unwrap().is_ipv6()),
                Err(e) => assert!(e.to_string().starts_with("Failed to bind")),
            }
        }
    }

    #[test]
    fn test_load_missing_explicit_config_fails() {
        let missing = PathBuf::from("/nonexistent/sovereign-gateway.hcl");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn test_build_inspector_strict_mode() {
        let mut config = GatewayConfig::default();
        config.inspector.strict_checksums = true;
        config.inspector.extra_keywords = vec!["nightjar".to_string()];
        let inspector = build_inspector(&config).unwrap();
        assert_eq!(inspector.checksum_mode(), ChecksumMode::Strict);
        assert!(inspector.keywords().iter().any(|k| k == "nightjar"));
    }

    #[tokio::test]
    async fn test_build_gateway_opens_audit_log() {
        let dir = TempDir::new().unwrap();
        let mut config = GatewayConfig::default();
        config.audit.log_file = dir.path().join("logs/audit.log");
        let gateway = build_gateway(&config).await.unwrap();
        assert!(config.audit.log_file.exists());
        assert_eq!(gateway.max_request_size(), 1024 * 1024);
    }
}

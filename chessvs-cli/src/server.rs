//! Server command - start the web board server
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_server(), start_server()
//! - Level 3: (delegated to chessvs-server crate)
//! - Level 4: configuration validation

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use chessvs_core::GameConfig;
use chessvs_server::{run_server, ServerConfig};

use crate::config::AppConfig;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ServerArgs {
    /// Port number to listen on [default: from config, else 8002]
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory containing the board front end
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run server command
///
/// 1. Merge flags over the loaded configuration
/// 2. Start server (blocking)
pub fn run(args: ServerArgs, app: AppConfig) -> Result<()> {
    let (server, game) = configure_server(&args, app)?;

    tracing::info!(
        port = server.port,
        human = %game.human_color,
        "Starting CHESSVS server"
    );

    start_server(server, game)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Command-line flags override the config file
fn configure_server(args: &ServerArgs, app: AppConfig) -> Result<(ServerConfig, GameConfig)> {
    let AppConfig { game, mut server } = app;

    if let Some(port) = args.port {
        server.port = port;
    }
    if let Some(dir) = &args.static_dir {
        server.static_dir = dir.to_string_lossy().to_string();
    }

    validate_static_dir(Path::new(&server.static_dir))?;

    Ok((server, game))
}

/// Start the server (blocking)
fn start_server(server: ServerConfig, game: GameConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_server(server, game))
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Validate that static directory exists
fn validate_static_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        tracing::warn!(
            "Static directory does not exist: {}. Only the API will be served.",
            path.display()
        );
    } else if !path.is_dir() {
        anyhow::bail!(
            "Static path exists but is not a directory: {}",
            path.display()
        );
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn no_flags() -> ServerArgs {
        ServerArgs {
            port: None,
            static_dir: None,
        }
    }

    #[test]
    fn test_configure_server_defaults() {
        let (server, game) = configure_server(&no_flags(), AppConfig::default()).unwrap();
        assert_eq!(server, ServerConfig::default());
        assert_eq!(game, GameConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let args = ServerArgs {
            port: Some(9100),
            static_dir: Some(PathBuf::from("test_static")),
        };

        let (server, game) = configure_server(&args, AppConfig::default()).unwrap();
        assert_eq!(server.port, 9100);
        assert_eq!(server.static_dir, "test_static");
        assert_eq!(game, GameConfig::default());
    }

    #[test]
    fn test_validate_static_dir_nonexistent() {
        // Should not error, just warn
        assert!(validate_static_dir(Path::new("/nonexistent/path")).is_ok());
    }

    #[test]
    fn test_validate_static_dir_is_file() {
        let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        assert!(validate_static_dir(&manifest).is_err());
    }
}

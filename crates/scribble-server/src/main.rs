//! Scribble game server.
//!
//! Environment:
//! - `SCRIBBLE_BIND` (default `0.0.0.0:3000`)
//! - `SCRIBBLE_MAX_ROUNDS` (default 3)
//! - `SCRIBBLE_IDLE_TIMEOUT_SECS` (default 60, at least 1)
//! - `RUST_LOG` (default `scribble=info,scribble_room=info`)

use std::time::Duration;

use scribble::DEFAULT_IDLE_TIMEOUT;
use scribble::prelude::*;

const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[derive(Debug, PartialEq)]
struct Settings {
    bind: String,
    game: GameConfig,
    idle_timeout: Duration,
}

impl Settings {
    fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self {
            bind: lookup("SCRIBBLE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            game: GameConfig::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        };

        if let Some(raw) = lookup("SCRIBBLE_MAX_ROUNDS") {
            let rounds: u32 = raw
                .trim()
                .parse()
                .map_err(|e| format!("SCRIBBLE_MAX_ROUNDS={raw:?}: {e}"))?;
            if rounds == 0 {
                return Err("SCRIBBLE_MAX_ROUNDS must be at least 1".into());
            }
            settings.game.max_rounds = rounds;
        }

        if let Some(raw) = lookup("SCRIBBLE_IDLE_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|e| format!("SCRIBBLE_IDLE_TIMEOUT_SECS={raw:?}: {e}"))?;
            if secs == 0 {
                return Err("SCRIBBLE_IDLE_TIMEOUT_SECS must be at least 1".into());
            }
            settings.idle_timeout = Duration::from_secs(secs);
        }

        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scribble=info,scribble_room=info".into()),
        )
        .init();

    let settings = Settings::from_env()?;
    tracing::info!(
        bind = %settings.bind,
        max_rounds = settings.game.max_rounds,
        idle_timeout_secs = settings.idle_timeout.as_secs(),
        "starting scribble server"
    );

    let server = ScribbleServer::builder()
        .bind(&settings.bind)
        .game_config(settings.game)
        .idle_timeout(settings.idle_timeout)
        .build()
        .await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }
    Ok(())
}

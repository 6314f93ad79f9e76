//! Runtime configuration (§4.7 socket paths/ports, §9 `SANDBOX` flag).
//!
//! Grounded in `examples/original_source/Server/Server.c`'s fixed game
//! (1234) and api (55554) ports, re-expressed as env-overridable fields
//! the way the teacher's `cfg-if`-gated builds select features.

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub game_port: u16,
    pub api_port: u16,
    pub tick_millis: u64,
    pub max_clients: usize,
    /// Disables the hard dev-allowlist; non-whitelisted uuids may use
    /// cheats when true (§9).
    pub sandbox: bool,
    pub rivet_token: Option<String>,
    pub rivet_lobby_id: Option<String>,
    /// Prefix squad join codes are matched against (S3's `<server_alias>-<code>`);
    /// overridden at runtime by the sidecar's inbound tag 101.
    pub server_alias: String,
}

impl ServerConfig {
    pub fn tick_duration(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    /// Reads overrides from the environment, falling back to the
    /// original's hard-coded defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("RYSTERIA_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            game_port: env_parsed("RYSTERIA_GAME_PORT", 1234),
            api_port: env_parsed("RYSTERIA_API_PORT", 55554),
            tick_millis: env_parsed("RYSTERIA_TICK_MILLIS", 40),
            max_clients: env_parsed("RYSTERIA_MAX_CLIENTS", 256),
            sandbox: env::var("SANDBOX").map(|v| v != "0").unwrap_or(false),
            rivet_token: env::var("RIVET_TOKEN").ok(),
            rivet_lobby_id: env::var("RIVET_LOBBY_ID").ok(),
            server_alias: env::var("RYSTERIA_SERVER_ALIAS").unwrap_or_else(|_| "rysteria".to_string()),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            game_port: 1234,
            api_port: 55554,
            tick_millis: 40,
            max_clients: 256,
            sandbox: false,
            rivet_token: None,
            rivet_lobby_id: None,
            server_alias: "rysteria".to_string(),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_fixed_ports() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.game_port, 1234);
        assert_eq!(cfg.api_port, 55554);
        assert_eq!(cfg.tick_duration().as_millis(), 40);
    }
}

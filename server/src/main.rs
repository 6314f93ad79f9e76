//! Entry point: loads config from the environment, opens the game
//! socket, and runs the fixed-tick loop forever (§5: "crash-on-fatal, 0
//! never returned from the event loop").

use rysteria_server::tick::Server;
use rysteria_server::ServerConfig;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = ServerConfig::from_env();
    log::info!("starting rysteria-server: game_port={} api_port={} sandbox={}", config.game_port, config.api_port, config.sandbox);

    let mut server = Server::new(config);
    if let Err(e) = server.run().await {
        log::error!("fatal: {e}");
        std::process::exit(1);
    }
}

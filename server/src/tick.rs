//! The authoritative loop: single-threaded, cooperative, pinned to
//! `tick_millis` (§5). Owns the `World` and every live [`ServerClient`];
//! nothing else is allowed to mutate either.

use std::collections::HashMap;
use std::net::SocketAddr;

use futures_util::{FutureExt, SinkExt, StreamExt};
use log::{info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::account::SidecarClient;
use crate::config::ServerConfig;
use crate::ecs::components::Arena;
use crate::ecs::entity::Entity;
use crate::ecs::store::World;
use crate::error::ServerResult;
use crate::session::dispatch::handle_frame;
use crate::session::handshake::{build_handshake_frame, HandshakeFields};
use crate::session::snapshot::write_update;
use crate::session::ServerClient;
use crate::squad;
use crate::systems;

/// Top-level server: the `World`, every live client, and the monotonic
/// tick counter systems key drop-off-timers and cooldowns against.
///
/// Sockets are polled with a zero-timeout `now_or_never` read each tick
/// rather than handed to a reader task, so the whole loop stays on one
/// thread per §5's scheduling model. The account sidecar is polled the
/// same way, right alongside the game socket (§5).
pub struct Server {
    config: ServerConfig,
    world: World,
    clients: HashMap<u32, ServerClient>,
    sockets: HashMap<u32, WebSocketStream<TcpStream>>,
    next_client_id: u32,
    tick_num: u64,
    default_arena: Entity,
    sidecar: Option<SidecarClient>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let mut world = World::new();
        let default_arena = world.alloc_entity().expect("entity table large enough for the bootstrap arena");
        world.add_arena(default_arena, Arena::new(0, 64, 256.0)).expect("freshly allocated entity has no arena yet");
        Self {
            config,
            world,
            clients: HashMap::new(),
            sockets: HashMap::new(),
            next_client_id: 1,
            tick_num: 0,
            default_arena,
            sidecar: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Binds the game socket and runs forever: a zero-timeout accept
    /// poll, then one full system pass, then sleep out the remainder of
    /// the tick (§5 "suspension points").
    pub async fn run(&mut self) -> ServerResult<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.bind_addr, self.config.game_port).parse().map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "bad bind address")
        })?;
        let listener = TcpListener::bind(addr).await?;
        info!("rysteria-server listening on {addr}");

        let sidecar_addr = format!("{}:{}", self.config.bind_addr, self.config.api_port);
        match SidecarClient::connect(&sidecar_addr).await {
            Ok(sidecar) => {
                info!("connected to account sidecar at {sidecar_addr}");
                self.sidecar = Some(sidecar);
            }
            Err(e) => warn!("account sidecar unavailable at {sidecar_addr}: {e}; running without persistence"),
        }

        let mut interval = tokio::time::interval(self.config.tick_duration());
        loop {
            tokio::select! {
                biased;
                accepted = listener.accept() => {
                    if let Ok((stream, peer)) = accepted {
                        self.accept_client(stream, peer).await;
                    }
                }
                _ = interval.tick() => {
                    self.run_one_tick();
                    self.poll_sidecar().await;
                    self.flush_sockets().await;
                }
            }
        }
    }

    async fn accept_client(&mut self, stream: TcpStream, peer: SocketAddr) {
        let ws = match tokio_tungstenite::accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                warn!("handshake failed for {peer}: {e}");
                return;
            }
        };
        let id = self.next_client_id;
        self.next_client_id += 1;

        let requested_verification = fastrand::u64(..);
        let clientbound_seed = fastrand::u64(..);
        let serverbound_seed = fastrand::u64(..);
        let frame = build_handshake_frame(&HandshakeFields {
            requested_verification,
            clientbound_key: clientbound_seed,
            serverbound_key: serverbound_seed,
        });

        let mut client = ServerClient::new(id, clientbound_seed, serverbound_seed);
        client.requested_verification = requested_verification;
        let mut ws = ws;
        if ws.send(Message::Binary(frame.to_vec())).await.is_err() {
            return;
        }
        self.clients.insert(id, client);
        self.sockets.insert(id, ws);
        info!("client {id} connected from {peer}");
    }

    /// Drains whatever's already buffered on every socket (no blocking
    /// read) and dispatches each frame in arrival order (§5: inputs
    /// received between tick N and N+1 are applied at the start of
    /// N+1, in socket-arrival order).
    fn poll_sockets(&mut self) {
        let ids: Vec<u32> = self.sockets.keys().copied().collect();
        for id in ids {
            let mut frames = Vec::new();
            if let Some(socket) = self.sockets.get_mut(&id) {
                while let Some(Some(Ok(msg))) = socket.next().now_or_never() {
                    if let Message::Binary(data) = msg {
                        frames.push(data);
                    }
                }
            }
            let Some(client) = self.clients.get_mut(&id) else { continue };
            for frame in frames {
                handle_frame(&mut self.world, &self.config, client, self.default_arena, self.tick_num, &frame);
            }
        }
    }

    /// Flushes each client's queued outbound frames to its socket.
    async fn flush_sockets(&mut self) {
        for (id, client) in self.clients.iter_mut() {
            let Some(socket) = self.sockets.get_mut(id) else { continue };
            while let Some(payload) = client.outbound.pop_front() {
                if socket.send(Message::Binary(payload)).await.is_err() {
                    client.pending_kick = true;
                    break;
                }
            }
        }
    }

    /// Sends whatever the sidecar has queued (currently just logged for
    /// future account-load wiring) and nothing blocking -- same
    /// zero-timeout discipline as `poll_sockets` (§5).
    async fn poll_sidecar(&mut self) {
        let Some(sidecar) = self.sidecar.as_mut() else { return };
        for payload in sidecar.try_recv().await {
            match crate::account::decode_inbound(&payload) {
                Ok(crate::account::InboundMessage::SetAlias(alias)) => {
                    self.config.server_alias = alias;
                }
                Ok(crate::account::InboundMessage::LoadAccount(record)) => {
                    if let Some(client) = self.clients.values_mut().find(|c| c.uuid == record.uuid) {
                        client.account = record;
                    }
                }
                Ok(crate::account::InboundMessage::ForceKick(uuid)) => {
                    if let Some(client) = self.clients.values_mut().find(|c| c.uuid == uuid) {
                        client.pending_kick = true;
                    }
                }
                Err(e) => warn!("malformed sidecar message: {e}"),
            }
        }
    }

    /// One full §5 system pass plus the tick counter advance; split out
    /// from `run` so tests can drive it without live sockets.
    pub fn run_one_tick(&mut self) {
        self.poll_sockets();
        let dead: Vec<u32> = self.clients.iter().filter(|(_, c)| c.pending_kick).map(|(&id, _)| id).collect();
        for id in dead {
            if let Some(client) = self.clients.remove(&id) {
                if let Some(player_info) = client.player_info {
                    squad::leave(&mut self.world, player_info);
                    let flower = self.world.get_player_info(player_info).map(|i| i.flower);
                    if let Some(flower) = flower.filter(|f| !f.is_null()) {
                        self.world.request_deletion(flower);
                    }
                    self.world.request_deletion(player_info);
                }
            }
            self.sockets.remove(&id);
        }
        systems::tick(&mut self.world, self.tick_num);
        self.build_updates();
        self.tick_num += 1;
    }

    /// Assembles and queues this tick's `update` packet for every
    /// connected client (§4.7), the per-client delta snapshot delivery
    /// that keeps a squad-ready client receiving state every tick
    /// instead of just once at handshake.
    fn build_updates(&mut self) {
        for client in self.clients.values_mut() {
            if !client.received_first_packet {
                continue;
            }
            let mut w = rysteria_protocol::PacketWriter::new();
            w.write_u8(rysteria_protocol::packet::ClientboundHeader::Update as u8);
            write_update(&mut w, &self.world, client.player_info, self.tick_num, &mut client.view_state);
            client.queue_message(w.into_vec());
        }
    }

    pub fn tick_num(&self) -> u64 {
        self.tick_num
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_one_tick_advances_the_counter() {
        let mut server = Server::new(ServerConfig::default());
        assert_eq!(server.tick_num(), 0);
        server.run_one_tick();
        assert_eq!(server.tick_num(), 1);
    }
}

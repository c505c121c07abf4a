//! # Lobby Player Simulator
//!
//! Connects a number of simulated players to a running lobby server. Each
//! player sets its profile, wanders around with a random walk and chats now
//! and then, reconnecting after a delay whenever its connection drops.

mod player;

use clap::Parser;
use futures::{SinkExt, StreamExt};
use player::{Inbound, SimulatedPlayer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, sleep, sleep_until, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(name = "lobby-client")]
#[command(about = "Lobby Player Simulation Client")]
struct Args {
    /// Server WebSocket URL
    #[arg(short, long, default_value = "ws://127.0.0.1:8080/player")]
    url: String,

    /// Number of simultaneous players to simulate
    #[arg(short, long, default_value = "5")]
    players: u32,

    /// Movement frequency in Hz
    #[arg(short, long, default_value = "2.0")]
    move_freq: f64,

    /// Chat frequency in messages per minute
    #[arg(short, long, default_value = "6.0")]
    say_freq: f64,

    /// Simulation duration in seconds
    #[arg(short, long, default_value = "60")]
    duration: u64,

    /// Side length of the square players wander in
    #[arg(short, long, default_value = "20")]
    world_size: i32,

    /// Delay before reconnecting a dropped player, in milliseconds
    #[arg(short, long, default_value = "5000")]
    retry_delay_ms: u64,
}

/// How a single connection ended.
enum SessionEnd {
    /// The simulation ran out of time
    Finished,
    /// The server closed the connection or the stream ended
    Disconnected,
}

/// Runs one connection until it drops or the deadline passes.
async fn play_session(
    player: &mut SimulatedPlayer,
    args: &Args,
    deadline: Instant,
) -> anyhow::Result<SessionEnd> {
    let (ws_stream, _) = connect_async(args.url.as_str()).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    player.reset();

    for command in player.profile_commands() {
        ws_sender.send(Message::text(command)).await?;
    }

    let mut move_timer = interval(Duration::from_secs_f64(1.0 / args.move_freq));
    let mut say_timer = interval(Duration::from_secs_f64(60.0 / args.say_freq));
    // both intervals fire immediately; skip that first tick
    move_timer.tick().await;
    say_timer.tick().await;

    let mut sent = 0u64;
    let mut received = 0u64;

    let end = loop {
        tokio::select! {
            msg = ws_receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        received += 1;
                        let inbound = Inbound::parse(text.as_str());
                        match &inbound {
                            Inbound::Identity(session_id) => {
                                info!("🎫 Player assigned session {}", session_id);
                            }
                            Inbound::Players(players) if players.len() != player.known_players() => {
                                info!("👥 Player {} sees {} players", label(player), players.len());
                            }
                            Inbound::Players(_) => {}
                            Inbound::Other(text) => {
                                debug!("📨 Player {} received unexpected frame: {}", label(player), text);
                            }
                        }
                        player.observe(&inbound);
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!("🔌 Player {} received CLOSE: {:?}", label(player), frame);
                        break SessionEnd::Disconnected;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("⚠️ Player {} WebSocket error: {}", label(player), e);
                        break SessionEnd::Disconnected;
                    }
                    None => {
                        info!("🔌 Player {} connection closed (stream ended)", label(player));
                        break SessionEnd::Disconnected;
                    }
                }
            }

            _ = move_timer.tick() => {
                let command = player.step(&mut rand::thread_rng());
                ws_sender.send(Message::text(command)).await?;
                sent += 1;
            }

            _ = say_timer.tick() => {
                let command = player.chat(&mut rand::thread_rng());
                debug!("💬 Player {} sends {}", label(player), command);
                ws_sender.send(Message::text(command)).await?;
                sent += 1;
            }

            _ = sleep_until(deadline) => {
                info!("⏰ Player {} simulation complete", label(player));
                let _ = ws_sender.send(Message::Close(None)).await;
                break SessionEnd::Finished;
            }
        }
    };

    info!(
        "📊 Player {} connection stats: sent {} commands, received {} frames",
        label(player),
        sent,
        received
    );
    Ok(end)
}

/// Short label for log lines: the session id once known.
fn label(player: &SimulatedPlayer) -> String {
    match player.session_id() {
        Some(id) => id.to_string(),
        None => "<connecting>".to_string(),
    }
}

/// Keeps one player connected until the deadline, reconnecting as needed.
async fn run_player(index: u32, args: Arc<Args>, deadline: Instant) {
    let mut player = SimulatedPlayer::new(index, args.world_size);
    let retry_delay = Duration::from_millis(args.retry_delay_ms);

    loop {
        match play_session(&mut player, &args, deadline).await {
            Ok(SessionEnd::Finished) => return,
            Ok(SessionEnd::Disconnected) => {}
            Err(e) => error!("❌ Player #{} connection failed: {}", index + 1, e),
        }

        if Instant::now() + retry_delay >= deadline {
            return;
        }
        info!(
            "🔁 Player #{} reconnecting in {}ms",
            index + 1,
            args.retry_delay_ms
        );
        sleep(retry_delay).await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.move_freq > 0.0, "move frequency must be positive");
    anyhow::ensure!(args.say_freq > 0.0, "chat frequency must be positive");

    info!("🚀 Starting Lobby Player Simulation");
    info!("📊 Configuration:");
    info!("   • Server: {}", args.url);
    info!("   • Players: {}", args.players);
    info!("   • Movement: {:.1} Hz", args.move_freq);
    info!("   • Chat: {:.1}/min", args.say_freq);
    info!("   • Duration: {}s", args.duration);

    let args = Arc::new(args);
    let deadline = Instant::now() + Duration::from_secs(args.duration);
    let mut handles = Vec::new();

    for index in 0..args.players {
        handles.push(tokio::spawn(run_player(index, args.clone(), deadline)));

        // Stagger connections to avoid overwhelming server
        sleep(Duration::from_millis(100)).await;
    }

    info!("🎮 All {} players started", args.players);

    for handle in handles {
        let _ = handle.await;
    }

    info!("✅ Lobby Player Simulation complete!");
    Ok(())
}

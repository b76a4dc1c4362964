use std::time::Duration;

use clap::Parser;
use oddword::prelude::*;
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "oddword", version, about = "Imposter word game server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "ODDWORD_BIND", default_value = "0.0.0.0:8080")]
    bind: String,

    /// Seconds of discussion before voting opens.
    #[arg(long, env = "ODDWORD_DISCUSSION_SECS", default_value_t = 120)]
    discussion_secs: u64,

    /// Drop connections that stay silent this long.
    #[arg(long, env = "ODDWORD_IDLE_TIMEOUT_SECS", default_value_t = 30)]
    idle_timeout_secs: u64,

    /// Players needed to start a round (at least 3).
    #[arg(
        long,
        env = "ODDWORD_MIN_PLAYERS",
        default_value_t = 3,
        value_parser = clap::value_parser!(u64).range(3..)
    )]
    min_players: u64,

    /// Keep rooms registered after their last player leaves.
    #[arg(long, env = "ODDWORD_KEEP_EMPTY_ROOMS")]
    keep_empty_rooms: bool,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let empty_room_policy = if self.keep_empty_rooms {
            EmptyRoomPolicy::Retain
        } else {
            EmptyRoomPolicy::Delete
        };
        ServerConfig {
            bind_addr: self.bind,
            discussion: Duration::from_secs(self.discussion_secs),
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            game: GameConfig {
                min_players: usize::try_from(self.min_players).unwrap_or(usize::MAX),
                empty_room_policy,
                ..GameConfig::default()
            },
        }
    }
}

fn setup_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oddword=info,oddword_game=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().compact().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), OddwordError> {
    setup_logging();
    let config = Args::parse().into_config();
    tracing::info!(?config, "starting");

    let server = OddwordServer::builder().config(config).build().await?;
    server.run().await
}

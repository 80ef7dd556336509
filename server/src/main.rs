use clap::Parser;
use log::info;
use server::game::{self, World};
use server::network::{Delivery, LatencyShim, NetworkServer};
use server::registry::Registry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = shared::DEFAULT_HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = shared::DEFAULT_PORT)]
    port: u16,

    /// Simulation updates per second
    #[arg(short, long, default_value_t = shared::TICK_RATE)]
    tick_rate: u32,

    /// Artificial one-way latency in milliseconds, applied each direction
    #[arg(short, long, default_value_t = shared::LATENCY_MS)]
    latency_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let registry = Arc::new(RwLock::new(Registry::new()));
    let shim = LatencyShim::new(Duration::from_millis(args.latency_ms));

    let address = format!("{}:{}", args.host, args.port);
    // Failing to bind is the only fatal startup error
    let server = NetworkServer::bind(&address).await?;
    info!(
        "Starting at {} tick/s with {}ms simulated latency",
        args.tick_rate, args.latency_ms
    );

    let listener_handle = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            server.run(registry, shim).await;
        })
    };

    let game_handle = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            run_game_loop(registry, shim, args.tick_rate).await;
        })
    };

    tokio::select! {
        result = listener_handle => {
            if let Err(e) = result {
                eprintln!("Network task panicked: {}", e);
            }
        }
        result = game_handle => {
            if let Err(e) = result {
                eprintln!("Game loop task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

/// Authoritative fixed-tick loop: spawn coins, integrate movement,
/// resolve pickups, broadcast the snapshot.
async fn run_game_loop(registry: Arc<RwLock<Registry>>, shim: LatencyShim, tick_rate: u32) {
    let dt = 1.0 / tick_rate as f32;
    let mut ticker = interval(Duration::from_secs_f32(dt));
    // An overrunning tick is not compensated for; we just pick up at the
    // next period boundary
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut world = World::new();

    // Skip the first tick since it fires immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        world.maybe_spawn_coin(std::time::Instant::now());

        // Brief lock: copy the players out, run the whole tick on the copy
        let mut snapshot = registry.read().await.snapshot();

        for handle in snapshot.iter_mut() {
            game::integrate(&mut handle.player, dt);
        }
        game::collect_coins(&mut snapshot, &mut world.coins);

        registry.write().await.commit(&snapshot);

        let state = game::state_message(&snapshot, &world.coins);
        for handle in &snapshot {
            // A connection that vanished after the snapshot just drops this
            let _ = handle.tx.send(Delivery {
                due: shim.due(),
                message: state.clone(),
            });
        }
    }
}

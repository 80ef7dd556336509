use clap::Parser;
use client::game::ClientGameState;
use client::input::InputTracker;
use client::network::Connection;
use client::rendering::Renderer;
use log::{debug, info};
use macroquad::prelude::*;
use shared::{InputFlags, Message, MAP_HEIGHT, MAP_WIDTH};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Server address to connect to
    #[arg(short, long, default_value = shared::DEFAULT_ADDR)]
    server: String,

    /// Artificial one-way latency in milliseconds
    #[arg(short, long, default_value_t = 0)]
    latency_ms: u64,

    /// Display name sent with the join request
    #[arg(short, long, default_value = "Player")]
    name: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Coin Arena".to_string(),
        window_width: MAP_WIDTH as i32,
        window_height: MAP_HEIGHT as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    info!("Connecting to {}", args.server);
    let mut connection = match Connection::connect(&args.server, Duration::from_millis(args.latency_ms)) {
        Ok(connection) => connection,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", args.server, e);
            return;
        }
    };
    connection.send(&Message::Join {
        name: args.name.clone(),
    });
    info!("Sent join request as {:?}", args.name);

    let mut state = ClientGameState::new();
    let mut input = InputTracker::new();
    let renderer = Renderer::new();

    loop {
        let dt = get_frame_time();

        let flags = sample_input();
        if let Some(flags) = input.update(flags, dt) {
            connection.send(&Message::Input { keys: flags });
        }

        connection.pump();
        for message in connection.poll_messages() {
            match message {
                Message::Welcome { id } => {
                    info!("Assigned player id {}", id);
                    state.set_local_id(id);
                }
                Message::State { players, coins } => {
                    state.apply_snapshot(players, coins);
                }
                other => debug!("Ignoring {:?}", other),
            }
        }

        state.advance(dt);
        renderer.render(&mut state);

        next_frame().await;
    }
}

fn sample_input() -> InputFlags {
    InputFlags {
        up: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
        down: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
        left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
        right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
    }
}

//! Text client for module-driven RPGs.
//!
//! The client reads `embershell.toml`, loads the configured module,
//! and either plays with local authority or attaches to a game server
//! configured there. Three tasks share the facade: the command loop
//! (this file), the simulation tick task, and — with a server — the
//! reconciler spawned on attach.

mod command;
mod config;
mod data;
mod error;
mod lang;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use embershell_engine::Module;
use embershell_game::{Game, TickScheduler};
use embershell_net::{Connection, Session};

use crate::command::{Cli, INPUT_INDICATOR};
use crate::config::{Config, CONFIG_FILE};
use crate::error::CliError;
use crate::lang::Lang;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let config = Config::load(Path::new(CONFIG_FILE))?;
    init_tracing(&config);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        module = %config.module,
        "embershell starting"
    );

    let lang = Lang::load(&config.lang_path());
    let module = if config.module.is_empty() {
        None
    } else {
        Some(Module::new(data::load_module_data(Path::new(
            &config.module,
        ))?))
    };
    let game = Arc::new(Mutex::new(Game::new(module)));

    if let Some(server) = &config.server {
        match Connection::connect(&server.host, server.port).await {
            Ok((conn, responses)) => {
                Game::set_server(&game, Session::new(conn), responses).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "unable to connect to game server");
            }
        }
    }

    spawn_simulation(Arc::clone(&game), config.tick_rate_hz);

    let mut cli = Cli::new(game, config, lang);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        cli.handle_input(&line).await;
        if cli.should_close() {
            break;
        }
        prompt();
    }
    if let Err(e) = cli.config().save(Path::new(CONFIG_FILE)) {
        tracing::error!(error = %e, "unable to save config");
    }
    tracing::info!("embershell closing");
    Ok(())
}

fn init_tracing(config: &Config) {
    let default = if config.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the fixed-timestep simulation loop next to the command loop.
fn spawn_simulation(game: Arc<Mutex<Game>>, tick_rate_hz: u32) {
    tokio::spawn(async move {
        let mut scheduler = TickScheduler::with_rate(tick_rate_hz);
        loop {
            let info = scheduler.wait_for_tick().await;
            game.lock().await.update(info.dt.as_millis() as u64);
        }
    });
}

fn prompt() {
    print!("{INPUT_INDICATOR}");
    let _ = std::io::stdout().flush();
}

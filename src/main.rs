use clap::Parser;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use tokio::sync::Notify;

mod cli;
mod config;
mod handler;
mod http;
mod logger;
mod player;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::Args::parse();
    let cfg = config::Config::load_from(&args.config)?;
    logger::init(&cfg)?;

    // One thread: connections and player launches interleave as local tasks
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    let launcher = Rc::new(player::PlayerLauncher::new(&cfg.player));
    logger::log_player_configured(&cfg.player.command, launcher.player());

    let on_valid_path = move |path: PathBuf| {
        let launcher = Rc::clone(&launcher);
        async move { launcher.play(&path.to_string_lossy()).await }
    };

    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::run(&cfg, on_valid_path, shutdown))
        .await?;

    logger::log_shutdown();
    Ok(())
}

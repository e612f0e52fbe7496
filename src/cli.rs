use clap::Parser;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(
    name = "video_player_server",
    version,
    about = "Opens a media player for files requested over a local GET endpoint"
)]
pub struct Args {
    /// Config file path, extension optional (config.toml, config.yaml, ...)
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,
}

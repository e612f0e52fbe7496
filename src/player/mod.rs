//! External player launcher
//!
//! Builds the player command line for a file, runs it through the platform
//! shell and reports the outcome through the logger.

use std::io;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::PlayerConfig;
use crate::logger;

/// Sentinel command selecting the platform opener
pub const DEFAULT_PLAYER: &str = "default";

/// Result of one finished player process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    pub command: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Map the configured player command to the executable to run
///
/// `default` becomes `xdg-open` on Linux and `start` on Windows; on any
/// other OS it is returned unchanged.
pub fn resolve_player(command: &str, os: &str) -> String {
    if command != DEFAULT_PLAYER {
        return command.to_string();
    }
    if os.eq_ignore_ascii_case("linux") {
        "xdg-open".to_string()
    } else if os.eq_ignore_ascii_case("windows") {
        "start".to_string()
    } else {
        command.to_string()
    }
}

pub struct PlayerLauncher {
    player: String,
}

impl PlayerLauncher {
    pub fn new(config: &PlayerConfig) -> Self {
        let player = resolve_player(&config.command, &config.os);
        if player == DEFAULT_PLAYER {
            logger::log_warning(&format!(
                "No default player known for OS '{}', launching '{DEFAULT_PLAYER}' as-is",
                config.os
            ));
        }
        Self { player }
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    /// Shell command line for a file: `<player> "<path>"`
    pub fn command_line(&self, path: &str) -> String {
        format!("{} \"{path}\"", self.player)
    }

    /// Run the player for `path` and wait for it to exit
    pub async fn run(&self, path: &str) -> io::Result<PlayOutcome> {
        let command = self.command_line(path);
        logger::log_player_running(&command);

        let output = shell_command(&command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(PlayOutcome {
            command,
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run the player and log its exit code and captured output
    pub async fn play(&self, path: &str) {
        match self.run(path).await {
            Ok(outcome) => {
                logger::log_player_done(&outcome.command, outcome.exit_code);
                logger::log_player_output("stdout", &outcome.stdout);
                logger::log_player_output("stderr", &outcome.stderr);
            }
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to start player for '{path}': {e}"
                ));
            }
        }
    }
}

/// `cmd /C <command>` with the command line passed verbatim; `arg` would
/// escape the quotes around the path as `\"`, which cmd.exe does not undo
#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.raw_arg("/C").raw_arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

//! Audio server gateway backed by the `pactl` command line tool
//!
//! Works against PulseAudio as well as PipeWire through pipewire-pulse. Each
//! call spawns `pactl` once and waits for it; nothing is retried.

use async_trait::async_trait;
use smart_volume_core::domain::audio::{
    AudioGateway, GatewayError, Result, Snapshot, TargetId, Volume,
};
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::pactl_json;

/// Gateway that shells out to `pactl`
#[derive(Debug, Clone)]
pub struct PactlGateway {
    program: PathBuf,
}

impl Default for PactlGateway {
    fn default() -> Self {
        Self::new("pactl")
    }
}

impl PactlGateway {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.program.display(), args.join(" "))
    }

    /// Run pactl and return its stdout, failing on a non-zero exit status
    async fn run(&self, args: &[&str]) -> Result<String> {
        let command = self.describe(args);
        debug!(%command, "Running");

        let output = Command::new(&self.program)
            .args(args)
            // keep number formatting stable in JSON output
            .env("LC_ALL", "C")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| GatewayError::Unavailable {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GatewayError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout)
            .map_err(|e| GatewayError::Malformed(format!("`{command}` printed invalid UTF-8: {e}")))
    }
}

#[async_trait]
impl AudioGateway for PactlGateway {
    #[instrument(skip(self))]
    async fn snapshot(&self) -> Result<Snapshot> {
        let info = self.run(&["--format=json", "info"]).await?;
        let sinks = self.run(&["--format=json", "list", "sinks"]).await?;
        let sink_inputs = self.run(&["--format=json", "list", "sink-inputs"]).await?;

        pactl_json::parse_snapshot(&info, &sinks, &sink_inputs)
    }

    #[instrument(skip(self))]
    async fn set_volume(&self, target: TargetId, volume: Volume) -> Result<()> {
        let subcommand = match target {
            TargetId::Stream(_) => "set-sink-input-volume",
            TargetId::Device(_) => "set-sink-volume",
        };
        let index = target.index().to_string();
        let raw = pactl_json::to_raw(volume).to_string();

        self.run(&[subcommand, &index, &raw]).await?;
        Ok(())
    }
}

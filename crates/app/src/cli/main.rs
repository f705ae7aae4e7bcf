//! smart-volume-adjust CLI Application

mod args;

use anyhow::Context;
use args::{Cli, Settings};
use clap::Parser;
use smart_volume_core::domain::{
    AdjustConfig, AdjustError, Notice, Notifier, Outcome, VolumeAdjuster, EXIT_INVALID_INPUT,
};
use smart_volume_infra::{DesktopNotifier, NotificationIdStore, PactlGateway};
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(code) => exit_code(code),
        Err(err) => {
            eprintln!("smart-volume-adjust: {err:#}");
            let code = err
                .downcast_ref::<AdjustError>()
                .map(AdjustError::exit_code)
                .unwrap_or(EXIT_INVALID_INPUT);
            exit_code(code)
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

async fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => AdjustConfig::default_path().map_err(AdjustError::from)?,
    };
    let config = AdjustConfig::load_or_default(&config_path)
        .await
        .map_err(AdjustError::from)?;

    let gateway = PactlGateway::new(&config.pulse.pactl);
    let notifier = DesktopNotifier::new(
        config.notify.app_name.clone(),
        config.notify.timeout_ms,
        NotificationIdStore::default(),
    );

    // patterns and the volume token are validated before the server is contacted
    let settings = cli.resolve(config)?;
    debug!(?settings, "Resolved settings");

    let adjuster = VolumeAdjuster::new(gateway);
    let outcome = adjuster
        .run(&settings.plan)
        .await
        .context("adjusting volume")?;

    report(&outcome, &settings);

    if settings.notify && !settings.plan.dry_run {
        if let Some(adjustment) = &outcome.adjustment {
            let notice = Notice::for_adjustment(adjustment, settings.absolute_report, settings.plan.limit);
            if let Err(e) = notifier.notify(&notice).await {
                warn!(error = %e, "Failed to send notification");
            }
        }
    }

    Ok(outcome.exit_code())
}

/// Print the outcome on stdout, and the per pattern matches for dry runs.
fn report(outcome: &Outcome, settings: &Settings) {
    if settings.plan.dry_run {
        for entry in &outcome.matches {
            let matched = if entry.labels.is_empty() {
                "(nothing)".to_string()
            } else {
                entry.labels.join(", ")
            };
            println!("pattern {:?}: {}", entry.pattern, matched);
        }
    }

    let Some(adjustment) = &outcome.adjustment else {
        if !settings.quiet {
            eprintln!("smart-volume-adjust: no matching stream found");
        }
        return;
    };

    if settings.quiet {
        return;
    }

    let message = adjustment.message(settings.absolute_report);
    if adjustment.applied {
        println!("{message}");
    } else {
        println!("[dry-run] {message}");
    }
}

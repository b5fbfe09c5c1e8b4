use std::future::Future;

use anyhow::Context;
use camino::Utf8PathBuf;
use drivesync_config::Config;
use tokio_util::sync::CancellationToken;

use crate::progress::ProgressView;
use crate::Overrides;

pub struct RunArgs {
    pub config_path: Utf8PathBuf,
    pub overrides: Overrides,
    pub once: bool,
    pub progress: ProgressView,
}

pub fn load_config(args: &RunArgs) -> anyhow::Result<Config> {
    let config = Config::load(&args.config_path)?;
    Ok(args.overrides.apply(config)?)
}

/// Loads configuration, connects to Drive and runs the mirror loop until
/// ctrl-c (or a single cycle with `--once`).
pub async fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    tracing::info!(
        folders = config.folder_ids.len(),
        extensions = %config.allowed_extensions.join(", "),
        interval_secs = config.loop_interval,
        download_dir = %config.download_dir,
        "starting drivesync"
    );

    let scheduler = drivesync_pipeline::drive_scheduler(&config).await?;

    let (tx, rx) = tokio::sync::mpsc::channel(256);
    let progress = tokio::spawn(args.progress.drive(rx));

    if args.once {
        scheduler.run_once(Some(tx)).await;
    } else {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            if watch_interrupts(tokio::signal::ctrl_c, trigger).await {
                tracing::warn!("second interrupt received, aborting");
                std::process::exit(130);
            }
        });
        scheduler.run(cancel, Some(tx), |_| {}).await;
    }

    progress.await.context("progress renderer panicked")?;
    Ok(())
}

/// Cancels `token` on the first signal from `next`. Resolves to `true` once a
/// second signal arrives, or `false` if the signal source fails.
pub async fn watch_interrupts<F, Fut>(mut next: F, token: CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next().await.is_err() {
        return false;
    }
    tracing::info!("interrupt received, stopping after the current cycle (ctrl-c again aborts)");
    token.cancel();
    next().await.is_ok()
}

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use drivesync_cli::commands::{self, RunArgs};
use drivesync_cli::progress::ProgressView;
use drivesync_cli::{classify, logging, ErrorClass, Overrides};
use drivesync_config::DEFAULT_CONFIG_FILE;

#[derive(Parser)]
#[command(author, version, about = "Mirror Google Drive folders into a local directory")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, env = "DRIVESYNC_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: Utf8PathBuf,
    /// Service-account key file (overrides `credentials_file`)
    #[arg(long)]
    credentials: Option<Utf8PathBuf>,
    /// Destination directory (overrides `download_dir`)
    #[arg(long)]
    download_dir: Option<Utf8PathBuf>,
    /// Seconds between cycles (overrides `loop_interval`)
    #[arg(long)]
    interval: Option<u64>,
    /// Concurrent downloads per folder (overrides `max_concurrent_downloads`)
    #[arg(short, long)]
    threads: Option<usize>,
    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
    /// File that receives a copy of every log line
    #[arg(long, default_value = "download.log")]
    log_file: Utf8PathBuf,
    /// Log to stderr only
    #[arg(long)]
    no_log_file: bool,
    /// Hide per-file progress bars
    #[arg(short, long)]
    quiet: bool,
    /// Log debug detail, including per-chunk progress
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let progress = if cli.quiet {
        ProgressView::hidden()
    } else {
        ProgressView::new()
    };
    let log_file = (!cli.no_log_file).then_some(cli.log_file.as_path());
    if let Err(e) = logging::init(cli.verbose, log_file, progress.multi().clone()) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    let args = RunArgs {
        config_path: cli.config,
        overrides: Overrides {
            credentials: cli.credentials,
            download_dir: cli.download_dir,
            interval: cli.interval,
            threads: cli.threads,
        },
        once: cli.once,
        progress,
    };

    match commands::cmd_run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match classify(&e) {
                ErrorClass::Fatal => tracing::error!("fatal: {e:#}"),
                ErrorClass::Unexpected => tracing::error!("unexpected error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::CommandFactory;

    #[test]
    fn every_flag_is_documented() {
        let cmd = Cli::command();
        cmd.clone().debug_assert();
        for arg in cmd.get_arguments() {
            assert!(arg.get_help().is_some(), "--{} has no help text", arg.get_id());
        }
    }
}

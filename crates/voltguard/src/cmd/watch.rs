use std::fs;
use std::path::Path;
use std::time::Duration;

use voltguard_feed::{ConnectionState, FeedClient, FeedConfig, LatestFrame};

use crate::cmd::WatchArgs;
use crate::exit::{feed_error, io_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_frame, print_status, OutputFormat};

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    if args.count == Some(0) {
        return Err(CliError::new(USAGE, "--count must be greater than zero"));
    }
    let config = FeedConfig {
        endpoint: args.addr.clone(),
        retry_delay: parse_duration(&args.retry_delay)?,
        connect_timeout: parse_duration(&args.connect_timeout)?,
        ..FeedConfig::default()
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("failed to start runtime", err))?;
    runtime.block_on(watch(config, args, format))
}

async fn watch(config: FeedConfig, args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let endpoint = config.endpoint.clone();
    let handle = FeedClient::new(config).connect_tcp();
    let mut frames = handle.subscribe_frames();
    let mut status = handle.subscribe();

    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    let outcome = loop {
        tokio::select! {
            biased;
            signal = &mut interrupt => {
                if let Err(err) = signal {
                    break Err(io_error("signal handler setup failed", err));
                }
                tracing::info!("interrupted, closing feed");
                break Ok(SUCCESS);
            }
            changed = frames.changed() => {
                if changed.is_err() {
                    break Err(CliError::new(INTERNAL, "frame feed stopped unexpectedly"));
                }
                // Only the newest frame is kept; intermediate ones may be skipped.
                let latest = frames.borrow_and_update().clone();
                let Some(frame) = latest else {
                    continue;
                };
                if let Err(err) = show_frame(&frame, args.output.as_deref(), format) {
                    break Err(err);
                }
                if args.count.is_some_and(|count| frame.sequence >= count as u64) {
                    break Ok(SUCCESS);
                }
            }
            _ = status.wait_for(|s| s.state == ConnectionState::Disconnected) => {
                break Err(CliError::new(
                    FAILURE,
                    format!("frame server at {endpoint} closed the connection"),
                ));
            }
        }
    };

    // A connect or protocol failure replaces the generic disconnect error.
    let last = handle
        .shutdown()
        .await
        .map_err(|err| feed_error(&format!("frame server at {endpoint}"), err))?;
    tracing::info!(
        requests = last.stats.requests_sent,
        frames = last.stats.frames_received,
        errors = last.stats.server_errors,
        "feed closed"
    );
    if outcome.is_ok() {
        print_status(&last, format);
    }
    outcome
}

fn show_frame(frame: &LatestFrame, output: Option<&Path>, format: OutputFormat) -> CliResult<()> {
    if let Some(path) = output {
        write_frame(path, &frame.image)?;
    }
    print_frame(frame, format);
    Ok(())
}

/// Replace `path` with `image`. Readers never see a partially written file.
fn write_frame(path: &Path, image: &[u8]) -> CliResult<()> {
    let partial = path.with_extension("part");
    fs::write(&partial, image)
        .map_err(|err| io_error(&format!("failed writing {}", partial.display()), err))?;
    fs::rename(&partial, path)
        .map_err(|err| io_error(&format!("failed replacing {}", path.display()), err))
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(number) => (number, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };
    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

use std::future::Future;

use tokio::io::{BufWriter, Stdout};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::error::AppError;

/// Resources handed to the application body
pub struct RunContext {
    /// Buffered stdout; the body flushes it before returning
    pub stdout: BufWriter<Stdout>,
    /// Cancelled when a termination signal arrives
    pub cancellation: CancellationToken,
}

/// Reusable CLI application runner that handles:
/// - Signal handling (SIGINT, SIGTERM, SIGHUP) through a cancellation token
/// - Stdout buffering
/// - Exit codes (0 = success, 1 = error, 130 = SIGINT, 143 = SIGTERM)
///
/// A signal cancels the token and the body is awaited to completion, so it
/// can stop its pipelines and release resources before the process exits.
pub struct CliApp {
    name: String,
}

impl CliApp {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the application body with signal handling
    ///
    /// This function never returns - it calls std::process::exit with the appropriate code
    pub async fn run<F, Fut>(self, main_fn: F) -> !
    where
        F: FnOnce(RunContext) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        let cancellation = CancellationToken::new();
        let context = RunContext {
            stdout: BufWriter::new(tokio::io::stdout()),
            cancellation: cancellation.clone(),
        };
        let main_fut = main_fn(context);
        tokio::pin!(main_fut);

        let code = tokio::select! {
            result = &mut main_fut => self.exit_code(result),
            signal_code = self.wait_for_signal() => {
                cancellation.cancel();
                if let Err(e) = main_fut.await {
                    eprintln!("{}: {}", self.name, e);
                }
                signal_code
            }
        };
        std::process::exit(code)
    }

    fn exit_code(&self, result: Result<(), AppError>) -> i32 {
        match result {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{}: {}", self.name, e);
                1
            }
        }
    }

    /// Wait for any Unix signal (SIGINT, SIGTERM, SIGHUP) or Ctrl+C
    /// Returns the exit code to use (130 for SIGINT, 143 for SIGTERM, etc.)
    async fn wait_for_signal(&self) -> i32 {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let (Ok(mut sigterm), Ok(mut sigint), Ok(mut sighup)) = (
                signal(SignalKind::terminate()),
                signal(SignalKind::interrupt()),
                signal(SignalKind::hangup()),
            ) else {
                warn!("Failed to set up signal handlers");
                return std::future::pending().await;
            };

            tokio::select! {
                _ = sigterm.recv() => {
                    eprintln!("Received SIGTERM");
                    143 // 128 + 15
                }
                _ = sigint.recv() => {
                    eprintln!("Received SIGINT");
                    130 // 128 + 2
                }
                _ = sighup.recv() => {
                    eprintln!("Received SIGHUP");
                    129 // 128 + 1
                }
            }
        }

        #[cfg(not(unix))]
        {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("Failed to set up Ctrl+C handler");
                return std::future::pending().await;
            }
            eprintln!("Received Ctrl+C");
            130
        }
    }
}

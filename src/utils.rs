//! some utils

use arh_core::timer::CancelToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logs to stderr, filtered by `RUST_LOG` (`info` if unset or invalid)
pub fn init_logger() {
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Cancels `cancel` on the first Ctrl-C.
///
/// The listener runs on its own thread with a single threaded runtime and is
/// left behind when the process exits.
pub fn cancel_on_ctrl_c(cancel: CancelToken) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    std::thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("received Ctrl-C, stopping");
                        cancel.cancel();
                    }
                    Err(err) => warn!("failed to listen for Ctrl-C: {err}"),
                }
            })
        })?;
    Ok(())
}

use tokio::signal::unix::SignalKind;
use tokio::signal::unix::signal;
use tracing::info;

/// Block until SIGINT, SIGTERM or SIGQUIT. SIGHUP lands in the reload slot
/// and the loop continues.
pub async fn wait_for_shutdown() -> std::io::Result<()> {
	let mut interrupt = signal(SignalKind::interrupt())?;
	let mut terminate = signal(SignalKind::terminate())?;
	let mut quit = signal(SignalKind::quit())?;
	let mut hangup = signal(SignalKind::hangup())?;

	loop {
		tokio::select! {
			_ = interrupt.recv() => return Ok(()),
			_ = terminate.recv() => return Ok(()),
			_ = quit.recv() => return Ok(()),
			_ = hangup.recv() => reload(),
		}
	}
}

/// Reload slot. Configuration is immutable after startup, so SIGHUP only
/// acknowledges the request.
fn reload() {
	info!("SIGHUP received, nothing to reload");
}

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Time formatter producing "[YYYY-MM-DD HH:MM:SS.micros]" in local time.
struct LocalTimeFormat;

impl FormatTime for LocalTimeFormat {
	fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
		let now = std::time::SystemTime::now();
		let datetime: chrono::DateTime<chrono::Local> = now.into();
		write!(w, "{}", datetime.format("[%Y-%m-%d %H:%M:%S%.6f]"))
	}
}

/// Keeps the file appender's background worker alive; drop on shutdown to
/// flush remaining log lines.
pub struct LoggerGuard {
	_file: Option<WorkerGuard>,
}

/// Initialize logging with the configured level and an optional log file.
///
/// The level acts as the default filter; the `RUST_LOG` environment
/// variable still overrides it. With a `logfile`, lines go to the file
/// through a non-blocking writer and nothing reaches the console; without
/// one they go to stdout.
pub fn init(level: &str, logfile: Option<&Path>) -> LoggerGuard {
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

	match logfile {
		Some(path) => {
			let directory = path.parent().unwrap_or_else(|| Path::new("."));
			let filename = path.file_name().unwrap_or_else(|| "stratus.log".as_ref());
			let appender = tracing_appender::rolling::never(directory, filename);
			let (writer, guard) = tracing_appender::non_blocking(appender);
			tracing_subscriber::registry()
				.with(env_filter)
				.with(
					fmt::layer()
						.with_timer(LocalTimeFormat)
						.with_target(true)
						.with_ansi(false)
						.with_writer(writer),
				)
				.init();
			LoggerGuard { _file: Some(guard) }
		}
		None => {
			tracing_subscriber::registry()
				.with(env_filter)
				.with(fmt::layer().with_timer(LocalTimeFormat).with_target(true))
				.init();
			LoggerGuard { _file: None }
		}
	}
}

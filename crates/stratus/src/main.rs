use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use storage::Storage;

mod cmd;
mod config;
mod errors;
mod server;
mod session;
mod signal;

use crate::server::Server;

#[derive(Parser, Debug)]
#[command(
	name = "stratus",
	about = "Redis-protocol front-end over a transactional ordered KV store"
)]
struct Args {
	/// Path to the TOML configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
	let args = Args::parse();
	let config = config::load(args.config.as_deref())?.stratus;

	let logfile = (!config.logfile.is_empty()).then(|| Path::new(&config.logfile));
	let _log_guard = telemetry::init(&config.loglevel, logfile);

	let storage = Storage::memory();
	let server = Server::new(Arc::new(config), storage);

	tokio::select! {
		result = server.run() => result,
		result = signal::wait_for_shutdown() => {
			result?;
			info!("shutting down");
			Ok(())
		}
	}
}

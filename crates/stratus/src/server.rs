use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use storage::Storage;
use storage::TtlSweeper;

use crate::cmd::CommandTable;
use crate::config::ServerConfig;
use crate::session::Session;

pub struct Server {
	config: Arc<ServerConfig>,
	storage: Storage,
	table: Arc<CommandTable>,
	connections: Arc<AtomicUsize>,
}

impl Server {
	pub fn new(config: Arc<ServerConfig>, storage: Storage) -> Self {
		Self {
			config,
			storage,
			table: Arc::new(CommandTable::new()),
			connections: Arc::new(AtomicUsize::new(0)),
		}
	}

	/// Bind, launch the sweeper and `maxproc` acceptor tasks, and serve
	/// until the process is told to stop.
	pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
		let listener = Arc::new(TcpListener::bind(&self.config.address).await?);
		info!(address = %self.config.address, "stratus listening");

		TtlSweeper::new(
			self.storage.clone(),
			self.config.ttl_checker_loop,
			self.config.ttl_checker_interval,
		)
		.spawn();

		let mut acceptors = Vec::with_capacity(self.config.maxproc.max(1));
		for _ in 0..self.config.maxproc.max(1) {
			let listener = listener.clone();
			let storage = self.storage.clone();
			let table = self.table.clone();
			let config = self.config.clone();
			let connections = self.connections.clone();
			acceptors.push(tokio::spawn(async move {
				accept_loop(listener, storage, table, config, connections).await;
			}));
		}
		for acceptor in acceptors {
			acceptor.await?;
		}
		Ok(())
	}
}

async fn accept_loop(
	listener: Arc<TcpListener>,
	storage: Storage,
	table: Arc<CommandTable>,
	config: Arc<ServerConfig>,
	connections: Arc<AtomicUsize>,
) {
	loop {
		match listener.accept().await {
			Ok((socket, addr)) => {
				let current = connections.fetch_add(1, Ordering::SeqCst) + 1;
				if current > config.max_connection {
					warn!(%addr, current, "connection limit reached, closing");
					connections.fetch_sub(1, Ordering::SeqCst);
					drop(socket);
					continue;
				}
				debug!(%addr, current, "client connected");
				spawn_session(
					socket,
					storage.clone(),
					table.clone(),
					config.auth.clone(),
					connections.clone(),
				);
			}
			Err(e) => {
				error!(error = %e, "accept failed");
			}
		}
	}
}

fn spawn_session(
	socket: TcpStream,
	storage: Storage,
	table: Arc<CommandTable>,
	auth: String,
	connections: Arc<AtomicUsize>,
) {
	tokio::spawn(async move {
		let mut session = Session::new(socket, storage, table, auth);
		if let Err(e) = session.run().await {
			debug!(error = %e, "session ended with error");
		}
		connections.fetch_sub(1, Ordering::SeqCst);
	});
}

use std::sync::Arc;

use bytes::Bytes;
use bytes::BytesMut;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use resp::Reply;
use resp::parse_request;
use storage::Storage;
use storage::Transaction;

use crate::cmd::CommandTable;
use crate::errors::CommandError;

/// Per-connection state machine: authentication, the optional MULTI
/// transaction with its queued commands, and the pending replies collected
/// during EXEC.
pub struct Session<S> {
	stream: S,
	storage: Storage,
	table: Arc<CommandTable>,
	auth: String,
	authenticated: bool,
	txn: Option<Transaction>,
	queue: Vec<(String, Vec<Bytes>)>,
	pending: Vec<Reply>,
	buffer: BytesMut,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Session<S> {
	pub fn new(stream: S, storage: Storage, table: Arc<CommandTable>, auth: String) -> Self {
		// Without a configured password there is nothing to authenticate
		// against, so sessions start authenticated.
		let authenticated = auth.is_empty();
		Self {
			stream,
			storage,
			table,
			auth,
			authenticated,
			txn: None,
			queue: Vec::new(),
			pending: Vec::new(),
			buffer: BytesMut::with_capacity(4096),
		}
	}

	/// Drive the connection until EOF or a protocol error. An open MULTI
	/// transaction rolls back when the session drops.
	pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
		loop {
			let n = self.stream.read_buf(&mut self.buffer).await?;
			if n == 0 {
				if self.buffer.is_empty() {
					return Ok(());
				}
				return Err("connection closed with incomplete request".into());
			}

			loop {
				match parse_request(&mut self.buffer) {
					Ok(Some(parts)) => {
						if parts.is_empty() {
							continue;
						}
						let reply = self.process(parts).await;
						self.write_reply(&reply).await?;
					}
					Ok(None) => break,
					Err(e) => {
						let reply = Reply::error(format!("ERR protocol error: {e}"));
						self.write_reply(&reply).await?;
						return Err(e.into());
					}
				}
			}
		}
	}

	async fn process(&mut self, parts: Vec<Bytes>) -> Reply {
		let name = String::from_utf8_lossy(&parts[0]).to_uppercase();
		let args = parts[1..].to_vec();
		debug!(command = %name, argc = args.len(), "processing command");

		if !self.authenticated && name != "AUTH" {
			return CommandError::NoAuth.reply();
		}
		match name.as_str() {
			"AUTH" => self.auth_command(&args),
			"PING" => {
				if args.is_empty() {
					Reply::simple("PONG")
				} else {
					CommandError::WrongArity("ping".to_string()).reply()
				}
			}
			"MULTI" => self.multi_command(),
			"EXEC" => self.exec_command().await,
			"DISCARD" => self.discard_command(),
			_ => {
				if self.txn.is_some() {
					self.queue.push((name, args));
					Reply::simple("QUEUED")
				} else {
					self.run_command(&name, &args).await
				}
			}
		}
	}

	/// Auto-commit mode: the handler opens and commits its own transaction.
	async fn run_command(&self, name: &str, args: &[Bytes]) -> Reply {
		match self.table.get(name) {
			Some(command) => match command.execute(&self.storage, None, args).await {
				Ok(reply) => reply,
				Err(e) => e.reply(),
			},
			None => CommandError::BadCommand(name.to_lowercase()).reply(),
		}
	}

	fn auth_command(&mut self, args: &[Bytes]) -> Reply {
		if args.len() != 1 {
			return CommandError::WrongArity("auth".to_string()).reply();
		}
		if self.auth.is_empty() {
			return CommandError::NoAuthNeeded.reply();
		}
		if args[0] == self.auth.as_bytes() {
			self.authenticated = true;
			Reply::ok()
		} else {
			self.authenticated = false;
			CommandError::AuthFailed.reply()
		}
	}

	/// Capture a transaction now so EXEC validates against this snapshot.
	fn multi_command(&mut self) -> Reply {
		self.reset_txn();
		self.txn = Some(self.storage.new_txn());
		Reply::ok()
	}

	/// Run every queued command inside the captured transaction and commit
	/// once. Any command error, or a commit conflict, answers nil and leaves
	/// the store untouched.
	async fn exec_command(&mut self) -> Reply {
		let Some(txn) = self.txn.take() else {
			self.reset_txn();
			return Reply::Null;
		};
		if self.queue.is_empty() {
			self.reset_txn();
			return Reply::Null;
		}

		let queue = std::mem::take(&mut self.queue);
		self.pending.clear();
		for (name, args) in &queue {
			let result = match self.table.get(name) {
				Some(command) => command.execute(&self.storage, Some(&txn), args).await,
				None => Err(CommandError::BadCommand(name.to_lowercase())),
			};
			match result {
				Ok(reply) => self.pending.push(reply),
				Err(e) => {
					debug!(command = %name, error = %e, "EXEC aborted");
					txn.rollback();
					self.reset_txn();
					return Reply::Null;
				}
			}
		}

		let reply = match txn.commit() {
			Ok(()) => Reply::Array(std::mem::take(&mut self.pending)),
			Err(e) => {
				debug!(error = %e, "EXEC commit failed");
				Reply::Null
			}
		};
		self.reset_txn();
		reply
	}

	fn discard_command(&mut self) -> Reply {
		if let Some(txn) = self.txn.take() {
			txn.rollback();
		}
		self.reset_txn();
		Reply::ok()
	}

	fn reset_txn(&mut self) {
		self.txn = None;
		self.queue.clear();
		self.pending.clear();
	}

	async fn write_reply(&mut self, reply: &Reply) -> std::io::Result<()> {
		let encoded = reply.encode();
		self.stream.write_all(&encoded).await?;
		self.stream.flush().await
	}
}

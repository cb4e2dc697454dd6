use resp::Reply;
use storage::StorageError;
use thiserror::Error;

/// Everything a command can fail with, kept as kinds and rendered into a
/// RESP error only at the session boundary.
#[derive(Debug, Error)]
pub enum CommandError {
	#[error("ERR client sent AUTH, but no password is set")]
	NoAuthNeeded,

	#[error("ERR invalid password")]
	AuthFailed,

	#[error("NOAUTH authentication required")]
	NoAuth,

	#[error("ERR unknown command '{0}'")]
	BadCommand(String),

	#[error("ERR wrong number of arguments for '{0}' command")]
	WrongArity(String),

	#[error("ERR command params invalid")]
	BadParams,

	#[error(transparent)]
	Storage(#[from] StorageError),
}

impl CommandError {
	pub fn reply(&self) -> Reply {
		Reply::error(self.to_string())
	}
}

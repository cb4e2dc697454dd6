//! The command registry: one explicit table built at startup, mapping
//! uppercased command names to arity-checked async handlers. Handlers never
//! touch the wire; they return a [`Reply`] or a [`CommandError`] and the
//! session decides where it goes.

mod hash;
mod list;
mod set;
mod string;
mod utils;
mod zset;

use std::collections::HashMap;

use bytes::Bytes;
use futures::future::BoxFuture;
use resp::Reply;
use storage::Storage;
use storage::Transaction;

use crate::errors::CommandError;

pub type CommandResult = Result<Reply, CommandError>;

/// All handlers run against the session's transaction when one is active,
/// or `None` for auto-commit single-statement mode.
pub type Handler =
	for<'a> fn(&'a Storage, Option<&'a Transaction>, &'a [Bytes]) -> BoxFuture<'a, CommandResult>;

pub struct Command {
	name: &'static str,
	/// Argument count including the command name: positive is exact,
	/// negative a minimum.
	arity: i16,
	handler: Handler,
}

impl Command {
	pub(crate) fn new(name: &'static str, arity: i16, handler: Handler) -> Self {
		Self {
			name,
			arity,
			handler,
		}
	}

	fn validate_arity(&self, arg_count: usize) -> Result<(), CommandError> {
		let ok = if self.arity > 0 {
			arg_count == self.arity as usize
		} else {
			arg_count >= (-self.arity) as usize
		};
		if ok {
			Ok(())
		} else {
			Err(CommandError::WrongArity(self.name.to_lowercase()))
		}
	}

	pub async fn execute(
		&self,
		storage: &Storage,
		txn: Option<&Transaction>,
		args: &[Bytes],
	) -> CommandResult {
		self.validate_arity(args.len() + 1)?;
		(self.handler)(storage, txn, args).await
	}
}

pub struct CommandTable {
	inner: HashMap<&'static str, Command>,
}

impl Default for CommandTable {
	fn default() -> Self {
		Self::new()
	}
}

impl CommandTable {
	/// Build the full registry. Deterministic: this function is the one
	/// place that enumerates every known command.
	pub fn new() -> Self {
		let mut table = Self {
			inner: HashMap::new(),
		};
		string::register(&mut table);
		hash::register(&mut table);
		list::register(&mut table);
		set::register(&mut table);
		zset::register(&mut table);
		table
	}

	pub(crate) fn insert(&mut self, command: Command) {
		self.inner.insert(command.name, command);
	}

	pub fn get(&self, name: &str) -> Option<&Command> {
		self.inner.get(name)
	}
}

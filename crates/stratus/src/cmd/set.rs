use bytes::Bytes;
use resp::Reply;
use storage::SetAction;
use storage::Storage;
use storage::Transaction;

use super::Command;
use super::CommandResult;
use super::CommandTable;

pub(super) fn register(table: &mut CommandTable) {
	table.insert(Command::new("SADD", -3, |db, txn, args| Box::pin(sadd(db, txn, args))));
	table.insert(Command::new("SCARD", 2, |db, txn, args| Box::pin(scard(db, txn, args))));
	table.insert(Command::new("SMEMBERS", 2, |db, txn, args| Box::pin(smembers(db, txn, args))));
	table.insert(Command::new("SISMEMBER", 3, |db, txn, args| {
		Box::pin(sismember(db, txn, args))
	}));
	table.insert(Command::new("SREM", -3, |db, txn, args| Box::pin(srem(db, txn, args))));
	table.insert(Command::new("SDIFF", -2, |db, txn, args| {
		Box::pin(action(db, txn, args, SetAction::Diff))
	}));
	table.insert(Command::new("SINTER", -2, |db, txn, args| {
		Box::pin(action(db, txn, args, SetAction::Inter))
	}));
	table.insert(Command::new("SUNION", -2, |db, txn, args| {
		Box::pin(action(db, txn, args, SetAction::Union))
	}));
	table.insert(Command::new("SDIFFSTORE", -3, |db, txn, args| {
		Box::pin(store_action(db, txn, args, SetAction::Diff))
	}));
	table.insert(Command::new("SINTERSTORE", -3, |db, txn, args| {
		Box::pin(store_action(db, txn, args, SetAction::Inter))
	}));
	table.insert(Command::new("SUNIONSTORE", -3, |db, txn, args| {
		Box::pin(store_action(db, txn, args, SetAction::Union))
	}));
}

async fn sadd(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.sadd(txn, &args[0], &args[1..]).await?))
}

async fn scard(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.scard(txn, &args[0]).await?))
}

async fn smembers(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let members = db.smembers(txn, &args[0]).await?;
	Ok(Reply::array(members.into_iter().map(Reply::bulk)))
}

async fn sismember(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let present = db.sismember(txn, &args[0], &args[1]).await?;
	Ok(Reply::integer(i64::from(present)))
}

async fn srem(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.srem(txn, &args[0], &args[1..]).await?))
}

async fn action(
	db: &Storage,
	txn: Option<&Transaction>,
	args: &[Bytes],
	action: SetAction,
) -> CommandResult {
	let members = db.set_action(txn, action, args).await?;
	Ok(Reply::array(members.into_iter().map(Reply::bulk)))
}

async fn store_action(
	db: &Storage,
	txn: Option<&Transaction>,
	args: &[Bytes],
	action: SetAction,
) -> CommandResult {
	let stored = db
		.set_store_action(txn, action, &args[0], &args[1..])
		.await?;
	Ok(Reply::integer(stored))
}

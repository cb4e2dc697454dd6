use bytes::Bytes;
use resp::Reply;
use storage::Storage;
use storage::Transaction;

use super::Command;
use super::CommandResult;
use super::CommandTable;
use super::utils::parse_i64;
use crate::errors::CommandError;

pub(super) fn register(table: &mut CommandTable) {
	table.insert(Command::new("HSET", 4, |db, txn, args| Box::pin(hset(db, txn, args))));
	table.insert(Command::new("HSETNX", 4, |db, txn, args| Box::pin(hsetnx(db, txn, args))));
	table.insert(Command::new("HMSET", -4, |db, txn, args| Box::pin(hmset(db, txn, args))));
	table.insert(Command::new("HGET", 3, |db, txn, args| Box::pin(hget(db, txn, args))));
	table.insert(Command::new("HMGET", -3, |db, txn, args| Box::pin(hmget(db, txn, args))));
	table.insert(Command::new("HDEL", -3, |db, txn, args| Box::pin(hdel(db, txn, args))));
	table.insert(Command::new("HEXISTS", 3, |db, txn, args| Box::pin(hexists(db, txn, args))));
	table.insert(Command::new("HKEYS", 2, |db, txn, args| Box::pin(hkeys(db, txn, args))));
	table.insert(Command::new("HVALS", 2, |db, txn, args| Box::pin(hvals(db, txn, args))));
	table.insert(Command::new("HGETALL", 2, |db, txn, args| Box::pin(hgetall(db, txn, args))));
	table.insert(Command::new("HLEN", 2, |db, txn, args| Box::pin(hlen(db, txn, args))));
	table.insert(Command::new("HSTRLEN", 3, |db, txn, args| Box::pin(hstrlen(db, txn, args))));
	table.insert(Command::new("HINCRBY", 4, |db, txn, args| Box::pin(hincrby(db, txn, args))));
}

async fn hset(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let added = db
		.hset(txn, &args[0], args[1].clone(), args[2].clone())
		.await?;
	Ok(Reply::integer(added))
}

async fn hsetnx(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let added = db
		.hsetnx(txn, &args[0], args[1].clone(), args[2].clone())
		.await?;
	Ok(Reply::integer(added))
}

async fn hmset(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	if !(args.len() - 1).is_multiple_of(2) {
		return Err(CommandError::WrongArity("hmset".to_string()));
	}
	let pairs: Vec<(Bytes, Bytes)> = args[1..]
		.chunks_exact(2)
		.map(|pair| (pair[0].clone(), pair[1].clone()))
		.collect();
	db.hmset(txn, &args[0], &pairs).await?;
	Ok(Reply::ok())
}

async fn hget(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::bulk_or_null(db.hget(txn, &args[0], &args[1]).await?))
}

async fn hmget(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let values = db.hmget(txn, &args[0], &args[1..]).await?;
	Ok(Reply::array(values.into_iter().map(Reply::bulk_or_null)))
}

async fn hdel(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.hdel(txn, &args[0], &args[1..]).await?))
}

async fn hexists(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let present = db.hexists(txn, &args[0], &args[1]).await?;
	Ok(Reply::integer(i64::from(present)))
}

async fn hkeys(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let fields = db.hkeys(txn, &args[0]).await?;
	Ok(Reply::array(fields.into_iter().map(Reply::bulk)))
}

async fn hvals(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let values = db.hvals(txn, &args[0]).await?;
	Ok(Reply::array(values.into_iter().map(Reply::bulk)))
}

async fn hgetall(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let pairs = db.hgetall(txn, &args[0]).await?;
	Ok(Reply::array(pairs.into_iter().map(Reply::bulk)))
}

async fn hlen(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.hlen(txn, &args[0]).await?))
}

async fn hstrlen(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.hstrlen(txn, &args[0], &args[1]).await?))
}

async fn hincrby(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let step = parse_i64(&args[2])?;
	let value = db.hincrby(txn, &args[0], args[1].clone(), step).await?;
	Ok(Reply::integer(value))
}

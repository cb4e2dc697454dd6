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
	table.insert(Command::new("GET", 2, |db, txn, args| Box::pin(get(db, txn, args))));
	table.insert(Command::new("SET", 3, |db, txn, args| Box::pin(set(db, txn, args))));
	table.insert(Command::new("MGET", -2, |db, txn, args| Box::pin(mget(db, txn, args))));
	table.insert(Command::new("MSET", -3, |db, txn, args| Box::pin(mset(db, txn, args))));
	table.insert(Command::new("DEL", -2, |db, txn, args| Box::pin(del(db, txn, args))));
	table.insert(Command::new("SETEX", 4, |db, txn, args| Box::pin(setex(db, txn, args))));
	table.insert(Command::new("INCR", 2, |db, txn, args| Box::pin(incr(db, txn, args))));
	table.insert(Command::new("INCRBY", 3, |db, txn, args| Box::pin(incrby(db, txn, args))));
	table.insert(Command::new("DECR", 2, |db, txn, args| Box::pin(decr(db, txn, args))));
	table.insert(Command::new("DECRBY", 3, |db, txn, args| Box::pin(decrby(db, txn, args))));
	table.insert(Command::new("STRLEN", 2, |db, txn, args| Box::pin(strlen(db, txn, args))));
	table.insert(Command::new("TTL", 2, |db, txn, args| Box::pin(ttl(db, txn, args))));
	table.insert(Command::new("PTTL", 2, |db, txn, args| Box::pin(pttl(db, txn, args))));
	table.insert(Command::new("EXPIRE", 3, |db, txn, args| Box::pin(expire(db, txn, args))));
	table.insert(Command::new("PEXPIRE", 3, |db, txn, args| Box::pin(pexpire(db, txn, args))));
	table.insert(Command::new("EXPIREAT", 3, |db, txn, args| {
		Box::pin(expireat(db, txn, args))
	}));
	table.insert(Command::new("PEXPIREAT", 3, |db, txn, args| {
		Box::pin(pexpireat(db, txn, args))
	}));
}

async fn get(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::bulk_or_null(db.get(txn, &args[0]).await?))
}

async fn set(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	db.set(txn, &args[0], args[1].clone()).await?;
	Ok(Reply::ok())
}

async fn mget(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let values = db.mget(txn, args).await?;
	Ok(Reply::array(values.into_iter().map(Reply::bulk_or_null)))
}

async fn mset(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	if !args.len().is_multiple_of(2) {
		return Err(CommandError::WrongArity("mset".to_string()));
	}
	let pairs: Vec<(Bytes, Bytes)> = args
		.chunks_exact(2)
		.map(|pair| (pair[0].clone(), pair[1].clone()))
		.collect();
	db.mset(txn, &pairs).await?;
	Ok(Reply::ok())
}

async fn del(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.delete(txn, args).await?))
}

async fn setex(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let seconds = parse_i64(&args[1])?;
	db.setex(txn, &args[0], seconds, args[2].clone()).await?;
	Ok(Reply::ok())
}

async fn incr(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.incr(txn, &args[0], 1).await?))
}

async fn incrby(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let step = parse_i64(&args[1])?;
	Ok(Reply::integer(db.incr(txn, &args[0], step).await?))
}

async fn decr(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.decr(txn, &args[0], 1).await?))
}

async fn decrby(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let step = parse_i64(&args[1])?;
	Ok(Reply::integer(db.decr(txn, &args[0], step).await?))
}

async fn strlen(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.strlen(txn, &args[0]).await?))
}

async fn ttl(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.ttl(txn, &args[0]).await?))
}

async fn pttl(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.pttl(txn, &args[0]).await?))
}

async fn expire(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let seconds = parse_i64(&args[1])?;
	Ok(Reply::integer(db.expire(txn, &args[0], seconds).await?))
}

async fn pexpire(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let ms = parse_i64(&args[1])?;
	Ok(Reply::integer(db.pexpire(txn, &args[0], ms).await?))
}

async fn expireat(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let ts = parse_i64(&args[1])?;
	Ok(Reply::integer(db.expire_at(txn, &args[0], ts).await?))
}

async fn pexpireat(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let ts = parse_i64(&args[1])?;
	Ok(Reply::integer(db.pexpire_at(txn, &args[0], ts).await?))
}

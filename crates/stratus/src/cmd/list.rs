use bytes::Bytes;
use resp::Reply;
use storage::Storage;
use storage::Transaction;

use super::Command;
use super::CommandResult;
use super::CommandTable;
use super::utils::parse_i64;

pub(super) fn register(table: &mut CommandTable) {
	table.insert(Command::new("LPUSH", -3, |db, txn, args| Box::pin(lpush(db, txn, args))));
	table.insert(Command::new("RPUSH", -3, |db, txn, args| Box::pin(rpush(db, txn, args))));
	table.insert(Command::new("LPOP", 2, |db, txn, args| Box::pin(lpop(db, txn, args))));
	table.insert(Command::new("RPOP", 2, |db, txn, args| Box::pin(rpop(db, txn, args))));
	table.insert(Command::new("LLEN", 2, |db, txn, args| Box::pin(llen(db, txn, args))));
	table.insert(Command::new("LINDEX", 3, |db, txn, args| Box::pin(lindex(db, txn, args))));
	table.insert(Command::new("LRANGE", 4, |db, txn, args| Box::pin(lrange(db, txn, args))));
	table.insert(Command::new("LSET", 4, |db, txn, args| Box::pin(lset(db, txn, args))));
	table.insert(Command::new("LTRIM", 4, |db, txn, args| Box::pin(ltrim(db, txn, args))));
}

async fn lpush(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.lpush(txn, &args[0], &args[1..]).await?))
}

async fn rpush(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.rpush(txn, &args[0], &args[1..]).await?))
}

async fn lpop(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::bulk_or_null(db.lpop(txn, &args[0]).await?))
}

async fn rpop(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::bulk_or_null(db.rpop(txn, &args[0]).await?))
}

async fn llen(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.llen(txn, &args[0]).await?))
}

async fn lindex(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let index = parse_i64(&args[1])?;
	Ok(Reply::bulk_or_null(db.lindex(txn, &args[0], index).await?))
}

async fn lrange(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let start = parse_i64(&args[1])?;
	let stop = parse_i64(&args[2])?;
	let items = db.lrange(txn, &args[0], start, stop).await?;
	Ok(Reply::array(items.into_iter().map(Reply::bulk)))
}

async fn lset(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let index = parse_i64(&args[1])?;
	db.lset(txn, &args[0], index, args[2].clone()).await?;
	Ok(Reply::ok())
}

async fn ltrim(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let start = parse_i64(&args[1])?;
	let stop = parse_i64(&args[2])?;
	db.ltrim(txn, &args[0], start, stop).await?;
	Ok(Reply::ok())
}

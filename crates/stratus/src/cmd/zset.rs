use bytes::Bytes;
use resp::Reply;
use storage::Storage;
use storage::Transaction;

use super::Command;
use super::CommandResult;
use super::CommandTable;
use super::utils::parse_i64;
use super::utils::parse_lex;
use super::utils::parse_range_options;
use super::utils::parse_score;
use crate::errors::CommandError;

pub(super) fn register(table: &mut CommandTable) {
	table.insert(Command::new("ZADD", -4, |db, txn, args| Box::pin(zadd(db, txn, args))));
	table.insert(Command::new("ZCARD", 2, |db, txn, args| Box::pin(zcard(db, txn, args))));
	table.insert(Command::new("ZSCORE", 3, |db, txn, args| Box::pin(zscore(db, txn, args))));
	table.insert(Command::new("ZCOUNT", 4, |db, txn, args| Box::pin(zcount(db, txn, args))));
	table.insert(Command::new("ZINCRBY", 4, |db, txn, args| Box::pin(zincrby(db, txn, args))));
	table.insert(Command::new("ZREM", -3, |db, txn, args| Box::pin(zrem(db, txn, args))));
	table.insert(Command::new("ZRANGE", -4, |db, txn, args| {
		Box::pin(zrange(db, txn, args, false))
	}));
	table.insert(Command::new("ZREVRANGE", -4, |db, txn, args| {
		Box::pin(zrange(db, txn, args, true))
	}));
	table.insert(Command::new("ZRANGEBYSCORE", -4, |db, txn, args| {
		Box::pin(zrange_by_score(db, txn, args, false))
	}));
	table.insert(Command::new("ZREVRANGEBYSCORE", -4, |db, txn, args| {
		Box::pin(zrange_by_score(db, txn, args, true))
	}));
	table.insert(Command::new("ZRANGEBYLEX", -4, |db, txn, args| {
		Box::pin(zrange_by_lex(db, txn, args, false))
	}));
	table.insert(Command::new("ZREVRANGEBYLEX", -4, |db, txn, args| {
		Box::pin(zrange_by_lex(db, txn, args, true))
	}));
	table.insert(Command::new("ZLEXCOUNT", 4, |db, txn, args| Box::pin(zlexcount(db, txn, args))));
	table.insert(Command::new("ZREMRANGEBYSCORE", 4, |db, txn, args| {
		Box::pin(zrem_range_by_score(db, txn, args))
	}));
	table.insert(Command::new("ZREMRANGEBYLEX", 4, |db, txn, args| {
		Box::pin(zrem_range_by_lex(db, txn, args))
	}));
}

async fn zadd(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	if !(args.len() - 1).is_multiple_of(2) {
		return Err(CommandError::WrongArity("zadd".to_string()));
	}
	let mut pairs = Vec::with_capacity((args.len() - 1) / 2);
	for chunk in args[1..].chunks_exact(2) {
		pairs.push((parse_score(&chunk[0])?, chunk[1].clone()));
	}
	Ok(Reply::integer(db.zadd(txn, &args[0], &pairs).await?))
}

async fn zcard(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.zcard(txn, &args[0]).await?))
}

async fn zscore(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let score = db.zscore(txn, &args[0], &args[1]).await?;
	Ok(Reply::bulk_or_null(
		score.map(|score| Bytes::from(score.to_string())),
	))
}

async fn zcount(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let min = parse_score(&args[1])?;
	let max = parse_score(&args[2])?;
	Ok(Reply::integer(db.zcount(txn, &args[0], min, max).await?))
}

async fn zincrby(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let step = parse_i64(&args[1])?;
	let score = db.zincrby(txn, &args[0], step, &args[2]).await?;
	Ok(Reply::bulk(score.to_string()))
}

async fn zrem(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	Ok(Reply::integer(db.zrem(txn, &args[0], &args[1..]).await?))
}

async fn zrange(
	db: &Storage,
	txn: Option<&Transaction>,
	args: &[Bytes],
	reverse: bool,
) -> CommandResult {
	let start = parse_i64(&args[1])?;
	let stop = parse_i64(&args[2])?;
	let with_scores = match args.len() {
		3 => false,
		4 if args[3].eq_ignore_ascii_case(b"WITHSCORES") => true,
		_ => return Err(CommandError::BadParams),
	};
	let items = db
		.zrange(txn, &args[0], start, stop, with_scores, reverse)
		.await?;
	Ok(Reply::array(items.into_iter().map(Reply::bulk)))
}

async fn zrange_by_score(
	db: &Storage,
	txn: Option<&Transaction>,
	args: &[Bytes],
	reverse: bool,
) -> CommandResult {
	// The reverse variant takes max before min.
	let (min, max) = if reverse {
		(parse_score(&args[2])?, parse_score(&args[1])?)
	} else {
		(parse_score(&args[1])?, parse_score(&args[2])?)
	};
	let options = parse_range_options(&args[3..], true)?;
	let items = db
		.zrange_by_score(
			txn,
			&args[0],
			min,
			max,
			options.with_scores,
			options.offset,
			options.count,
			reverse,
		)
		.await?;
	Ok(Reply::array(items.into_iter().map(Reply::bulk)))
}

async fn zrange_by_lex(
	db: &Storage,
	txn: Option<&Transaction>,
	args: &[Bytes],
	reverse: bool,
) -> CommandResult {
	let (min, max) = if reverse {
		(parse_lex(&args[2])?, parse_lex(&args[1])?)
	} else {
		(parse_lex(&args[1])?, parse_lex(&args[2])?)
	};
	let options = parse_range_options(&args[3..], false)?;
	let members = db
		.zrange_by_lex(
			txn,
			&args[0],
			&min,
			&max,
			options.offset,
			options.count,
			reverse,
		)
		.await?;
	Ok(Reply::array(members.into_iter().map(Reply::bulk)))
}

async fn zlexcount(db: &Storage, txn: Option<&Transaction>, args: &[Bytes]) -> CommandResult {
	let min = parse_lex(&args[1])?;
	let max = parse_lex(&args[2])?;
	Ok(Reply::integer(
		db.zlexcount(txn, &args[0], &min, &max).await?,
	))
}

async fn zrem_range_by_score(
	db: &Storage,
	txn: Option<&Transaction>,
	args: &[Bytes],
) -> CommandResult {
	let min = parse_score(&args[1])?;
	let max = parse_score(&args[2])?;
	Ok(Reply::integer(
		db.zrem_range_by_score(txn, &args[0], min, max).await?,
	))
}

async fn zrem_range_by_lex(
	db: &Storage,
	txn: Option<&Transaction>,
	args: &[Bytes],
) -> CommandResult {
	let min = parse_lex(&args[1])?;
	let max = parse_lex(&args[2])?;
	Ok(Reply::integer(
		db.zrem_range_by_lex(txn, &args[0], &min, &max).await?,
	))
}

use bytes::Bytes;
use storage::LexBound;
use storage::SCORE_MAX;
use storage::SCORE_MIN;
use storage::StorageError;

use crate::errors::CommandError;

pub(super) fn parse_i64(raw: &[u8]) -> Result<i64, CommandError> {
	std::str::from_utf8(raw)
		.ok()
		.and_then(|s| s.parse::<i64>().ok())
		.ok_or(CommandError::Storage(StorageError::NotInteger))
}

/// A score argument: a decimal integer, or the `±INF` sentinels mapped to
/// the score domain's extremes.
pub(super) fn parse_score(raw: &[u8]) -> Result<i64, CommandError> {
	match raw.to_ascii_uppercase().as_slice() {
		b"-INF" => Ok(SCORE_MIN),
		b"+INF" | b"INF" => Ok(SCORE_MAX),
		_ => parse_i64(raw),
	}
}

pub(super) fn parse_lex(raw: &[u8]) -> Result<LexBound, CommandError> {
	LexBound::parse(raw).ok_or(CommandError::BadParams)
}

/// Split trailing `[WITHSCORES]` / `[LIMIT offset count]` options of the
/// range-by-score commands.
pub(super) struct RangeOptions {
	pub(super) with_scores: bool,
	pub(super) offset: i64,
	pub(super) count: i64,
}

pub(super) fn parse_range_options(
	args: &[Bytes],
	allow_with_scores: bool,
) -> Result<RangeOptions, CommandError> {
	let mut options = RangeOptions {
		with_scores: false,
		offset: 0,
		count: -1,
	};
	let mut i = 0;
	while i < args.len() {
		match args[i].to_ascii_uppercase().as_slice() {
			b"WITHSCORES" if allow_with_scores => {
				options.with_scores = true;
				i += 1;
			}
			b"LIMIT" => {
				if i + 2 >= args.len() {
					return Err(CommandError::BadParams);
				}
				options.offset = parse_i64(&args[i + 1])?;
				options.count = parse_i64(&args[i + 2])?;
				i += 3;
			}
			_ => return Err(CommandError::BadParams),
		}
	}
	Ok(options)
}

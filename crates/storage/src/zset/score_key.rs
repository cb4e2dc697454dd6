use bytes::Buf;
use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::error::StorageError;

const ZSET_SCORE_TAG: u8 = 5;

/// Integer score domain. The two extremes of `i64` are reserved so that the
/// `±INF` command sentinels and the exclusive upper bound `max + 1` stay
/// representable.
pub const SCORE_MIN: i64 = i64::MIN + 2;
pub const SCORE_MAX: i64 = i64::MAX - 1;

/// Shift a signed score into `u64` so lexicographic byte order over the
/// encoded form equals numeric order over the score.
pub fn score_offset(score: i64) -> u64 {
	(score as u64).wrapping_add(SCORE_MAX as u64)
}

pub fn score_restore(offset: u64) -> i64 {
	offset.wrapping_sub(SCORE_MAX as u64) as i64
}

/// Index row key of one sorted-set member, ordered by score then member:
/// `tag ‖ u16 keylen ‖ user_key ‖ u64 score_offset ‖ member`. The row value
/// is one zero byte.
#[derive(Debug, Clone, PartialEq)]
pub struct ZSetScoreKey {
	user_key: Bytes,
	score: i64,
	member: Bytes,
}

impl ZSetScoreKey {
	pub fn new(user_key: impl Into<Bytes>, score: i64, member: impl Into<Bytes>) -> Self {
		Self {
			user_key: user_key.into(),
			score,
			member: member.into(),
		}
	}

	pub fn score(&self) -> i64 {
		self.score
	}

	pub fn member(&self) -> &Bytes {
		&self.member
	}

	pub fn encode(&self) -> Bytes {
		let mut bytes = BytesMut::with_capacity(11 + self.user_key.len() + self.member.len());
		bytes.put_u8(ZSET_SCORE_TAG);
		bytes.put_u16(self.user_key.len() as u16);
		bytes.extend_from_slice(&self.user_key);
		bytes.put_u64(score_offset(self.score));
		bytes.extend_from_slice(&self.member);
		bytes.freeze()
	}

	/// Scan start for all score rows of one key.
	pub fn prefix(user_key: &Bytes) -> Bytes {
		let mut bytes = BytesMut::with_capacity(3 + user_key.len());
		bytes.put_u8(ZSET_SCORE_TAG);
		bytes.put_u16(user_key.len() as u16);
		bytes.extend_from_slice(user_key);
		bytes.freeze()
	}

	/// Exclusive upper bound for score range `[min, max]`: the empty-member
	/// row at `max + 1`. `max` never exceeds [`SCORE_MAX`], so the successor
	/// score exists.
	pub fn range_end(user_key: &Bytes, max: i64) -> Bytes {
		ZSetScoreKey::new(user_key.clone(), max.saturating_add(1), Bytes::new()).encode()
	}

	pub fn decode(raw: &Bytes) -> Result<Self, StorageError> {
		if raw.first() != Some(&ZSET_SCORE_TAG) {
			return Err(StorageError::WrongType);
		}
		let mut buf = &raw[1..];
		if buf.len() < 2 {
			return Err(StorageError::InvalidMeta);
		}
		let key_len = buf.get_u16() as usize;
		if buf.len() < key_len + 8 {
			return Err(StorageError::InvalidMeta);
		}
		buf.advance(key_len);
		let score = score_restore(buf.get_u64());
		Ok(Self {
			user_key: raw.slice(3..3 + key_len),
			score,
			member: raw.slice(11 + key_len..),
		})
	}
}

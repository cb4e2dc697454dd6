use bytes::Buf;
use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::error::StorageError;

const ZSET_DATA_TAG: u8 = 4;

/// The member row's value: its score, 8 big-endian bytes.
pub fn encode_score_value(score: i64) -> bytes::Bytes {
	Bytes::copy_from_slice(&score.to_be_bytes())
}

pub fn decode_score_value(raw: &[u8]) -> Result<i64, StorageError> {
	if raw.len() < 8 {
		return Err(StorageError::InvalidMeta);
	}
	let mut buf = raw;
	Ok(buf.get_i64())
}

/// Data row key of one sorted-set member:
/// `tag ‖ u16 keylen ‖ user_key ‖ u16 memlen ‖ member`. The row value is the
/// member's score as 8 big-endian bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ZSetMemberKey {
	user_key: Bytes,
	member: Bytes,
}

impl ZSetMemberKey {
	pub fn new(user_key: impl Into<Bytes>, member: impl Into<Bytes>) -> Self {
		Self {
			user_key: user_key.into(),
			member: member.into(),
		}
	}

	pub fn member(&self) -> &Bytes {
		&self.member
	}

	pub fn encode(&self) -> Bytes {
		let mut bytes = BytesMut::with_capacity(5 + self.user_key.len() + self.member.len());
		bytes.put_u8(ZSET_DATA_TAG);
		bytes.put_u16(self.user_key.len() as u16);
		bytes.extend_from_slice(&self.user_key);
		bytes.put_u16(self.member.len() as u16);
		bytes.extend_from_slice(&self.member);
		bytes.freeze()
	}

	/// Infimum of all member rows of one key: the empty member.
	pub fn range_start(user_key: &Bytes) -> Bytes {
		ZSetMemberKey::new(user_key.clone(), Bytes::new()).encode()
	}

	/// Supremum of all member rows of one key; member lengths stay below
	/// the `u16::MAX` sentinel. Used as an exclusive upper bound.
	pub fn range_end(user_key: &Bytes) -> Bytes {
		let mut bytes = BytesMut::with_capacity(5 + user_key.len());
		bytes.put_u8(ZSET_DATA_TAG);
		bytes.put_u16(user_key.len() as u16);
		bytes.extend_from_slice(user_key);
		bytes.put_u16(u16::MAX);
		bytes.freeze()
	}

	pub fn decode(raw: &Bytes) -> Result<Self, StorageError> {
		if raw.first() != Some(&ZSET_DATA_TAG) {
			return Err(StorageError::WrongType);
		}
		let mut buf = &raw[1..];
		if buf.len() < 2 {
			return Err(StorageError::InvalidMeta);
		}
		let key_len = buf.get_u16() as usize;
		if buf.len() < key_len + 2 {
			return Err(StorageError::InvalidMeta);
		}
		buf.advance(key_len);
		let member_len = buf.get_u16() as usize;
		if buf.len() < member_len {
			return Err(StorageError::InvalidMeta);
		}
		Ok(Self {
			user_key: raw.slice(3..3 + key_len),
			member: raw.slice(5 + key_len..5 + key_len + member_len),
		})
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("z", "m", b"\x04\x00\x01z\x00\x01m")]
	#[case("key", "ab", b"\x04\x00\x03key\x00\x02ab")]
	fn test_zset_member_key_encode(#[case] key: &str, #[case] member: &str, #[case] expected: &[u8]) {
		let member_key = ZSetMemberKey::new(
			Bytes::copy_from_slice(key.as_bytes()),
			Bytes::copy_from_slice(member.as_bytes()),
		);
		assert_eq!(&member_key.encode()[..], expected);
	}

	#[test]
	fn test_zset_member_key_roundtrip() {
		let member_key = ZSetMemberKey::new(Bytes::from("z"), Bytes::from("alpha"));
		let decoded = ZSetMemberKey::decode(&member_key.encode()).unwrap();
		assert_eq!(decoded.member(), &Bytes::from("alpha"));
	}

	#[test]
	fn test_range_bounds_bracket_all_members() {
		let key = Bytes::from("z");
		let start = ZSetMemberKey::range_start(&key);
		let end = ZSetMemberKey::range_end(&key);
		for member in ["", "a", "zz"] {
			let row = ZSetMemberKey::new(key.clone(), Bytes::copy_from_slice(member.as_bytes()))
				.encode();
			assert!(start <= row, "member {member:?} below range start");
			assert!(row < end, "member {member:?} above range end");
		}
	}
}

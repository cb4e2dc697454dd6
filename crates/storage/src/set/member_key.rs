use bytes::Buf;
use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::error::StorageError;

const SET_DATA_TAG: u8 = 2;

/// Data row key of one set member:
/// `tag ‖ u16 keylen ‖ user_key ‖ member`. The row value is one zero byte.
#[derive(Debug, Clone, PartialEq)]
pub struct SetMemberKey {
	user_key: Bytes,
	member: Bytes,
}

impl SetMemberKey {
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
		let mut bytes = BytesMut::with_capacity(3 + self.user_key.len() + self.member.len());
		bytes.put_u8(SET_DATA_TAG);
		bytes.put_u16(self.user_key.len() as u16);
		bytes.extend_from_slice(&self.user_key);
		bytes.extend_from_slice(&self.member);
		bytes.freeze()
	}

	/// Scan start for all members of one set.
	pub fn prefix(user_key: &Bytes) -> Bytes {
		let mut bytes = BytesMut::with_capacity(3 + user_key.len());
		bytes.put_u8(SET_DATA_TAG);
		bytes.put_u16(user_key.len() as u16);
		bytes.extend_from_slice(user_key);
		bytes.freeze()
	}

	pub fn decode(raw: &Bytes) -> Result<Self, StorageError> {
		if raw.first() != Some(&SET_DATA_TAG) {
			return Err(StorageError::WrongType);
		}
		let mut buf = &raw[1..];
		if buf.len() < 2 {
			return Err(StorageError::InvalidMeta);
		}
		let key_len = buf.get_u16() as usize;
		if buf.len() < key_len {
			return Err(StorageError::InvalidMeta);
		}
		Ok(Self {
			user_key: raw.slice(3..3 + key_len),
			member: raw.slice(3 + key_len..),
		})
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("s", "m", b"\x02\x00\x01sm")]
	#[case("set", "member", b"\x02\x00\x03setmember")]
	fn test_set_member_key_encode(#[case] key: &str, #[case] member: &str, #[case] expected: &[u8]) {
		let member_key = SetMemberKey::new(
			Bytes::copy_from_slice(key.as_bytes()),
			Bytes::copy_from_slice(member.as_bytes()),
		);
		assert_eq!(&member_key.encode()[..], expected);
	}

	#[test]
	fn test_set_member_key_roundtrip() {
		let member_key = SetMemberKey::new(Bytes::from("s"), Bytes::from("apple"));
		let decoded = SetMemberKey::decode(&member_key.encode()).unwrap();
		assert_eq!(decoded.member(), &Bytes::from("apple"));
	}

	#[test]
	fn test_members_of_one_set_are_contiguous() {
		let a = SetMemberKey::new(Bytes::from("s"), Bytes::from("a")).encode();
		let b = SetMemberKey::new(Bytes::from("s"), Bytes::from("b")).encode();
		let other = SetMemberKey::new(Bytes::from("t"), Bytes::from("a")).encode();
		assert!(a < b);
		assert!(b < other);
	}
}

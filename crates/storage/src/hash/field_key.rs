use bytes::Buf;
use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::error::StorageError;

const HASH_DATA_TAG: u8 = 7;

/// Data row key of one hash field:
/// `tag ‖ u16 keylen ‖ user_key ‖ field`. The row value is the field value.
#[derive(Debug, Clone, PartialEq)]
pub struct HashFieldKey {
	user_key: Bytes,
	field: Bytes,
}

impl HashFieldKey {
	pub fn new(user_key: impl Into<Bytes>, field: impl Into<Bytes>) -> Self {
		Self {
			user_key: user_key.into(),
			field: field.into(),
		}
	}

	pub fn field(&self) -> &Bytes {
		&self.field
	}

	pub fn encode(&self) -> Bytes {
		let mut bytes = BytesMut::with_capacity(3 + self.user_key.len() + self.field.len());
		bytes.put_u8(HASH_DATA_TAG);
		bytes.put_u16(self.user_key.len() as u16);
		bytes.extend_from_slice(&self.user_key);
		bytes.extend_from_slice(&self.field);
		bytes.freeze()
	}

	/// Scan start for all fields of one hash.
	pub fn prefix(user_key: &Bytes) -> Bytes {
		let mut bytes = BytesMut::with_capacity(3 + user_key.len());
		bytes.put_u8(HASH_DATA_TAG);
		bytes.put_u16(user_key.len() as u16);
		bytes.extend_from_slice(user_key);
		bytes.freeze()
	}

	pub fn decode(raw: &Bytes) -> Result<Self, StorageError> {
		if raw.first() != Some(&HASH_DATA_TAG) {
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
			field: raw.slice(3 + key_len..),
		})
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("h", "f", b"\x07\x00\x01hf")]
	#[case("key", "field", b"\x07\x00\x03keyfield")]
	#[case("key", "", b"\x07\x00\x03key")]
	fn test_hash_field_key_encode(#[case] key: &str, #[case] field: &str, #[case] expected: &[u8]) {
		let data_key = HashFieldKey::new(
			Bytes::copy_from_slice(key.as_bytes()),
			Bytes::copy_from_slice(field.as_bytes()),
		);
		assert_eq!(&data_key.encode()[..], expected);
	}

	#[test]
	fn test_hash_field_key_roundtrip() {
		let data_key = HashFieldKey::new(Bytes::from("mykey"), Bytes::from("myfield"));
		let decoded = HashFieldKey::decode(&data_key.encode()).unwrap();
		assert_eq!(decoded, data_key);
		assert_eq!(decoded.field(), &Bytes::from("myfield"));
	}

	#[test]
	fn test_prefix_orders_before_fields() {
		let prefix = HashFieldKey::prefix(&Bytes::from("k"));
		let row = HashFieldKey::new(Bytes::from("k"), Bytes::from("a")).encode();
		assert!(prefix < row);
	}
}

use bytes::Buf;
use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::error::StorageError;

const TTL_TAG: u8 = 109;
const EXPIRE_TAG: u8 = 110;

/// Point-lookup row for a key's expiry: `tag ‖ user_key` with the absolute
/// expiry (ms since epoch) as an 8-byte big-endian value.
#[derive(Debug, Clone, PartialEq)]
pub struct TtlKey {
	user_key: Bytes,
}

impl TtlKey {
	pub fn new(user_key: impl Into<Bytes>) -> Self {
		Self {
			user_key: user_key.into(),
		}
	}

	pub fn encode(&self) -> Bytes {
		let mut bytes = BytesMut::with_capacity(1 + self.user_key.len());
		bytes.put_u8(TTL_TAG);
		bytes.extend_from_slice(&self.user_key);
		bytes.freeze()
	}

	pub fn encode_value(expire_ms: u64) -> Bytes {
		Bytes::copy_from_slice(&expire_ms.to_be_bytes())
	}

	pub fn decode_value(raw: &[u8]) -> Result<u64, StorageError> {
		if raw.len() < 8 {
			return Err(StorageError::InvalidMeta);
		}
		let mut buf = raw;
		Ok(buf.get_u64())
	}
}

/// Time-indexed row the sweeper walks: `tag ‖ u64 expire_ms ‖ user_key`,
/// value one zero byte. Rows order by timestamp then key.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpireKey {
	expire_ms: u64,
	user_key: Bytes,
}

impl ExpireKey {
	pub fn new(expire_ms: u64, user_key: impl Into<Bytes>) -> Self {
		Self {
			expire_ms,
			user_key: user_key.into(),
		}
	}

	pub fn expire_ms(&self) -> u64 {
		self.expire_ms
	}

	pub fn user_key(&self) -> &Bytes {
		&self.user_key
	}

	pub fn encode(&self) -> Bytes {
		let mut bytes = BytesMut::with_capacity(9 + self.user_key.len());
		bytes.put_u8(EXPIRE_TAG);
		bytes.put_u64(self.expire_ms);
		bytes.extend_from_slice(&self.user_key);
		bytes.freeze()
	}

	pub fn decode(raw: &Bytes) -> Result<Self, StorageError> {
		if raw.first() != Some(&EXPIRE_TAG) {
			return Err(StorageError::WrongType);
		}
		let mut buf = &raw[1..];
		if buf.len() < 8 {
			return Err(StorageError::InvalidMeta);
		}
		let expire_ms = buf.get_u64();
		Ok(Self {
			expire_ms,
			user_key: raw.slice(9..),
		})
	}

	/// Scan start of the whole expiry index.
	pub fn range_start() -> Bytes {
		ExpireKey::new(0, Bytes::new()).encode()
	}

	/// Scan end of the whole expiry index; expiries never reach
	/// `i64::MAX` milliseconds.
	pub fn range_end() -> Bytes {
		ExpireKey::new(i64::MAX as u64, Bytes::new()).encode()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ttl_key_encode() {
		let ttl_key = TtlKey::new(Bytes::from("k"));
		assert_eq!(&ttl_key.encode()[..], b"\x6dk");
	}

	#[test]
	fn test_ttl_value_roundtrip() {
		let raw = TtlKey::encode_value(1_234_567);
		assert_eq!(TtlKey::decode_value(&raw).unwrap(), 1_234_567);
	}

	#[test]
	fn test_expire_key_roundtrip() {
		let expire_key = ExpireKey::new(99, Bytes::from("mykey"));
		let decoded = ExpireKey::decode(&expire_key.encode()).unwrap();
		assert_eq!(decoded.expire_ms(), 99);
		assert_eq!(decoded.user_key(), &Bytes::from("mykey"));
	}

	#[test]
	fn test_expire_keys_order_by_timestamp_then_key() {
		let early_b = ExpireKey::new(10, Bytes::from("b")).encode();
		let late_a = ExpireKey::new(20, Bytes::from("a")).encode();
		let late_b = ExpireKey::new(20, Bytes::from("b")).encode();
		assert!(early_b < late_a);
		assert!(late_a < late_b);
	}

	#[test]
	fn test_range_brackets_all_rows() {
		let row = ExpireKey::new(1_700_000_000_000, Bytes::from("k")).encode();
		assert!(ExpireKey::range_start() <= row);
		assert!(row < ExpireKey::range_end());
	}
}

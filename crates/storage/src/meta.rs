//! The meta row shared by every logical key.
//!
//! String values and container meta records live in one physical namespace
//! (`0x00 ‖ user_key`), with the value's first byte carrying the type tag.
//! That single location is what lets PTTL, DEL and the sweeper discover a
//! key's type with one read.

use bytes::Buf;
use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::data_type::DataType;
use crate::data_type::FLAG_NORMAL;
use crate::error::StorageError;

/// Key tag of the shared meta/string namespace.
const META_TAG: u8 = DataType::String as u8;

#[derive(Debug, Clone, PartialEq)]
pub struct MetaKey {
	user_key: Bytes,
}

impl MetaKey {
	pub fn new(user_key: impl Into<Bytes>) -> Self {
		Self {
			user_key: user_key.into(),
		}
	}

	pub fn encode(&self) -> Bytes {
		let mut bytes = BytesMut::with_capacity(1 + self.user_key.len());
		bytes.put_u8(META_TAG);
		bytes.extend_from_slice(&self.user_key);
		bytes.freeze()
	}
}

/// Type tag of a raw meta value. Errors: empty value, unknown tag.
pub fn meta_type(raw: &[u8]) -> Result<DataType, StorageError> {
	let first = raw.first().ok_or(StorageError::InvalidRawData)?;
	DataType::from_u8(*first).ok_or(StorageError::WrongType)
}

/// Meta record of HASH, SET and ZSET containers: `{size, ttl_ms, flag}`,
/// written with a per-engine type tag in front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerMeta {
	pub size: u64,
	pub ttl_ms: u64,
	pub flag: u8,
}

impl ContainerMeta {
	pub fn new(size: u64) -> Self {
		Self {
			size,
			ttl_ms: 0,
			flag: FLAG_NORMAL,
		}
	}

	pub fn encode(&self, data_type: DataType) -> Bytes {
		let mut bytes = BytesMut::with_capacity(18);
		bytes.put_u8(data_type as u8);
		bytes.put_u64(self.size);
		bytes.put_u64(self.ttl_ms);
		bytes.put_u8(self.flag);
		bytes.freeze()
	}

	/// Decode a raw meta value, enforcing the expected type tag.
	pub fn decode(raw: &[u8], expect: DataType) -> Result<Self, StorageError> {
		if meta_type(raw)? != expect {
			return Err(StorageError::WrongType);
		}
		let mut buf = &raw[1..];
		if buf.len() < 17 {
			return Err(StorageError::InvalidMeta);
		}
		let size = buf.get_u64();
		let ttl_ms = buf.get_u64();
		let flag = buf.get_u8();
		Ok(Self { size, ttl_ms, flag })
	}
}

/// Both ends start in the middle of the index space so a list can grow in
/// either direction.
pub const LIST_INITIAL_INDEX: u64 = (1 << 32) - 512;

/// List meta record: `{head, tail, size, ttl_ms, flag}` behind the LIST tag.
/// Elements live at indexes `[head, tail)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMeta {
	pub head: u64,
	pub tail: u64,
	pub size: u64,
	pub ttl_ms: u64,
	pub flag: u8,
}

impl Default for ListMeta {
	fn default() -> Self {
		Self {
			head: LIST_INITIAL_INDEX,
			tail: LIST_INITIAL_INDEX,
			size: 0,
			ttl_ms: 0,
			flag: FLAG_NORMAL,
		}
	}
}

impl ListMeta {
	pub fn encode(&self) -> Bytes {
		let mut bytes = BytesMut::with_capacity(34);
		bytes.put_u8(DataType::List as u8);
		bytes.put_u64(self.head);
		bytes.put_u64(self.tail);
		bytes.put_u64(self.size);
		bytes.put_u64(self.ttl_ms);
		bytes.put_u8(self.flag);
		bytes.freeze()
	}

	pub fn decode(raw: &[u8]) -> Result<Self, StorageError> {
		if meta_type(raw)? != DataType::List {
			return Err(StorageError::WrongType);
		}
		let mut buf = &raw[1..];
		if buf.len() < 33 {
			return Err(StorageError::InvalidMeta);
		}
		let head = buf.get_u64();
		let tail = buf.get_u64();
		let size = buf.get_u64();
		let ttl_ms = buf.get_u64();
		let flag = buf.get_u8();
		Ok(Self {
			head,
			tail,
			size,
			ttl_ms,
			flag,
		})
	}
}

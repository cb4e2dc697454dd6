use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::data_type::DataType;
use crate::error::StorageError;
use crate::meta::meta_type;

/// A string payload behind its one-byte type tag, as stored in the shared
/// meta namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct StringValue {
	pub value: Bytes,
}

impl StringValue {
	pub fn new(value: impl Into<Bytes>) -> Self {
		Self {
			value: value.into(),
		}
	}

	pub fn encode(&self) -> Bytes {
		let mut bytes = BytesMut::with_capacity(1 + self.value.len());
		bytes.put_u8(DataType::String as u8);
		bytes.extend_from_slice(&self.value);
		bytes.freeze()
	}

	/// Decode a raw meta value as a string payload; a container tag is a
	/// wrong-type access.
	pub fn decode(raw: &Bytes) -> Result<Self, StorageError> {
		if meta_type(raw)? != DataType::String {
			return Err(StorageError::WrongType);
		}
		Ok(Self {
			value: raw.slice(1..),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::meta::ContainerMeta;

	#[test]
	fn test_string_value_roundtrip() {
		let value = StringValue::new(Bytes::from("hello"));
		let encoded = value.encode();
		assert_eq!(&encoded[..], b"\x00hello");
		assert_eq!(StringValue::decode(&encoded).unwrap(), value);
	}

	#[test]
	fn test_empty_payload_is_valid() {
		let encoded = StringValue::new(Bytes::new()).encode();
		assert_eq!(&encoded[..], b"\x00");
		assert_eq!(StringValue::decode(&encoded).unwrap().value, Bytes::new());
	}

	#[test]
	fn test_container_tag_is_wrong_type() {
		let encoded = ContainerMeta::new(3).encode(DataType::Hash);
		assert!(matches!(
			StringValue::decode(&encoded),
			Err(StorageError::WrongType)
		));
	}

	#[test]
	fn test_empty_raw_is_invalid() {
		assert!(matches!(
			StringValue::decode(&Bytes::new()),
			Err(StorageError::InvalidRawData)
		));
	}
}

use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

const LIST_DATA_TAG: u8 = 9;

/// Data row key of one list element:
/// `tag ‖ u64 keylen ‖ user_key ‖ u64 index`. The row value is the element.
/// Rows of one list order by index, so the elements between `head` and
/// `tail` are one contiguous scanable run.
#[derive(Debug, Clone, PartialEq)]
pub struct ListElementKey {
	user_key: Bytes,
	index: u64,
}

impl ListElementKey {
	pub fn new(user_key: impl Into<Bytes>, index: u64) -> Self {
		Self {
			user_key: user_key.into(),
			index,
		}
	}

	pub fn encode(&self) -> Bytes {
		let mut bytes = BytesMut::with_capacity(17 + self.user_key.len());
		bytes.put_u8(LIST_DATA_TAG);
		bytes.put_u64(self.user_key.len() as u64);
		bytes.extend_from_slice(&self.user_key);
		bytes.put_u64(self.index);
		bytes.freeze()
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("l", 1, b"\x09\x00\x00\x00\x00\x00\x00\x00\x01l\x00\x00\x00\x00\x00\x00\x00\x01")]
	#[case("l", 255, b"\x09\x00\x00\x00\x00\x00\x00\x00\x01l\x00\x00\x00\x00\x00\x00\x00\xff")]
	fn test_list_element_key_encode(#[case] key: &str, #[case] index: u64, #[case] expected: &[u8]) {
		let element_key = ListElementKey::new(Bytes::copy_from_slice(key.as_bytes()), index);
		assert_eq!(&element_key.encode()[..], expected);
	}

	#[test]
	fn test_list_element_keys_order_by_index() {
		let key = Bytes::from("mylist");
		let a = ListElementKey::new(key.clone(), 10).encode();
		let b = ListElementKey::new(key.clone(), 11).encode();
		let c = ListElementKey::new(key, u64::MAX).encode();
		assert!(a < b);
		assert!(b < c);
	}
}

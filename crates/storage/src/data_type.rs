/// Type tag of a meta row's value. The numeric values are bit-stable: they
/// are written to disk as the first byte of every meta value.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
	String = 0,
	Set = 1,
	ZSet = 3,
	Hash = 6,
	List = 8,
}

impl DataType {
	pub fn from_u8(v: u8) -> Option<Self> {
		match v {
			0 => Some(Self::String),
			1 => Some(Self::Set),
			3 => Some(Self::ZSet),
			6 => Some(Self::Hash),
			8 => Some(Self::List),
			_ => None,
		}
	}
}

/// Meta row flag byte.
pub const FLAG_NORMAL: u8 = 0;
pub const FLAG_DELETED: u8 = 1;

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(0, Some(DataType::String))]
	#[case(1, Some(DataType::Set))]
	#[case(3, Some(DataType::ZSet))]
	#[case(6, Some(DataType::Hash))]
	#[case(8, Some(DataType::List))]
	#[case(2, None)]
	#[case(109, None)]
	fn test_data_type_from_u8(#[case] raw: u8, #[case] expected: Option<DataType>) {
		assert_eq!(DataType::from_u8(raw), expected);
	}
}

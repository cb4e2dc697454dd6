use bytes::Bytes;

/// One end of a lexicographic range, as written in ZRANGEBYLEX and friends:
/// `-` and `+` are the open ends, `[x` is inclusive and `(x` exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum LexBound {
	Min,
	Max,
	Incl(Bytes),
	Excl(Bytes),
}

impl LexBound {
	/// Parse a client-supplied bound. Empty input or a missing marker byte
	/// is rejected.
	pub fn parse(raw: &[u8]) -> Option<Self> {
		match raw.first()? {
			b'-' if raw.len() == 1 => Some(LexBound::Min),
			b'+' if raw.len() == 1 => Some(LexBound::Max),
			b'[' => Some(LexBound::Incl(Bytes::copy_from_slice(&raw[1..]))),
			b'(' => Some(LexBound::Excl(Bytes::copy_from_slice(&raw[1..]))),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(b"-".as_slice(), Some(LexBound::Min))]
	#[case(b"+".as_slice(), Some(LexBound::Max))]
	#[case(b"[abc".as_slice(), Some(LexBound::Incl(Bytes::from_static(b"abc"))))]
	#[case(b"(abc".as_slice(), Some(LexBound::Excl(Bytes::from_static(b"abc"))))]
	#[case(b"[".as_slice(), Some(LexBound::Incl(Bytes::new())))]
	#[case(b"".as_slice(), None)]
	#[case(b"abc".as_slice(), None)]
	#[case(b"=a".as_slice(), None)]
	fn test_lex_bound_parse(#[case] raw: &[u8], #[case] expected: Option<LexBound>) {
		assert_eq!(LexBound::parse(raw), expected);
	}
}

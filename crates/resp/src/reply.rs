use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

const CRLF: &[u8] = b"\r\n";

const SIMPLE_STRING: u8 = b'+';
const ERROR: u8 = b'-';
const INTEGER: u8 = b':';
const BULK_STRING: u8 = b'$';
const ARRAY: u8 = b'*';

/// A server reply. This is the closed set of shapes the server ever writes:
/// nothing outside it reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
	/// `+OK\r\n`
	SimpleString(Bytes),
	/// `-ERR message\r\n`
	Error(Bytes),
	/// `:1000\r\n`
	Integer(i64),
	/// `$5\r\nhello\r\n`
	Bulk(Bytes),
	/// `$-1\r\n` — the nil bulk
	Null,
	/// `*2\r\n...` — nested replies
	Array(Vec<Reply>),
}

impl Reply {
	pub fn simple(s: impl Into<Bytes>) -> Self {
		Reply::SimpleString(s.into())
	}

	pub fn error(e: impl Into<Bytes>) -> Self {
		Reply::Error(e.into())
	}

	pub fn integer(i: i64) -> Self {
		Reply::Integer(i)
	}

	pub fn bulk(b: impl Into<Bytes>) -> Self {
		Reply::Bulk(b.into())
	}

	/// Bulk when present, nil when absent.
	pub fn bulk_or_null(b: Option<impl Into<Bytes>>) -> Self {
		match b {
			Some(b) => Reply::Bulk(b.into()),
			None => Reply::Null,
		}
	}

	pub fn array(items: impl IntoIterator<Item = Reply>) -> Self {
		Reply::Array(items.into_iter().collect())
	}

	pub fn ok() -> Self {
		Reply::SimpleString(Bytes::from_static(b"OK"))
	}

	pub fn is_error(&self) -> bool {
		matches!(self, Reply::Error(_))
	}

	/// Serialize into `buf` as RESP2.
	pub fn encode_to(&self, buf: &mut BytesMut) {
		match self {
			Reply::SimpleString(s) => encode_line(buf, SIMPLE_STRING, s),
			Reply::Error(e) => encode_line(buf, ERROR, e),
			Reply::Integer(i) => encode_line(buf, INTEGER, i.to_string().as_bytes()),
			Reply::Bulk(b) => {
				encode_length(buf, BULK_STRING, b.len() as i64);
				buf.put_slice(b);
				buf.put_slice(CRLF);
			}
			Reply::Null => encode_length(buf, BULK_STRING, -1),
			Reply::Array(items) => {
				encode_length(buf, ARRAY, items.len() as i64);
				for item in items {
					item.encode_to(buf);
				}
			}
		}
	}

	pub fn encode(&self) -> Bytes {
		let mut buf = BytesMut::new();
		self.encode_to(&mut buf);
		buf.freeze()
	}
}

#[inline]
fn encode_line(buf: &mut BytesMut, marker: u8, payload: &[u8]) {
	buf.put_u8(marker);
	buf.put_slice(payload);
	buf.put_slice(CRLF);
}

#[inline]
fn encode_length(buf: &mut BytesMut, marker: u8, length: i64) {
	buf.put_u8(marker);
	buf.put_slice(length.to_string().as_bytes());
	buf.put_slice(CRLF);
}

impl From<i64> for Reply {
	fn from(i: i64) -> Self {
		Reply::Integer(i)
	}
}

impl From<Bytes> for Reply {
	fn from(b: Bytes) -> Self {
		Reply::Bulk(b)
	}
}

impl From<Option<Bytes>> for Reply {
	fn from(b: Option<Bytes>) -> Self {
		Reply::bulk_or_null(b)
	}
}

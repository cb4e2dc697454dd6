use bytes::Bytes;
use bytes::BytesMut;
use resp::ParseError;
use resp::parse_request;

fn args(parts: &[&str]) -> Vec<Bytes> {
	parts.iter().map(|p| Bytes::copy_from_slice(p.as_bytes())).collect()
}

#[test]
fn test_parse_complete_array() {
	let mut buf = BytesMut::from(&b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$2\r\n10\r\n"[..]);
	let parsed = parse_request(&mut buf).unwrap().unwrap();
	assert_eq!(parsed, args(&["SET", "k", "10"]));
	assert!(buf.is_empty());
}

#[test]
fn test_parse_binary_safe_bulk() {
	let mut buf = BytesMut::from(&b"*2\r\n$3\r\nGET\r\n$4\r\na\r\nb\r\n"[..]);
	let parsed = parse_request(&mut buf).unwrap().unwrap();
	assert_eq!(parsed[1], Bytes::from_static(b"a\r\nb"));
}

#[test]
fn test_incomplete_frame_leaves_buffer_untouched() {
	let mut buf = BytesMut::from(&b"*2\r\n$3\r\nGET\r\n$5\r\nhel"[..]);
	let before = buf.clone();
	assert_eq!(parse_request(&mut buf).unwrap(), None);
	assert_eq!(buf, before);

	// Arrival of the rest completes the frame.
	buf.extend_from_slice(b"lo\r\n");
	let parsed = parse_request(&mut buf).unwrap().unwrap();
	assert_eq!(parsed, args(&["GET", "hello"]));
}

#[test]
fn test_pipelined_requests_parse_in_order() {
	let mut buf = BytesMut::from(&b"*1\r\n$4\r\nPING\r\n*1\r\n$4\r\nPING\r\n"[..]);
	assert_eq!(parse_request(&mut buf).unwrap().unwrap(), args(&["PING"]));
	assert_eq!(parse_request(&mut buf).unwrap().unwrap(), args(&["PING"]));
	assert_eq!(parse_request(&mut buf).unwrap(), None);
}

#[test]
fn test_inline_command() {
	let mut buf = BytesMut::from(&b"PING\r\n"[..]);
	assert_eq!(parse_request(&mut buf).unwrap().unwrap(), args(&["PING"]));
}

#[test]
fn test_inline_command_splits_whitespace() {
	let mut buf = BytesMut::from(&b"SET  key\tvalue\r\n"[..]);
	assert_eq!(
		parse_request(&mut buf).unwrap().unwrap(),
		args(&["SET", "key", "value"])
	);
}

#[test]
fn test_blank_inline_lines_are_skipped() {
	let mut buf = BytesMut::from(&b"\r\nPING\r\n"[..]);
	assert_eq!(parse_request(&mut buf).unwrap().unwrap(), args(&["PING"]));
}

#[test]
fn test_empty_array_is_allowed() {
	let mut buf = BytesMut::from(&b"*0\r\n"[..]);
	assert_eq!(parse_request(&mut buf).unwrap().unwrap(), Vec::<Bytes>::new());
}

#[test]
fn test_negative_array_length_is_error() {
	let mut buf = BytesMut::from(&b"*-1\r\n"[..]);
	assert_eq!(
		parse_request(&mut buf),
		Err(ParseError::InvalidArrayLength(-1))
	);
}

#[test]
fn test_negative_bulk_length_is_error() {
	let mut buf = BytesMut::from(&b"*1\r\n$-1\r\n"[..]);
	assert_eq!(
		parse_request(&mut buf),
		Err(ParseError::InvalidBulkLength(-1))
	);
}

#[test]
fn test_missing_bulk_marker_is_error() {
	let mut buf = BytesMut::from(&b"*1\r\n:42\r\n"[..]);
	assert_eq!(
		parse_request(&mut buf),
		Err(ParseError::ExpectedBulkString(Some(b':')))
	);
}

#[test]
fn test_bare_newline_is_error() {
	let mut buf = BytesMut::from(&b"*1\n$4\r\nPING\r\n"[..]);
	assert_eq!(parse_request(&mut buf), Err(ParseError::BadLineEnding));
}

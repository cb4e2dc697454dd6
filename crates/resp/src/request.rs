use bytes::Buf;
use bytes::Bytes;
use bytes::BytesMut;

use crate::error::ParseError;

/// Redis caps a single bulk string at 512 MiB; anything larger is a
/// protocol error rather than an allocation request.
const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Try to consume one complete client request from `buf`.
///
/// Returns `Ok(Some(args))` and advances the buffer past the frame when a
/// full request is available, `Ok(None)` (buffer untouched) when more bytes
/// are needed, and `Err` on a malformed frame. Both RESP arrays of bulk
/// strings and inline commands (`PING\r\n`) are accepted; blank inline
/// lines are skipped.
pub fn parse_request(buf: &mut BytesMut) -> Result<Option<Vec<Bytes>>, ParseError> {
	loop {
		if buf.is_empty() {
			return Ok(None);
		}
		if buf[0] == b'*' {
			return parse_array(buf);
		}
		match parse_inline(buf)? {
			Some(args) if args.is_empty() => continue,
			Some(args) => return Ok(Some(args)),
			None => return Ok(None),
		}
	}
}

/// `*N\r\n` followed by N bulk strings `$len\r\n<data>\r\n`.
fn parse_array(buf: &mut BytesMut) -> Result<Option<Vec<Bytes>>, ParseError> {
	let Some((header_start, header_end, mut pos)) = read_line(buf, 0)? else {
		return Ok(None);
	};
	let argc = parse_int(&buf[header_start + 1..header_end])?;
	if argc < 0 {
		return Err(ParseError::InvalidArrayLength(argc));
	}

	let mut ranges = Vec::with_capacity(argc as usize);
	for _ in 0..argc {
		let Some((line_start, line_end, body_start)) = read_line(buf, pos)? else {
			return Ok(None);
		};
		if buf.get(line_start) != Some(&b'$') {
			return Err(ParseError::ExpectedBulkString(buf.get(line_start).copied()));
		}
		let len = parse_int(&buf[line_start + 1..line_end])?;
		if !(0..=MAX_BULK_LEN).contains(&len) {
			return Err(ParseError::InvalidBulkLength(len));
		}
		let body_end = body_start + len as usize;
		if buf.len() < body_end + 2 {
			return Ok(None);
		}
		if &buf[body_end..body_end + 2] != b"\r\n" {
			return Err(ParseError::BadLineEnding);
		}
		ranges.push((body_start, body_end));
		pos = body_end + 2;
	}

	let frame = buf.split_to(pos).freeze();
	Ok(Some(
		ranges
			.into_iter()
			.map(|(start, end)| frame.slice(start..end))
			.collect(),
	))
}

/// One whitespace-separated line; tokens are copied out of the buffer.
fn parse_inline(buf: &mut BytesMut) -> Result<Option<Vec<Bytes>>, ParseError> {
	let Some((start, end, next)) = read_line(buf, 0)? else {
		return Ok(None);
	};
	let args = buf[start..end]
		.split(|&b| b == b' ' || b == b'\t')
		.filter(|token| !token.is_empty())
		.map(Bytes::copy_from_slice)
		.collect();
	buf.advance(next);
	Ok(Some(args))
}

/// Locate one CRLF-terminated line starting at `from`. Returns
/// `(content_start, content_end, next_pos)` with the CRLF excluded.
fn read_line(buf: &[u8], from: usize) -> Result<Option<(usize, usize, usize)>, ParseError> {
	let Some(nl) = memchr::memchr(b'\n', &buf[from..]) else {
		return Ok(None);
	};
	let nl = from + nl;
	if nl == from || buf[nl - 1] != b'\r' {
		return Err(ParseError::BadLineEnding);
	}
	Ok(Some((from, nl - 1, nl + 1)))
}

fn parse_int(digits: &[u8]) -> Result<i64, ParseError> {
	if digits.is_empty() {
		return Err(ParseError::InvalidInteger);
	}
	let (neg, digits) = match digits[0] {
		b'-' => (true, &digits[1..]),
		_ => (false, digits),
	};
	if digits.is_empty() {
		return Err(ParseError::InvalidInteger);
	}
	let mut value: i64 = 0;
	for &b in digits {
		if !b.is_ascii_digit() {
			return Err(ParseError::InvalidInteger);
		}
		value = value
			.checked_mul(10)
			.and_then(|v| v.checked_add((b - b'0') as i64))
			.ok_or(ParseError::InvalidInteger)?;
	}
	Ok(if neg { -value } else { value })
}

use bytes::Bytes;
use resp::Reply;
use rstest::rstest;

#[rstest]
#[case(Reply::ok(), b"+OK\r\n".as_slice())]
#[case(Reply::simple("PONG"), b"+PONG\r\n".as_slice())]
#[case(Reply::error("ERR boom"), b"-ERR boom\r\n".as_slice())]
#[case(Reply::integer(1000), b":1000\r\n".as_slice())]
#[case(Reply::integer(-2), b":-2\r\n".as_slice())]
#[case(Reply::bulk("hello"), b"$5\r\nhello\r\n".as_slice())]
#[case(Reply::bulk(""), b"$0\r\n\r\n".as_slice())]
#[case(Reply::Null, b"$-1\r\n".as_slice())]
fn test_encode_scalars(#[case] reply: Reply, #[case] expected: &[u8]) {
	assert_eq!(&reply.encode()[..], expected);
}

#[test]
fn test_encode_array() {
	let reply = Reply::array([Reply::bulk("a"), Reply::integer(2), Reply::Null]);
	assert_eq!(&reply.encode()[..], b"*3\r\n$1\r\na\r\n:2\r\n$-1\r\n");
}

#[test]
fn test_encode_nested_array() {
	let reply = Reply::array([Reply::array([Reply::integer(1)]), Reply::ok()]);
	assert_eq!(&reply.encode()[..], b"*2\r\n*1\r\n:1\r\n+OK\r\n");
}

#[test]
fn test_encode_empty_array() {
	assert_eq!(&Reply::array([]).encode()[..], b"*0\r\n");
}

#[test]
fn test_bulk_or_null() {
	assert_eq!(
		Reply::bulk_or_null(Some(Bytes::from("v"))),
		Reply::bulk("v")
	);
	assert_eq!(Reply::bulk_or_null(None::<Bytes>), Reply::Null);
}

#[test]
fn test_binary_bulk_roundtrips_length() {
	let payload = Bytes::from_static(b"a\r\nb\x00c");
	let encoded = Reply::Bulk(payload.clone()).encode();
	assert_eq!(&encoded[..], b"$7\r\na\r\nb\x00c\r\n");
}

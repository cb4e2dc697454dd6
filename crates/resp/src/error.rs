use thiserror::Error;

/// Errors raised while parsing a client request frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
	#[error("line not terminated with CRLF")]
	BadLineEnding,

	#[error("invalid integer in protocol header")]
	InvalidInteger,

	#[error("invalid array length: {0}")]
	InvalidArrayLength(i64),

	#[error("invalid bulk string length: {0}")]
	InvalidBulkLength(i64),

	#[error("expected bulk string marker, got {0:?}")]
	ExpectedBulkString(Option<u8>),
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
	#[error("key can't be empty")]
	KeyEmpty,

	#[error("WRONGTYPE operation against a key holding the wrong kind of value")]
	WrongType,

	#[error("invalid key meta")]
	InvalidMeta,

	#[error("index out of range")]
	OutOfRange,

	#[error("value is not an integer or out of range")]
	NotInteger,

	#[error("raw value missing type tag")]
	InvalidRawData,

	#[error("server internal error")]
	Internal,

	#[error(transparent)]
	Kv(#[from] txnkv::KvError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

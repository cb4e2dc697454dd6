use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KvError {
	#[error("write conflict, transaction must retry")]
	Conflict,
	#[error("transaction already committed or rolled back")]
	Finished,
}

pub type Result<T> = std::result::Result<T, KvError>;

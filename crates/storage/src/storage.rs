use bytes::Bytes;

use txnkv::Transaction;

use crate::data_type::DataType;
use crate::error::Result;
use crate::error::StorageError;
use crate::meta::ContainerMeta;
use crate::meta::ListMeta;
use crate::meta::MetaKey;
use crate::meta::meta_type;
use crate::store::Store;

/// The typed keyspace: five engines over one [`Store`], split across the
/// `storage_*` modules. Cheap to clone and share between connection tasks;
/// all mutation goes through per-call transactions.
#[derive(Clone)]
pub struct Storage {
	store: Store,
}

impl Storage {
	pub fn new(store: Store) -> Self {
		Self { store }
	}

	/// Storage over a fresh in-process store.
	pub fn memory() -> Self {
		Self::new(Store::memory())
	}

	pub fn store(&self) -> &Store {
		&self.store
	}

	pub fn new_txn(&self) -> Transaction {
		self.store.new_txn()
	}

	pub(crate) fn now_ms() -> u64 {
		chrono::Utc::now().timestamp_millis() as u64
	}

	/// Resolve the caller's transaction or open a private one for a
	/// single-statement operation.
	pub(crate) fn scope<'a>(&self, txn: Option<&'a Transaction>) -> TxnScope<'a> {
		match txn {
			Some(txn) => TxnScope::Session(txn),
			None => TxnScope::Local(self.store.new_txn()),
		}
	}

	/// Raw meta value of a key, whatever its type.
	pub(crate) async fn read_meta(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
	) -> Result<Option<Bytes>> {
		self.store.get(txn, &MetaKey::new(key.clone()).encode()).await
	}

	/// Container meta of `key`, enforcing the engine's type tag. Absent meta
	/// means an empty container.
	pub(crate) async fn container_meta(
		&self,
		txn: &Transaction,
		key: &Bytes,
		expect: DataType,
	) -> Result<Option<ContainerMeta>> {
		match self.read_meta(Some(txn), key).await? {
			Some(raw) => Ok(Some(ContainerMeta::decode(&raw, expect)?)),
			None => Ok(None),
		}
	}

	pub(crate) async fn write_container_meta(
		&self,
		txn: &Transaction,
		key: &Bytes,
		meta: &ContainerMeta,
		data_type: DataType,
	) -> Result<()> {
		self.store
			.set(
				Some(txn),
				MetaKey::new(key.clone()).encode(),
				meta.encode(data_type),
			)
			.await
	}

	/// List meta of `key`; an absent meta row is a fresh list with both ends
	/// at the initial index.
	pub(crate) async fn list_meta(&self, txn: &Transaction, key: &Bytes) -> Result<ListMeta> {
		match self.read_meta(Some(txn), key).await? {
			Some(raw) => ListMeta::decode(&raw),
			None => Ok(ListMeta::default()),
		}
	}

	/// Remove logical keys inside `txn`: container data rows, the meta row
	/// and any expiry rows. Returns how many keys had a meta row.
	pub(crate) async fn delete_with_txn(&self, txn: &Transaction, keys: &[Bytes]) -> Result<i64> {
		let mut deleted = 0;
		for key in keys {
			let meta_key = MetaKey::new(key.clone()).encode();
			if let Some(raw) = self.store.get(Some(txn), &meta_key).await? {
				match meta_type(&raw)? {
					DataType::Set => {
						self.clear_set(txn, key).await?;
					}
					DataType::ZSet => {
						self.clear_zset(txn, key).await?;
					}
					DataType::Hash => {
						self.clear_hash(txn, key).await?;
					}
					DataType::List => {
						self.clear_list(txn, key).await?;
					}
					DataType::String => {}
				}
				deleted += 1;
			}
			txn.delete(meta_key)?;
			self.remove_expiry_rows(txn, key).await?;
		}
		Ok(deleted)
	}
}

/// Either the session's transaction or a private single-statement one.
/// A local transaction left uncommitted rolls back when the scope drops.
pub(crate) enum TxnScope<'a> {
	Session(&'a Transaction),
	Local(Transaction),
}

impl TxnScope<'_> {
	pub(crate) fn txn(&self) -> &Transaction {
		match self {
			TxnScope::Session(txn) => txn,
			TxnScope::Local(txn) => txn,
		}
	}

	pub(crate) fn commit_if_local(self) -> Result<()> {
		if let TxnScope::Local(txn) = self {
			txn.commit()?;
		}
		Ok(())
	}
}

pub(crate) fn check_key(key: &[u8]) -> Result<()> {
	if key.is_empty() {
		Err(StorageError::KeyEmpty)
	} else {
		Ok(())
	}
}

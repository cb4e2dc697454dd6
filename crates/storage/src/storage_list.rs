use bytes::Bytes;

use txnkv::Transaction;

use crate::error::Result;
use crate::error::StorageError;
use crate::list::element_key::ListElementKey;
use crate::meta::MetaKey;
use crate::storage::Storage;
use crate::storage::check_key;

/// Which end of the list an operation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEnd {
	Head,
	Tail,
}

impl Storage {
	/// Prepend; returns the new length.
	pub async fn lpush(&self, txn: Option<&Transaction>, key: &Bytes, items: &[Bytes]) -> Result<i64> {
		self.push(txn, key, ListEnd::Head, items).await
	}

	/// Append; returns the new length.
	pub async fn rpush(&self, txn: Option<&Transaction>, key: &Bytes, items: &[Bytes]) -> Result<i64> {
		self.push(txn, key, ListEnd::Tail, items).await
	}

	async fn push(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		end: ListEnd,
		items: &[Bytes],
	) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let mut meta = self.list_meta(txn, key).await?;
		let count = items.len() as u64;
		match end {
			ListEnd::Head => {
				let mut index = meta.head;
				meta.head -= count;
				for item in items {
					index -= 1;
					txn.put(ListElementKey::new(key.clone(), index).encode(), item.clone())?;
				}
			}
			ListEnd::Tail => {
				let mut index = meta.tail;
				meta.tail += count;
				for item in items {
					txn.put(ListElementKey::new(key.clone(), index).encode(), item.clone())?;
					index += 1;
				}
			}
		}
		meta.size += count;
		txn.put(MetaKey::new(key.clone()).encode(), meta.encode())?;
		scope.commit_if_local()?;
		Ok(meta.size as i64)
	}

	pub async fn lpop(&self, txn: Option<&Transaction>, key: &Bytes) -> Result<Option<Bytes>> {
		self.pop(txn, key, ListEnd::Head).await
	}

	pub async fn rpop(&self, txn: Option<&Transaction>, key: &Bytes) -> Result<Option<Bytes>> {
		self.pop(txn, key, ListEnd::Tail).await
	}

	async fn pop(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		end: ListEnd,
	) -> Result<Option<Bytes>> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let mut meta = self.list_meta(txn, key).await?;
		if meta.size == 0 {
			scope.commit_if_local()?;
			return Ok(None);
		}
		let index = match end {
			ListEnd::Head => {
				let index = meta.head;
				meta.head += 1;
				index
			}
			ListEnd::Tail => {
				meta.tail -= 1;
				meta.tail
			}
		};
		let element_key = ListElementKey::new(key.clone(), index).encode();
		let item = self.store().get(Some(txn), &element_key).await?;
		txn.delete(element_key)?;
		meta.size -= 1;
		if meta.size == 0 {
			txn.delete(MetaKey::new(key.clone()).encode())?;
		} else {
			txn.put(MetaKey::new(key.clone()).encode(), meta.encode())?;
		}
		scope.commit_if_local()?;
		Ok(item)
	}

	pub async fn llen(&self, txn: Option<&Transaction>, key: &Bytes) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let meta = self.list_meta(txn, key).await?;
		scope.commit_if_local()?;
		Ok(meta.size as i64)
	}

	/// Element at `index`, with negative indexes counting from the tail.
	pub async fn lindex(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		index: i64,
	) -> Result<Option<Bytes>> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let meta = self.list_meta(txn, key).await?;
		let size = meta.size as i64;
		let index = if index < 0 { index + size } else { index };
		if index < 0 || index >= size {
			scope.commit_if_local()?;
			return Ok(None);
		}
		let element_key = ListElementKey::new(key.clone(), meta.head + index as u64).encode();
		let item = self.store().get(Some(txn), &element_key).await?;
		scope.commit_if_local()?;
		Ok(item)
	}

	/// The contiguous slice `[start, stop]` after Redis index
	/// normalization, batch-read in order.
	pub async fn lrange(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		start: i64,
		stop: i64,
	) -> Result<Vec<Bytes>> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let meta = self.list_meta(txn, key).await?;
		let size = meta.size as i64;
		let Some((start, stop)) = normalize_range(start, stop, size) else {
			scope.commit_if_local()?;
			return Ok(Vec::new());
		};
		let keys: Vec<Bytes> = (start..=stop)
			.map(|i| ListElementKey::new(key.clone(), meta.head + i as u64).encode())
			.collect();
		let found = self.store().mget(Some(txn), &keys).await?;
		let mut items = Vec::with_capacity(keys.len());
		for element_key in &keys {
			let item = found
				.get(element_key)
				.cloned()
				.ok_or(StorageError::InvalidMeta)?;
			items.push(item);
		}
		scope.commit_if_local()?;
		Ok(items)
	}

	/// Overwrite the element at `index`; out-of-bounds is an error.
	pub async fn lset(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		index: i64,
		value: Bytes,
	) -> Result<()> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let meta = self.list_meta(txn, key).await?;
		let size = meta.size as i64;
		let index = if index < 0 { index + size } else { index };
		if index < 0 || index >= size {
			return Err(StorageError::OutOfRange);
		}
		txn.put(
			ListElementKey::new(key.clone(), meta.head + index as u64).encode(),
			value,
		)?;
		scope.commit_if_local()?;
		Ok(())
	}

	/// Keep only `[start, stop]`; an empty range removes the list entirely.
	pub async fn ltrim(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		start: i64,
		stop: i64,
	) -> Result<()> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let mut meta = self.list_meta(txn, key).await?;
		if meta.size == 0 {
			scope.commit_if_local()?;
			return Ok(());
		}
		let size = meta.size as i64;
		match normalize_range(start, stop, size) {
			None => {
				self.clear_list(txn, key).await?;
				txn.delete(MetaKey::new(key.clone()).encode())?;
			}
			Some((start, stop)) => {
				let new_head = meta.head + start as u64;
				let new_tail = meta.head + stop as u64 + 1;
				for index in meta.head..new_head {
					txn.delete(ListElementKey::new(key.clone(), index).encode())?;
				}
				for index in new_tail..meta.tail {
					txn.delete(ListElementKey::new(key.clone(), index).encode())?;
				}
				meta.head = new_head;
				meta.tail = new_tail;
				meta.size = (stop - start + 1) as u64;
				txn.put(MetaKey::new(key.clone()).encode(), meta.encode())?;
			}
		}
		scope.commit_if_local()?;
		Ok(())
	}

	/// Drop every element row of a list; the caller owns the meta row.
	pub(crate) async fn clear_list(&self, txn: &Transaction, key: &Bytes) -> Result<u64> {
		let meta = self.list_meta(txn, key).await?;
		for index in meta.head..meta.tail {
			txn.delete(ListElementKey::new(key.clone(), index).encode())?;
		}
		Ok(meta.size)
	}
}

/// Redis range-index normalization, shared with ZRANGE: negative indexes
/// count from the tail, then both are clamped to `[0, size)`. `None` means
/// an empty range.
pub(crate) fn normalize_range(start: i64, stop: i64, size: i64) -> Option<(i64, i64)> {
	if size == 0 {
		return None;
	}
	let start = if start < 0 { (start + size).max(0) } else { start };
	let stop = if stop < 0 { stop + size } else { stop };
	if start >= size || stop < 0 || start > stop {
		return None;
	}
	Some((start, stop.min(size - 1)))
}

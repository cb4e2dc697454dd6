use std::collections::HashMap;
use std::ops::Bound;

use bytes::Bytes;

use txnkv::Transaction;

use crate::error::Result;
use crate::error::StorageError;

/// Thin capability wrapper over the transactional ordered KV store.
///
/// Every operation takes `Option<&Transaction>`: with `Some`, it runs inside
/// the caller's transaction; with `None`, reads go through a max-version
/// snapshot and writes open and commit a private transaction. "Not found" is
/// an absence, never an error.
#[derive(Clone, Default)]
pub struct Store {
	kv: txnkv::Store,
}

impl Store {
	pub fn new(kv: txnkv::Store) -> Self {
		Self { kv }
	}

	/// Fresh in-process store.
	pub fn memory() -> Self {
		Self::new(txnkv::Store::new())
	}

	pub fn new_txn(&self) -> Transaction {
		self.kv.begin()
	}

	fn scan(
		&self,
		txn: Option<&Transaction>,
		start: Bound<Bytes>,
		end: Bound<Bytes>,
		limit: usize,
	) -> Vec<(Bytes, Bytes)> {
		match txn {
			Some(txn) => txn.scan(start, end, limit),
			None => self.kv.snapshot().scan(start, end, limit),
		}
	}

	pub async fn get(&self, txn: Option<&Transaction>, key: &[u8]) -> Result<Option<Bytes>> {
		match txn {
			Some(txn) => Ok(txn.get(key)),
			None => Ok(self.kv.snapshot().get(key)),
		}
	}

	pub async fn set(&self, txn: Option<&Transaction>, key: Bytes, value: Bytes) -> Result<()> {
		match txn {
			Some(txn) => {
				txn.put(key, value)?;
				Ok(())
			}
			None => {
				let txn = self.kv.begin();
				txn.put(key, value)?;
				txn.commit()?;
				Ok(())
			}
		}
	}

	/// Point reads for many keys; absent keys are simply missing from the
	/// returned map.
	pub async fn mget(
		&self,
		txn: Option<&Transaction>,
		keys: &[Bytes],
	) -> Result<HashMap<Bytes, Bytes>> {
		let values = match txn {
			Some(txn) => txn.batch_get(keys),
			None => {
				let snapshot = self.kv.snapshot();
				keys.iter().map(|key| snapshot.get(key)).collect()
			}
		};
		let mut out = HashMap::with_capacity(keys.len());
		for (key, value) in keys.iter().zip(values) {
			if let Some(value) = value {
				out.insert(key.clone(), value);
			}
		}
		Ok(out)
	}

	pub async fn mset(
		&self,
		txn: Option<&Transaction>,
		pairs: Vec<(Bytes, Bytes)>,
	) -> Result<usize> {
		let count = pairs.len();
		match txn {
			Some(txn) => {
				for (key, value) in pairs {
					txn.put(key, value)?;
				}
			}
			None => {
				let txn = self.kv.begin();
				for (key, value) in pairs {
					txn.put(key, value)?;
				}
				txn.commit()?;
			}
		}
		Ok(count)
	}

	/// Delete raw keys inside `txn`, returning how many were present.
	pub async fn delete_with_txn(&self, txn: &Transaction, keys: &[Bytes]) -> Result<u64> {
		let mut deleted = 0;
		for key in keys {
			if txn.get(key).is_some() {
				deleted += 1;
			}
			txn.delete(key.clone())?;
		}
		Ok(deleted)
	}

	/// Key-only range iteration with selectable endpoints.
	///
	/// `with_start`/`with_end` choose whether rows exactly at the bounds are
	/// included; `end == None` leaves the range open; `limit == 0` means
	/// unbounded; with `count_only` no keys are materialized and only the
	/// count is returned.
	#[allow(clippy::too_many_arguments)]
	pub async fn get_range_keys(
		&self,
		txn: Option<&Transaction>,
		start: Bytes,
		with_start: bool,
		end: Option<Bytes>,
		with_end: bool,
		offset: u64,
		limit: u64,
		count_only: bool,
	) -> Result<(Vec<Bytes>, u64)> {
		let start_bound = if with_start {
			Bound::Included(start)
		} else {
			Bound::Excluded(start)
		};
		let end_bound = match end {
			None => Bound::Unbounded,
			Some(end) if with_end => Bound::Included(end),
			Some(end) => Bound::Excluded(end),
		};
		let scan_limit = if limit == 0 {
			0
		} else {
			offset.saturating_add(limit) as usize
		};
		let rows = self.scan(txn, start_bound, end_bound, scan_limit);
		let take = if limit == 0 { usize::MAX } else { limit as usize };

		let mut keys = Vec::new();
		let mut count = 0;
		for (key, _) in rows.into_iter().skip(offset as usize).take(take) {
			if count_only {
				count += 1;
			} else {
				keys.push(key);
			}
		}
		Ok((keys, count))
	}

	/// Range iteration returning values, optionally interleaved with their
	/// keys. Both endpoints are inclusive; `limit == 0` means unbounded.
	pub async fn get_range_keys_values(
		&self,
		txn: Option<&Transaction>,
		start: Bytes,
		end: Option<Bytes>,
		limit: u64,
		with_keys: bool,
	) -> Result<Vec<Bytes>> {
		let end_bound = match end {
			None => Bound::Unbounded,
			Some(end) => Bound::Included(end),
		};
		let rows = self.scan(txn, Bound::Included(start), end_bound, limit as usize);
		let mut out = Vec::with_capacity(if with_keys { rows.len() * 2 } else { rows.len() });
		for (key, value) in rows {
			if with_keys {
				out.push(key);
			}
			out.push(value);
		}
		Ok(out)
	}

	/// Delete every row in the inclusive range, up to `limit` rows
	/// (`limit == 0` means unbounded). Returns the number deleted.
	pub async fn delete_range_with_txn(
		&self,
		txn: &Transaction,
		start: Bytes,
		end: Option<Bytes>,
		limit: u64,
	) -> Result<u64> {
		let end_bound = match end {
			None => Bound::Unbounded,
			Some(end) => Bound::Included(end),
		};
		let rows = txn.scan(Bound::Included(start), end_bound, limit as usize);
		let mut deleted = 0;
		for (key, _) in rows {
			txn.delete(key)?;
			deleted += 1;
		}
		Ok(deleted)
	}

	/// Decimal read-modify-write: missing keys count from zero, a
	/// non-integer payload or an overflowing step is `NotInteger`.
	pub async fn incr(&self, txn: Option<&Transaction>, key: Bytes, step: i64) -> Result<i64> {
		match txn {
			Some(txn) => self.incr_in(txn, key, step),
			None => {
				let txn = self.kv.begin();
				let value = self.incr_in(&txn, key, step)?;
				txn.commit()?;
				Ok(value)
			}
		}
	}

	fn incr_in(&self, txn: &Transaction, key: Bytes, step: i64) -> Result<i64> {
		let old = match txn.get(&key) {
			Some(raw) => parse_decimal(&raw)?,
			None => 0,
		};
		let new = old.checked_add(step).ok_or(StorageError::NotInteger)?;
		txn.put(key, Bytes::from(new.to_string()))?;
		Ok(new)
	}
}

pub(crate) fn parse_decimal(raw: &[u8]) -> Result<i64> {
	std::str::from_utf8(raw)
		.ok()
		.and_then(|s| s.parse::<i64>().ok())
		.ok_or(StorageError::NotInteger)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bytes(s: &str) -> Bytes {
		Bytes::copy_from_slice(s.as_bytes())
	}

	async fn seeded_store(keys: &[&str]) -> Store {
		let store = Store::memory();
		let txn = store.new_txn();
		for key in keys {
			txn.put(bytes(key), bytes("v")).unwrap();
		}
		txn.commit().unwrap();
		store
	}

	#[tokio::test]
	async fn test_get_range_keys_bounds() {
		let store = seeded_store(&["a", "b", "c", "d"]).await;
		let (keys, _) = store
			.get_range_keys(None, bytes("a"), true, Some(bytes("c")), true, 0, 0, false)
			.await
			.unwrap();
		assert_eq!(keys, vec![bytes("a"), bytes("b"), bytes("c")]);

		let (keys, _) = store
			.get_range_keys(None, bytes("a"), false, Some(bytes("c")), false, 0, 0, false)
			.await
			.unwrap();
		assert_eq!(keys, vec![bytes("b")]);
	}

	#[tokio::test]
	async fn test_get_range_keys_offset_limit() {
		let store = seeded_store(&["a", "b", "c", "d", "e"]).await;
		let (keys, _) = store
			.get_range_keys(None, bytes("a"), true, None, true, 1, 2, false)
			.await
			.unwrap();
		assert_eq!(keys, vec![bytes("b"), bytes("c")]);
	}

	#[tokio::test]
	async fn test_get_range_keys_count_only() {
		let store = seeded_store(&["a", "b", "c"]).await;
		let (keys, count) = store
			.get_range_keys(None, bytes("a"), true, None, true, 0, 0, true)
			.await
			.unwrap();
		assert!(keys.is_empty());
		assert_eq!(count, 3);
	}

	#[tokio::test]
	async fn test_get_range_keys_values_interleaved() {
		let store = Store::memory();
		let txn = store.new_txn();
		txn.put(bytes("a"), bytes("1")).unwrap();
		txn.put(bytes("b"), bytes("2")).unwrap();
		txn.commit().unwrap();

		let interleaved = store
			.get_range_keys_values(None, bytes("a"), None, 0, true)
			.await
			.unwrap();
		assert_eq!(interleaved, vec![bytes("a"), bytes("1"), bytes("b"), bytes("2")]);

		let values = store
			.get_range_keys_values(None, bytes("a"), None, 0, false)
			.await
			.unwrap();
		assert_eq!(values, vec![bytes("1"), bytes("2")]);
	}

	#[tokio::test]
	async fn test_delete_range_respects_limit() {
		let store = seeded_store(&["a", "b", "c", "d"]).await;
		let txn = store.new_txn();
		let deleted = store
			.delete_range_with_txn(&txn, bytes("a"), None, 2)
			.await
			.unwrap();
		txn.commit().unwrap();
		assert_eq!(deleted, 2);
		assert_eq!(store.get(None, b"a").await.unwrap(), None);
		assert!(store.get(None, b"c").await.unwrap().is_some());
	}

	#[tokio::test]
	async fn test_incr_from_missing_and_existing() {
		let store = Store::memory();
		assert_eq!(store.incr(None, bytes("n"), 5).await.unwrap(), 5);
		assert_eq!(store.incr(None, bytes("n"), -2).await.unwrap(), 3);
		assert_eq!(store.get(None, b"n").await.unwrap(), Some(bytes("3")));
	}

	#[tokio::test]
	async fn test_incr_rejects_non_integer() {
		let store = Store::memory();
		store.set(None, bytes("s"), bytes("abc")).await.unwrap();
		assert!(matches!(
			store.incr(None, bytes("s"), 1).await,
			Err(StorageError::NotInteger)
		));
	}

	#[tokio::test]
	async fn test_mget_mset() {
		let store = Store::memory();
		let written = store
			.mset(None, vec![(bytes("a"), bytes("1")), (bytes("b"), bytes("2"))])
			.await
			.unwrap();
		assert_eq!(written, 2);

		let map = store
			.mget(None, &[bytes("a"), bytes("missing"), bytes("b")])
			.await
			.unwrap();
		assert_eq!(map.len(), 2);
		assert_eq!(map.get(&bytes("a")), Some(&bytes("1")));
		assert_eq!(map.get(&bytes("missing")), None);
	}
}

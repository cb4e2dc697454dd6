use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Mutex;

use bytes::Bytes;

use crate::error::KvError;
use crate::error::Result;
use crate::store::Store;

/// An optimistic transaction: reads at a fixed snapshot, writes buffered
/// until [`commit`](Transaction::commit). Owned handle, usable through
/// `&self`; dropping an unfinished transaction rolls it back.
pub struct Transaction {
	store: Store,
	start_ts: u64,
	state: Mutex<State>,
}

struct State {
	writes: BTreeMap<Bytes, Option<Bytes>>,
	finished: bool,
}

impl Transaction {
	pub(crate) fn new(store: Store, start_ts: u64) -> Self {
		Self {
			store,
			start_ts,
			state: Mutex::new(State {
				writes: BTreeMap::new(),
				finished: false,
			}),
		}
	}

	/// Read a key: the transaction's own write if any, else the snapshot.
	pub fn get(&self, key: &[u8]) -> Option<Bytes> {
		{
			let state = self.state.lock().expect("poisoned lock");
			if let Some(value) = state.writes.get(key) {
				return value.clone();
			}
		}
		self.store.read_at(key, self.start_ts)
	}

	/// Point reads for many keys, in input order.
	pub fn batch_get(&self, keys: &[Bytes]) -> Vec<Option<Bytes>> {
		keys.iter().map(|key| self.get(key)).collect()
	}

	pub fn put(&self, key: impl Into<Bytes>, value: impl Into<Bytes>) -> Result<()> {
		let mut state = self.state.lock().expect("poisoned lock");
		if state.finished {
			return Err(KvError::Finished);
		}
		state.writes.insert(key.into(), Some(value.into()));
		Ok(())
	}

	pub fn delete(&self, key: impl Into<Bytes>) -> Result<()> {
		let mut state = self.state.lock().expect("poisoned lock");
		if state.finished {
			return Err(KvError::Finished);
		}
		state.writes.insert(key.into(), None);
		Ok(())
	}

	/// Ordered scan merging the transaction's buffered writes over the
	/// snapshot. Tombstoned keys disappear; `limit == 0` means unbounded.
	pub fn scan(&self, start: Bound<Bytes>, end: Bound<Bytes>, limit: usize) -> Vec<(Bytes, Bytes)> {
		if crate::store::is_empty_range(&start, &end) {
			return Vec::new();
		}
		let writes: Vec<(Bytes, Option<Bytes>)> = {
			let state = self.state.lock().expect("poisoned lock");
			state
				.writes
				.range((start.clone(), end.clone()))
				.map(|(k, v)| (k.clone(), v.clone()))
				.collect()
		};
		// Buffered writes can hide at most `writes.len()` committed rows, so
		// fetching that many extra keeps a bounded scan exact.
		let committed_limit = if limit == 0 { 0 } else { limit + writes.len() };
		let committed = self.store.scan_at(start, end, self.start_ts, committed_limit);

		let mut out = Vec::new();
		let mut ci = committed.into_iter().peekable();
		let mut wi = writes.into_iter().peekable();
		while limit == 0 || out.len() < limit {
			// Which side carries the next key: committed, buffered, or both
			// (a buffered overwrite shadows the committed row).
			let from_committed = match (ci.peek(), wi.peek()) {
				(Some((ck, _)), Some((wk, _))) => match ck.cmp(wk) {
					std::cmp::Ordering::Less => true,
					std::cmp::Ordering::Greater => false,
					std::cmp::Ordering::Equal => {
						ci.next();
						false
					}
				},
				(Some(_), None) => true,
				(None, Some(_)) => false,
				(None, None) => break,
			};
			if from_committed {
				if let Some((key, value)) = ci.next() {
					out.push((key, value));
				}
			} else if let Some((key, Some(value))) = wi.next() {
				out.push((key, value));
			}
		}
		out
	}

	/// Validate and apply the write set. Fails with [`KvError::Conflict`]
	/// when another transaction committed to any written key after this
	/// transaction began; the transaction is finished either way.
	pub fn commit(&self) -> Result<()> {
		let mut state = self.state.lock().expect("poisoned lock");
		if state.finished {
			return Err(KvError::Finished);
		}
		state.finished = true;
		let result = if state.writes.is_empty() {
			Ok(0)
		} else {
			self.store.commit_writes(self.start_ts, &state.writes)
		};
		self.store.unregister(self.start_ts);
		result.map(|_| ())
	}

	/// Discard buffered writes. Idempotent.
	pub fn rollback(&self) {
		let mut state = self.state.lock().expect("poisoned lock");
		if state.finished {
			return;
		}
		state.finished = true;
		state.writes.clear();
		self.store.unregister(self.start_ts);
	}
}

impl Drop for Transaction {
	fn drop(&mut self) {
		self.rollback();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_txn_reads_own_writes() {
		let store = Store::new();
		let txn = store.begin();
		txn.put(Bytes::from("k"), Bytes::from("v")).unwrap();
		assert_eq!(txn.get(b"k"), Some(Bytes::from("v")));
		txn.delete(Bytes::from("k")).unwrap();
		assert_eq!(txn.get(b"k"), None);
	}

	#[test]
	fn test_snapshot_isolation() {
		let store = Store::new();
		let setup = store.begin();
		setup.put(Bytes::from("k"), Bytes::from("old")).unwrap();
		setup.commit().unwrap();

		let reader = store.begin();
		let writer = store.begin();
		writer.put(Bytes::from("k"), Bytes::from("new")).unwrap();
		writer.commit().unwrap();

		// Reader still sees the snapshot it started from.
		assert_eq!(reader.get(b"k"), Some(Bytes::from("old")));
		reader.rollback();
		assert_eq!(store.snapshot().get(b"k"), Some(Bytes::from("new")));
	}

	#[test]
	fn test_write_conflict_first_committer_wins() {
		let store = Store::new();
		let a = store.begin();
		let b = store.begin();
		a.put(Bytes::from("k"), Bytes::from("a")).unwrap();
		b.put(Bytes::from("k"), Bytes::from("b")).unwrap();
		a.commit().unwrap();
		assert_eq!(b.commit(), Err(KvError::Conflict));
		assert_eq!(store.snapshot().get(b"k"), Some(Bytes::from("a")));
	}

	#[test]
	fn test_disjoint_writes_do_not_conflict() {
		let store = Store::new();
		let a = store.begin();
		let b = store.begin();
		a.put(Bytes::from("x"), Bytes::from("1")).unwrap();
		b.put(Bytes::from("y"), Bytes::from("2")).unwrap();
		a.commit().unwrap();
		b.commit().unwrap();
		assert_eq!(store.snapshot().get(b"x"), Some(Bytes::from("1")));
		assert_eq!(store.snapshot().get(b"y"), Some(Bytes::from("2")));
	}

	#[test]
	fn test_scan_merges_buffered_writes() {
		let store = Store::new();
		let setup = store.begin();
		setup.put(Bytes::from("a"), Bytes::from("1")).unwrap();
		setup.put(Bytes::from("c"), Bytes::from("3")).unwrap();
		setup.commit().unwrap();

		let txn = store.begin();
		txn.put(Bytes::from("b"), Bytes::from("2")).unwrap();
		txn.delete(Bytes::from("c")).unwrap();

		let rows = txn.scan(Bound::Unbounded, Bound::Unbounded, 0);
		let keys: Vec<_> = rows.iter().map(|(k, _)| k.clone()).collect();
		assert_eq!(keys, vec![Bytes::from("a"), Bytes::from("b")]);
	}

	#[test]
	fn test_inverted_range_scans_empty() {
		let store = Store::new();
		let setup = store.begin();
		setup.put(Bytes::from("a"), Bytes::from("1")).unwrap();
		setup.commit().unwrap();

		let txn = store.begin();
		let rows = txn.scan(
			Bound::Included(Bytes::from("z")),
			Bound::Excluded(Bytes::from("a")),
			0,
		);
		assert!(rows.is_empty());
		let rows = txn.scan(
			Bound::Excluded(Bytes::from("a")),
			Bound::Excluded(Bytes::from("a")),
			0,
		);
		assert!(rows.is_empty());
	}

	#[test]
	fn test_rollback_discards_writes() {
		let store = Store::new();
		let txn = store.begin();
		txn.put(Bytes::from("k"), Bytes::from("v")).unwrap();
		txn.rollback();
		assert_eq!(store.snapshot().get(b"k"), None);
		assert_eq!(txn.commit(), Err(KvError::Finished));
	}

	#[test]
	fn test_commit_after_commit_fails() {
		let store = Store::new();
		let txn = store.begin();
		txn.put(Bytes::from("k"), Bytes::from("v")).unwrap();
		txn.commit().unwrap();
		assert_eq!(txn.commit(), Err(KvError::Finished));
	}
}

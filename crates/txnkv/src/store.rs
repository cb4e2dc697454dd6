use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use bytes::Bytes;

use crate::error::KvError;
use crate::error::Result;
use crate::txn::Transaction;

/// One committed version of a key. `value == None` is a tombstone.
#[derive(Debug, Clone)]
pub(crate) struct Version {
	pub(crate) ts: u64,
	pub(crate) value: Option<Bytes>,
}

/// Shared ordered MVCC store. Cheap to clone.
#[derive(Clone, Default)]
pub struct Store {
	inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
	/// Version chains in ascending commit-timestamp order.
	chains: RwLock<BTreeMap<Bytes, Vec<Version>>>,
	last_commit_ts: AtomicU64,
	/// Serializes commit validation and apply.
	commit_lock: Mutex<()>,
	/// Refcounted start timestamps of live transactions, for version pruning.
	active: Mutex<BTreeMap<u64, usize>>,
}

impl Store {
	pub fn new() -> Self {
		Self::default()
	}

	/// Begin a transaction reading at the current max committed timestamp.
	pub fn begin(&self) -> Transaction {
		let start_ts = self.inner.last_commit_ts.load(Ordering::SeqCst);
		self.register(start_ts);
		Transaction::new(self.clone(), start_ts)
	}

	/// Read-only view at the max committed version.
	pub fn snapshot(&self) -> Snapshot {
		Snapshot {
			store: self.clone(),
			ts: u64::MAX,
		}
	}

	fn visible(chain: &[Version], ts: u64) -> Option<Bytes> {
		chain
			.iter()
			.rev()
			.find(|v| v.ts <= ts)
			.and_then(|v| v.value.clone())
	}

	pub(crate) fn read_at(&self, key: &[u8], ts: u64) -> Option<Bytes> {
		let chains = self.inner.chains.read().expect("poisoned lock");
		chains.get(key).and_then(|chain| Self::visible(chain, ts))
	}

	/// Ordered scan of committed versions visible at `ts`.
	/// `limit == 0` means unbounded.
	pub(crate) fn scan_at(
		&self,
		start: Bound<Bytes>,
		end: Bound<Bytes>,
		ts: u64,
		limit: usize,
	) -> Vec<(Bytes, Bytes)> {
		if is_empty_range(&start, &end) {
			return Vec::new();
		}
		let chains = self.inner.chains.read().expect("poisoned lock");
		let mut out = Vec::new();
		for (key, chain) in chains.range((start, end)) {
			if limit != 0 && out.len() == limit {
				break;
			}
			if let Some(value) = Self::visible(chain, ts) {
				out.push((key.clone(), value));
			}
		}
		out
	}

	/// Validate the write set against `start_ts` and apply it at one new
	/// commit timestamp. First committer wins.
	pub(crate) fn commit_writes(
		&self,
		start_ts: u64,
		writes: &BTreeMap<Bytes, Option<Bytes>>,
	) -> Result<u64> {
		let _guard = self.inner.commit_lock.lock().expect("poisoned lock");
		{
			let chains = self.inner.chains.read().expect("poisoned lock");
			for key in writes.keys() {
				if let Some(last) = chains.get(key).and_then(|chain| chain.last())
					&& last.ts > start_ts
				{
					return Err(KvError::Conflict);
				}
			}
		}
		let commit_ts = self.inner.last_commit_ts.fetch_add(1, Ordering::SeqCst) + 1;
		let min_active = self.min_active_ts(commit_ts);
		let mut chains = self.inner.chains.write().expect("poisoned lock");
		for (key, value) in writes {
			let chain = chains.entry(key.clone()).or_default();
			chain.push(Version {
				ts: commit_ts,
				value: value.clone(),
			});
			Self::prune(chain, min_active);
			let dead =
				chain.len() == 1 && chain[0].value.is_none() && chain[0].ts <= min_active;
			if dead {
				chains.remove(key);
			}
		}
		Ok(commit_ts)
	}

	/// Drop versions no live transaction can still read: everything older
	/// than the newest version at or below `min_active`.
	fn prune(chain: &mut Vec<Version>, min_active: u64) {
		if let Some(idx) = chain.iter().rposition(|v| v.ts <= min_active)
			&& idx > 0
		{
			chain.drain(..idx);
		}
	}

	fn min_active_ts(&self, fallback: u64) -> u64 {
		let active = self.inner.active.lock().expect("poisoned lock");
		active.keys().next().copied().unwrap_or(fallback)
	}

	pub(crate) fn register(&self, ts: u64) {
		let mut active = self.inner.active.lock().expect("poisoned lock");
		*active.entry(ts).or_insert(0) += 1;
	}

	pub(crate) fn unregister(&self, ts: u64) {
		let mut active = self.inner.active.lock().expect("poisoned lock");
		if let Some(count) = active.get_mut(&ts) {
			*count -= 1;
			if *count == 0 {
				active.remove(&ts);
			}
		}
	}
}

/// `BTreeMap::range` panics on inverted bounds; callers hand us
/// client-derived ranges, so an inverted range is just an empty one.
pub(crate) fn is_empty_range(start: &Bound<Bytes>, end: &Bound<Bytes>) -> bool {
	match (start, end) {
		(Bound::Excluded(s), Bound::Excluded(e)) => s >= e,
		(Bound::Included(s) | Bound::Excluded(s), Bound::Included(e) | Bound::Excluded(e)) => s > e,
		_ => false,
	}
}

/// Read-only view of the store at a fixed timestamp.
pub struct Snapshot {
	store: Store,
	ts: u64,
}

impl Snapshot {
	pub fn get(&self, key: &[u8]) -> Option<Bytes> {
		self.store.read_at(key, self.ts)
	}

	/// `limit == 0` means unbounded.
	pub fn scan(&self, start: Bound<Bytes>, end: Bound<Bytes>, limit: usize) -> Vec<(Bytes, Bytes)> {
		self.store.scan_at(start, end, self.ts, limit)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_snapshot_reads_latest_commit() {
		let store = Store::new();
		let txn = store.begin();
		txn.put(Bytes::from("k"), Bytes::from("v1")).unwrap();
		txn.commit().unwrap();

		assert_eq!(store.snapshot().get(b"k"), Some(Bytes::from("v1")));

		let txn = store.begin();
		txn.put(Bytes::from("k"), Bytes::from("v2")).unwrap();
		txn.commit().unwrap();

		assert_eq!(store.snapshot().get(b"k"), Some(Bytes::from("v2")));
	}

	#[test]
	fn test_tombstone_hides_key() {
		let store = Store::new();
		let txn = store.begin();
		txn.put(Bytes::from("k"), Bytes::from("v")).unwrap();
		txn.commit().unwrap();

		let txn = store.begin();
		txn.delete(Bytes::from("k")).unwrap();
		txn.commit().unwrap();

		assert_eq!(store.snapshot().get(b"k"), None);
		assert!(
			store
				.snapshot()
				.scan(Bound::Unbounded, Bound::Unbounded, 0)
				.is_empty()
		);
	}

	#[test]
	fn test_scan_respects_bounds_and_limit() {
		let store = Store::new();
		let txn = store.begin();
		for k in ["a", "b", "c", "d"] {
			txn.put(Bytes::from(k), Bytes::from(k)).unwrap();
		}
		txn.commit().unwrap();

		let snap = store.snapshot();
		let all = snap.scan(
			Bound::Included(Bytes::from("b")),
			Bound::Excluded(Bytes::from("d")),
			0,
		);
		assert_eq!(all.len(), 2);
		assert_eq!(all[0].0, Bytes::from("b"));
		assert_eq!(all[1].0, Bytes::from("c"));

		let limited = snap.scan(Bound::Unbounded, Bound::Unbounded, 3);
		assert_eq!(limited.len(), 3);
	}
}

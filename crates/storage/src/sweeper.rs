use std::time::Duration;

use tracing::debug;
use tracing::warn;

use crate::error::Result;
use crate::expire::keys::ExpireKey;
use crate::expire::keys::TtlKey;
use crate::storage::Storage;

/// Background task walking the time-ordered EXPIRE index and deleting due
/// keys in bounded batches. Commits optimistically: a foreground writer that
/// extends a TTL wins the race and the tick's batch is abandoned, to be
/// retried on the next tick.
pub struct TtlSweeper {
	storage: Storage,
	max_loops: u64,
	interval: Duration,
}

impl TtlSweeper {
	pub fn new(storage: Storage, max_loops: u64, interval_ms: u64) -> Self {
		Self {
			storage,
			max_loops,
			interval: Duration::from_millis(interval_ms),
		}
	}

	pub fn spawn(self) -> tokio::task::JoinHandle<()> {
		tokio::spawn(async move {
			loop {
				tokio::time::sleep(self.interval).await;
				match self.sweep_once().await {
					Ok(0) => {}
					Ok(cleaned) => debug!(cleaned, "ttl sweeper removed expired keys"),
					Err(e) => warn!(error = %e, "ttl sweeper tick abandoned"),
				}
			}
		})
	}

	/// One bounded tick: scan due EXPIRE rows, delete each row pair and the
	/// owning key's payload, commit. Returns how many keys were removed.
	pub async fn sweep_once(&self) -> Result<usize> {
		let txn = self.storage.new_txn();
		let now = Storage::now_ms();
		let (rows, _) = self
			.storage
			.store()
			.get_range_keys(
				Some(&txn),
				ExpireKey::range_start(),
				true,
				Some(ExpireKey::range_end()),
				true,
				0,
				self.max_loops,
				false,
			)
			.await?;

		let mut cleaned = 0;
		for raw in &rows {
			let expire = ExpireKey::decode(raw)?;
			if expire.expire_ms() > now {
				// The index is time-ordered; the rest is in the future.
				break;
			}
			let key = expire.user_key().clone();
			txn.delete(raw.clone())?;
			let ttl_key = TtlKey::new(key.clone()).encode();
			match self.storage.store().get(Some(&txn), &ttl_key).await? {
				Some(value) if TtlKey::decode_value(&value)? == expire.expire_ms() => {
					self.storage
						.delete_with_txn(&txn, std::slice::from_ref(&key))
						.await?;
					cleaned += 1;
				}
				// The TTL row points elsewhere: the key's expiry was
				// rewritten after this index row was laid down. Only the
				// stale index row goes.
				_ => {}
			}
		}
		txn.commit()?;
		Ok(cleaned)
	}
}

#[cfg(test)]
mod tests {
	use bytes::Bytes;

	use super::*;

	fn bytes(s: &str) -> Bytes {
		Bytes::copy_from_slice(s.as_bytes())
	}

	fn sweeper(storage: &Storage) -> TtlSweeper {
		TtlSweeper::new(storage.clone(), 1000, 10)
	}

	async fn expire_row_count(storage: &Storage) -> usize {
		storage
			.store()
			.get_range_keys(
				None,
				ExpireKey::range_start(),
				true,
				Some(ExpireKey::range_end()),
				true,
				0,
				0,
				false,
			)
			.await
			.unwrap()
			.0
			.len()
	}

	#[tokio::test]
	async fn test_sweep_removes_due_string_key() {
		let storage = Storage::memory();
		storage.set(None, &bytes("k"), bytes("v")).await.unwrap();
		storage.pexpire_at(None, &bytes("k"), 1).await.unwrap();

		let cleaned = sweeper(&storage).sweep_once().await.unwrap();
		assert_eq!(cleaned, 1);
		assert_eq!(storage.get(None, &bytes("k")).await.unwrap(), None);
		assert_eq!(storage.pttl(None, &bytes("k")).await.unwrap(), -2);
		assert_eq!(expire_row_count(&storage).await, 0);
	}

	#[tokio::test]
	async fn test_sweep_clears_container_payload() {
		let storage = Storage::memory();
		storage
			.sadd(None, &bytes("s"), &[bytes("a"), bytes("b")])
			.await
			.unwrap();
		storage.pexpire_at(None, &bytes("s"), 1).await.unwrap();

		let cleaned = sweeper(&storage).sweep_once().await.unwrap();
		assert_eq!(cleaned, 1);
		assert_eq!(storage.scard(None, &bytes("s")).await.unwrap(), 0);
		assert!(storage.smembers(None, &bytes("s")).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_sweep_leaves_future_expiries() {
		let storage = Storage::memory();
		storage.set(None, &bytes("k"), bytes("v")).await.unwrap();
		storage.expire(None, &bytes("k"), 3600).await.unwrap();

		let cleaned = sweeper(&storage).sweep_once().await.unwrap();
		assert_eq!(cleaned, 0);
		assert_eq!(storage.get(None, &bytes("k")).await.unwrap(), Some(bytes("v")));
		assert_eq!(expire_row_count(&storage).await, 1);
	}

	#[tokio::test]
	async fn test_sweep_skips_stale_index_row_after_extension() {
		let storage = Storage::memory();
		storage.set(None, &bytes("k"), bytes("v")).await.unwrap();
		storage.expire(None, &bytes("k"), 3600).await.unwrap();

		// A stale index row from an earlier, since-rewritten expiry.
		let txn = storage.new_txn();
		txn.put(ExpireKey::new(1, bytes("k")).encode(), Bytes::from_static(&[0]))
			.unwrap();
		txn.commit().unwrap();

		let cleaned = sweeper(&storage).sweep_once().await.unwrap();
		assert_eq!(cleaned, 0);
		// The stale row is gone, the live expiry and the value survive.
		assert_eq!(expire_row_count(&storage).await, 1);
		assert_eq!(storage.get(None, &bytes("k")).await.unwrap(), Some(bytes("v")));
		assert!(storage.pttl(None, &bytes("k")).await.unwrap() > 0);
	}

	#[tokio::test]
	async fn test_sweep_batch_is_bounded() {
		let storage = Storage::memory();
		for i in 0..5i64 {
			let key = bytes(&format!("k{i}"));
			storage.set(None, &key, bytes("v")).await.unwrap();
			storage.pexpire_at(None, &key, 1 + i).await.unwrap();
		}

		let bounded = TtlSweeper::new(storage.clone(), 2, 10);
		assert_eq!(bounded.sweep_once().await.unwrap(), 2);
		assert_eq!(bounded.sweep_once().await.unwrap(), 2);
		assert_eq!(bounded.sweep_once().await.unwrap(), 1);
		assert_eq!(expire_row_count(&storage).await, 0);
	}
}

use bytes::Bytes;

use txnkv::Transaction;

use crate::error::Result;
use crate::expire::keys::ExpireKey;
use crate::expire::keys::TtlKey;
use crate::storage::Storage;
use crate::storage::check_key;

impl Storage {
	/// Remaining time to live in milliseconds: -2 when the key is missing,
	/// -1 when it has no expiry, otherwise the remainder clamped at 0.
	pub async fn pttl(&self, txn: Option<&Transaction>, key: &Bytes) -> Result<i64> {
		check_key(key)?;
		if self.read_meta(txn, key).await?.is_none() {
			return Ok(-2);
		}
		let ttl_key = TtlKey::new(key.clone()).encode();
		let Some(raw) = self.store().get(txn, &ttl_key).await? else {
			return Ok(-1);
		};
		let expire_ms = TtlKey::decode_value(&raw)?;
		let remaining = expire_ms as i64 - Self::now_ms() as i64;
		Ok(remaining.max(0))
	}

	/// [`pttl`](Storage::pttl) in seconds.
	pub async fn ttl(&self, txn: Option<&Transaction>, key: &Bytes) -> Result<i64> {
		let ttl = self.pttl(txn, key).await?;
		if ttl > 0 { Ok(ttl / 1000) } else { Ok(ttl) }
	}

	pub async fn expire(&self, txn: Option<&Transaction>, key: &Bytes, seconds: i64) -> Result<i64> {
		let at = Self::now_ms() as i64 + seconds.saturating_mul(1000);
		self.pexpire_at(txn, key, at).await
	}

	pub async fn pexpire(&self, txn: Option<&Transaction>, key: &Bytes, ms: i64) -> Result<i64> {
		let at = Self::now_ms() as i64 + ms;
		self.pexpire_at(txn, key, at).await
	}

	pub async fn expire_at(&self, txn: Option<&Transaction>, key: &Bytes, ts: i64) -> Result<i64> {
		self.pexpire_at(txn, key, ts.saturating_mul(1000)).await
	}

	/// Set the absolute expiry of a key of any type. Returns 1 on success,
	/// 0 when the key does not exist.
	pub async fn pexpire_at(&self, txn: Option<&Transaction>, key: &Bytes, ts_ms: i64) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let ret = self.pexpire_at_with(scope.txn(), key, ts_ms.max(0) as u64).await?;
		scope.commit_if_local()?;
		Ok(ret)
	}

	/// The shared expiry rewrite: drop the old EXPIRE row if any, then write
	/// the EXPIRE and TTL rows for the new timestamp in the same transaction.
	pub(crate) async fn pexpire_at_with(
		&self,
		txn: &Transaction,
		key: &Bytes,
		ts_ms: u64,
	) -> Result<i64> {
		if self.read_meta(Some(txn), key).await?.is_none() {
			return Ok(0);
		}
		let ttl_key = TtlKey::new(key.clone()).encode();
		if let Some(raw) = self.store().get(Some(txn), &ttl_key).await? {
			let old_ms = TtlKey::decode_value(&raw)?;
			txn.delete(ExpireKey::new(old_ms, key.clone()).encode())?;
		}
		txn.put(ExpireKey::new(ts_ms, key.clone()).encode(), Bytes::from_static(&[0]))?;
		txn.put(ttl_key, TtlKey::encode_value(ts_ms))?;
		Ok(1)
	}

	/// Drop both expiry rows of `key`, if it has any.
	pub(crate) async fn remove_expiry_rows(&self, txn: &Transaction, key: &Bytes) -> Result<()> {
		let ttl_key = TtlKey::new(key.clone()).encode();
		let Some(raw) = self.store().get(Some(txn), &ttl_key).await? else {
			return Ok(());
		};
		let expire_ms = TtlKey::decode_value(&raw)?;
		txn.delete(ttl_key)?;
		txn.delete(ExpireKey::new(expire_ms, key.clone()).encode())?;
		Ok(())
	}

	/// Lazy expiry hook run at the top of every container access and string
	/// mutator: when the key's expiry has lapsed, remove the expiry rows
	/// and, with `delete_value`, the payload itself.
	pub(crate) async fn delete_if_expired(
		&self,
		txn: &Transaction,
		key: &Bytes,
		delete_value: bool,
	) -> Result<()> {
		if self.pttl(Some(txn), key).await? != 0 {
			return Ok(());
		}
		self.remove_expiry_rows(txn, key).await?;
		if delete_value {
			self.delete_with_txn(txn, std::slice::from_ref(key)).await?;
		}
		Ok(())
	}
}

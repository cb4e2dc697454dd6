use bytes::Bytes;

use txnkv::Transaction;

use crate::error::Result;
use crate::error::StorageError;
use crate::meta::MetaKey;
use crate::storage::Storage;
use crate::storage::check_key;
use crate::store::parse_decimal;
use crate::string::value::StringValue;

impl Storage {
	/// Value of a string key, `None` when missing. A container meta at the
	/// key is a wrong-type access.
	pub async fn get(&self, txn: Option<&Transaction>, key: &Bytes) -> Result<Option<Bytes>> {
		check_key(key)?;
		let scope = self.scope(txn);
		self.delete_if_expired(scope.txn(), key, true).await?;
		let raw = self.read_meta(Some(scope.txn()), key).await?;
		let value = match raw {
			Some(raw) => Some(StringValue::decode(&raw)?.value),
			None => None,
		};
		scope.commit_if_local()?;
		Ok(value)
	}

	pub async fn set(&self, txn: Option<&Transaction>, key: &Bytes, value: Bytes) -> Result<()> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		// An expired key must read as absent before the type check, and its
		// lapsed expiry must not outlive the new value.
		self.delete_if_expired(txn, key, true).await?;
		if let Some(raw) = self.read_meta(Some(txn), key).await? {
			// Overwriting a container is a type error, not an implicit DEL.
			StringValue::decode(&raw)?;
		}
		self.store()
			.set(
				Some(txn),
				MetaKey::new(key.clone()).encode(),
				StringValue::new(value).encode(),
			)
			.await?;
		scope.commit_if_local()?;
		Ok(())
	}

	/// SET plus expiry, one transaction.
	pub async fn setex(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		seconds: i64,
		value: Bytes,
	) -> Result<()> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		if let Some(raw) = self.read_meta(Some(txn), key).await? {
			StringValue::decode(&raw)?;
		}
		self.store()
			.set(
				Some(txn),
				MetaKey::new(key.clone()).encode(),
				StringValue::new(value).encode(),
			)
			.await?;
		let at = Self::now_ms() as i64 + seconds.saturating_mul(1000);
		self.pexpire_at_with(txn, key, at.max(0) as u64).await?;
		scope.commit_if_local()?;
		Ok(())
	}

	/// Values of many string keys, in request order, `None` for missing.
	pub async fn mget(
		&self,
		txn: Option<&Transaction>,
		keys: &[Bytes],
	) -> Result<Vec<Option<Bytes>>> {
		if keys.is_empty() {
			return Err(StorageError::KeyEmpty);
		}
		let encoded: Vec<Bytes> = keys
			.iter()
			.map(|key| MetaKey::new(key.clone()).encode())
			.collect();
		let found = self.store().mget(txn, &encoded).await?;
		let mut out = Vec::with_capacity(keys.len());
		for encoded_key in &encoded {
			match found.get(encoded_key) {
				Some(raw) => out.push(Some(StringValue::decode(raw)?.value)),
				None => out.push(None),
			}
		}
		Ok(out)
	}

	pub async fn mset(&self, txn: Option<&Transaction>, pairs: &[(Bytes, Bytes)]) -> Result<()> {
		if pairs.is_empty() {
			return Err(StorageError::KeyEmpty);
		}
		let encoded = pairs
			.iter()
			.map(|(key, value)| {
				check_key(key)?;
				Ok((
					MetaKey::new(key.clone()).encode(),
					StringValue::new(value.clone()).encode(),
				))
			})
			.collect::<Result<Vec<_>>>()?;
		self.store().mset(txn, encoded).await?;
		Ok(())
	}

	/// Remove logical keys of any type. Returns how many existed.
	pub async fn delete(&self, txn: Option<&Transaction>, keys: &[Bytes]) -> Result<i64> {
		if keys.is_empty() {
			return Err(StorageError::KeyEmpty);
		}
		let scope = self.scope(txn);
		let txn = scope.txn();
		for key in keys {
			self.delete_if_expired(txn, key, false).await?;
		}
		let deleted = self.delete_with_txn(txn, keys).await?;
		scope.commit_if_local()?;
		Ok(deleted)
	}

	/// Add `step` to the decimal string at `key`; a missing key counts from
	/// zero, anything non-decimal is `NotInteger`.
	pub async fn incr(&self, txn: Option<&Transaction>, key: &Bytes, step: i64) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let old = match self.read_meta(Some(txn), key).await? {
			Some(raw) => parse_decimal(&StringValue::decode(&raw)?.value)?,
			None => 0,
		};
		let new = old.checked_add(step).ok_or(StorageError::NotInteger)?;
		self.store()
			.set(
				Some(txn),
				MetaKey::new(key.clone()).encode(),
				StringValue::new(Bytes::from(new.to_string())).encode(),
			)
			.await?;
		scope.commit_if_local()?;
		Ok(new)
	}

	pub async fn decr(&self, txn: Option<&Transaction>, key: &Bytes, step: i64) -> Result<i64> {
		self.incr(txn, key, -step).await
	}

	/// Byte length of a string value, 0 when missing.
	pub async fn strlen(&self, txn: Option<&Transaction>, key: &Bytes) -> Result<i64> {
		Ok(self
			.get(txn, key)
			.await?
			.map(|value| value.len() as i64)
			.unwrap_or(0))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bytes(s: &str) -> Bytes {
		Bytes::copy_from_slice(s.as_bytes())
	}

	#[tokio::test]
	async fn test_set_get_roundtrip() {
		let storage = Storage::memory();
		storage.set(None, &bytes("k"), bytes("v")).await.unwrap();
		assert_eq!(storage.get(None, &bytes("k")).await.unwrap(), Some(bytes("v")));
		assert_eq!(storage.get(None, &bytes("missing")).await.unwrap(), None);
	}

	#[tokio::test]
	async fn test_get_rejects_container_key() {
		let storage = Storage::memory();
		storage
			.sadd(None, &bytes("s"), &[bytes("m")])
			.await
			.unwrap();
		assert!(matches!(
			storage.get(None, &bytes("s")).await,
			Err(StorageError::WrongType)
		));
		assert!(matches!(
			storage.set(None, &bytes("s"), bytes("v")).await,
			Err(StorageError::WrongType)
		));
	}

	#[tokio::test]
	async fn test_empty_key_is_rejected() {
		let storage = Storage::memory();
		assert!(matches!(
			storage.get(None, &Bytes::new()).await,
			Err(StorageError::KeyEmpty)
		));
	}

	#[tokio::test]
	async fn test_incr_scenario() {
		// SET k "10"; INCR k -> 11; GET k -> "11"; TTL k -> -1
		let storage = Storage::memory();
		storage.set(None, &bytes("k"), bytes("10")).await.unwrap();
		assert_eq!(storage.incr(None, &bytes("k"), 1).await.unwrap(), 11);
		assert_eq!(storage.get(None, &bytes("k")).await.unwrap(), Some(bytes("11")));
		assert_eq!(storage.ttl(None, &bytes("k")).await.unwrap(), -1);
	}

	#[tokio::test]
	async fn test_incr_on_missing_key_counts_from_zero() {
		let storage = Storage::memory();
		assert_eq!(storage.incr(None, &bytes("n"), 5).await.unwrap(), 5);
		assert_eq!(storage.decr(None, &bytes("n"), 2).await.unwrap(), 3);
	}

	#[tokio::test]
	async fn test_incr_rejects_non_integer_value() {
		let storage = Storage::memory();
		storage.set(None, &bytes("k"), bytes("abc")).await.unwrap();
		assert!(matches!(
			storage.incr(None, &bytes("k"), 1).await,
			Err(StorageError::NotInteger)
		));
	}

	#[tokio::test]
	async fn test_mget_preserves_order_with_gaps() {
		let storage = Storage::memory();
		storage
			.mset(None, &[(bytes("a"), bytes("1")), (bytes("b"), bytes("2"))])
			.await
			.unwrap();
		let values = storage
			.mget(None, &[bytes("b"), bytes("missing"), bytes("a")])
			.await
			.unwrap();
		assert_eq!(values, vec![Some(bytes("2")), None, Some(bytes("1"))]);
	}

	#[tokio::test]
	async fn test_delete_counts_only_present_keys() {
		let storage = Storage::memory();
		storage.set(None, &bytes("a"), bytes("1")).await.unwrap();
		storage.set(None, &bytes("b"), bytes("2")).await.unwrap();
		let deleted = storage
			.delete(None, &[bytes("a"), bytes("b"), bytes("missing")])
			.await
			.unwrap();
		assert_eq!(deleted, 2);
		assert_eq!(storage.get(None, &bytes("a")).await.unwrap(), None);
	}

	#[tokio::test]
	async fn test_delete_clears_container_rows() {
		let storage = Storage::memory();
		storage
			.sadd(None, &bytes("s"), &[bytes("a"), bytes("b")])
			.await
			.unwrap();
		assert_eq!(storage.delete(None, &[bytes("s")]).await.unwrap(), 1);
		assert_eq!(storage.scard(None, &bytes("s")).await.unwrap(), 0);
		// Type is free again after DEL.
		storage.set(None, &bytes("s"), bytes("v")).await.unwrap();
	}

	#[tokio::test]
	async fn test_strlen() {
		let storage = Storage::memory();
		storage.set(None, &bytes("k"), bytes("hello")).await.unwrap();
		assert_eq!(storage.strlen(None, &bytes("k")).await.unwrap(), 5);
		assert_eq!(storage.strlen(None, &bytes("missing")).await.unwrap(), 0);
	}
}

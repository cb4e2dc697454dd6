use bytes::Bytes;

use txnkv::Transaction;

use crate::data_type::DataType;
use crate::error::Result;
use crate::error::StorageError;
use crate::hash::field_key::HashFieldKey;
use crate::meta::ContainerMeta;
use crate::meta::MetaKey;
use crate::storage::Storage;
use crate::storage::check_key;

impl Storage {
	/// Upsert one field. Returns 1 when the field is new, 0 on overwrite.
	pub async fn hset(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		field: Bytes,
		value: Bytes,
	) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let mut meta = self
			.container_meta(txn, key, DataType::Hash)
			.await?
			.unwrap_or_else(|| ContainerMeta::new(0));
		let field_key = HashFieldKey::new(key.clone(), field).encode();
		let added = i64::from(self.store().get(Some(txn), &field_key).await?.is_none());
		self.store().set(Some(txn), field_key, value).await?;
		if added > 0 {
			meta.size += added as u64;
			self.write_container_meta(txn, key, &meta, DataType::Hash).await?;
		}
		scope.commit_if_local()?;
		Ok(added)
	}

	/// Like [`hset`](Storage::hset) but a no-op when the field exists.
	pub async fn hsetnx(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		field: Bytes,
		value: Bytes,
	) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let mut meta = self
			.container_meta(txn, key, DataType::Hash)
			.await?
			.unwrap_or_else(|| ContainerMeta::new(0));
		let field_key = HashFieldKey::new(key.clone(), field).encode();
		if self.store().get(Some(txn), &field_key).await?.is_some() {
			scope.commit_if_local()?;
			return Ok(0);
		}
		self.store().set(Some(txn), field_key, value).await?;
		meta.size += 1;
		self.write_container_meta(txn, key, &meta, DataType::Hash).await?;
		scope.commit_if_local()?;
		Ok(1)
	}

	/// Upsert many fields; size grows only for new fields.
	pub async fn hmset(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		pairs: &[(Bytes, Bytes)],
	) -> Result<()> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let mut meta = self
			.container_meta(txn, key, DataType::Hash)
			.await?
			.unwrap_or_else(|| ContainerMeta::new(0));
		let mut added = 0;
		for (field, value) in pairs {
			let field_key = HashFieldKey::new(key.clone(), field.clone()).encode();
			if self.store().get(Some(txn), &field_key).await?.is_none() {
				added += 1;
			}
			self.store().set(Some(txn), field_key, value.clone()).await?;
		}
		if added > 0 {
			meta.size += added;
			self.write_container_meta(txn, key, &meta, DataType::Hash).await?;
		}
		scope.commit_if_local()?;
		Ok(())
	}

	pub async fn hget(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		field: &Bytes,
	) -> Result<Option<Bytes>> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let value = match self.container_meta(txn, key, DataType::Hash).await? {
			Some(_) => {
				let field_key = HashFieldKey::new(key.clone(), field.clone()).encode();
				self.store().get(Some(txn), &field_key).await?
			}
			None => None,
		};
		scope.commit_if_local()?;
		Ok(value)
	}

	pub async fn hexists(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		field: &Bytes,
	) -> Result<bool> {
		Ok(self.hget(txn, key, field).await?.is_some())
	}

	/// Byte length of one field's value, 0 when absent.
	pub async fn hstrlen(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		field: &Bytes,
	) -> Result<i64> {
		Ok(self
			.hget(txn, key, field)
			.await?
			.map(|value| value.len() as i64)
			.unwrap_or(0))
	}

	/// Values of many fields, in request order, `None` for absent fields.
	pub async fn hmget(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		fields: &[Bytes],
	) -> Result<Vec<Option<Bytes>>> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		if self.container_meta(txn, key, DataType::Hash).await?.is_none() {
			scope.commit_if_local()?;
			return Ok(vec![None; fields.len()]);
		}
		let encoded: Vec<Bytes> = fields
			.iter()
			.map(|field| HashFieldKey::new(key.clone(), field.clone()).encode())
			.collect();
		let found = self.store().mget(Some(txn), &encoded).await?;
		let values = encoded
			.iter()
			.map(|field_key| found.get(field_key).cloned())
			.collect();
		scope.commit_if_local()?;
		Ok(values)
	}

	/// Delete fields; the meta row goes with the last one.
	pub async fn hdel(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		fields: &[Bytes],
	) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let Some(mut meta) = self.container_meta(txn, key, DataType::Hash).await? else {
			scope.commit_if_local()?;
			return Ok(0);
		};
		let mut removed: u64 = 0;
		for field in fields {
			let field_key = HashFieldKey::new(key.clone(), field.clone()).encode();
			if self.store().get(Some(txn), &field_key).await?.is_some() {
				txn.delete(field_key)?;
				removed += 1;
			}
		}
		if removed > 0 {
			meta.size = meta
				.size
				.checked_sub(removed)
				.ok_or(StorageError::InvalidMeta)?;
			if meta.size == 0 {
				txn.delete(MetaKey::new(key.clone()).encode())?;
			} else {
				self.write_container_meta(txn, key, &meta, DataType::Hash).await?;
			}
		}
		scope.commit_if_local()?;
		Ok(removed as i64)
	}

	pub async fn hlen(&self, txn: Option<&Transaction>, key: &Bytes) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let size = self
			.container_meta(txn, key, DataType::Hash)
			.await?
			.map(|meta| meta.size as i64)
			.unwrap_or(0);
		scope.commit_if_local()?;
		Ok(size)
	}

	pub async fn hkeys(&self, txn: Option<&Transaction>, key: &Bytes) -> Result<Vec<Bytes>> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let Some(meta) = self.container_meta(txn, key, DataType::Hash).await? else {
			scope.commit_if_local()?;
			return Ok(Vec::new());
		};
		let (rows, _) = self
			.store()
			.get_range_keys(
				Some(txn),
				HashFieldKey::prefix(key),
				true,
				None,
				true,
				0,
				meta.size,
				false,
			)
			.await?;
		let mut fields = Vec::with_capacity(rows.len());
		for raw in &rows {
			fields.push(HashFieldKey::decode(raw)?.field().clone());
		}
		scope.commit_if_local()?;
		Ok(fields)
	}

	pub async fn hvals(&self, txn: Option<&Transaction>, key: &Bytes) -> Result<Vec<Bytes>> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let Some(meta) = self.container_meta(txn, key, DataType::Hash).await? else {
			scope.commit_if_local()?;
			return Ok(Vec::new());
		};
		let values = self
			.store()
			.get_range_keys_values(Some(txn), HashFieldKey::prefix(key), None, meta.size, false)
			.await?;
		scope.commit_if_local()?;
		Ok(values)
	}

	/// Fields interleaved with their values, in field order.
	pub async fn hgetall(&self, txn: Option<&Transaction>, key: &Bytes) -> Result<Vec<Bytes>> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let Some(meta) = self.container_meta(txn, key, DataType::Hash).await? else {
			scope.commit_if_local()?;
			return Ok(Vec::new());
		};
		let interleaved = self
			.store()
			.get_range_keys_values(Some(txn), HashFieldKey::prefix(key), None, meta.size, true)
			.await?;
		let mut out = Vec::with_capacity(interleaved.len());
		for (i, item) in interleaved.into_iter().enumerate() {
			if i % 2 == 0 {
				out.push(HashFieldKey::decode(&item)?.field().clone());
			} else {
				out.push(item);
			}
		}
		scope.commit_if_local()?;
		Ok(out)
	}

	/// Add `step` to a decimal field value; a new field bumps the size.
	pub async fn hincrby(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		field: Bytes,
		step: i64,
	) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let mut meta = self
			.container_meta(txn, key, DataType::Hash)
			.await?
			.unwrap_or_else(|| ContainerMeta::new(0));
		let field_key = HashFieldKey::new(key.clone(), field).encode();
		let existed = self.store().get(Some(txn), &field_key).await?.is_some();
		let new = self.store().incr(Some(txn), field_key, step).await?;
		if !existed {
			meta.size += 1;
			self.write_container_meta(txn, key, &meta, DataType::Hash).await?;
		}
		scope.commit_if_local()?;
		Ok(new)
	}

	/// Drop every data row of a hash; the caller owns the meta row.
	pub(crate) async fn clear_hash(&self, txn: &Transaction, key: &Bytes) -> Result<u64> {
		let Some(meta) = self.container_meta(txn, key, DataType::Hash).await? else {
			return Ok(0);
		};
		self.store()
			.delete_range_with_txn(txn, HashFieldKey::prefix(key), None, meta.size)
			.await
	}
}

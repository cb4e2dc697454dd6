use std::collections::HashSet;

use bytes::Bytes;

use txnkv::Transaction;

use crate::data_type::DataType;
use crate::error::Result;
use crate::error::StorageError;
use crate::meta::ContainerMeta;
use crate::meta::MetaKey;
use crate::set::member_key::SetMemberKey;
use crate::storage::Storage;
use crate::storage::check_key;

/// Set algebra selector shared by SDIFF/SINTER/SUNION and their STORE
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetAction {
	Diff,
	Inter,
	Union,
}

impl Storage {
	/// Add members; returns how many were new.
	pub async fn sadd(&self, txn: Option<&Transaction>, key: &Bytes, members: &[Bytes]) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let mut meta = self
			.container_meta(txn, key, DataType::Set)
			.await?
			.unwrap_or_else(|| ContainerMeta::new(0));
		let mut added: u64 = 0;
		for member in members {
			let member_key = SetMemberKey::new(key.clone(), member.clone()).encode();
			if self.store().get(Some(txn), &member_key).await?.is_none() {
				txn.put(member_key, Bytes::from_static(&[0]))?;
				added += 1;
			}
		}
		if added > 0 {
			meta.size += added;
			self.write_container_meta(txn, key, &meta, DataType::Set).await?;
		}
		scope.commit_if_local()?;
		Ok(added as i64)
	}

	/// Remove members; the meta row goes with the last one.
	pub async fn srem(&self, txn: Option<&Transaction>, key: &Bytes, members: &[Bytes]) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let Some(mut meta) = self.container_meta(txn, key, DataType::Set).await? else {
			scope.commit_if_local()?;
			return Ok(0);
		};
		let mut removed: u64 = 0;
		for member in members {
			let member_key = SetMemberKey::new(key.clone(), member.clone()).encode();
			if self.store().get(Some(txn), &member_key).await?.is_some() {
				txn.delete(member_key)?;
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
				self.write_container_meta(txn, key, &meta, DataType::Set).await?;
			}
		}
		scope.commit_if_local()?;
		Ok(removed as i64)
	}

	/// All members, in member byte order.
	pub async fn smembers(&self, txn: Option<&Transaction>, key: &Bytes) -> Result<Vec<Bytes>> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let Some(meta) = self.container_meta(txn, key, DataType::Set).await? else {
			scope.commit_if_local()?;
			return Ok(Vec::new());
		};
		let (rows, _) = self
			.store()
			.get_range_keys(
				Some(txn),
				SetMemberKey::prefix(key),
				true,
				None,
				true,
				0,
				meta.size,
				false,
			)
			.await?;
		let mut members = Vec::with_capacity(rows.len());
		for raw in &rows {
			members.push(SetMemberKey::decode(raw)?.member().clone());
		}
		scope.commit_if_local()?;
		Ok(members)
	}

	pub async fn sismember(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		member: &Bytes,
	) -> Result<bool> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let present = match self.container_meta(txn, key, DataType::Set).await? {
			Some(_) => {
				let member_key = SetMemberKey::new(key.clone(), member.clone()).encode();
				self.store().get(Some(txn), &member_key).await?.is_some()
			}
			None => false,
		};
		scope.commit_if_local()?;
		Ok(present)
	}

	/// Cardinality from the meta row; a pure read.
	pub async fn scard(&self, txn: Option<&Transaction>, key: &Bytes) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let size = self
			.container_meta(txn, key, DataType::Set)
			.await?
			.map(|meta| meta.size as i64)
			.unwrap_or(0);
		scope.commit_if_local()?;
		Ok(size)
	}

	/// SDIFF/SINTER/SUNION: fold the keys' member sets left to right with
	/// the first key as seed; missing keys contribute the empty set. The
	/// result is returned in member byte order.
	pub async fn set_action(
		&self,
		txn: Option<&Transaction>,
		action: SetAction,
		keys: &[Bytes],
	) -> Result<Vec<Bytes>> {
		if keys.is_empty() {
			return Err(StorageError::KeyEmpty);
		}
		let scope = self.scope(txn);
		let txn = scope.txn();
		let result = self.fold_sets(txn, action, keys).await?;
		scope.commit_if_local()?;
		let mut members: Vec<Bytes> = result.into_iter().collect();
		members.sort();
		Ok(members)
	}

	/// The STORE variants: replace `dest` with the computed result, ttl
	/// reset. Returns the stored cardinality.
	pub async fn set_store_action(
		&self,
		txn: Option<&Transaction>,
		action: SetAction,
		dest: &Bytes,
		keys: &[Bytes],
	) -> Result<i64> {
		check_key(dest)?;
		if keys.is_empty() {
			return Err(StorageError::KeyEmpty);
		}
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, dest, true).await?;
		let result = self.fold_sets(txn, action, keys).await?;

		if let Some(old_meta) = self.container_meta(txn, dest, DataType::Set).await?
			&& old_meta.size > 0
		{
			self.store()
				.delete_range_with_txn(txn, SetMemberKey::prefix(dest), None, old_meta.size)
				.await?;
		}
		for member in &result {
			txn.put(
				SetMemberKey::new(dest.clone(), member.clone()).encode(),
				Bytes::from_static(&[0]),
			)?;
		}
		let cardinality = result.len() as u64;
		if cardinality == 0 {
			txn.delete(MetaKey::new(dest.clone()).encode())?;
		} else {
			self.write_container_meta(txn, dest, &ContainerMeta::new(cardinality), DataType::Set)
				.await?;
		}
		scope.commit_if_local()?;
		Ok(cardinality as i64)
	}

	async fn fold_sets(
		&self,
		txn: &Transaction,
		action: SetAction,
		keys: &[Bytes],
	) -> Result<HashSet<Bytes>> {
		let mut result: Option<HashSet<Bytes>> = None;
		for key in keys {
			let members: HashSet<Bytes> =
				self.smembers(Some(txn), key).await?.into_iter().collect();
			result = Some(match result {
				None => members,
				Some(seed) => match action {
					SetAction::Diff => seed.difference(&members).cloned().collect(),
					SetAction::Inter => seed.intersection(&members).cloned().collect(),
					SetAction::Union => seed.union(&members).cloned().collect(),
				},
			});
		}
		Ok(result.unwrap_or_default())
	}

	/// Drop every member row of a set; the caller owns the meta row.
	pub(crate) async fn clear_set(&self, txn: &Transaction, key: &Bytes) -> Result<u64> {
		let Some(meta) = self.container_meta(txn, key, DataType::Set).await? else {
			return Ok(0);
		};
		self.store()
			.delete_range_with_txn(txn, SetMemberKey::prefix(key), None, meta.size)
			.await
	}
}

use bytes::Bytes;

use txnkv::Transaction;

use crate::data_type::DataType;
use crate::error::Result;
use crate::error::StorageError;
use crate::meta::ContainerMeta;
use crate::meta::MetaKey;
use crate::storage::Storage;
use crate::storage::check_key;
use crate::storage_list::normalize_range;
use crate::zset::lex_bound::LexBound;
use crate::zset::member_key::ZSetMemberKey;
use crate::zset::member_key::decode_score_value;
use crate::zset::member_key::encode_score_value;
use crate::zset::score_key::SCORE_MAX;
use crate::zset::score_key::SCORE_MIN;
use crate::zset::score_key::ZSetScoreKey;

fn check_score(score: i64) -> Result<()> {
	if (SCORE_MIN..=SCORE_MAX).contains(&score) {
		Ok(())
	} else {
		Err(StorageError::NotInteger)
	}
}

impl Storage {
	/// Upsert scored members. A score change swaps the member's score row;
	/// only new members grow the size. Returns how many were new.
	pub async fn zadd(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		pairs: &[(i64, Bytes)],
	) -> Result<i64> {
		check_key(key)?;
		for (score, _) in pairs {
			check_score(*score)?;
		}
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let mut meta = self
			.container_meta(txn, key, DataType::ZSet)
			.await?
			.unwrap_or_else(|| ContainerMeta::new(0));
		let mut added: u64 = 0;
		for (score, member) in pairs {
			let data_key = ZSetMemberKey::new(key.clone(), member.clone()).encode();
			match self.store().get(Some(txn), &data_key).await? {
				Some(raw) => {
					let old_score = decode_score_value(&raw)?;
					if old_score != *score {
						txn.delete(
							ZSetScoreKey::new(key.clone(), old_score, member.clone()).encode(),
						)?;
						txn.put(
							ZSetScoreKey::new(key.clone(), *score, member.clone()).encode(),
							Bytes::from_static(&[0]),
						)?;
						txn.put(data_key, encode_score_value(*score))?;
					}
				}
				None => {
					txn.put(data_key, encode_score_value(*score))?;
					txn.put(
						ZSetScoreKey::new(key.clone(), *score, member.clone()).encode(),
						Bytes::from_static(&[0]),
					)?;
					added += 1;
				}
			}
		}
		if added > 0 {
			meta.size += added;
			self.write_container_meta(txn, key, &meta, DataType::ZSet).await?;
		}
		scope.commit_if_local()?;
		Ok(added as i64)
	}

	pub async fn zcard(&self, txn: Option<&Transaction>, key: &Bytes) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let size = self
			.container_meta(txn, key, DataType::ZSet)
			.await?
			.map(|meta| meta.size as i64)
			.unwrap_or(0);
		scope.commit_if_local()?;
		Ok(size)
	}

	/// Point read of one member's score.
	pub async fn zscore(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		member: &Bytes,
	) -> Result<Option<i64>> {
		check_key(key)?;
		let data_key = ZSetMemberKey::new(key.clone(), member.clone()).encode();
		match self.store().get(txn, &data_key).await? {
			Some(raw) => Ok(Some(decode_score_value(&raw)?)),
			None => Ok(None),
		}
	}

	/// Add `step` to a member's score (0 when absent); the meta row is
	/// written only when the member is new.
	pub async fn zincrby(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		step: i64,
		member: &Bytes,
	) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let mut meta = self
			.container_meta(txn, key, DataType::ZSet)
			.await?
			.unwrap_or_else(|| ContainerMeta::new(0));
		let data_key = ZSetMemberKey::new(key.clone(), member.clone()).encode();
		let new_score = match self.store().get(Some(txn), &data_key).await? {
			Some(raw) => {
				let old_score = decode_score_value(&raw)?;
				let new_score = old_score
					.checked_add(step)
					.ok_or(StorageError::NotInteger)?;
				check_score(new_score)?;
				if new_score != old_score {
					txn.delete(
						ZSetScoreKey::new(key.clone(), old_score, member.clone()).encode(),
					)?;
					txn.put(
						ZSetScoreKey::new(key.clone(), new_score, member.clone()).encode(),
						Bytes::from_static(&[0]),
					)?;
					txn.put(data_key, encode_score_value(new_score))?;
				}
				new_score
			}
			None => {
				check_score(step)?;
				txn.put(data_key, encode_score_value(step))?;
				txn.put(
					ZSetScoreKey::new(key.clone(), step, member.clone()).encode(),
					Bytes::from_static(&[0]),
				)?;
				meta.size += 1;
				self.write_container_meta(txn, key, &meta, DataType::ZSet).await?;
				step
			}
		};
		scope.commit_if_local()?;
		Ok(new_score)
	}

	/// Remove members, both paired rows each.
	pub async fn zrem(&self, txn: Option<&Transaction>, key: &Bytes, members: &[Bytes]) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let Some(mut meta) = self.container_meta(txn, key, DataType::ZSet).await? else {
			scope.commit_if_local()?;
			return Ok(0);
		};
		let mut removed: u64 = 0;
		for member in members {
			let data_key = ZSetMemberKey::new(key.clone(), member.clone()).encode();
			if let Some(raw) = self.store().get(Some(txn), &data_key).await? {
				let score = decode_score_value(&raw)?;
				txn.delete(data_key)?;
				txn.delete(ZSetScoreKey::new(key.clone(), score, member.clone()).encode())?;
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
				self.write_container_meta(txn, key, &meta, DataType::ZSet).await?;
			}
		}
		scope.commit_if_local()?;
		Ok(removed as i64)
	}

	/// Members in rank order `[start, stop]` with Redis index rules;
	/// `reverse` counts ranks from the top. Scores are interleaved as
	/// decimal strings when `with_scores` is set.
	pub async fn zrange(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		start: i64,
		stop: i64,
		with_scores: bool,
		reverse: bool,
	) -> Result<Vec<Bytes>> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let Some(meta) = self.container_meta(txn, key, DataType::ZSet).await? else {
			scope.commit_if_local()?;
			return Ok(Vec::new());
		};
		let size = meta.size as i64;
		let Some((start, stop)) = normalize_range(start, stop, size) else {
			scope.commit_if_local()?;
			return Ok(Vec::new());
		};
		let count = stop - start + 1;
		let offset = if reverse { size - 1 - stop } else { start };
		let (rows, _) = self
			.store()
			.get_range_keys(
				Some(txn),
				ZSetScoreKey::prefix(key),
				true,
				None,
				true,
				offset as u64,
				count as u64,
				false,
			)
			.await?;
		let mut entries = Vec::with_capacity(rows.len());
		for raw in &rows {
			let decoded = ZSetScoreKey::decode(raw)?;
			entries.push((decoded.member().clone(), decoded.score()));
		}
		if reverse {
			entries.reverse();
		}
		scope.commit_if_local()?;
		Ok(render_entries(entries, with_scores))
	}

	/// Members with scores in `[min, max]`, by half-open score-key bounds
	/// `[min, max + 1)`. With `reverse`, order flips before the
	/// `(offset, count)` window applies; `count < 0` means the rest.
	#[allow(clippy::too_many_arguments)]
	pub async fn zrange_by_score(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		min: i64,
		max: i64,
		with_scores: bool,
		offset: i64,
		count: i64,
		reverse: bool,
	) -> Result<Vec<Bytes>> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		if min > max || self.container_meta(txn, key, DataType::ZSet).await?.is_none() {
			scope.commit_if_local()?;
			return Ok(Vec::new());
		}
		let (rows, _) = self
			.store()
			.get_range_keys(
				Some(txn),
				ZSetScoreKey::new(key.clone(), min, Bytes::new()).encode(),
				true,
				Some(ZSetScoreKey::range_end(key, max)),
				false,
				0,
				0,
				false,
			)
			.await?;
		let mut entries = Vec::with_capacity(rows.len());
		for raw in &rows {
			let decoded = ZSetScoreKey::decode(raw)?;
			entries.push((decoded.member().clone(), decoded.score()));
		}
		if reverse {
			entries.reverse();
		}
		let entries = apply_window(entries, offset, count);
		scope.commit_if_local()?;
		Ok(render_entries(entries, with_scores))
	}

	/// Count members with scores in `[min, max]` without materializing keys.
	pub async fn zcount(&self, txn: Option<&Transaction>, key: &Bytes, min: i64, max: i64) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		if min > max || self.container_meta(txn, key, DataType::ZSet).await?.is_none() {
			scope.commit_if_local()?;
			return Ok(0);
		}
		let (_, count) = self
			.store()
			.get_range_keys(
				Some(txn),
				ZSetScoreKey::new(key.clone(), min, Bytes::new()).encode(),
				true,
				Some(ZSetScoreKey::range_end(key, max)),
				false,
				0,
				0,
				true,
			)
			.await?;
		scope.commit_if_local()?;
		Ok(count as i64)
	}

	/// Members in the lexicographic range, ordered by the member-row
	/// encoding. `count < 0` means the rest.
	#[allow(clippy::too_many_arguments)]
	pub async fn zrange_by_lex(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		min: &LexBound,
		max: &LexBound,
		offset: i64,
		count: i64,
		reverse: bool,
	) -> Result<Vec<Bytes>> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		if self.container_meta(txn, key, DataType::ZSet).await?.is_none() {
			scope.commit_if_local()?;
			return Ok(Vec::new());
		}
		let (start, with_start, end, with_end) = lex_bounds(key, min, max);
		let (rows, _) = self
			.store()
			.get_range_keys(Some(txn), start, with_start, Some(end), with_end, 0, 0, false)
			.await?;
		let mut members = Vec::with_capacity(rows.len());
		for raw in &rows {
			members.push(ZSetMemberKey::decode(raw)?.member().clone());
		}
		if reverse {
			members.reverse();
		}
		let members = apply_window(members, offset, count);
		scope.commit_if_local()?;
		Ok(members)
	}

	pub async fn zlexcount(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		min: &LexBound,
		max: &LexBound,
	) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		if self.container_meta(txn, key, DataType::ZSet).await?.is_none() {
			scope.commit_if_local()?;
			return Ok(0);
		}
		let (start, with_start, end, with_end) = lex_bounds(key, min, max);
		let (_, count) = self
			.store()
			.get_range_keys(Some(txn), start, with_start, Some(end), with_end, 0, 0, true)
			.await?;
		scope.commit_if_local()?;
		Ok(count as i64)
	}

	/// Remove every member with a score in `[min, max]`.
	pub async fn zrem_range_by_score(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		min: i64,
		max: i64,
	) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let Some(mut meta) = self.container_meta(txn, key, DataType::ZSet).await? else {
			scope.commit_if_local()?;
			return Ok(0);
		};
		if min > max {
			scope.commit_if_local()?;
			return Ok(0);
		}
		let (rows, _) = self
			.store()
			.get_range_keys(
				Some(txn),
				ZSetScoreKey::new(key.clone(), min, Bytes::new()).encode(),
				true,
				Some(ZSetScoreKey::range_end(key, max)),
				false,
				0,
				0,
				false,
			)
			.await?;
		let mut removed: u64 = 0;
		for raw in &rows {
			let decoded = ZSetScoreKey::decode(raw)?;
			txn.delete(raw.clone())?;
			txn.delete(ZSetMemberKey::new(key.clone(), decoded.member().clone()).encode())?;
			removed += 1;
		}
		if removed > 0 {
			meta.size = meta
				.size
				.checked_sub(removed)
				.ok_or(StorageError::InvalidMeta)?;
			if meta.size == 0 {
				txn.delete(MetaKey::new(key.clone()).encode())?;
			} else {
				self.write_container_meta(txn, key, &meta, DataType::ZSet).await?;
			}
		}
		scope.commit_if_local()?;
		Ok(removed as i64)
	}

	/// Remove every member in the lexicographic range.
	pub async fn zrem_range_by_lex(
		&self,
		txn: Option<&Transaction>,
		key: &Bytes,
		min: &LexBound,
		max: &LexBound,
	) -> Result<i64> {
		check_key(key)?;
		let scope = self.scope(txn);
		let txn = scope.txn();
		self.delete_if_expired(txn, key, true).await?;
		let Some(mut meta) = self.container_meta(txn, key, DataType::ZSet).await? else {
			scope.commit_if_local()?;
			return Ok(0);
		};
		let (start, with_start, end, with_end) = lex_bounds(key, min, max);
		let (rows, _) = self
			.store()
			.get_range_keys(Some(txn), start, with_start, Some(end), with_end, 0, 0, false)
			.await?;
		let mut removed: u64 = 0;
		for raw in &rows {
			let member = ZSetMemberKey::decode(raw)?.member().clone();
			let Some(value) = self.store().get(Some(txn), raw).await? else {
				continue;
			};
			let score = decode_score_value(&value)?;
			txn.delete(raw.clone())?;
			txn.delete(ZSetScoreKey::new(key.clone(), score, member).encode())?;
			removed += 1;
		}
		if removed > 0 {
			meta.size = meta
				.size
				.checked_sub(removed)
				.ok_or(StorageError::InvalidMeta)?;
			if meta.size == 0 {
				txn.delete(MetaKey::new(key.clone()).encode())?;
			} else {
				self.write_container_meta(txn, key, &meta, DataType::ZSet).await?;
			}
		}
		scope.commit_if_local()?;
		Ok(removed as i64)
	}

	/// Drop both row families of a sorted set; the caller owns the meta row.
	pub(crate) async fn clear_zset(&self, txn: &Transaction, key: &Bytes) -> Result<u64> {
		let Some(meta) = self.container_meta(txn, key, DataType::ZSet).await? else {
			return Ok(0);
		};
		let (rows, _) = self
			.store()
			.get_range_keys(
				Some(txn),
				ZSetScoreKey::prefix(key),
				true,
				None,
				true,
				0,
				meta.size,
				false,
			)
			.await?;
		let mut removed = 0;
		for raw in &rows {
			let decoded = ZSetScoreKey::decode(raw)?;
			txn.delete(raw.clone())?;
			txn.delete(ZSetMemberKey::new(key.clone(), decoded.member().clone()).encode())?;
			removed += 1;
		}
		Ok(removed)
	}
}

/// Lex bounds over the member-row family. The returned end bound pairs with
/// `with_end`; the `-`/`+` sentinels become the family's infimum/supremum.
fn lex_bounds(key: &Bytes, min: &LexBound, max: &LexBound) -> (Bytes, bool, Bytes, bool) {
	let (start, with_start) = match min {
		LexBound::Min => (ZSetMemberKey::range_start(key), true),
		LexBound::Max => (ZSetMemberKey::range_end(key), false),
		LexBound::Incl(member) => (ZSetMemberKey::new(key.clone(), member.clone()).encode(), true),
		LexBound::Excl(member) => (ZSetMemberKey::new(key.clone(), member.clone()).encode(), false),
	};
	let (end, with_end) = match max {
		LexBound::Min => (ZSetMemberKey::range_start(key), false),
		LexBound::Max => (ZSetMemberKey::range_end(key), false),
		LexBound::Incl(member) => (ZSetMemberKey::new(key.clone(), member.clone()).encode(), true),
		LexBound::Excl(member) => (ZSetMemberKey::new(key.clone(), member.clone()).encode(), false),
	};
	(start, with_start, end, with_end)
}

/// `(offset, count)` window after any reversal; `count < 0` means the rest.
fn apply_window<T>(items: Vec<T>, offset: i64, count: i64) -> Vec<T> {
	let offset = offset.max(0) as usize;
	if offset >= items.len() {
		return Vec::new();
	}
	let take = if count < 0 {
		usize::MAX
	} else {
		count as usize
	};
	items.into_iter().skip(offset).take(take).collect()
}

fn render_entries(entries: Vec<(Bytes, i64)>, with_scores: bool) -> Vec<Bytes> {
	let mut out = Vec::with_capacity(if with_scores {
		entries.len() * 2
	} else {
		entries.len()
	});
	for (member, score) in entries {
		out.push(member);
		if with_scores {
			out.push(Bytes::from(score.to_string()));
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bytes(s: &str) -> Bytes {
		Bytes::copy_from_slice(s.as_bytes())
	}

	#[tokio::test]
	async fn test_zset_scenario() {
		// ZADD z 1 a -> 1; ZADD z 2 b -> 1; ZADD z 2 a -> 0;
		// ZRANGE z 0 -1 WITHSCORES -> a 2 b 2; ZSCORE z a -> 2; ZCOUNT z 2 2 -> 2
		let storage = Storage::memory();
		let key = bytes("z");
		assert_eq!(storage.zadd(None, &key, &[(1, bytes("a"))]).await.unwrap(), 1);
		assert_eq!(storage.zadd(None, &key, &[(2, bytes("b"))]).await.unwrap(), 1);
		assert_eq!(storage.zadd(None, &key, &[(2, bytes("a"))]).await.unwrap(), 0);
		assert_eq!(
			storage.zrange(None, &key, 0, -1, true, false).await.unwrap(),
			vec![bytes("a"), bytes("2"), bytes("b"), bytes("2")]
		);
		assert_eq!(storage.zscore(None, &key, &bytes("a")).await.unwrap(), Some(2));
		assert_eq!(storage.zcount(None, &key, 2, 2).await.unwrap(), 2);
	}

	#[tokio::test]
	async fn test_zadd_score_update_swaps_score_row() {
		let storage = Storage::memory();
		let key = bytes("z");
		storage
			.zadd(None, &key, &[(1, bytes("a")), (2, bytes("b"))])
			.await
			.unwrap();
		storage.zadd(None, &key, &[(5, bytes("a"))]).await.unwrap();

		assert_eq!(
			storage.zrange(None, &key, 0, -1, false, false).await.unwrap(),
			vec![bytes("b"), bytes("a")]
		);
		assert_eq!(storage.zcard(None, &key).await.unwrap(), 2);
		// The old score row must be gone.
		assert_eq!(storage.zcount(None, &key, 1, 1).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_zrange_rank_windows() {
		let storage = Storage::memory();
		let key = bytes("z");
		storage
			.zadd(
				None,
				&key,
				&[(1, bytes("a")), (2, bytes("b")), (3, bytes("c"))],
			)
			.await
			.unwrap();
		assert_eq!(
			storage.zrange(None, &key, 0, 1, false, false).await.unwrap(),
			vec![bytes("a"), bytes("b")]
		);
		assert_eq!(
			storage.zrange(None, &key, -2, -1, false, false).await.unwrap(),
			vec![bytes("b"), bytes("c")]
		);
		assert_eq!(
			storage.zrange(None, &key, 0, 1, false, true).await.unwrap(),
			vec![bytes("c"), bytes("b")]
		);
		assert!(storage.zrange(None, &key, 5, 9, false, false).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_zrange_by_score_bounds_and_window() {
		let storage = Storage::memory();
		let key = bytes("z");
		storage
			.zadd(
				None,
				&key,
				&[
					(-5, bytes("neg")),
					(1, bytes("a")),
					(2, bytes("b")),
					(3, bytes("c")),
				],
			)
			.await
			.unwrap();
		assert_eq!(
			storage
				.zrange_by_score(None, &key, 1, 2, false, 0, -1, false)
				.await
				.unwrap(),
			vec![bytes("a"), bytes("b")]
		);
		assert_eq!(
			storage
				.zrange_by_score(None, &key, SCORE_MIN, SCORE_MAX, false, 1, 2, false)
				.await
				.unwrap(),
			vec![bytes("a"), bytes("b")]
		);
		assert_eq!(
			storage
				.zrange_by_score(None, &key, 1, 3, true, 0, 1, true)
				.await
				.unwrap(),
			vec![bytes("c"), bytes("3")]
		);
	}

	#[tokio::test]
	async fn test_zincrby() {
		let storage = Storage::memory();
		let key = bytes("z");
		assert_eq!(storage.zincrby(None, &key, 3, &bytes("m")).await.unwrap(), 3);
		assert_eq!(storage.zincrby(None, &key, -1, &bytes("m")).await.unwrap(), 2);
		assert_eq!(storage.zcard(None, &key).await.unwrap(), 1);
		assert_eq!(storage.zscore(None, &key, &bytes("m")).await.unwrap(), Some(2));
		assert_eq!(storage.zcount(None, &key, 2, 2).await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_zrem_and_meta_lifecycle() {
		let storage = Storage::memory();
		let key = bytes("z");
		storage
			.zadd(None, &key, &[(1, bytes("a")), (2, bytes("b"))])
			.await
			.unwrap();
		assert_eq!(
			storage.zrem(None, &key, &[bytes("a"), bytes("nope")]).await.unwrap(),
			1
		);
		assert_eq!(storage.zcard(None, &key).await.unwrap(), 1);
		assert_eq!(storage.zrem(None, &key, &[bytes("b")]).await.unwrap(), 1);
		assert_eq!(storage.zcard(None, &key).await.unwrap(), 0);
		storage.set(None, &key, bytes("v")).await.unwrap();
	}

	#[tokio::test]
	async fn test_zrem_range_by_score() {
		let storage = Storage::memory();
		let key = bytes("z");
		storage
			.zadd(
				None,
				&key,
				&[(1, bytes("a")), (2, bytes("b")), (3, bytes("c"))],
			)
			.await
			.unwrap();
		assert_eq!(storage.zrem_range_by_score(None, &key, 1, 2).await.unwrap(), 2);
		assert_eq!(
			storage.zrange(None, &key, 0, -1, false, false).await.unwrap(),
			vec![bytes("c")]
		);
	}

	#[tokio::test]
	async fn test_lex_ranges_over_same_length_members() {
		let storage = Storage::memory();
		let key = bytes("z");
		storage
			.zadd(
				None,
				&key,
				&[(0, bytes("a")), (0, bytes("b")), (0, bytes("c")), (0, bytes("d"))],
			)
			.await
			.unwrap();

		let all = storage
			.zrange_by_lex(None, &key, &LexBound::Min, &LexBound::Max, 0, -1, false)
			.await
			.unwrap();
		assert_eq!(all, vec![bytes("a"), bytes("b"), bytes("c"), bytes("d")]);

		let bounded = storage
			.zrange_by_lex(
				None,
				&key,
				&LexBound::Incl(bytes("b")),
				&LexBound::Excl(bytes("d")),
				0,
				-1,
				false,
			)
			.await
			.unwrap();
		assert_eq!(bounded, vec![bytes("b"), bytes("c")]);

		assert_eq!(
			storage
				.zlexcount(None, &key, &LexBound::Min, &LexBound::Incl(bytes("c")))
				.await
				.unwrap(),
			3
		);

		let reversed = storage
			.zrange_by_lex(None, &key, &LexBound::Min, &LexBound::Max, 1, 2, true)
			.await
			.unwrap();
		assert_eq!(reversed, vec![bytes("c"), bytes("b")]);
	}

	#[tokio::test]
	async fn test_zrem_range_by_lex() {
		let storage = Storage::memory();
		let key = bytes("z");
		storage
			.zadd(
				None,
				&key,
				&[(0, bytes("a")), (0, bytes("b")), (0, bytes("c"))],
			)
			.await
			.unwrap();
		let removed = storage
			.zrem_range_by_lex(
				None,
				&key,
				&LexBound::Incl(bytes("a")),
				&LexBound::Incl(bytes("b")),
			)
			.await
			.unwrap();
		assert_eq!(removed, 2);
		assert_eq!(storage.zcard(None, &key).await.unwrap(), 1);
		assert_eq!(storage.zscore(None, &key, &bytes("a")).await.unwrap(), None);
	}

	#[tokio::test]
	async fn test_negative_scores_order_before_positive() {
		let storage = Storage::memory();
		let key = bytes("z");
		storage
			.zadd(
				None,
				&key,
				&[(10, bytes("p")), (-10, bytes("n")), (0, bytes("zero"))],
			)
			.await
			.unwrap();
		assert_eq!(
			storage.zrange(None, &key, 0, -1, false, false).await.unwrap(),
			vec![bytes("n"), bytes("zero"), bytes("p")]
		);
	}

	#[tokio::test]
	async fn test_zset_rejects_string_key() {
		let storage = Storage::memory();
		storage.set(None, &bytes("k"), bytes("v")).await.unwrap();
		assert!(matches!(
			storage.zadd(None, &bytes("k"), &[(1, bytes("a"))]).await,
			Err(StorageError::WrongType)
		));
	}

	#[tokio::test]
	async fn test_out_of_domain_score_is_rejected() {
		let storage = Storage::memory();
		assert!(matches!(
			storage.zadd(None, &bytes("z"), &[(i64::MAX, bytes("a"))]).await,
			Err(StorageError::NotInteger)
		));
	}
}

//! Key placement.
//!
//! A key belongs to shard `u16_le(sha1(key)[0..2]) % shards`. The mapping depends on nothing but
//! the key bytes and the number of shards, so every process that agrees on the shard list agrees
//! on where each key lives. There is no rebalancing: changing the shard count moves keys.

use std::collections::BTreeMap;

use sha1::{Digest, Sha1};

/// Returns the index of the shard owning `key`.
///
/// # Panics
///
/// Panics if `shards` is zero.
pub fn locate(key: &[u8], shards: usize) -> usize {
    assert!(shards > 0, "cannot locate a key without shards");

    let digest = Sha1::digest(key);
    let slot = u16::from_le_bytes([digest[0], digest[1]]);
    usize::from(slot) % shards
}

/// Groups items by owning shard.
///
/// Groups come out in shard-index order and only non-empty shards are present. Within a group the
/// items keep their input order.
pub fn partition<T, F>(
    items: impl IntoIterator<Item = T>,
    shards: usize,
    key: F,
) -> Vec<(usize, Vec<T>)>
where
    F: Fn(&T) -> &[u8],
{
    let mut groups: BTreeMap<usize, Vec<T>> = BTreeMap::new();
    for item in items {
        let shard = locate(key(&item), shards);
        groups.entry(shard).or_default().push(item);
    }
    groups.into_iter().collect()
}

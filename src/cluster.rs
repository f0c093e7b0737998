use std::fmt;
use std::future::Future;

use bytes::Bytes;
use futures::future::join_all;
use tokio::net::ToSocketAddrs;
use tracing::{debug, info, warn};

use crate::argument::Argument;
use crate::client::Client;
use crate::commands::KvPair;
use crate::config::ClientConfig;
use crate::frame::Frame;
use crate::shard;
use crate::{Error, Result};

/// Routes keys over a fixed list of independent stores.
///
/// The shard table is set at construction and never changes: the index of a client in the list
/// is its shard id, and [`Cluster::shard_of`] decides which shard owns a key. Single-key
/// operations go straight to the owner. Bulk operations are split per shard and the sub-requests
/// run concurrently, one task per shard.
#[derive(Clone, Debug)]
pub struct Cluster {
    shards: Vec<Client>,
}

/// A failed sub-request of a bulk operation.
#[derive(Debug)]
pub struct ShardFailure {
    pub shard: usize,
    pub error: Error,
}

/// Outcome of a bulk operation.
///
/// `values` holds what the successful shards returned, concatenated in shard order. Every shard
/// that failed is listed in `failures` and contributed nothing to `values`.
#[derive(Debug)]
pub struct MultiResult<T> {
    pub values: Vec<T>,
    pub failures: Vec<ShardFailure>,
    /// Number of shards that took part.
    pub shards: usize,
}

impl<T> MultiResult<T> {
    fn empty() -> MultiResult<T> {
        MultiResult {
            values: Vec::new(),
            failures: Vec::new(),
            shards: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_shards(&self) -> Vec<usize> {
        self.failures.iter().map(|failure| failure.shard).collect()
    }

    /// Turns a partial success into an error.
    pub fn into_complete(self) -> Result<Vec<T>> {
        if self.is_complete() {
            return Ok(self.values);
        }
        Err(Error::PartialFailure {
            failed: self.failed_shards(),
            total: self.shards,
        })
    }
}

/// The reply a shard gave to its part of [`Cluster::execute_multi`].
#[derive(Debug, PartialEq)]
pub struct ShardReply {
    pub shard: usize,
    pub keys: Vec<String>,
    pub frame: Frame,
}

impl Cluster {
    /// Connects to every shard, in order.
    ///
    /// If any shard can't be reached, the ones already connected are closed again and the error
    /// is returned.
    pub async fn connect<A>(addrs: impl IntoIterator<Item = A>) -> Result<Cluster>
    where
        A: ToSocketAddrs + fmt::Display,
    {
        Cluster::connect_with_config(addrs, ClientConfig::default()).await
    }

    pub async fn connect_with_config<A>(
        addrs: impl IntoIterator<Item = A>,
        config: ClientConfig,
    ) -> Result<Cluster>
    where
        A: ToSocketAddrs + fmt::Display,
    {
        let mut shards = Vec::new();
        for addr in addrs {
            match Client::connect_with_config(addr, config.clone()).await {
                Ok(client) => shards.push(client),
                Err(err) => {
                    for client in &shards {
                        let _ = client.close().await;
                    }
                    return Err(err);
                }
            }
        }

        let cluster = Cluster::from_clients(shards)?;
        info!(shards = cluster.len(), "cluster ready");
        Ok(cluster)
    }

    pub fn from_clients(shards: Vec<Client>) -> Result<Cluster> {
        if shards.is_empty() {
            return Err(Error::NoShards);
        }
        Ok(Cluster { shards })
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    pub fn shards(&self) -> &[Client] {
        &self.shards
    }

    pub fn shard(&self, index: usize) -> Option<&Client> {
        self.shards.get(index)
    }

    pub fn shard_of(&self, key: impl AsRef<[u8]>) -> usize {
        shard::locate(key.as_ref(), self.shards.len())
    }

    /// The client owning `key`.
    pub fn client_for(&self, key: impl AsRef<[u8]>) -> &Client {
        &self.shards[self.shard_of(key)]
    }

    /// Runs a command on the shard that owns `key`.
    pub async fn execute(
        &self,
        key: &str,
        command: &str,
        args: &[Argument],
    ) -> Result<Frame> {
        self.client_for(key).execute(command, args).await
    }

    /// Groups keys by owning shard, in shard order, keeping the input order within each group.
    pub fn partition<K: AsRef<str>>(&self, keys: &[K]) -> Vec<(usize, Vec<String>)> {
        shard::partition(
            keys.iter().map(|key| key.as_ref().to_string()),
            self.shards.len(),
            |key| key.as_bytes(),
        )
    }

    /// Sends `command key...` to every shard owning at least one of `keys`, concurrently.
    pub async fn execute_multi<K: AsRef<str>>(
        &self,
        keys: &[K],
        command: &str,
    ) -> MultiResult<ShardReply> {
        let command = command.to_string();
        self.fan_out(self.partition(keys), move |shard, client, keys| {
            let command = command.clone();
            async move {
                let frame = client
                    .execute(&command, &[Argument::TextSeq(keys.clone())])
                    .await?;
                Ok(vec![ShardReply { shard, keys, frame }])
            }
        })
        .await
    }

    /// Reads many keys at once. Missing keys are left out of the result.
    pub async fn multi_get<K: AsRef<str>>(&self, keys: &[K]) -> MultiResult<KvPair<Bytes>> {
        self.fan_out(self.partition(keys), |_, client, keys| async move {
            client.multi_get(&keys).await
        })
        .await
    }

    /// Writes many pairs at once and returns the keys of the shards that accepted them.
    pub async fn multi_set(&self, pairs: Vec<KvPair<Argument>>) -> MultiResult<String> {
        let groups = shard::partition(pairs, self.shards.len(), |pair| pair.key.as_bytes());
        self.fan_out(groups, |_, client, pairs| async move {
            client.multi_set(&pairs).await?;
            Ok(pairs.into_iter().map(|pair| pair.key).collect())
        })
        .await
    }

    /// Deletes many keys at once and returns the keys of the shards that deleted them.
    pub async fn multi_del<K: AsRef<str>>(&self, keys: &[K]) -> MultiResult<String> {
        self.fan_out(self.partition(keys), |_, client, keys| async move {
            client.multi_del(&keys).await?;
            Ok(keys)
        })
        .await
    }

    /// Closes every shard. All shards are closed even if some fail; the first error is returned.
    pub async fn close(&self) -> Result<()> {
        let results = join_all(self.shards.iter().map(Client::close)).await;
        info!(shards = self.shards.len(), "cluster closed");
        results.into_iter().collect()
    }

    /// Runs `op` once per group, each on its own task, and merges the outcomes in shard order.
    ///
    /// Every task hands its result back through its own join handle; nothing is shared between
    /// tasks.
    async fn fan_out<T, R, F, Fut>(&self, groups: Vec<(usize, Vec<T>)>, op: F) -> MultiResult<R>
    where
        F: Fn(usize, Client, Vec<T>) -> Fut,
        Fut: Future<Output = Result<Vec<R>>> + Send + 'static,
        R: Send + 'static,
    {
        if groups.is_empty() {
            return MultiResult::empty();
        }
        debug!(shards = groups.len(), "fanning out");

        let tasks = groups.into_iter().map(|(shard, items)| {
            let handle = tokio::spawn(op(shard, self.shards[shard].clone(), items));
            async move { (shard, handle.await) }
        });
        let outcomes = join_all(tasks).await;

        let mut merged = MultiResult::empty();
        merged.shards = outcomes.len();
        for (shard, outcome) in outcomes {
            let error = match outcome {
                Ok(Ok(values)) => {
                    merged.values.extend(values);
                    continue;
                }
                Ok(Err(err)) => err,
                Err(join_err) => Error::Worker(join_err.to_string()),
            };
            warn!(shard, %error, "shard sub-request failed");
            merged.failures.push(ShardFailure { shard, error });
        }
        merged
    }
}

/// Single-key commands, forwarded to the owning shard.
impl Cluster {
    pub async fn set(&self, key: &str, value: impl Into<Argument>) -> Result<bool> {
        self.client_for(key).set(key, value).await
    }

    pub async fn setx(
        &self,
        key: &str,
        value: impl Into<Argument>,
        ttl: i64,
    ) -> Result<bool> {
        self.client_for(key).setx(key, value, ttl).await
    }

    pub async fn setnx(&self, key: &str, value: impl Into<Argument>) -> Result<bool> {
        self.client_for(key).setnx(key, value).await
    }

    pub async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.client_for(key).get(key).await
    }

    pub async fn getset(
        &self,
        key: &str,
        value: impl Into<Argument>,
    ) -> Result<Option<Bytes>> {
        self.client_for(key).getset(key, value).await
    }

    pub async fn del(&self, key: &str) -> Result<bool> {
        self.client_for(key).del(key).await
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        self.client_for(key).exists(key).await
    }

    pub async fn incr(&self, key: &str, by: i64) -> Result<i64> {
        self.client_for(key).incr(key, by).await
    }

    pub async fn decr(&self, key: &str, by: i64) -> Result<i64> {
        self.client_for(key).decr(key, by).await
    }

    // Hashes are placed by their name, so all fields of one hash live on the same shard.

    pub async fn hset(
        &self,
        name: &str,
        field: &str,
        value: impl Into<Argument>,
    ) -> Result<bool> {
        self.client_for(name).hset(name, field, value).await
    }

    pub async fn hget(&self, name: &str, field: &str) -> Result<Option<Bytes>> {
        self.client_for(name).hget(name, field).await
    }

    pub async fn hdel(&self, name: &str, field: &str) -> Result<bool> {
        self.client_for(name).hdel(name, field).await
    }

    pub async fn hincr(&self, name: &str, field: &str, by: i64) -> Result<i64> {
        self.client_for(name).hincr(name, field, by).await
    }

    pub async fn hexists(&self, name: &str, field: &str) -> Result<bool> {
        self.client_for(name).hexists(name, field).await
    }
}

use bytes::Bytes;

use crate::argument::Argument;
use crate::client::Client;
use crate::commands::{self, KvPair};
use crate::Result;

/// Plain key/value commands.
impl Client {
    pub async fn set(&self, key: &str, value: impl Into<Argument>) -> Result<bool> {
        let frame = self.execute("set", &[key.into(), value.into()]).await?;
        commands::ack("set", &frame)
    }

    /// Sets a value that expires after `ttl` seconds.
    pub async fn setx(
        &self,
        key: &str,
        value: impl Into<Argument>,
        ttl: i64,
    ) -> Result<bool> {
        let frame = self
            .execute("setx", &[key.into(), value.into(), ttl.into()])
            .await?;
        commands::ack("setx", &frame)
    }

    /// Returns false when the key already existed.
    pub async fn setnx(&self, key: &str, value: impl Into<Argument>) -> Result<bool> {
        let frame = self.execute("setnx", &[key.into(), value.into()]).await?;
        commands::flag("setnx", &frame)
    }

    pub async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let frame = self.execute("get", &[key.into()]).await?;
        commands::optional_value("get", &frame)
    }

    /// Stores `value` and returns the previous one.
    pub async fn getset(
        &self,
        key: &str,
        value: impl Into<Argument>,
    ) -> Result<Option<Bytes>> {
        let frame = self.execute("getset", &[key.into(), value.into()]).await?;
        commands::optional_value("getset", &frame)
    }

    pub async fn del(&self, key: &str) -> Result<bool> {
        let frame = self.execute("del", &[key.into()]).await?;
        commands::ack("del", &frame)
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        let frame = self.execute("exists", &[key.into()]).await?;
        commands::flag("exists", &frame)
    }

    pub async fn incr(&self, key: &str, by: i64) -> Result<i64> {
        let frame = self.execute("incr", &[key.into(), by.into()]).await?;
        commands::int("incr", &frame)
    }

    pub async fn decr(&self, key: &str, by: i64) -> Result<i64> {
        let frame = self.execute("decr", &[key.into(), by.into()]).await?;
        commands::int("decr", &frame)
    }

    /// Keys in `(start, end]`, at most `limit` of them.
    pub async fn scan(
        &self,
        start: &str,
        end: &str,
        limit: u32,
    ) -> Result<Vec<KvPair<Bytes>>> {
        let frame = self
            .execute("scan", &[start.into(), end.into(), limit.into()])
            .await?;
        commands::pairs("scan", &frame)
    }

    pub async fn multi_set(&self, pairs: &[KvPair<Argument>]) -> Result<bool> {
        let args = commands::flatten_pairs(
            pairs
                .iter()
                .map(|pair| (pair.key.as_str(), pair.value.clone())),
        );
        let frame = self.execute("multi_set", &args).await?;
        commands::ack("multi_set", &frame)
    }

    /// Returns the pairs that exist; missing keys are left out.
    pub async fn multi_get<K: AsRef<str>>(&self, keys: &[K]) -> Result<Vec<KvPair<Bytes>>> {
        let frame = self
            .execute("multi_get", &[commands::text_seq(keys)])
            .await?;
        commands::pairs("multi_get", &frame)
    }

    pub async fn multi_del<K: AsRef<str>>(&self, keys: &[K]) -> Result<bool> {
        let frame = self
            .execute("multi_del", &[commands::text_seq(keys)])
            .await?;
        commands::ack("multi_del", &frame)
    }
}

use bytes::Bytes;

use crate::argument::Argument;
use crate::client::Client;
use crate::commands::{self, KvPair};
use crate::Result;

impl Client {
    pub async fn hset(
        &self,
        name: &str,
        field: &str,
        value: impl Into<Argument>,
    ) -> Result<bool> {
        let frame = self
            .execute("hset", &[name.into(), field.into(), value.into()])
            .await?;
        commands::ack("hset", &frame)
    }

    pub async fn hget(&self, name: &str, field: &str) -> Result<Option<Bytes>> {
        let frame = self.execute("hget", &[name.into(), field.into()]).await?;
        commands::optional_value("hget", &frame)
    }

    pub async fn hdel(&self, name: &str, field: &str) -> Result<bool> {
        let frame = self.execute("hdel", &[name.into(), field.into()]).await?;
        commands::ack("hdel", &frame)
    }

    pub async fn hincr(&self, name: &str, field: &str, by: i64) -> Result<i64> {
        let frame = self
            .execute("hincr", &[name.into(), field.into(), by.into()])
            .await?;
        commands::int("hincr", &frame)
    }

    pub async fn hdecr(&self, name: &str, field: &str, by: i64) -> Result<i64> {
        let frame = self
            .execute("hdecr", &[name.into(), field.into(), by.into()])
            .await?;
        commands::int("hdecr", &frame)
    }

    pub async fn hexists(&self, name: &str, field: &str) -> Result<bool> {
        let frame = self.execute("hexists", &[name.into(), field.into()]).await?;
        commands::flag("hexists", &frame)
    }

    pub async fn hsize(&self, name: &str) -> Result<i64> {
        let frame = self.execute("hsize", &[name.into()]).await?;
        commands::int("hsize", &frame)
    }

    /// Names of the hashes in `(start, end]`.
    pub async fn hlist(&self, start: &str, end: &str, limit: u32) -> Result<Vec<String>> {
        let frame = self
            .execute("hlist", &[start.into(), end.into(), limit.into()])
            .await?;
        commands::string_list("hlist", &frame)
    }

    pub async fn hkeys(
        &self,
        name: &str,
        start: &str,
        end: &str,
        limit: u32,
    ) -> Result<Vec<String>> {
        let frame = self
            .execute(
                "hkeys",
                &[name.into(), start.into(), end.into(), limit.into()],
            )
            .await?;
        commands::string_list("hkeys", &frame)
    }

    pub async fn hscan(
        &self,
        name: &str,
        start: &str,
        end: &str,
        limit: u32,
    ) -> Result<Vec<KvPair<Bytes>>> {
        let frame = self
            .execute(
                "hscan",
                &[name.into(), start.into(), end.into(), limit.into()],
            )
            .await?;
        commands::pairs("hscan", &frame)
    }

    /// Like [`hscan`](Client::hscan), in reverse field order.
    pub async fn hrscan(
        &self,
        name: &str,
        start: &str,
        end: &str,
        limit: u32,
    ) -> Result<Vec<KvPair<Bytes>>> {
        let frame = self
            .execute(
                "hrscan",
                &[name.into(), start.into(), end.into(), limit.into()],
            )
            .await?;
        commands::pairs("hrscan", &frame)
    }

    pub async fn hclear(&self, name: &str) -> Result<bool> {
        let frame = self.execute("hclear", &[name.into()]).await?;
        commands::ack("hclear", &frame)
    }

    pub async fn multi_hset(&self, name: &str, fields: &[KvPair<Argument>]) -> Result<bool> {
        commands::require_some("multi_hset", fields)?;

        let mut args = vec![Argument::from(name)];
        args.extend(commands::flatten_pairs(
            fields
                .iter()
                .map(|pair| (pair.key.as_str(), pair.value.clone())),
        ));
        let frame = self.execute("multi_hset", &args).await?;
        commands::ack("multi_hset", &frame)
    }

    pub async fn multi_hget<K: AsRef<str>>(
        &self,
        name: &str,
        fields: &[K],
    ) -> Result<Vec<KvPair<Bytes>>> {
        commands::require_some("multi_hget", fields)?;

        let frame = self
            .execute("multi_hget", &[name.into(), commands::text_seq(fields)])
            .await?;
        commands::pairs("multi_hget", &frame)
    }

    pub async fn multi_hdel<K: AsRef<str>>(&self, name: &str, fields: &[K]) -> Result<bool> {
        commands::require_some("multi_hdel", fields)?;

        let frame = self
            .execute("multi_hdel", &[name.into(), commands::text_seq(fields)])
            .await?;
        commands::ack("multi_hdel", &frame)
    }
}

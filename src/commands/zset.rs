use crate::argument::Argument;
use crate::client::Client;
use crate::commands::{self, KvPair};
use crate::Result;

/// Sorted sets. Scores are integers; a member's score comes back as a `KvPair<i64>`.
impl Client {
    pub async fn zset(&self, name: &str, member: &str, score: i64) -> Result<bool> {
        let frame = self
            .execute("zset", &[name.into(), member.into(), score.into()])
            .await?;
        commands::ack("zset", &frame)
    }

    pub async fn zget(&self, name: &str, member: &str) -> Result<Option<i64>> {
        let frame = self.execute("zget", &[name.into(), member.into()]).await?;
        commands::optional_int("zget", &frame)
    }

    pub async fn zdel(&self, name: &str, member: &str) -> Result<bool> {
        let frame = self.execute("zdel", &[name.into(), member.into()]).await?;
        commands::ack("zdel", &frame)
    }

    pub async fn zincr(&self, name: &str, member: &str, by: i64) -> Result<i64> {
        let frame = self
            .execute("zincr", &[name.into(), member.into(), by.into()])
            .await?;
        commands::int("zincr", &frame)
    }

    pub async fn zsize(&self, name: &str) -> Result<i64> {
        let frame = self.execute("zsize", &[name.into()]).await?;
        commands::int("zsize", &frame)
    }

    pub async fn zexists(&self, name: &str, member: &str) -> Result<bool> {
        let frame = self.execute("zexists", &[name.into(), member.into()]).await?;
        commands::flag("zexists", &frame)
    }

    pub async fn zlist(&self, start: &str, end: &str, limit: u32) -> Result<Vec<String>> {
        let frame = self
            .execute("zlist", &[start.into(), end.into(), limit.into()])
            .await?;
        commands::string_list("zlist", &frame)
    }

    /// Members after `start` whose score lies in `[score_start, score_end]`. An open bound is
    /// sent as an empty field.
    pub async fn zkeys(
        &self,
        name: &str,
        start: &str,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: u32,
    ) -> Result<Vec<String>> {
        let args = range_args(name, start, score_start, score_end, limit);
        let frame = self.execute("zkeys", &args).await?;
        commands::string_list("zkeys", &frame)
    }

    pub async fn zscan(
        &self,
        name: &str,
        start: &str,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: u32,
    ) -> Result<Vec<KvPair<i64>>> {
        let args = range_args(name, start, score_start, score_end, limit);
        let frame = self.execute("zscan", &args).await?;
        commands::scored_pairs("zscan", &frame)
    }

    pub async fn zrscan(
        &self,
        name: &str,
        start: &str,
        score_start: Option<i64>,
        score_end: Option<i64>,
        limit: u32,
    ) -> Result<Vec<KvPair<i64>>> {
        let args = range_args(name, start, score_start, score_end, limit);
        let frame = self.execute("zrscan", &args).await?;
        commands::scored_pairs("zrscan", &frame)
    }

    pub async fn zrank(&self, name: &str, member: &str) -> Result<i64> {
        let frame = self.execute("zrank", &[name.into(), member.into()]).await?;
        commands::int("zrank", &frame)
    }

    pub async fn zrrank(&self, name: &str, member: &str) -> Result<i64> {
        let frame = self.execute("zrrank", &[name.into(), member.into()]).await?;
        commands::int("zrrank", &frame)
    }

    pub async fn zrange(
        &self,
        name: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<KvPair<i64>>> {
        let frame = self
            .execute("zrange", &[name.into(), offset.into(), limit.into()])
            .await?;
        commands::scored_pairs("zrange", &frame)
    }

    pub async fn zrrange(
        &self,
        name: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<KvPair<i64>>> {
        let frame = self
            .execute("zrrange", &[name.into(), offset.into(), limit.into()])
            .await?;
        commands::scored_pairs("zrrange", &frame)
    }

    pub async fn zclear(&self, name: &str) -> Result<bool> {
        let frame = self.execute("zclear", &[name.into()]).await?;
        commands::ack("zclear", &frame)
    }

    pub async fn multi_zset(&self, name: &str, members: &[KvPair<i64>]) -> Result<bool> {
        commands::require_some("multi_zset", members)?;

        let mut args = vec![Argument::from(name)];
        args.extend(commands::flatten_pairs(
            members.iter().map(|pair| (pair.key.as_str(), pair.value)),
        ));
        let frame = self.execute("multi_zset", &args).await?;
        commands::ack("multi_zset", &frame)
    }

    pub async fn multi_zget<K: AsRef<str>>(
        &self,
        name: &str,
        members: &[K],
    ) -> Result<Vec<KvPair<i64>>> {
        commands::require_some("multi_zget", members)?;

        let frame = self
            .execute("multi_zget", &[name.into(), commands::text_seq(members)])
            .await?;
        commands::scored_pairs("multi_zget", &frame)
    }

    pub async fn multi_zdel<K: AsRef<str>>(&self, name: &str, members: &[K]) -> Result<bool> {
        commands::require_some("multi_zdel", members)?;

        let frame = self
            .execute("multi_zdel", &[name.into(), commands::text_seq(members)])
            .await?;
        commands::ack("multi_zdel", &frame)
    }
}

fn range_args(
    name: &str,
    start: &str,
    score_start: Option<i64>,
    score_end: Option<i64>,
    limit: u32,
) -> [Argument; 5] {
    [
        name.into(),
        start.into(),
        score_start.into(),
        score_end.into(),
        limit.into(),
    ]
}

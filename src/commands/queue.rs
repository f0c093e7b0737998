use bytes::Bytes;

use crate::argument::Argument;
use crate::client::Client;
use crate::commands;
use crate::Result;

/// Lists used as double-ended queues.
impl Client {
    pub async fn qsize(&self, name: &str) -> Result<i64> {
        let frame = self.execute("qsize", &[name.into()]).await?;
        commands::int("qsize", &frame)
    }

    pub async fn qclear(&self, name: &str) -> Result<bool> {
        let frame = self.execute("qclear", &[name.into()]).await?;
        commands::ack("qclear", &frame)
    }

    pub async fn qfront(&self, name: &str) -> Result<Option<Bytes>> {
        let frame = self.execute("qfront", &[name.into()]).await?;
        commands::optional_value("qfront", &frame)
    }

    pub async fn qback(&self, name: &str) -> Result<Option<Bytes>> {
        let frame = self.execute("qback", &[name.into()]).await?;
        commands::optional_value("qback", &frame)
    }

    /// Item at `index`; negative indexes count from the back.
    pub async fn qget(&self, name: &str, index: i64) -> Result<Option<Bytes>> {
        let frame = self.execute("qget", &[name.into(), index.into()]).await?;
        commands::optional_value("qget", &frame)
    }

    pub async fn qslice(&self, name: &str, begin: i64, end: i64) -> Result<Vec<Bytes>> {
        let frame = self
            .execute("qslice", &[name.into(), begin.into(), end.into()])
            .await?;
        commands::list("qslice", &frame)
    }

    pub async fn qpush(&self, name: &str, item: impl Into<Argument>) -> Result<bool> {
        self.qpush_back(name, item).await
    }

    pub async fn qpush_front(&self, name: &str, item: impl Into<Argument>) -> Result<bool> {
        let frame = self
            .execute("qpush_front", &[name.into(), item.into()])
            .await?;
        commands::ack("qpush_front", &frame)
    }

    pub async fn qpush_back(&self, name: &str, item: impl Into<Argument>) -> Result<bool> {
        let frame = self
            .execute("qpush_back", &[name.into(), item.into()])
            .await?;
        commands::ack("qpush_back", &frame)
    }

    pub async fn qpop(&self, name: &str) -> Result<Option<Bytes>> {
        self.qpop_front(name).await
    }

    pub async fn qpop_front(&self, name: &str) -> Result<Option<Bytes>> {
        let frame = self.execute("qpop_front", &[name.into()]).await?;
        commands::optional_value("qpop_front", &frame)
    }

    pub async fn qpop_back(&self, name: &str) -> Result<Option<Bytes>> {
        let frame = self.execute("qpop_back", &[name.into()]).await?;
        commands::optional_value("qpop_back", &frame)
    }
}

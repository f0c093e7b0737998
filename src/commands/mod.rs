//! Typed operations on top of [`Client::execute`](crate::Client::execute).
//!
//! Every method is a command name, an argument list and a rule for turning the reply frame into
//! a value. The helpers in this module implement the rules shared by all of them:
//!
//! * `ok` followed by the expected number of fields is a success;
//! * `not_found` is a logical absence for lookups;
//! * any other status is reported as [`Error::Server`];
//! * a success with the wrong number of fields, or with a number that doesn't parse, is reported
//!   as [`Error::BadResponse`].
//!
//! Replies are never retried here: only transport failures are, by the client itself.

pub mod hash;
pub mod queue;
pub mod strings;
pub mod zset;

use std::str::{self, FromStr};

use bytes::Bytes;
use itertools::Itertools;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::argument::Argument;
use crate::frame::Frame;
use crate::{Error, Result};

/// Status tokens understood by the typed operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    Ok,
    NotFound,
    Error,
    Fail,
    ClientError,
}

/// A key and its value, the unit of bulk reads and writes.
#[derive(Clone, Debug, PartialEq)]
pub struct KvPair<V> {
    pub key: String,
    pub value: V,
}

impl<V> KvPair<V> {
    pub fn new(key: impl Into<String>, value: V) -> KvPair<V> {
        KvPair {
            key: key.into(),
            value,
        }
    }
}

impl<K: Into<String>, V: Into<Argument>> From<(K, V)> for KvPair<Argument> {
    fn from((key, value): (K, V)) -> Self {
        KvPair::new(key, value.into())
    }
}

/// Splits a reply into its status and payload, rejecting anything that isn't `ok` or
/// `not_found`.
fn status<'a>(command: &str, frame: &'a Frame) -> Result<(Status, &'a [Bytes])> {
    let raw = frame
        .status()
        .ok_or_else(|| Error::bad_response(command, "empty reply"))?;

    match str::from_utf8(raw).ok().and_then(|s| Status::from_str(s).ok()) {
        Some(status @ (Status::Ok | Status::NotFound)) => Ok((status, frame.payload())),
        _ => Err(Error::Server {
            command: command.to_string(),
            status: String::from_utf8_lossy(raw).into_owned(),
            detail: frame
                .payload()
                .first()
                .map(|detail| String::from_utf8_lossy(detail).into_owned()),
        }),
    }
}

fn expect_ok<'a>(command: &str, frame: &'a Frame) -> Result<&'a [Bytes]> {
    match status(command, frame)? {
        (Status::Ok, payload) => Ok(payload),
        (status, _) => Err(Error::Server {
            command: command.to_string(),
            status: status.to_string(),
            detail: None,
        }),
    }
}

/// `ok` with any payload.
pub(crate) fn ack(command: &str, frame: &Frame) -> Result<bool> {
    expect_ok(command, frame).map(|_| true)
}

/// `ok` with exactly one field.
pub(crate) fn value(command: &str, frame: &Frame) -> Result<Bytes> {
    match expect_ok(command, frame)? {
        [value] => Ok(value.clone()),
        payload => Err(arity(command, 1, payload.len())),
    }
}

/// `ok` with one field, or `not_found`.
pub(crate) fn optional_value(command: &str, frame: &Frame) -> Result<Option<Bytes>> {
    match status(command, frame)? {
        (Status::NotFound, _) => Ok(None),
        (_, [value]) => Ok(Some(value.clone())),
        (_, payload) => Err(arity(command, 1, payload.len())),
    }
}

pub(crate) fn int(command: &str, frame: &Frame) -> Result<i64> {
    parse_int(command, &value(command, frame)?)
}

pub(crate) fn optional_int(command: &str, frame: &Frame) -> Result<Option<i64>> {
    optional_value(command, frame)?
        .map(|value| parse_int(command, &value))
        .transpose()
}

/// `ok` with a single `0`/`1` field. A bare `ok` counts as true.
pub(crate) fn flag(command: &str, frame: &Frame) -> Result<bool> {
    match expect_ok(command, frame)? {
        [] => Ok(true),
        [value] => Ok(parse_int(command, value)? != 0),
        payload => Err(arity(command, 1, payload.len())),
    }
}

/// `ok` followed by any number of fields.
pub(crate) fn list(command: &str, frame: &Frame) -> Result<Vec<Bytes>> {
    expect_ok(command, frame).map(<[Bytes]>::to_vec)
}

pub(crate) fn string_list(command: &str, frame: &Frame) -> Result<Vec<String>> {
    expect_ok(command, frame)?
        .iter()
        .map(|field| text(command, field))
        .collect()
}

/// `ok` followed by key/value pairs. `not_found` is an empty result.
pub(crate) fn pairs(command: &str, frame: &Frame) -> Result<Vec<KvPair<Bytes>>> {
    let payload = match status(command, frame)? {
        (Status::NotFound, _) => return Ok(Vec::new()),
        (_, payload) => payload,
    };
    if payload.len() % 2 != 0 {
        return Err(Error::bad_response(
            command,
            format!("expected key/value pairs, got {} fields", payload.len()),
        ));
    }

    payload
        .iter()
        .tuples()
        .map(|(key, value)| Ok(KvPair::new(text(command, key)?, value.clone())))
        .collect()
}

/// Key/value pairs whose values are integers, e.g. sorted-set scores.
pub(crate) fn scored_pairs(command: &str, frame: &Frame) -> Result<Vec<KvPair<i64>>> {
    pairs(command, frame)?
        .into_iter()
        .map(|pair| Ok(KvPair::new(pair.key, parse_int(command, &pair.value)?)))
        .collect()
}

fn text(command: &str, field: &[u8]) -> Result<String> {
    String::from_utf8(field.to_vec())
        .map_err(|_| Error::bad_response(command, "field is not valid UTF-8"))
}

fn parse_int(command: &str, field: &[u8]) -> Result<i64> {
    str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            Error::bad_response(
                command,
                format!("expected an integer, got {:?}", String::from_utf8_lossy(field)),
            )
        })
}

fn arity(command: &str, expected: usize, actual: usize) -> Error {
    Error::bad_response(
        command,
        format!("expected {expected} payload field(s), got {actual}"),
    )
}

/// Builds `[key, value, key, value, ...]` for the multi-write commands.
pub(crate) fn flatten_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Vec<Argument>
where
    K: Into<Argument>,
    V: Into<Argument>,
{
    pairs
        .into_iter()
        .flat_map(|(key, value)| [key.into(), value.into()])
        .collect()
}

pub(crate) fn text_seq<K: AsRef<str>>(items: &[K]) -> Argument {
    Argument::TextSeq(items.iter().map(|item| item.as_ref().to_string()).collect())
}

pub(crate) fn require_some<T>(command: &str, items: &[T]) -> Result<()> {
    if items.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "`{command}` needs at least one item"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(fields: &[&str]) -> Frame {
        Frame::new(fields.iter().map(|f| Bytes::from(f.to_string())).collect())
    }

    #[test]
    fn status_tokens() {
        assert_eq!(Status::from_str("not_found"), Ok(Status::NotFound));
        assert_eq!(Status::ClientError.as_ref(), "client_error");
        assert!(Status::from_str("OK").is_err());
    }

    #[test]
    fn ack_accepts_bare_ok() {
        assert!(ack("set", &frame(&["ok"])).unwrap());
        assert!(ack("set", &frame(&["ok", "1"])).unwrap());
    }

    #[test]
    fn value_and_absence() {
        assert_eq!(
            optional_value("get", &frame(&["ok", "v"])).unwrap(),
            Some(Bytes::from("v"))
        );
        assert_eq!(optional_value("get", &frame(&["not_found"])).unwrap(), None);
    }

    #[test]
    fn value_arity_is_enforced() {
        let err = optional_value("get", &frame(&["ok"])).unwrap_err();
        assert!(matches!(err, Error::BadResponse { .. }));

        let err = value("qfront", &frame(&["ok", "a", "b"])).unwrap_err();
        assert!(matches!(err, Error::BadResponse { .. }));
    }

    #[test]
    fn not_found_is_an_error_where_a_value_is_required() {
        let err = value("qfront", &frame(&["not_found"])).unwrap_err();

        assert!(matches!(err, Error::Server { ref status, .. } if status == "not_found"));
    }

    #[test]
    fn unknown_status_is_a_server_error() {
        let err = ack("set", &frame(&["client_error", "wrong number of arguments"])).unwrap_err();

        match err {
            Error::Server {
                command,
                status,
                detail,
            } => {
                assert_eq!(command, "set");
                assert_eq!(status, "client_error");
                assert_eq!(detail.as_deref(), Some("wrong number of arguments"));
            }
            err => panic!("unexpected error {err:?}"),
        }
    }

    #[test]
    fn empty_reply_is_a_bad_response() {
        let err = ack("set", &Frame::default()).unwrap_err();

        assert!(matches!(err, Error::BadResponse { .. }));
    }

    #[test]
    fn integers() {
        assert_eq!(int("incr", &frame(&["ok", "-3"])).unwrap(), -3);
        assert!(matches!(
            int("incr", &frame(&["ok", "three"])),
            Err(Error::BadResponse { .. })
        ));
        assert_eq!(optional_int("zget", &frame(&["not_found"])).unwrap(), None);
    }

    #[test]
    fn flags() {
        assert!(flag("exists", &frame(&["ok", "1"])).unwrap());
        assert!(!flag("exists", &frame(&["ok", "0"])).unwrap());
        assert!(flag("exists", &frame(&["ok"])).unwrap());
    }

    #[test]
    fn key_value_pairs() {
        let actual = pairs("multi_get", &frame(&["ok", "a", "1", "b", "2"])).unwrap();

        assert_eq!(
            actual,
            vec![
                KvPair::new("a", Bytes::from("1")),
                KvPair::new("b", Bytes::from("2"))
            ]
        );
        assert!(pairs("multi_get", &frame(&["not_found"])).unwrap().is_empty());
        assert!(matches!(
            pairs("multi_get", &frame(&["ok", "a"])),
            Err(Error::BadResponse { .. })
        ));
    }

    #[test]
    fn scores() {
        let actual = scored_pairs("zscan", &frame(&["ok", "a", "10", "b", "-2"])).unwrap();

        assert_eq!(actual, vec![KvPair::new("a", 10i64), KvPair::new("b", -2i64)]);
    }

    #[test]
    fn flattening() {
        let args = flatten_pairs([("a", 1i64), ("b", 2i64)]);

        assert_eq!(
            args,
            vec![
                Argument::from("a"),
                Argument::Int(1),
                Argument::from("b"),
                Argument::Int(2)
            ]
        );
    }
}

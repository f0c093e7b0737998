use bytes::{BufMut, Bytes};

use crate::{Error, Result};

/// A single request argument.
///
/// The set of variants is closed: everything the protocol can carry is listed here, so the only
/// values the encoder can refuse are floats without a decimal representation.
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    Text(String),
    Bytes(Bytes),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Encodes as a zero-length field.
    Absent,
    /// Expanded in place into one field per element.
    TextSeq(Vec<String>),
}

impl Argument {
    /// Checks that the argument can be encoded without writing anything.
    pub fn validate(&self) -> Result<()> {
        match self {
            Argument::Float(value) if !value.is_finite() => Err(Error::InvalidArgument(format!(
                "float {value} has no decimal representation"
            ))),
            _ => Ok(()),
        }
    }

    /// Appends the wire form of the argument to `dst`.
    pub fn encode<B: BufMut>(&self, dst: &mut B) -> Result<()> {
        self.validate()?;

        match self {
            Argument::Text(text) => put_field(dst, text.as_bytes()),
            Argument::Bytes(bytes) => put_field(dst, bytes),
            Argument::Int(value) => put_field(dst, value.to_string().as_bytes()),
            Argument::Float(value) => put_field(dst, value.to_string().as_bytes()),
            Argument::Bool(true) => put_field(dst, b"1"),
            Argument::Bool(false) => put_field(dst, b"0"),
            Argument::Absent => put_field(dst, b""),
            Argument::TextSeq(items) => {
                for item in items {
                    put_field(dst, item.as_bytes());
                }
            }
        }

        Ok(())
    }
}

fn put_field<B: BufMut>(dst: &mut B, data: &[u8]) {
    dst.put_slice(data.len().to_string().as_bytes());
    dst.put_u8(b'\n');
    dst.put_slice(data);
    dst.put_u8(b'\n');
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Text(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Text(value)
    }
}

impl From<&String> for Argument {
    fn from(value: &String) -> Self {
        Argument::Text(value.clone())
    }
}

impl From<Bytes> for Argument {
    fn from(value: Bytes) -> Self {
        Argument::Bytes(value)
    }
}

impl From<&[u8]> for Argument {
    fn from(value: &[u8]) -> Self {
        Argument::Bytes(Bytes::copy_from_slice(value))
    }
}

impl From<Vec<u8>> for Argument {
    fn from(value: Vec<u8>) -> Self {
        Argument::Bytes(Bytes::from(value))
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Argument::Int(value)
    }
}

impl From<i32> for Argument {
    fn from(value: i32) -> Self {
        Argument::Int(value.into())
    }
}

impl From<u32> for Argument {
    fn from(value: u32) -> Self {
        Argument::Int(value.into())
    }
}

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Argument::Float(value)
    }
}

impl From<f32> for Argument {
    fn from(value: f32) -> Self {
        Argument::Float(value.into())
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Argument::Bool(value)
    }
}

impl From<Vec<String>> for Argument {
    fn from(value: Vec<String>) -> Self {
        Argument::TextSeq(value)
    }
}

impl From<Vec<&str>> for Argument {
    fn from(value: Vec<&str>) -> Self {
        Argument::TextSeq(value.into_iter().map(str::to_string).collect())
    }
}

impl<T: Into<Argument>> From<Option<T>> for Argument {
    fn from(value: Option<T>) -> Self {
        value.map_or(Argument::Absent, Into::into)
    }
}

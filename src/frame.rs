// Wire format: every field is `<length>\n<bytes>\n`, a blank line ends the frame.

use std::fmt;
use std::io::Cursor;

use bytes::Bytes;
use thiserror::Error as ThisError;

const LF: u8 = b'\n';
const CR: u8 = b'\r';

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("invalid length prefix {0:?}")]
    InvalidLength(String),
    #[error("field payload is not terminated by a newline")]
    MissingTerminator,
}

/// One decoded reply (or request): an ordered list of raw fields.
///
/// The first field of a reply is the status token, the rest is a payload whose meaning depends on
/// the command that produced it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    fields: Vec<Bytes>,
}

impl Frame {
    pub fn new(fields: Vec<Bytes>) -> Frame {
        Frame { fields }
    }

    pub fn fields(&self) -> &[Bytes] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<Bytes> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The status token, if the frame has any field at all.
    pub fn status(&self) -> Option<&[u8]> {
        self.fields.first().map(|field| &field[..])
    }

    /// Everything after the status token.
    pub fn payload(&self) -> &[Bytes] {
        self.fields.get(1..).unwrap_or_default()
    }

    /// Parses one frame starting at the cursor position.
    ///
    /// On success the cursor points right after the terminating blank line. On
    /// `Error::Incomplete` the caller must keep every byte and call again once more data has
    /// arrived; the parse restarts from the same position and reaches the same result.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Frame, Error> {
        let mut fields = Vec::new();

        loop {
            let line = get_line(src)?;

            if line.is_empty() || line == [CR] {
                if fields.is_empty() {
                    // Keep-alive, nothing decoded yet.
                    continue;
                }
                return Ok(Frame { fields });
            }

            let length = parse_length(line)?;
            let data = get_field(src, length)?;
            fields.push(Bytes::copy_from_slice(data));
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let size = self
            .fields
            .iter()
            .map(|field| field.len() + 22)
            .sum::<usize>();
        let mut bytes = Vec::with_capacity(size + 1);
        for field in &self.fields {
            bytes.extend_from_slice(field.len().to_string().as_bytes());
            bytes.push(LF);
            bytes.extend_from_slice(field);
            bytes.push(LF);
        }
        bytes.push(LF);
        bytes
    }
}

impl From<Vec<Bytes>> for Frame {
    fn from(fields: Vec<Bytes>) -> Self {
        Frame { fields }
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, field) in self.fields.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:?}", String::from_utf8_lossy(field))?;
        }
        write!(f, "]")
    }
}

/// Returns the bytes up to the next newline and moves the cursor past it.
fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let buf = *src.get_ref();

    let end = buf[start..]
        .iter()
        .position(|&byte| byte == LF)
        .map(|index| start + index)
        .ok_or(Error::Incomplete)?;

    src.set_position((end + 1) as u64);

    Ok(&buf[start..end])
}

/// Returns the next `length` bytes, which must be followed by a newline.
fn get_field<'a>(src: &mut Cursor<&'a [u8]>, length: usize) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let buf = *src.get_ref();

    let end = start.checked_add(length).ok_or(Error::Incomplete)?;
    if buf.len() <= end {
        return Err(Error::Incomplete);
    }
    if buf[end] != LF {
        return Err(Error::MissingTerminator);
    }

    src.set_position((end + 1) as u64);

    Ok(&buf[start..end])
}

fn parse_length(line: &[u8]) -> Result<usize, Error> {
    let invalid = || Error::InvalidLength(String::from_utf8_lossy(line).into_owned());

    if !line.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }

    std::str::from_utf8(line)
        .map_err(|_| invalid())?
        .parse::<usize>()
        .map_err(|_| invalid())
}

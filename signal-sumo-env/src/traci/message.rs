//! Encoding and decoding of TraCI messages.
use super::{constants::*, TraciError};

/// Builds the content of a command, or a whole message.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Constructs an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a byte.
    pub fn u8(mut self, v: u8) -> Self {
        self.buf.push(v);
        self
    }

    /// Appends a 4-byte integer.
    pub fn i32(mut self, v: i32) -> Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    /// Appends an 8-byte float.
    pub fn f64(mut self, v: f64) -> Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    /// Appends a string, prefixed by its length.
    pub fn string(mut self, v: &str) -> Self {
        self.buf.extend_from_slice(&(v.len() as i32).to_be_bytes());
        self.buf.extend_from_slice(v.as_bytes());
        self
    }

    /// Appends a list of strings, prefixed by its length.
    pub fn string_list<S: AsRef<str>>(self, vs: &[S]) -> Self {
        let mut w = self.i32(vs.len() as i32);
        for v in vs.iter() {
            w = w.string(v.as_ref());
        }
        w
    }

    /// Appends a value with its type tag.
    pub fn value(self, v: &Value) -> Self {
        match v {
            Value::Int(i) => self.u8(TYPE_INTEGER).i32(*i),
            Value::Double(d) => self.u8(TYPE_DOUBLE).f64(*d),
            Value::String(s) => self.u8(TYPE_STRING).string(s),
            Value::StringList(l) => self.u8(TYPE_STRINGLIST).string_list(l.as_slice()),
        }
    }

    /// Appends a command with the given id and content, using the extended length
    /// field when the command is longer than 255 bytes.
    pub fn command(mut self, id: u8, content: &[u8]) -> Self {
        let len = content.len() + 2;
        if len <= u8::MAX as usize {
            self.buf.push(len as u8);
        } else {
            self.buf.push(0);
            self.buf.extend_from_slice(&((len + 4) as i32).to_be_bytes());
        }
        self.buf.push(id);
        self.buf.extend_from_slice(content);
        self
    }

    /// Bytes written so far.
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Wraps the written commands into a message by prefixing the total length.
    pub fn into_message(self) -> Vec<u8> {
        let mut msg = Vec::with_capacity(self.buf.len() + 4);
        msg.extend_from_slice(&((self.buf.len() + 4) as i32).to_be_bytes());
        msg.extend_from_slice(&self.buf);
        msg
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// A typed value of a variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer.
    Int(i32),

    /// Double.
    Double(f64),

    /// String.
    String(String),

    /// List of strings.
    StringList(Vec<String>),
}

/// Reads a received message. The length prefix of the message is not part of it.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Constructs a reader at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Whether everything has been read.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], TraciError> {
        let end = self.pos + n;
        if end > self.buf.len() {
            return Err(TraciError::Truncated);
        }
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Reads a byte.
    pub fn u8(&mut self) -> Result<u8, TraciError> {
        Ok(self.take(1)?[0])
    }

    /// Reads a 4-byte integer.
    pub fn i32(&mut self) -> Result<i32, TraciError> {
        let mut b = [0u8; 4];
        b.copy_from_slice(self.take(4)?);
        Ok(i32::from_be_bytes(b))
    }

    /// Reads an 8-byte float.
    pub fn f64(&mut self) -> Result<f64, TraciError> {
        let mut b = [0u8; 8];
        b.copy_from_slice(self.take(8)?);
        Ok(f64::from_be_bytes(b))
    }

    /// Reads a length-prefixed string.
    pub fn string(&mut self) -> Result<String, TraciError> {
        let len = self.i32()?.max(0) as usize;
        Ok(String::from_utf8_lossy(self.take(len)?).into_owned())
    }

    /// Reads a length-prefixed list of strings.
    pub fn string_list(&mut self) -> Result<Vec<String>, TraciError> {
        let n = self.i32()?.max(0) as usize;
        (0..n).map(|_| self.string()).collect()
    }

    /// Reads a value preceded by its type tag.
    pub fn value(&mut self) -> Result<Value, TraciError> {
        match self.u8()? {
            TYPE_INTEGER => Ok(Value::Int(self.i32()?)),
            TYPE_DOUBLE => Ok(Value::Double(self.f64()?)),
            TYPE_STRING => Ok(Value::String(self.string()?)),
            TYPE_STRINGLIST => Ok(Value::StringList(self.string_list()?)),
            got => Err(TraciError::UnexpectedType {
                expected: TYPE_STRINGLIST,
                got,
            }),
        }
    }

    /// Reads the header of a command and returns its id and the length of its content.
    pub fn command_header(&mut self) -> Result<(u8, usize), TraciError> {
        let len = self.u8()? as usize;
        if len == 0 {
            let len = self.i32()?.max(6) as usize;
            Ok((self.u8()?, len - 6))
        } else {
            Ok((self.u8()?, len.max(2) - 2))
        }
    }

    /// Reads the status command answering `command`.
    pub fn status(&mut self, command: u8) -> Result<(), TraciError> {
        let (id, _) = self.command_header()?;
        let result = self.u8()?;
        let description = self.string()?;
        if id != command {
            return Err(TraciError::UnexpectedResponse {
                expected: command,
                got: id,
            });
        }
        match result {
            RTYPE_OK => Ok(()),
            _ => Err(TraciError::Status {
                command,
                result,
                description,
            }),
        }
    }
}

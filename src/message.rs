//! SSH binary encoding (RFC 4251 "5. Data Type Representations Used in the SSH Protocols").
//!
//! A `Message` is an append-only buffer with a read cursor. Fields are written and read back in
//! order; there is no framing beyond what the individual field types carry.

use error::KeyError;

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use openssl::bn::{BigNum, BigNumRef};

use std::fmt;

/// A buffer of SSH wire-encoded fields.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Message {
    buf: Vec<u8>,
    /// Read cursor into `buf`.
    pos: usize,
}

impl Message {
    /// Creates an empty message, ready for appending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps already encoded bytes. The read cursor starts at the first byte.
    pub fn from_bytes<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Message {
            buf: bytes.into(),
            pos: 0,
        }
    }

    /// Returns the complete encoded contents, independent of the read cursor.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns the bytes that have not been read yet.
    pub fn remaining(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    /// Moves the read cursor back to the start.
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    pub fn add_u32(&mut self, value: u32) -> &mut Self {
        let mut be = [0; 4];
        BigEndian::write_u32(&mut be, value);
        self.buf.extend_from_slice(&be);
        self
    }

    /// Appends a `string`: a `u32` length followed by the raw bytes.
    pub fn add_string<S: AsRef<[u8]>>(&mut self, string: S) -> &mut Self {
        let string = string.as_ref();
        self.add_u32(string.len() as u32);
        self.buf.extend_from_slice(string);
        self
    }

    /// Appends a non-negative `mpint`.
    ///
    /// The value is stored big-endian with as few bytes as possible. If the most significant bit
    /// of the first byte is set, a zero byte is prepended so the value doesn't read as negative.
    /// Zero is encoded as an empty string.
    pub fn add_mpint(&mut self, n: &BigNumRef) -> &mut Self {
        debug_assert!(!n.is_negative(), "negative mpints are not supported");

        let bytes = n.to_vec();
        if bytes.first().map_or(false, |b| b & 0x80 != 0) {
            self.add_u32(bytes.len() as u32 + 1);
            self.buf.push(0);
            self.buf.extend_from_slice(&bytes);
        } else {
            self.add_string(&bytes);
        }
        self
    }

    pub fn get_u32(&mut self) -> Result<u32, KeyError> {
        let value = self.remaining()
            .read_u32::<BigEndian>()
            .map_err(|_| KeyError::invalid("truncated length field"))?;
        self.pos += 4;
        Ok(value)
    }

    /// Reads a `string` field as raw bytes.
    ///
    /// Fails if the length prefix points past the end of the message.
    pub fn get_binary(&mut self) -> Result<Vec<u8>, KeyError> {
        let len = self.get_u32()? as usize;
        if len > self.remaining().len() {
            return Err(KeyError::invalid(format!(
                "string of {} bytes exceeds the {} remaining",
                len,
                self.remaining().len()
            )));
        }

        let start = self.pos;
        self.pos += len;
        Ok(self.buf[start..self.pos].to_vec())
    }

    /// Reads a `string` field that must be valid UTF-8.
    pub fn get_text(&mut self) -> Result<String, KeyError> {
        String::from_utf8(self.get_binary()?)
            .map_err(|e| KeyError::invalid(format!("string is not UTF-8: {}", e)))
    }

    /// Reads an `mpint` field.
    ///
    /// Negative values are rejected, since every number we decode (RSA exponents and moduli) is
    /// positive.
    pub fn get_mpint(&mut self) -> Result<BigNum, KeyError> {
        let bytes = self.get_binary()?;
        if bytes.first().map_or(false, |b| b & 0x80 != 0) {
            return Err(KeyError::invalid("negative mpint"));
        }

        Ok(BigNum::from_slice(&bytes)?)
    }
}

impl From<Vec<u8>> for Message {
    fn from(bytes: Vec<u8>) -> Self {
        Message::from_bytes(bytes)
    }
}

impl<'a> From<&'a [u8]> for Message {
    fn from(bytes: &'a [u8]) -> Self {
        Message::from_bytes(bytes)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Message")
            .field("len", &self.buf.len())
            .field("pos", &self.pos)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mpint_bytes(hex: &str) -> Vec<u8> {
        let n = BigNum::from_hex_str(hex).unwrap();
        let mut msg = Message::new();
        msg.add_mpint(&n);
        msg.into_bytes()
    }

    #[test]
    fn mpint_examples() {
        // RFC 4251, section 5
        assert_eq!(mpint_bytes("0"), [0, 0, 0, 0]);
        assert_eq!(
            mpint_bytes("9a378f9b2e332a7"),
            [0, 0, 0, 8, 0x09, 0xa3, 0x78, 0xf9, 0xb2, 0xe3, 0x32, 0xa7]
        );
        assert_eq!(mpint_bytes("80"), [0, 0, 0, 2, 0x00, 0x80]);
        assert_eq!(mpint_bytes("7f"), [0, 0, 0, 1, 0x7f]);
    }

    #[test]
    fn reads_fields_in_order() {
        let mut msg = Message::new();
        msg.add_string("ssh-rsa")
            .add_mpint(&BigNum::from_u32(65537).unwrap())
            .add_u32(7);

        let mut msg = Message::from_bytes(msg.into_bytes());
        assert_eq!(msg.get_text().unwrap(), "ssh-rsa");
        assert_eq!(msg.get_mpint().unwrap(), BigNum::from_u32(65537).unwrap());
        assert_eq!(msg.get_u32().unwrap(), 7);
        assert!(msg.remaining().is_empty());

        msg.rewind();
        assert_eq!(msg.get_binary().unwrap(), b"ssh-rsa");
    }

    #[test]
    fn zero_mpint_decodes() {
        let mut msg = Message::from_bytes(vec![0, 0, 0, 0]);
        assert_eq!(msg.get_mpint().unwrap(), BigNum::new().unwrap());
    }

    #[test]
    fn rejects_truncated_fields() {
        let mut msg = Message::from_bytes(vec![0, 0, 0]);
        match msg.get_u32() {
            Err(KeyError::InvalidKey(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }

        // length says 8, only 3 bytes follow
        let mut msg = Message::from_bytes(vec![0, 0, 0, 8, 1, 2, 3]);
        match msg.get_binary() {
            Err(KeyError::InvalidKey(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }

        let mut msg = Message::from_bytes(vec![0, 0, 0, 2, 0x01]);
        assert!(msg.get_mpint().is_err());
    }

    #[test]
    fn rejects_negative_mpint() {
        let mut msg = Message::from_bytes(vec![0, 0, 0, 1, 0xff]);
        match msg.get_mpint() {
            Err(KeyError::InvalidKey(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn rejects_non_utf8_text() {
        let mut msg = Message::new();
        msg.add_string(&[0xff, 0xfe][..]);
        msg.rewind();
        assert!(msg.get_text().is_err());
    }
}

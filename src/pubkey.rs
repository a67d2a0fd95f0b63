//! Utility for working with `.pub` SSH pubkey files

use error::KeyError;
use key::RsaKey;

use base64;

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// The contents of an OpenSSH public key file: `ssh-rsa <base64 blob> [comment]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyFile {
    pub key: RsaKey,
    /// Comment associated with the key. The last part of a `.pub` file, may be empty.
    pub comment: String,
}

impl PublicKeyFile {
    pub fn new<S: Into<String>>(key: RsaKey, comment: S) -> Self {
        PublicKeyFile {
            key,
            comment: comment.into(),
        }
    }

    /// Parses a single public key line.
    ///
    /// The key type before the blob must agree with the type stored inside of it.
    pub fn parse(line: &str) -> Result<Self, KeyError> {
        let mut split = line.trim().splitn(3, char::is_whitespace);
        let key_type = split.next().unwrap_or("");
        let data_encoded = split.next()
            .ok_or_else(|| KeyError::invalid("no pubkey data blob found"))?;
        let comment = split.next().unwrap_or("").trim().to_string();

        let blob = base64::decode(data_encoded.trim())
            .map_err(|e| KeyError::invalid(format!("pubkey blob is not base64: {}", e)))?;
        let key = RsaKey::from_blob(&blob)?;
        if key_type != key.name() {
            return Err(KeyError::invalid(format!(
                "key type '{}' does not match blob of type '{}'",
                key_type,
                key.name()
            )));
        }

        Ok(PublicKeyFile { key, comment })
    }

    /// Reads the public key file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, KeyError> {
        let mut content = String::new();
        File::open(path)?.read_to_string(&mut content)?;
        Self::parse(&content)
    }

    /// Formats the key as a `.pub` line, without a trailing newline.
    pub fn to_line(&self) -> String {
        if self.comment.is_empty() {
            format!("{} {}", self.key.name(), self.key.base64())
        } else {
            format!("{} {} {}", self.key.name(), self.key.base64(), self.comment)
        }
    }

    /// Writes the key to `path` as a single line.
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), KeyError> {
        let mut file = File::create(path)?;
        writeln!(file, "{}", self.to_line())?;
        Ok(())
    }
}

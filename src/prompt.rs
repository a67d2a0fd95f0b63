//! GUI passphrase prompt using pinentry

use util::clear_slice_securely;

use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Command, Stdio};

/// A passphrase, wiped from memory when dropped.
pub struct Passphrase(Vec<u8>);

impl Passphrase {
    pub fn new<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Passphrase(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for Passphrase {
    fn drop(&mut self) {
        clear_slice_securely(&mut self.0);
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Passphrase(..)")
    }
}

/// Undoes the percent-escaping pinentry applies to `D` lines.
fn unescape(data: &str) -> Vec<u8> {
    let bytes = data.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = if bytes[i] == b'%' {
            data.get(i + 1..i + 3).and_then(|hex| u8::from_str_radix(hex, 16).ok())
        } else {
            None
        };

        match escaped {
            Some(byte) => {
                out.push(byte);
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    out
}

pub struct PasswordPrompt {
    description: String,
}

impl PasswordPrompt {
    pub fn new<S: Into<String>>(description: S) -> Self {
        PasswordPrompt {
            description: description.into(),
        }
    }

    /// Invokes the passphrase prompt.
    ///
    /// Returns `None` if the user cancelled the dialog.
    pub fn invoke(&self) -> io::Result<Option<Passphrase>> {
        let mut pinentry = Command::new("pinentry")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;

        // Configure pinentry
        {
            let mut pincmd = pinentry.stdin.take()
                .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "pinentry has no stdin"))?;
            writeln!(pincmd, "SETTITLE RSA key passphrase")?;
            writeln!(pincmd, "SETPROMPT Passphrase:")?;
            writeln!(pincmd, "SETDESC {}", self.description.replace('\n', " "))?;
            writeln!(pincmd, "GETPIN")?;
            writeln!(pincmd, "BYE")?;
        }

        let out = pinentry.stdout.take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "pinentry has no stdout"))?;

        // Read until we get an "ERR" or "D" line
        let mut passphrase = None;
        for line in BufReader::new(out).lines() {
            let line = line?;
            if line.starts_with("ERR ") {
                debug!("pinentry: {}", line);
                break;   // Abort!
            } else if line.starts_with("D ") {
                passphrase = Some(Passphrase::new(unescape(&line[2..])));
                break;
            }
        }

        // it may already have exited after `BYE`
        let _ = pinentry.kill();
        pinentry.wait()?;
        Ok(passphrase)
    }
}

//! The error type shared by all key operations.

use openssl::error::ErrorStack;

use std::io;

quick_error! {
    #[derive(Debug)]
    pub enum KeyError {
        /// Malformed key blob, wrong algorithm name or unparsable private key file.
        InvalidKey(msg: String) {
            display("invalid key: {}", msg)
        }
        /// No key source was handed to the builder.
        EmptyKey {
            display("key object may not be empty")
        }
        /// The private key file is encrypted, but no password was supplied.
        PasswordRequired {
            display("private key file is encrypted")
        }
        /// The operation needs private key material, but only the public key is known.
        NotPrivate {
            display("operation requires a private key")
        }
        InvalidBits(bits: u32) {
            display("unsupported RSA key size: {} bits", bits)
        }
        Ssl(err: ErrorStack) {
            from()
            display("openssl operation failed: {}", err)
            source(err)
        }
        Io(err: io::Error) {
            from()
            display("i/o error: {}", err)
            source(err)
        }
    }
}

impl KeyError {
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        KeyError::InvalidKey(msg.into())
    }
}

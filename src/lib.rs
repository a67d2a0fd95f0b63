//! SSH `ssh-rsa` keys.
//!
//! `RsaKey` represents either a public key or a complete key pair and converts between the SSH
//! public key blob format, PEM private key files and OpenSSH `.pub` lines. It also creates and
//! checks `ssh-rsa` signatures (PKCS#1 v1.5 over SHA-1).

#[macro_use]
extern crate log;
#[macro_use]
extern crate quick_error;
extern crate base64;
extern crate byteorder;
extern crate dirs;
extern crate openssl;

pub mod config;
pub mod error;
pub mod key;
pub mod message;
pub mod privkey;
pub mod prompt;
pub mod provider;
pub mod pubkey;
pub mod util;

pub use error::KeyError;
pub use key::{KeyBuilder, KeyData, PublicNumbers, RsaKey, SSH_RSA};
pub use message::Message;
pub use provider::{Openssl, Provider};

//! Provides the `ToolConfig` struct, which defines the behaviour of the `rsakey` command line
//! tool.

use prompt::Passphrase;

use dirs;

use std::env;
use std::path::PathBuf;

/// Environment variable holding the passphrase of the key file.
pub const PASSPHRASE_VAR: &str = "RSAKEY_PASSPHRASE";

/// Modulus size of generated keys unless configured otherwise.
pub const DEFAULT_BITS: u32 = 3072;

/// Configures the tool's behaviour
pub struct ToolConfig {
    /// The key file to operate on. Defaults to `~/.ssh/id_rsa`.
    pub key_path: PathBuf,
    /// Passphrase protecting the private key file. Taken from `RSAKEY_PASSPHRASE` if set.
    pub passphrase: Option<Passphrase>,
    /// If `true`, a missing passphrase is requested through pinentry.
    pub ask_passphrase: bool,
    /// Modulus size for `generate`.
    pub bits: u32,
    /// Comment written into generated `.pub` files.
    pub comment: String,
    pub debug: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        ToolConfig {
            key_path: default_key_path(),
            passphrase: None,
            ask_passphrase: false,
            bits: DEFAULT_BITS,
            comment: String::new(),
            debug: false,
        }
    }
}

impl ToolConfig {
    /// Creates the default configuration, with the passphrase taken from the environment.
    pub fn from_env() -> Self {
        let mut conf = ToolConfig::default();
        conf.passphrase = env::var(PASSPHRASE_VAR).ok().map(Passphrase::new);
        conf
    }

    /// The public key file belonging to `key_path`.
    pub fn public_key_path(&self) -> PathBuf {
        let mut path = self.key_path.clone().into_os_string();
        path.push(".pub");
        PathBuf::from(path)
    }
}

fn default_key_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".ssh")
        .join("id_rsa")
}

extern crate rsakey;

#[macro_use] extern crate clap;
#[macro_use] extern crate log;
extern crate base64;
extern crate env_logger;

use rsakey::config::ToolConfig;
use rsakey::prompt::{Passphrase, PasswordPrompt};
use rsakey::pubkey::PublicKeyFile;
use rsakey::util;
use rsakey::{KeyError, Message, RsaKey};

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use log::LevelFilter;

use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::{env, fs, process};

/// Processes command line arguments by overwriting parts of the `ToolConfig` that are specified
/// in `args`.
fn process_args(args: &ArgMatches, conf: &mut ToolConfig) -> Result<(), Box<dyn Error>> {
    if let Some(path) = args.value_of("file") {
        conf.key_path = PathBuf::from(path);
    }
    if let Some(bits) = args.value_of("bits") {
        conf.bits = bits.parse()?;
    }
    if let Some(comment) = args.value_of("comment") {
        conf.comment = comment.to_string();
    }
    conf.ask_passphrase |= args.is_present("ask_passphrase");
    conf.debug |= args.is_present("debug");

    Ok(())
}

fn init_logger(debug: bool) {
    let mut builder = env_logger::Builder::new();
    builder.format(|buf, record| {
        writeln!(buf, "[{}] {}: {}", record.level(), record.module_path().unwrap_or("?"), record.args())
    });

    let default_level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    builder.filter_level(default_level);

    if let Ok(s) = env::var("RUST_LOG") {
        builder.parse_filters(&s);
    }
    builder.init();
}

/// Returns the configured passphrase, asking for one if allowed to.
fn passphrase(conf: &mut ToolConfig, description: &str) -> Result<Option<Passphrase>, Box<dyn Error>> {
    if let Some(pass) = conf.passphrase.take() {
        return Ok(Some(pass));
    }
    if !conf.ask_passphrase {
        return Ok(None);
    }

    match PasswordPrompt::new(description).invoke()? {
        Some(pass) => Ok(Some(pass)),
        None => Err("passphrase entry cancelled".into()),
    }
}

/// Loads the private key, unlocking it lazily: the passphrase is only asked for if the key file
/// turns out to be encrypted.
fn load_private_key(conf: &mut ToolConfig) -> Result<RsaKey, Box<dyn Error>> {
    let path = conf.key_path.clone();
    let pass = conf.passphrase.take();

    match RsaKey::from_private_key_file(&path, pass.as_ref().map(Passphrase::as_bytes)) {
        Err(KeyError::PasswordRequired) if pass.is_none() && conf.ask_passphrase => {
            let description = format!("Enter the passphrase for unlocking the key '{}'", path.display());
            let pass = passphrase(conf, &description)?;
            Ok(RsaKey::from_private_key_file(&path, pass.as_ref().map(Passphrase::as_bytes))?)
        }
        Err(KeyError::PasswordRequired) if pass.is_none() => Err(format!(
            "{} is encrypted, set {} or pass --ask-passphrase",
            path.display(),
            rsakey::config::PASSPHRASE_VAR
        ).into()),
        res => Ok(res?),
    }
}

/// Loads a key for public key operations: `.pub` files directly, anything else as private key.
fn load_any_key(conf: &mut ToolConfig) -> Result<RsaKey, Box<dyn Error>> {
    if conf.key_path.extension().map_or(false, |ext| ext == "pub") {
        Ok(PublicKeyFile::from_path(&conf.key_path)?.key)
    } else {
        load_private_key(conf)
    }
}

fn generate(conf: &mut ToolConfig) -> Result<(), Box<dyn Error>> {
    let path = conf.key_path.clone();
    if path.exists() {
        return Err(format!("{} already exists", path.display()).into());
    }

    let key = RsaKey::generate(conf.bits)?;
    let description = format!("Enter a passphrase for the new key '{}'", path.display());
    let pass = passphrase(conf, &description)?;
    key.write_private_key_file(&path, pass.as_ref().map(Passphrase::as_bytes))?;

    let pub_path = conf.public_key_path();
    PublicKeyFile::new(key.clone(), conf.comment.clone()).write_to_path(&pub_path)?;

    info!("wrote private key to {} and public key to {}", path.display(), pub_path.display());
    println!("{} MD5:{} (RSA)", key.bits(), key.fingerprint_hex()?);
    Ok(())
}

fn print_pubkey(conf: &mut ToolConfig) -> Result<(), Box<dyn Error>> {
    let key = load_private_key(conf)?;
    println!("{}", PublicKeyFile::new(key, conf.comment.clone()).to_line());
    Ok(())
}

fn fingerprint(conf: &mut ToolConfig) -> Result<(), Box<dyn Error>> {
    let key = load_any_key(conf)?;
    println!("{} MD5:{} (RSA)", key.bits(), key.fingerprint_hex()?);
    Ok(())
}

fn sign(conf: &mut ToolConfig, data_path: &Path) -> Result<(), Box<dyn Error>> {
    let key = load_private_key(conf)?;
    let data = fs::read(data_path)?;
    let sig = key.sign_ssh_data(&data)?;
    println!("{}", base64::encode(sig.as_bytes()));
    Ok(())
}

fn verify(conf: &mut ToolConfig, data_path: &Path, signature: &str) -> Result<bool, Box<dyn Error>> {
    let key = load_any_key(conf)?;
    let data = fs::read(data_path)?;
    let mut sig = Message::from_bytes(base64::decode(signature.trim())?);
    Ok(key.verify_ssh_sig(&data, &mut sig))
}

fn run(args: &ArgMatches, conf: &mut ToolConfig) -> Result<(), Box<dyn Error>> {
    match args.subcommand() {
        ("generate", Some(sub)) => {
            process_args(sub, conf)?;
            generate(conf)
        }
        ("pubkey", Some(sub)) => {
            process_args(sub, conf)?;
            print_pubkey(conf)
        }
        ("fingerprint", Some(sub)) => {
            process_args(sub, conf)?;
            fingerprint(conf)
        }
        ("sign", Some(sub)) => {
            process_args(sub, conf)?;
            sign(conf, Path::new(sub.value_of("data").unwrap_or_default()))
        }
        ("verify", Some(sub)) => {
            process_args(sub, conf)?;
            let data = Path::new(sub.value_of("data").unwrap_or_default());
            if verify(conf, data, sub.value_of("signature").unwrap_or_default())? {
                println!("signature ok");
                Ok(())
            } else {
                println!("signature mismatch");
                process::exit(1);
            }
        }
        _ => Err("no subcommand given".into()),
    }
}

fn main() {
    let file = Arg::with_name("file")
        .short("f")
        .value_name("FILE")
        .help("Key file to use (defaults to ~/.ssh/id_rsa)")
        .takes_value(true);
    let ask = Arg::with_name("ask_passphrase")
        .long("ask-passphrase")
        .help("Ask for the passphrase using pinentry");

    let matches = app_from_crate!()
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(Arg::with_name("debug")
            .short("d")
            .global(true)
            .help("Enable debug output"))
        .subcommand(SubCommand::with_name("generate")
            .about("Generate a new key pair")
            .arg(file.clone())
            .arg(ask.clone())
            .arg(Arg::with_name("bits")
                .short("b")
                .value_name("BITS")
                .help("Modulus size in bits")
                .takes_value(true))
            .arg(Arg::with_name("comment")
                .short("C")
                .value_name("COMMENT")
                .help("Comment for the public key file")
                .takes_value(true)))
        .subcommand(SubCommand::with_name("pubkey")
            .about("Print the public key of a private key file")
            .arg(file.clone())
            .arg(ask.clone()))
        .subcommand(SubCommand::with_name("fingerprint")
            .about("Print the MD5 fingerprint of a private or public key file")
            .arg(file.clone())
            .arg(ask.clone()))
        .subcommand(SubCommand::with_name("sign")
            .about("Sign a file, printing the base64 signature blob")
            .arg(file.clone())
            .arg(ask.clone())
            .arg(Arg::with_name("data").required(true).help("File to sign")))
        .subcommand(SubCommand::with_name("verify")
            .about("Verify a base64 signature blob over a file")
            .arg(file)
            .arg(ask)
            .arg(Arg::with_name("data").required(true).help("Signed file"))
            .arg(Arg::with_name("signature").required(true).help("Signature blob in base64")))
        .get_matches();

    let mut conf = ToolConfig::from_env();
    util::unwrap_or_exit(process_args(&matches, &mut conf));
    init_logger(conf.debug);

    util::unwrap_or_exit(run(&matches, &mut conf));
}

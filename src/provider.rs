//! The cryptographic backend used by `RsaKey`.
//!
//! Every RSA primitive the key type needs goes through the `Provider` trait. `Openssl` is the
//! implementation used by default; tests (or callers with special needs) can substitute their own.

use error::KeyError;

use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private, Public};
use openssl::rsa::{Padding, Rsa};
use openssl::sign::{Signer, Verifier};
use openssl::symm::Cipher;

/// RSA operations backing an `RsaKey`.
///
/// Signatures always use PKCS#1 v1.5 padding over a SHA-1 digest, which is what the `ssh-rsa`
/// algorithm specifies (RFC 4253 "6.6. Public Key Algorithms").
pub trait Provider: Send + Sync {
    /// Generates a fresh private key with the given modulus size and public exponent.
    fn generate(&self, bits: u32, exponent: u32) -> Result<Rsa<Private>, KeyError>;

    /// Builds a public key from its exponent and modulus.
    fn public_key(&self, e: BigNum, n: BigNum) -> Result<Rsa<Public>, KeyError>;

    /// Signs `data` with `key`.
    fn sign(&self, key: &Rsa<Private>, data: &[u8]) -> Result<Vec<u8>, KeyError>;

    /// Checks `signature` over `data`. A signature that doesn't match yields `Ok(false)`.
    fn verify(&self, key: &Rsa<Public>, data: &[u8], signature: &[u8]) -> Result<bool, KeyError>;

    /// Parses an unencrypted DER-encoded PKCS#1 `RSAPrivateKey`.
    fn load_der_private_key(&self, der: &[u8]) -> Result<Rsa<Private>, KeyError>;

    /// Serializes `key` as a traditional `RSA PRIVATE KEY` PEM document, encrypting it if a
    /// password is given.
    fn private_key_to_pem(&self, key: &Rsa<Private>, password: Option<&[u8]>)
        -> Result<Vec<u8>, KeyError>;
}

/// `Provider` backed by the system's OpenSSL library.
#[derive(Debug, Clone, Copy, Default)]
pub struct Openssl;

impl Provider for Openssl {
    fn generate(&self, bits: u32, exponent: u32) -> Result<Rsa<Private>, KeyError> {
        let e = BigNum::from_u32(exponent)?;
        Ok(Rsa::generate_with_e(bits, &e)?)
    }

    fn public_key(&self, e: BigNum, n: BigNum) -> Result<Rsa<Public>, KeyError> {
        // OpenSSL happily builds keys from nonsense numbers, check the basics first
        let three = BigNum::from_u32(3)?;
        if n < three {
            return Err(KeyError::invalid("modulus must be at least 3"));
        }
        if e < three || e >= n {
            return Err(KeyError::invalid("public exponent out of range"));
        }
        if !e.is_bit_set(0) {
            return Err(KeyError::invalid("public exponent must be odd"));
        }

        Ok(Rsa::from_public_components(n, e)?)
    }

    fn sign(&self, key: &Rsa<Private>, data: &[u8]) -> Result<Vec<u8>, KeyError> {
        let pkey = PKey::from_rsa(key.clone())?;
        let mut signer = Signer::new(MessageDigest::sha1(), &pkey)?;
        signer.set_rsa_padding(Padding::PKCS1)?;
        signer.update(data)?;
        Ok(signer.sign_to_vec()?)
    }

    fn verify(&self, key: &Rsa<Public>, data: &[u8], signature: &[u8]) -> Result<bool, KeyError> {
        let pkey = PKey::from_rsa(key.clone())?;
        let mut verifier = Verifier::new(MessageDigest::sha1(), &pkey)?;
        verifier.set_rsa_padding(Padding::PKCS1)?;
        verifier.update(data)?;
        Ok(verifier.verify(signature)?)
    }

    fn load_der_private_key(&self, der: &[u8]) -> Result<Rsa<Private>, KeyError> {
        Ok(Rsa::private_key_from_der(der)?)
    }

    fn private_key_to_pem(&self, key: &Rsa<Private>, password: Option<&[u8]>)
        -> Result<Vec<u8>, KeyError> {
        let pem = match password {
            Some(password) => key.private_key_to_pem_passphrase(Cipher::aes_256_cbc(), password)?,
            None => key.private_key_to_pem()?,
        };
        Ok(pem)
    }
}

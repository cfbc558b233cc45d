use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Seed for the fixed salt mixed into every session token.
const TOKEN_SALT_SEED: &str = "3.142";

pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Opaque session token: SHA-256 over the username, a fixed salt, the issue
/// time and a small random number.
pub fn issue_token(username: &str, issued_at: i64) -> String {
    let nonce: u32 = rand::rng().random_range(1..=1001);
    compose_token(username, issued_at, nonce)
}

fn compose_token(username: &str, issued_at: i64, nonce: u32) -> String {
    let salt = hex::encode(md5::Md5::digest(TOKEN_SALT_SEED.as_bytes()));
    sha256_hex(&format!("{username}{salt}{issued_at}{nonce}"))
}

pub fn hashes_match(stored: &str, candidate: &str) -> bool {
    stored.as_bytes().ct_eq(candidate.as_bytes()).into()
}

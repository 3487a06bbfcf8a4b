//! Cryptographic operations: Argon2id password hashing.

pub mod password;

//! Credential handling

pub mod keyring;

pub use self::keyring::{delete_api_key, get_api_key, has_api_key, set_api_key, KeyStore, API_KEY_ENV};

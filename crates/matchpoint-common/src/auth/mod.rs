//! Credential access and bearer-token decoding

mod credentials;

pub use credentials::{decode_user_id, Claims, CredentialProvider, StaticCredentials};

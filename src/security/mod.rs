pub mod credentials;
pub mod secrets;

pub use credentials::CredentialStore;
pub use secrets::SecretStore;

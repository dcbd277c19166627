mod credentials;

pub use credentials::CredentialStore;
pub use credentials::CredentialValidator;

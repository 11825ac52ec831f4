//! Registration and login over an append-only credential store.

pub mod credentials;
pub mod router;
pub mod service;

pub use credentials::{Credential, CredentialJournal, CredentialStore};
pub use router::accounts_router;
pub use service::{AccountError, AccountService, LoginRequest, RegistrationRequest};

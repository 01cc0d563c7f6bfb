//! Profile storage and credential orchestration for the Ads CLI
//!
//! Two layers, matching how the rest of the workspace consumes them:
//!
//! - [`store::ProfileStore`] — durable persistence of named credential
//!   profiles to a single permission-restricted JSON file. Owns no network
//!   logic.
//! - [`service::CredentialService`] — the orchestration façade: decides
//!   whether a cached token is valid, triggers the authorize or refresh
//!   flow through `gads-auth`, and persists results through the store.
//!
//! The store is an explicitly constructed handle passed down to the service
//! and the CLI commands; there is no process-wide instance.

pub mod error;
pub mod profile;
pub mod service;
pub mod store;

pub use error::{Error, Result};
pub use profile::{Credentials, Profile, ProfileUpdate};
pub use service::{AuthorizeOptions, CredentialService};
pub use store::{DEFAULT_PROFILE, ProfileStore};

//! HTTP client SDK for the Mentora coaching-assessment platform.
//!
//! This crate provides a typed client for the platform's REST API with
//! transparent credential handling: the current bearer token is attached to
//! every call, authentication responses are camelized from the server's
//! snake_case convention, and an expired token is refreshed exactly once per
//! call — with concurrent expiries coalesced into a single refresh request.
//!
//! # Example
//!
//! ```no_run
//! use mentora_client::{GoogleLoginRequest, MentoraClient, Result, TokenStore};
//!
//! # async fn example() -> Result<()> {
//! let client = MentoraClient::builder()
//!     .base_url("https://api.mentora.example")
//!     .on_session_expired(|| eprintln!("logged out, redirecting to login"))
//!     .build()?;
//!
//! // Log in and store the credential
//! let login = client.auth().login(GoogleLoginRequest {
//!     google_token: "google-id-token".into(),
//! }).await?;
//! client.token_store().set(&login.access_token);
//!
//! // From here every call carries the token, and a 401 triggers one
//! // refresh-and-retry before surfacing an error.
//! let groups = client.groups().list(Default::default()).await?;
//! println!("{} groups", groups.total);
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Auth**: Google and end-user login, logout, token refresh
//! - **Users**: profile, listing, HR/end-user creation, lifecycle
//! - **Groups**: CRUD and member management
//! - **Assessments**: CRUD and session launch
//! - **Sessions**: status, chat transcript, results and reports

pub mod api;
pub mod case;
pub mod client;
pub mod error;
pub mod types;

mod refresh;

pub use client::{ClientBuilder, MentoraClient, SessionExpiredHook};
pub use error::{Error, Result};
pub use types::*;

pub use api::{AssessmentsApi, AuthApi, GroupsApi, SessionsApi, UsersApi};

// Re-exported so applications can drive the token slot without depending on
// mentora-auth directly.
pub use mentora_auth::{SharedTokenStore, TokenStore};

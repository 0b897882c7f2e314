//! Access-token storage for Mentora API clients.
//!
//! The platform hands out a single bearer token per session. This crate owns
//! the slot that token lives in: [`TokenStore`] is the accessor contract, and
//! the two implementations cover the production case (a file that survives
//! process restarts) and the in-memory case (tests, short-lived tools).
//!
//! Reads are deliberately infallible — a missing file, an unreadable path, or
//! a never-written slot all degrade to "no token", and the caller decides
//! what an absent credential means for the request at hand.

pub mod store;

pub use store::{
    FileTokenStore, InMemoryTokenStore, SharedTokenStore, TokenStore, create_file_token_store,
    create_memory_token_store,
};

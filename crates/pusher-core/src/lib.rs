//! Core types and configuration for the Pusher REST client.
//!
//! This crate provides the building blocks shared by the signing and client
//! crates: the application [`Credentials`] used as signing material, the
//! endpoint configuration ([`PusherConfig`]), and the core error type.

mod config;
mod credentials;
mod error;

pub use config::{DEFAULT_HOST, PusherConfig, Scheme};
pub use credentials::Credentials;
pub use error::{CoreError, CoreResult};

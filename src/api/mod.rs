//! REST API client module for the DiviMate backend.
//!
//! This module provides the `ApiClient` for the credential exchange and
//! the group/expense resource endpoints. Authenticated calls carry a JWT
//! bearer token obtained through login or registration.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthExchange, AuthGateway};
pub use error::ApiError;

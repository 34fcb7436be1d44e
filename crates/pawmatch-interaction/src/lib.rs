//! Interaction layer for PawMatch.
//!
//! Clients for the remote catalog service.

pub mod fetch_api_client;

pub use fetch_api_client::FetchApiClient;

//! Shared types for the Soleil reservation system
//!
//! Data models, API response envelope and small utilities used by both the
//! server and API clients. DB row derives are feature-gated behind `db` so
//! frontend-facing consumers don't pull in sqlx.

pub mod cart;
pub mod models;
pub mod response;
pub mod util;

pub use response::ApiResponse;

pub mod auth;
pub mod client;

pub use auth::AuthCredentials;
pub use client::{ApiResponse, ClientError, MetadataClient};

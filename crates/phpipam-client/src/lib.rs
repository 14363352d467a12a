//! phpIPAM REST API Client
//!
//! A small async client for the read-only parts of the phpIPAM REST API used
//! by the exporter: sections and the subnets inside them.
//!
//! # Example
//!
//! ```no_run
//! use phpipam_client::{AuthMode, PhpIpamClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Log in once; the token is reused for every request
//! let client = PhpIpamClient::connect(
//!     "http://ipam.example.com/api/exporter",
//!     "admin",
//!     "secret",
//!     AuthMode::Token,
//! )
//! .await?;
//!
//! for section in client.sections().await? {
//!     let subnets = client.section_subnets(&section.id).await?;
//!     println!("{}: {} subnets", section.name, subnets.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Authentication
//!
//! - **Token**: `POST /user/` with basic credentials once, then a `token`
//!   header on every request
//! - **Basic**: basic credentials on every request

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod phpipam_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use auth::{AuthMode, AuthStrategy, authenticate};
pub use client::PhpIpamClient;
pub use error::PhpIpamError;
pub use models::*;
pub use phpipam_trait::PhpIpamClientTrait;
#[cfg(feature = "test-util")]
pub use mock::MockPhpIpamClient;

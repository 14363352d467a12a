//! PhpIpamClient trait for mocking
//!
//! The collector only depends on this trait, so tests can swap the HTTP client
//! for [`MockPhpIpamClient`](crate::MockPhpIpamClient).

use crate::error::PhpIpamError;
use crate::models::{Section, Subnet};

/// Trait for phpIPAM API client operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait PhpIpamClientTrait: Send + Sync {
    /// List all sections, in the order phpIPAM returns them
    async fn sections(&self) -> Result<Vec<Section>, PhpIpamError>;

    /// List the subnets of one section
    async fn section_subnets(&self, section_id: &str) -> Result<Vec<Subnet>, PhpIpamError>;
}

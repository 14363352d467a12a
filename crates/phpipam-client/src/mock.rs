//! Mock PhpIpamClient for unit testing
//!
//! Stores sections and subnets in memory and can be told to fail specific
//! calls, so collector behaviour can be tested without a running phpIPAM.

use crate::error::PhpIpamError;
use crate::models::{Section, Subnet};
use crate::phpipam_trait::PhpIpamClientTrait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mock phpIPAM client for testing
#[derive(Clone, Default)]
pub struct MockPhpIpamClient {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    sections: Vec<Section>,
    subnets: HashMap<String, Vec<Subnet>>,
    fail_sections: bool,
    failing_sections: HashSet<String>,
    missing_sections: HashSet<String>,
    requests: Vec<String>,
}

impl MockPhpIpamClient {
    /// Create a new mock client
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a section and its subnets (for test setup)
    pub fn add_section(&self, id: &str, name: &str, subnets: Vec<Subnet>) {
        let mut state = self.state();
        state.sections.push(Section {
            id: id.to_string(),
            name: name.to_string(),
        });
        state.subnets.insert(id.to_string(), subnets);
    }

    /// Make the section listing fail with an API error
    pub fn fail_sections(&self) {
        self.state().fail_sections = true;
    }

    /// Make the subnet listing of one section fail with an API error
    pub fn fail_section_subnets(&self, section_id: &str) {
        self.state().failing_sections.insert(section_id.to_string());
    }

    /// Make the subnet listing of one section answer 404
    pub fn missing_section_subnets(&self, section_id: &str) {
        self.state().missing_sections.insert(section_id.to_string());
    }

    /// Paths requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.state().requests.clone()
    }
}

#[async_trait::async_trait]
impl PhpIpamClientTrait for MockPhpIpamClient {
    async fn sections(&self) -> Result<Vec<Section>, PhpIpamError> {
        let mut state = self.state();
        state.requests.push("/sections".to_string());
        if state.fail_sections {
            return Err(PhpIpamError::Api(
                "GET /sections failed: 500 Internal Server Error - mock".to_string(),
            ));
        }
        Ok(state.sections.clone())
    }

    async fn section_subnets(&self, section_id: &str) -> Result<Vec<Subnet>, PhpIpamError> {
        let path = format!("/sections/{}/subnets", section_id);
        let mut state = self.state();
        state.requests.push(path.clone());
        if state.failing_sections.contains(section_id) {
            return Err(PhpIpamError::Api(format!(
                "GET {} failed: 500 Internal Server Error - mock",
                path
            )));
        }
        if state.missing_sections.contains(section_id) {
            return Err(PhpIpamError::NotFound(path));
        }
        Ok(state.subnets.get(section_id).cloned().unwrap_or_default())
    }
}

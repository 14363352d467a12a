//! Subnet collector.
//!
//! Walks phpIPAM sections and their subnets on every scrape and turns them
//! into per-(section, mask) gauge samples. Nothing is kept between scrapes.

use crate::metrics::{MetricDescriptor, SubnetKind, SubnetSample};
use phpipam_client::{PhpIpamClientTrait, PhpIpamError, Section, Subnet};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Result of one collection pass
#[derive(Debug, Default)]
pub struct Scrape {
    /// Samples gathered from every section that could be read
    pub samples: Vec<SubnetSample>,
    /// Failures that were logged and skipped
    pub errors: Vec<PhpIpamError>,
}

/// Collects subnet utilization from phpIPAM
pub struct SubnetsCollector {
    client: Arc<dyn PhpIpamClientTrait>,
    descriptors: Vec<MetricDescriptor>,
}

impl SubnetsCollector {
    /// Create a collector over a phpIPAM client
    pub fn new(client: Arc<dyn PhpIpamClientTrait>) -> Self {
        Self {
            client,
            descriptors: SubnetKind::ALL
                .into_iter()
                .map(MetricDescriptor::for_kind)
                .collect(),
        }
    }

    /// The four subnet gauge descriptors
    pub fn describe(&self) -> &[MetricDescriptor] {
        &self.descriptors
    }

    /// Gather the samples for one scrape
    pub async fn collect(&self) -> Vec<SubnetSample> {
        self.scrape().await.samples
    }

    /// Run one collection pass.
    ///
    /// A failed section listing aborts the pass with no samples. A failed
    /// subnet listing only skips that section.
    pub async fn scrape(&self) -> Scrape {
        let mut scrape = Scrape::default();

        let sections = match self.client.sections().await {
            Ok(sections) => sections,
            Err(e) => {
                error!(error = %e, "Failed to list phpIPAM sections, skipping scrape");
                scrape.errors.push(e);
                return scrape;
            }
        };

        for section in &sections {
            let subnets = match self.client.section_subnets(&section.id).await {
                Ok(subnets) => subnets,
                Err(PhpIpamError::NotFound(_)) => {
                    warn!(
                        section = %section.name,
                        section_id = %section.id,
                        "Section subnets not found (404), treating section as empty"
                    );
                    continue;
                }
                Err(e) => {
                    error!(
                        section = %section.name,
                        section_id = %section.id,
                        error = %e,
                        "Failed to list subnets, skipping section"
                    );
                    scrape.errors.push(e);
                    continue;
                }
            };

            scrape.samples.extend(aggregate_section(section, &subnets));
        }

        debug!(
            sections = sections.len(),
            samples = scrape.samples.len(),
            errors = scrape.errors.len(),
            "Scrape finished"
        );
        scrape
    }
}

/// Count a section's subnets per (kind, mask), one sample per non-empty bucket
pub fn aggregate_section(section: &Section, subnets: &[Subnet]) -> Vec<SubnetSample> {
    let mut buckets: BTreeMap<(SubnetKind, &str), u64> = BTreeMap::new();
    for subnet in subnets {
        *buckets
            .entry((SubnetKind::classify(subnet), subnet.mask.as_str()))
            .or_insert(0) += 1;
    }

    buckets
        .into_iter()
        .map(|((kind, mask), count)| SubnetSample {
            kind,
            section: section.name.clone(),
            mask: mask.to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
#[path = "collector_test.rs"]
mod collector_test;

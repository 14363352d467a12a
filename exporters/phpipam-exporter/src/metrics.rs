//! # Subnet Metrics
//!
//! Metric descriptors and text exposition for the subnet gauges.
//!
//! Every scrape builds its own `prometheus::Registry`, so nothing recorded in
//! one scrape can leak into the next and concurrent scrapes never share gauges.

use crate::error::ExporterError;
use phpipam_client::{AddressFamily, Subnet};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use tracing::warn;

/// Label names shared by every subnet gauge
pub const LABEL_NAMES: [&str; 2] = ["section", "mask"];

/// The four gauge families exported per (section, mask)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubnetKind {
    Ipv4Used,
    Ipv4Free,
    Ipv6Used,
    Ipv6Free,
}

impl SubnetKind {
    /// All kinds, in descriptor order
    pub const ALL: [SubnetKind; 4] = [
        SubnetKind::Ipv4Used,
        SubnetKind::Ipv4Free,
        SubnetKind::Ipv6Used,
        SubnetKind::Ipv6Free,
    ];

    /// Bucket a subnet by address family and free flag
    pub fn classify(subnet: &Subnet) -> Self {
        match (subnet.address_family(), subnet.is_marked_free()) {
            (AddressFamily::Ipv4, false) => SubnetKind::Ipv4Used,
            (AddressFamily::Ipv4, true) => SubnetKind::Ipv4Free,
            (AddressFamily::Ipv6, false) => SubnetKind::Ipv6Used,
            (AddressFamily::Ipv6, true) => SubnetKind::Ipv6Free,
        }
    }

    pub fn metric_name(self) -> &'static str {
        match self {
            SubnetKind::Ipv4Used => "phpipam_subnets_ipv4_used",
            SubnetKind::Ipv4Free => "phpipam_subnets_ipv4_free",
            SubnetKind::Ipv6Used => "phpipam_subnets_ipv6_used",
            SubnetKind::Ipv6Free => "phpipam_subnets_ipv6_free",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            SubnetKind::Ipv4Used => "Number of used IPv4 subnets in phpIPAM",
            SubnetKind::Ipv4Free => "Number of free IPv4 subnets in phpIPAM",
            SubnetKind::Ipv6Used => "Number of used IPv6 subnets in phpIPAM",
            SubnetKind::Ipv6Free => "Number of free IPv6 subnets in phpIPAM",
        }
    }
}

/// Static metadata for one gauge family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub kind: SubnetKind,
    pub name: &'static str,
    pub help: &'static str,
    pub label_names: &'static [&'static str],
}

impl MetricDescriptor {
    pub fn for_kind(kind: SubnetKind) -> Self {
        Self {
            kind,
            name: kind.metric_name(),
            help: kind.help(),
            label_names: &LABEL_NAMES,
        }
    }
}

/// One gauge value for a (section, mask) group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetSample {
    pub kind: SubnetKind,
    pub section: String,
    pub mask: String,
    pub count: u64,
}

/// Render samples in the Prometheus text exposition format
///
/// Families without samples are left out. Samples sharing a family and label
/// values (two sections with the same name) are summed.
///
/// # Errors
/// [`ExporterError::Metrics`] if a gauge cannot be registered or encoded.
pub fn render(
    descriptors: &[MetricDescriptor],
    samples: &[SubnetSample],
) -> Result<Vec<u8>, ExporterError> {
    let registry = Registry::new();
    let mut gauges = HashMap::with_capacity(descriptors.len());

    for descriptor in descriptors {
        let gauge = GaugeVec::new(
            Opts::new(descriptor.name, descriptor.help),
            descriptor.label_names,
        )?;
        registry.register(Box::new(gauge.clone()))?;
        gauges.insert(descriptor.kind, gauge);
    }

    for sample in samples {
        let Some(gauge) = gauges.get(&sample.kind) else {
            warn!(kind = ?sample.kind, "No descriptor registered for sample, dropping it");
            continue;
        };
        #[allow(clippy::cast_precision_loss, reason = "subnet counts stay far below 2^53")]
        gauge
            .with_label_values(&[sample.section.as_str(), sample.mask.as_str()])
            .add(sample.count as f64);
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    Ok(buffer)
}

/// Content type of [`render`]'s output
pub fn content_type() -> String {
    TextEncoder::new().format_type().to_string()
}

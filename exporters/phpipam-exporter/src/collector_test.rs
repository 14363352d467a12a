//! Unit tests for the subnet collector

use crate::collector::*;
use crate::metrics::{SubnetKind, SubnetSample, render};
use phpipam_client::{MockPhpIpamClient, Subnet};
use std::io;
use std::sync::{Arc, Mutex};

fn collector(mock: &MockPhpIpamClient) -> SubnetsCollector {
    SubnetsCollector::new(Arc::new(mock.clone()))
}

fn sample(kind: SubnetKind, section: &str, mask: &str, count: u64) -> SubnetSample {
    SubnetSample {
        kind,
        section: section.to_string(),
        mask: mask.to_string(),
        count,
    }
}

fn section_total(samples: &[SubnetSample], section: &str) -> u64 {
    samples
        .iter()
        .filter(|s| s.section == section)
        .map(|s| s.count)
        .sum()
}

#[tokio::test]
async fn test_lan_example() {
    let mock = MockPhpIpamClient::new();
    mock.add_section(
        "1",
        "LAN",
        vec![
            Subnet::new("10.0.0.0", "24", true),
            Subnet::new("10.0.1.0", "24", true),
            Subnet::new("10.0.2.0", "24", false),
        ],
    );

    let samples = collector(&mock).collect().await;

    assert_eq!(
        samples,
        vec![
            sample(SubnetKind::Ipv4Used, "LAN", "24", 1),
            sample(SubnetKind::Ipv4Free, "LAN", "24", 2),
        ]
    );
}

#[tokio::test]
async fn test_describe_returns_four_descriptors() {
    let mock = MockPhpIpamClient::new();
    let collector = collector(&mock);

    let kinds: Vec<_> = collector.describe().iter().map(|d| d.kind).collect();
    assert_eq!(kinds, SubnetKind::ALL.to_vec());
    // Describing never talks to phpIPAM
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_free_and_used_are_exclusive() {
    let mock = MockPhpIpamClient::new();
    mock.add_section(
        "1",
        "Mixed",
        vec![
            Subnet::new("192.168.0.0", "16", true),
            Subnet::new("172.16.0.0", "12", false),
            Subnet::new("2001:db8::", "32", true),
            Subnet::new("2001:db8:1::", "48", false),
            Subnet::new("2001:db8:2::", "48", false),
        ],
    );

    let samples = collector(&mock).collect().await;

    assert_eq!(
        samples,
        vec![
            sample(SubnetKind::Ipv4Used, "Mixed", "12", 1),
            sample(SubnetKind::Ipv4Free, "Mixed", "16", 1),
            sample(SubnetKind::Ipv6Used, "Mixed", "48", 2),
            sample(SubnetKind::Ipv6Free, "Mixed", "32", 1),
        ]
    );
    // Masks seen as free never show up as used, and the other way round
    assert!(!samples
        .iter()
        .any(|s| s.kind == SubnetKind::Ipv4Used && s.mask == "16"));
    assert!(!samples
        .iter()
        .any(|s| s.kind == SubnetKind::Ipv6Free && s.mask == "48"));
}

#[tokio::test]
async fn test_family_uses_colon_only() {
    let mock = MockPhpIpamClient::new();
    mock.add_section(
        "1",
        "Odd",
        vec![
            Subnet::new("10.0.0.0", "8", false),
            Subnet::new("2001:db8::", "32", false),
            Subnet::new("garbage", "8", false),
        ],
    );

    let samples = collector(&mock).collect().await;

    assert_eq!(
        samples,
        vec![
            sample(SubnetKind::Ipv4Used, "Odd", "8", 2),
            sample(SubnetKind::Ipv6Used, "Odd", "32", 1),
        ]
    );
}

#[tokio::test]
async fn test_sample_sum_matches_subnet_count() {
    let mock = MockPhpIpamClient::new();
    let lan: Vec<_> = (0..17)
        .map(|i| {
            let mask = if i % 3 == 0 { "16" } else { "24" };
            Subnet::new(format!("10.{}.0.0", i), mask, i % 2 == 0)
        })
        .collect();
    let dc: Vec<_> = (0..5)
        .map(|i| Subnet::new(format!("2001:db8:{}::", i), "64", i == 0))
        .collect();
    mock.add_section("1", "LAN", lan);
    mock.add_section("2", "DC", dc);

    let samples = collector(&mock).collect().await;

    assert_eq!(section_total(&samples, "LAN"), 17);
    assert_eq!(section_total(&samples, "DC"), 5);
    assert!(samples.iter().all(|s| s.count > 0));
}

#[tokio::test]
async fn test_sections_failure_aborts_scrape() {
    let mock = MockPhpIpamClient::new();
    mock.add_section("1", "LAN", vec![Subnet::new("10.0.0.0", "24", false)]);
    mock.fail_sections();

    let scrape = collector(&mock).scrape().await;

    assert!(scrape.samples.is_empty());
    assert_eq!(scrape.errors.len(), 1);
    assert_eq!(mock.requests(), vec!["/sections".to_string()]);
}

#[tokio::test]
async fn test_one_failing_section_is_skipped() {
    let mock = MockPhpIpamClient::new();
    mock.add_section("1", "A", vec![Subnet::new("10.0.0.0", "24", false)]);
    mock.add_section("2", "B", vec![Subnet::new("10.1.0.0", "24", false)]);
    mock.add_section("3", "C", vec![Subnet::new("10.2.0.0", "24", true)]);
    mock.fail_section_subnets("2");

    let scrape = collector(&mock).scrape().await;

    assert_eq!(scrape.errors.len(), 1);
    assert_eq!(
        scrape.samples,
        vec![
            sample(SubnetKind::Ipv4Used, "A", "24", 1),
            sample(SubnetKind::Ipv4Free, "C", "24", 1),
        ]
    );
    // Sections are visited in API order and the failure does not stop the walk
    assert_eq!(
        mock.requests(),
        vec![
            "/sections".to_string(),
            "/sections/1/subnets".to_string(),
            "/sections/2/subnets".to_string(),
            "/sections/3/subnets".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_missing_section_is_empty_not_an_error() {
    let mock = MockPhpIpamClient::new();
    mock.add_section("1", "Empty", vec![]);
    mock.add_section("2", "LAN", vec![Subnet::new("10.0.0.0", "24", false)]);
    mock.missing_section_subnets("1");

    let scrape = collector(&mock).scrape().await;

    assert!(scrape.errors.is_empty());
    assert_eq!(scrape.samples, vec![sample(SubnetKind::Ipv4Used, "LAN", "24", 1)]);
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_missing_section_is_logged_as_warning() {
    let mock = MockPhpIpamClient::new();
    mock.add_section("7", "Retired", vec![]);
    mock.missing_section_subnets("7");

    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let scrape = collector(&mock).scrape().await;

    assert!(scrape.errors.is_empty());
    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("WARN"), "logs: {}", output);
    assert!(output.contains("Section subnets not found"), "logs: {}", output);
    assert!(output.contains("Retired"), "logs: {}", output);
}

#[tokio::test]
async fn test_null_subnet_counts_under_empty_mask() {
    let mock = MockPhpIpamClient::new();
    mock.add_section(
        "1",
        "LAN",
        vec![Subnet::new("10.0.0.0", "24", false), Subnet::new("", "", false)],
    );

    let samples = collector(&mock).collect().await;

    assert_eq!(
        samples,
        vec![
            sample(SubnetKind::Ipv4Used, "LAN", "", 1),
            sample(SubnetKind::Ipv4Used, "LAN", "24", 1),
        ]
    );
}

#[tokio::test]
async fn test_empty_section_emits_nothing() {
    let mock = MockPhpIpamClient::new();
    mock.add_section("1", "Empty", vec![]);

    let scrape = collector(&mock).scrape().await;

    assert!(scrape.samples.is_empty());
    assert!(scrape.errors.is_empty());
}

#[tokio::test]
async fn test_buckets_do_not_leak_between_sections() {
    let mock = MockPhpIpamClient::new();
    mock.add_section("1", "A", vec![Subnet::new("10.0.0.0", "24", false); 3]);
    mock.add_section("2", "B", vec![Subnet::new("10.1.0.0", "24", false)]);

    let samples = collector(&mock).collect().await;

    assert_eq!(
        samples,
        vec![
            sample(SubnetKind::Ipv4Used, "A", "24", 3),
            sample(SubnetKind::Ipv4Used, "B", "24", 1),
        ]
    );
}

#[tokio::test]
async fn test_consecutive_scrapes_are_identical() {
    let mock = MockPhpIpamClient::new();
    mock.add_section(
        "1",
        "LAN",
        vec![
            Subnet::new("10.0.0.0", "24", true),
            Subnet::new("10.0.1.0", "25", false),
            Subnet::new("2001:db8::", "64", false),
        ],
    );
    mock.add_section("2", "WAN", vec![Subnet::new("198.51.100.0", "30", false)]);
    let collector = collector(&mock);

    let first = collector.collect().await;
    let second = collector.collect().await;
    assert_eq!(first, second);

    let first_text = render(collector.describe(), &first).unwrap();
    let second_text = render(collector.describe(), &second).unwrap();
    assert_eq!(first_text, second_text);
}

#[test]
fn test_aggregate_section_counts_per_mask() {
    let section = phpipam_client::Section {
        id: "5".to_string(),
        name: "Lab".to_string(),
    };
    let subnets = vec![
        Subnet::new("10.0.0.0", "24", false),
        Subnet::new("10.0.1.0", "24", false),
        Subnet::new("10.0.2.0", "26", false),
    ];

    assert_eq!(
        aggregate_section(&section, &subnets),
        vec![
            sample(SubnetKind::Ipv4Used, "Lab", "24", 2),
            sample(SubnetKind::Ipv4Used, "Lab", "26", 1),
        ]
    );
}

//! phpIPAM API models
//!
//! phpIPAM wraps every answer in the same envelope:
//! `{"code": 200, "success": true, "data": ...}`. Only the fields the exporter
//! reads are modelled; everything else in the payload is ignored.

use serde::{Deserialize, Deserializer};

/// phpIPAM response envelope
///
/// `data` is optional because phpIPAM answers an empty collection with a
/// message such as "No subnets found" and no `data` key at all.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// HTTP-like status code echoed in the body
    #[serde(default)]
    pub code: Option<u16>,
    /// Human readable message, set on errors and empty collections
    #[serde(default)]
    pub message: Option<String>,
    /// Payload
    pub data: Option<T>,
}

impl<T> ApiResponse<Vec<T>> {
    /// Unwrap a list payload, treating a missing `data` key as an empty list
    pub fn into_items(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }
}

/// Payload of `POST /user/`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenData {
    /// API token to send in the `token` header
    #[serde(default)]
    pub token: Option<String>,
}

/// Section model (`GET /sections`)
///
/// Null or absent fields decode as empty strings so one odd row never
/// rejects the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Section {
    /// Section id, used in `/sections/{id}/subnets`
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name, exported as the `section` label
    #[serde(default, deserialize_with = "string_or_number")]
    pub name: String,
}

/// Subnet model (`GET /sections/{id}/subnets`)
///
/// Like [`Section`], null or absent fields decode as empty strings; such a
/// subnet is still counted (as IPv4, under an empty mask).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subnet {
    /// Network address literal, e.g. `10.0.0.0` or `2001:db8::`
    #[serde(rename = "subnet", default, deserialize_with = "string_or_number")]
    pub network: String,
    /// Prefix length as sent by phpIPAM, e.g. `24`
    #[serde(default, deserialize_with = "string_or_number")]
    pub mask: String,
    /// Raw value of the `custom_free` field
    #[serde(rename = "custom_free", default, deserialize_with = "optional_flag")]
    pub custom_free: Option<String>,
}

/// Address family of a subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressFamily {
    /// Anything without a colon
    Ipv4,
    /// Addresses containing a colon
    Ipv6,
}

impl Subnet {
    /// Build a subnet from its parts
    pub fn new(network: impl Into<String>, mask: impl Into<String>, free: bool) -> Self {
        Self {
            network: network.into(),
            mask: mask.into(),
            custom_free: free.then(|| "1".to_string()),
        }
    }

    /// Address family, derived from the network literal.
    ///
    /// Any address containing a colon is IPv6; everything else, valid or not,
    /// is IPv4.
    pub fn address_family(&self) -> AddressFamily {
        if self.network.contains(':') {
            AddressFamily::Ipv6
        } else {
            AddressFamily::Ipv4
        }
    }

    /// Whether phpIPAM marks this subnet as free.
    ///
    /// Only the literal `1` means free. Absent, empty and any other value mean used.
    pub fn is_marked_free(&self) -> bool {
        self.custom_free.as_deref() == Some("1")
    }
}

/// Accept `"42"` or `42`; `null` becomes an empty string
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}

/// Keep strings and numbers as text, map null/bool/anything else to `None`
fn optional_flag<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_classification() {
        let family = |network: &str| Subnet::new(network, "24", false).address_family();
        assert_eq!(family("10.0.0.0"), AddressFamily::Ipv4);
        assert_eq!(family("2001:db8::"), AddressFamily::Ipv6);
        // No colon means IPv4, even for garbage
        assert_eq!(family("not-an-address"), AddressFamily::Ipv4);
        assert_eq!(family(""), AddressFamily::Ipv4);
    }

    #[test]
    fn test_subnet_wire_format() {
        let body = r#"{
            "id": "7",
            "subnet": "192.168.10.0",
            "mask": "24",
            "sectionId": "1",
            "description": "office",
            "custom_free": "1",
            "usage": {"used": "12", "maxhosts": 254, "freehosts": "242"}
        }"#;
        let subnet: Subnet = serde_json::from_str(body).unwrap();
        assert_eq!(subnet.network, "192.168.10.0");
        assert_eq!(subnet.mask, "24");
        assert!(subnet.is_marked_free());
    }

    #[test]
    fn test_free_flag_only_literal_one() {
        let cases = [
            (r#"{"subnet":"10.0.0.0","mask":"24","custom_free":"1"}"#, true),
            (r#"{"subnet":"10.0.0.0","mask":"24","custom_free":1}"#, true),
            (r#"{"subnet":"10.0.0.0","mask":"24","custom_free":"0"}"#, false),
            (r#"{"subnet":"10.0.0.0","mask":"24","custom_free":"yes"}"#, false),
            (r#"{"subnet":"10.0.0.0","mask":"24","custom_free":""}"#, false),
            (r#"{"subnet":"10.0.0.0","mask":"24","custom_free":true}"#, false),
            (r#"{"subnet":"10.0.0.0","mask":"24","custom_free":null}"#, false),
            (r#"{"subnet":"10.0.0.0","mask":"24"}"#, false),
        ];
        for (body, expected) in cases {
            let subnet: Subnet = serde_json::from_str(body).unwrap();
            assert_eq!(subnet.is_marked_free(), expected, "body: {}", body);
        }
    }

    #[test]
    fn test_numeric_ids_and_masks() {
        let section: Section = serde_json::from_str(r#"{"id": 3, "name": "LAN"}"#).unwrap();
        assert_eq!(section.id, "3");

        let subnet: Subnet =
            serde_json::from_str(r#"{"subnet": "10.0.0.0", "mask": 16}"#).unwrap();
        assert_eq!(subnet.mask, "16");
    }

    #[test]
    fn test_null_and_absent_fields_decode_empty() {
        let subnet: Subnet =
            serde_json::from_str(r#"{"subnet": null, "mask": null}"#).unwrap();
        assert_eq!(subnet, Subnet::new("", "", false));
        assert_eq!(subnet.address_family(), AddressFamily::Ipv4);

        let subnet: Subnet = serde_json::from_str(r#"{"id": "12"}"#).unwrap();
        assert_eq!(subnet, Subnet::new("", "", false));

        let section: Section = serde_json::from_str(r#"{"id": "4", "name": null}"#).unwrap();
        assert_eq!(section.name, "");
        let section: Section = serde_json::from_str(r#"{"id": "5"}"#).unwrap();
        assert_eq!(section.name, "");
    }

    #[test]
    fn test_one_null_row_keeps_the_listing() {
        let body = r#"{"data": [
            {"subnet": "10.0.0.0", "mask": "24"},
            {"subnet": null, "mask": null},
            {"subnet": "2001:db8::", "mask": "48", "custom_free": "1"}
        ]}"#;
        let response: ApiResponse<Vec<Subnet>> = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_items().len(), 3);
    }

    #[test]
    fn test_object_where_text_expected_is_rejected() {
        let result = serde_json::from_str::<Subnet>(r#"{"subnet": {"a": 1}, "mask": "24"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_envelope_without_data() {
        let body = r#"{"code": 200, "success": 0, "message": "No subnets found"}"#;
        let response: ApiResponse<Vec<Subnet>> = serde_json::from_str(body).unwrap();
        assert_eq!(response.message.as_deref(), Some("No subnets found"));
        assert!(response.into_items().is_empty());
    }
}

//! Postal code validation and service-area classification.

use std::collections::BTreeSet;
use std::fmt;

use super::errors::DomainError;

/// A validated 6-digit Indian postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pincode(String);

impl Pincode {
    /// Trims surrounding whitespace and accepts exactly six ASCII digits.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.len() == 6 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(DomainError::InvalidPincodeFormat)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geographic bucket a pincode falls into, before any order-value rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Local,
    Regional,
    National,
}

const SURAT_PINCODES: &[&str] = &[
    "394101", "394105", "394107", "394110", "394111", "394120", "394125", "394130", "394150",
    "394155", "394160", "394163", "394170", "394180", "394185", "394190", "394210", "394220",
    "394221", "394230", "394235", "394240", "394245", "394246", "394248", "394250", "394270",
    "394305", "394310", "394315", "394317", "394320", "394325", "394326", "394327", "394330",
    "394335", "394340", "394345", "394350", "394352", "394355", "394360", "394365", "394370",
    "394375", "394380", "394405", "394410", "394421", "394430", "394440", "394445", "394510",
    "394515", "394516", "394517", "394518", "394520", "394530", "394540", "394550", "394601",
    "394620", "394630", "394633", "394635", "394640", "394641", "394650", "394651", "394652",
    "394655", "394660", "394670", "394680", "394690",
];

/// Prefix tables describing where the shop delivers locally and regionally.
///
/// Defaults describe a shop in Surat (Gujarat). Every field can be replaced
/// from configuration without touching the classification logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceArea {
    pub local_prefixes: Vec<String>,
    pub local_pincodes: BTreeSet<String>,
    pub regional_prefixes: Vec<String>,
}

impl Default for ServiceArea {
    fn default() -> Self {
        Self {
            local_prefixes: vec!["394".to_string()],
            local_pincodes: SURAT_PINCODES.iter().map(|p| p.to_string()).collect(),
            regional_prefixes: ["36", "37", "38", "39"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl ServiceArea {
    pub fn zone_of(&self, pincode: &Pincode) -> Zone {
        let code = pincode.as_str();
        if self.local_prefixes.iter().any(|p| code.starts_with(p.as_str()))
            || self.local_pincodes.contains(code)
        {
            Zone::Local
        } else if self
            .regional_prefixes
            .iter()
            .any(|p| code.starts_with(p.as_str()))
        {
            Zone::Regional
        } else {
            Zone::National
        }
    }

    /// Validates `raw` and places it in a zone.
    pub fn classify(&self, raw: &str) -> Result<Zone, DomainError> {
        Pincode::parse(raw).map(|p| self.zone_of(&p))
    }
}

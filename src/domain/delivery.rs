//! Delivery charge quoting by pincode tier and order value.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pincode::{ServiceArea, Zone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryTier {
    Free,
    Local,
    Regional,
    National,
}

impl fmt::Display for DeliveryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeliveryTier::Free => "FREE",
            DeliveryTier::Local => "LOCAL",
            DeliveryTier::Regional => "REGIONAL",
            DeliveryTier::National => "NATIONAL",
        })
    }
}

/// Result of pricing delivery for one checkout. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryQuote {
    pub charge: i64,
    pub label: String,
    pub valid: bool,
    pub tier: Option<DeliveryTier>,
}

impl DeliveryQuote {
    fn invalid() -> Self {
        Self {
            charge: 0,
            label: "Invalid pincode".to_string(),
            valid: false,
            tier: None,
        }
    }

    fn priced(tier: DeliveryTier, charge: i64, label: &str) -> Self {
        Self {
            charge,
            label: label.to_string(),
            valid: true,
            tier: Some(tier),
        }
    }
}

/// Flat charges per tier and the local free-shipping threshold, in whole
/// currency units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRates {
    pub free_shipping_threshold: i64,
    pub local_charge: i64,
    pub regional_charge: i64,
    pub national_charge: i64,
}

impl Default for DeliveryRates {
    fn default() -> Self {
        Self {
            free_shipping_threshold: 500,
            local_charge: 30,
            regional_charge: 50,
            national_charge: 80,
        }
    }
}

pub const TRANSIT_LOCAL: &str = "Same Day / Next Day";
pub const TRANSIT_REGIONAL: &str = "2-3 Business Days";
pub const TRANSIT_NATIONAL: &str = "5-7 Business Days";

#[derive(Debug, Clone, Default)]
pub struct DeliveryCalculator {
    area: ServiceArea,
    rates: DeliveryRates,
}

impl DeliveryCalculator {
    pub fn new(area: ServiceArea, rates: DeliveryRates) -> Self {
        Self { area, rates }
    }

    pub fn area(&self) -> &ServiceArea {
        &self.area
    }

    pub fn rates(&self) -> &DeliveryRates {
        &self.rates
    }

    /// Prices delivery of an order worth `subtotal` to `pincode`.
    ///
    /// The free-shipping threshold only applies inside the local zone.
    pub fn calculate(&self, pincode: &str, subtotal: i64) -> DeliveryQuote {
        let Ok(zone) = self.area.classify(pincode) else {
            return DeliveryQuote::invalid();
        };

        match zone {
            Zone::Local if subtotal >= self.rates.free_shipping_threshold => {
                DeliveryQuote::priced(DeliveryTier::Free, 0, "FREE Delivery")
            }
            Zone::Local => DeliveryQuote::priced(
                DeliveryTier::Local,
                self.rates.local_charge,
                "Local Delivery",
            ),
            Zone::Regional => DeliveryQuote::priced(
                DeliveryTier::Regional,
                self.rates.regional_charge,
                "Regional Delivery",
            ),
            Zone::National => DeliveryQuote::priced(
                DeliveryTier::National,
                self.rates.national_charge,
                "All India Delivery",
            ),
        }
    }

    /// Transit estimate for `pincode`. Codes that fail validation get the
    /// slowest estimate.
    pub fn estimate_transit_time(&self, pincode: &str) -> &'static str {
        match self.area.classify(pincode) {
            Ok(Zone::Local) => TRANSIT_LOCAL,
            Ok(Zone::Regional) => TRANSIT_REGIONAL,
            Ok(Zone::National) | Err(_) => TRANSIT_NATIONAL,
        }
    }
}

//! Vendor detection from document text and filename.

use serde::Serialize;

use crate::models::invoice::{Vendor, VendorSelection};

/// Why a vendor was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionReason {
    /// The user fixed the vendor for the batch.
    Override,
    /// The vendor's brand name appears in the text or filename.
    BrandName,
    /// A vendor-specific technical marker appears in the text.
    TechnicalMarker,
    /// Nothing matched.
    Default,
}

/// Result of vendor detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub vendor: Vendor,
    pub reason: DetectionReason,
}

impl Detection {
    fn new(vendor: Vendor, reason: DetectionReason) -> Self {
        Self { vendor, reason }
    }
}

/// Interconnect facility code and product name only Equinix prints.
const EQUINIX_MARKERS: [&str; 2] = ["IBX", "Cross Connect"];

/// Service type and invoice recipient only found on Orange invoices.
const ORANGE_MARKERS: [&str; 2] = ["IPL", "BSCCL"];

/// Decide which vendor parser handles a document. Always yields a vendor.
pub fn detect_vendor(text: &str, filename: &str, selection: VendorSelection) -> Detection {
    if let VendorSelection::Fixed(vendor) = selection {
        return Detection::new(vendor, DetectionReason::Override);
    }

    let filename = filename.to_lowercase();
    let branded = |vendor: Vendor| {
        let name = vendor.name();
        text.contains(name) || filename.contains(&name.to_lowercase())
    };

    if branded(Vendor::Equinix) {
        return Detection::new(Vendor::Equinix, DetectionReason::BrandName);
    }
    if branded(Vendor::Orange) {
        return Detection::new(Vendor::Orange, DetectionReason::BrandName);
    }
    if EQUINIX_MARKERS.iter().any(|m| text.contains(m)) {
        return Detection::new(Vendor::Equinix, DetectionReason::TechnicalMarker);
    }
    if ORANGE_MARKERS.iter().any(|m| text.contains(m)) {
        return Detection::new(Vendor::Orange, DetectionReason::TechnicalMarker);
    }

    Detection::new(Vendor::Equinix, DetectionReason::Default)
}

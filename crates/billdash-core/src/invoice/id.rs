//! Fallback invoice identifiers for documents without a recognisable number.

use std::sync::atomic::{AtomicU32, Ordering};

use uuid::Uuid;

use crate::models::invoice::Vendor;

/// Source of identifiers used when no invoice number is found in the text.
pub trait IdGenerator: Send + Sync {
    /// Produce an identifier for an invoice from `vendor`.
    fn fallback_id(&self, vendor: Vendor) -> String;
}

/// Random `<prefix>-nnnn` identifiers. Collisions are left to the store.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn fallback_id(&self, vendor: Vendor) -> String {
        let n = Uuid::new_v4().as_u128() % 10_000;
        format!("{}-{}", vendor.id_prefix(), n)
    }
}

/// Deterministic `<prefix>-0001`, `<prefix>-0002`, ... identifiers.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU32,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn fallback_id(&self, vendor: Vendor) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{:04}", vendor.id_prefix(), n)
    }
}

/// Always returns the same identifier.
#[derive(Debug, Clone)]
pub struct FixedIdGenerator(pub String);

impl IdGenerator for FixedIdGenerator {
    fn fallback_id(&self, _vendor: Vendor) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_shape() {
        let id = RandomIdGenerator.fallback_id(Vendor::Equinix);
        let digits = id.strip_prefix("EQ-").unwrap();
        assert!(digits.parse::<u32>().unwrap() < 10_000);
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.fallback_id(Vendor::Orange), "OR-0001");
        assert_eq!(ids.fallback_id(Vendor::Equinix), "EQ-0002");
    }

    #[test]
    fn test_fixed_id() {
        let ids = FixedIdGenerator("TEST-1".to_string());
        assert_eq!(ids.fallback_id(Vendor::Orange), "TEST-1");
    }
}

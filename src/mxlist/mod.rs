//! MX records grouped by preference tier.
//!
//! [`MxList`] keeps every record keyed by its preference. Tiers are visited in
//! ascending preference order (RFC 5321 §5.1) and the members of a tier are
//! permuted so that equally preferred hosts share the load.

mod permutation;
mod types;

pub use permutation::{KeepOrder, Permutation, RandomPermutation};
pub use types::MxRecord;

use std::collections::BTreeMap;
use std::fmt;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MxList {
    tiers: BTreeMap<u16, Vec<MxRecord>>,
}

impl MxList {
    /// Group `records` by preference. Duplicates are kept.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = MxRecord>,
    {
        let mut tiers: BTreeMap<u16, Vec<MxRecord>> = BTreeMap::new();
        for record in records {
            tiers.entry(record.preference).or_default().push(record);
        }
        Self { tiers }
    }

    /// The implicit MX of RFC 5321 §5.1: `host` itself at preference 0.
    pub fn implicit(host: impl Into<String>) -> Self {
        Self::from_records([MxRecord::new(0, host)])
    }

    /// Permute every tier with a freshly seeded generator.
    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut RandomPermutation::from_entropy());
    }

    /// Permute every tier independently with `permutation`.
    pub fn shuffle_with<P>(&mut self, permutation: &mut P)
    where
        P: Permutation + ?Sized,
    {
        for tier in self.tiers.values_mut() {
            permutation.permute(tier);
        }
    }

    /// Distinct preference values, ascending.
    pub fn preferences(&self) -> Vec<u16> {
        self.tiers.keys().copied().collect()
    }

    pub fn tier(&self, preference: u16) -> Option<&[MxRecord]> {
        self.tiers.get(&preference).map(Vec::as_slice)
    }

    /// Tiers in ascending preference order.
    pub fn tiers(&self) -> impl Iterator<Item = (u16, &[MxRecord])> {
        self.tiers
            .iter()
            .map(|(preference, records)| (*preference, records.as_slice()))
    }

    /// Records in delivery order: tier by tier, then in tier order.
    pub fn iter(&self) -> impl Iterator<Item = &MxRecord> {
        self.tiers.values().flatten()
    }

    /// Number of records across all tiers.
    pub fn len(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn into_records(self) -> Vec<MxRecord> {
        self.tiers.into_values().flatten().collect()
    }
}

impl FromIterator<MxRecord> for MxList {
    fn from_iter<I: IntoIterator<Item = MxRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}

impl fmt::Display for MxList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<empty>");
        }
        for (index, (preference, records)) in self.tiers().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            let hosts = records
                .iter()
                .map(|r| r.exchange.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "{preference}: {hosts}")?;
        }
        Ok(())
    }
}

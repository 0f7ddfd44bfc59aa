//! Harvest quota ledger for DIY-leased fields.
//!
//! A field tracks its seasonal harvest allowance either as a single
//! aggregate cap or as a list of per-species caps. Both shapes answer
//! the same questions (`total`, `remaining`, `is_exhausted`) and deplete
//! through [`Quota::apply_harvest`], so call sites never branch on a
//! nullable column.
//!
//! Invariant: `remaining <= total` for every entry, always. Depletion is
//! floored at zero — over-harvest reporting clamps rather than errors.

use crate::types::HarvestEntry;
use serde::{Deserialize, Serialize};

/// Per-species harvest allowance entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesQuota {
    /// Species name (e.g. "Red Grouse")
    pub species: String,
    /// Seasonal cap for this species
    pub total: u32,
    /// Allowance still available
    pub remaining: u32,
}

impl SpeciesQuota {
    /// Creates a fresh entry with the full allowance remaining
    #[must_use]
    pub const fn new(species: String, total: u32) -> Self {
        Self {
            species,
            total,
            remaining: total,
        }
    }
}

/// A field's harvest allowance for the season.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Quota {
    /// No quota concept — guided (subsidised/international) fields
    Untracked,
    /// Single aggregate cap across all species
    Scalar {
        /// Seasonal cap
        total: u32,
        /// Allowance still available
        remaining: u32,
    },
    /// Per-species caps
    Species {
        /// One entry per tracked species
        entries: Vec<SpeciesQuota>,
    },
}

impl Quota {
    /// Builds a per-species quota, normalizing an empty list to
    /// [`Quota::Untracked`] so an empty list never reads as exhausted.
    #[must_use]
    pub fn species(entries: Vec<SpeciesQuota>) -> Self {
        if entries.is_empty() {
            Self::Untracked
        } else {
            Self::Species { entries }
        }
    }

    /// Builds a scalar quota with the full allowance remaining
    #[must_use]
    pub const fn scalar(total: u32) -> Self {
        Self::Scalar {
            total,
            remaining: total,
        }
    }

    /// Whether this field tracks harvests at all
    #[must_use]
    pub const fn is_tracked(&self) -> bool {
        !matches!(self, Self::Untracked)
    }

    /// Total seasonal allowance, summed across species.
    /// `None` for fields with no quota concept.
    #[must_use]
    pub fn total(&self) -> Option<u32> {
        match self {
            Self::Untracked => None,
            Self::Scalar { total, .. } => Some(*total),
            Self::Species { entries } => Some(entries.iter().map(|e| e.total).sum()),
        }
    }

    /// Remaining allowance, summed across species.
    /// `None` for fields with no quota concept.
    #[must_use]
    pub fn remaining(&self) -> Option<u32> {
        match self {
            Self::Untracked => None,
            Self::Scalar { remaining, .. } => Some(*remaining),
            Self::Species { entries } => Some(entries.iter().map(|e| e.remaining).sum()),
        }
    }

    /// True iff every entry's remaining allowance has reached zero.
    /// A field with no quota concept is never exhausted.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        match self {
            Self::Untracked => false,
            Self::Scalar { remaining, .. } => *remaining == 0,
            Self::Species { entries } => entries.iter().all(|e| e.remaining == 0),
        }
    }

    /// Checks the `remaining <= total` invariant on every entry
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        match self {
            Self::Untracked => true,
            Self::Scalar { total, remaining } => remaining <= total,
            Self::Species { entries } => entries.iter().all(|e| e.remaining <= e.total),
        }
    }

    /// Depletes the ledger for one hunt report.
    ///
    /// Per-species quotas decrement each matching species by its reported
    /// quantity; a scalar quota decrements by the aggregate count. Both
    /// floor at zero. Species with no matching entry are ignored — the
    /// field simply does not track them.
    pub fn apply_harvest(&mut self, animals_harvested: u32, per_species: &[HarvestEntry]) {
        match self {
            Self::Untracked => {}
            Self::Scalar { remaining, .. } => {
                *remaining = remaining.saturating_sub(animals_harvested);
            }
            Self::Species { entries } => {
                for harvested in per_species {
                    if let Some(entry) =
                        entries.iter_mut().find(|e| e.species == harvested.species)
                    {
                        entry.remaining = entry.remaining.saturating_sub(harvested.quantity);
                    }
                }
            }
        }
    }
}

impl Default for Quota {
    fn default() -> Self {
        Self::Untracked
    }
}

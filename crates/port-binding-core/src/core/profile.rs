// port-binding-core/src/core/profile.rs
// ============================================================================
// Module: Binding Profile Constraints
// Description: Per-key constraint records for driver profile dictionaries.
// Purpose: Describe which profile keys are accepted and how values are checked.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A binding profile is a caller-supplied dictionary carrying driver-specific
//! configuration (for example SR-IOV PCI addressing). Constraint sets are pure
//! data: each key maps to an optional regex pattern and a required flag.
//! Unknown keys are rejected by the codec; a `None` pattern means the key must
//! be omitted entirely, never merely `null`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Reference Patterns
// ============================================================================

/// Pattern for a PCI slot address such as `0000:03:00.1`.
pub const PCI_SLOT_PATTERN: &str =
    r"^[0-9a-fA-F]{4}:[0-9a-fA-F]{2}:[0-9a-fA-F]{2}.[0-9a-fA-F]$";
/// Pattern for PCI vendor/product information such as `8086:10ed`.
pub const PCI_VENDOR_PATTERN: &str = r"^[0-9a-fA-F]{4}:[0-9a-fA-F]{4}$";
/// Pattern for a comma-separated list of numbers and number ranges.
pub const COMMA_SEPARATED_LIST_PATTERN: &str = r"^([0-9]+(-[0-9]+)?)(,([0-9]+(-[0-9]+)?))*$";

// ============================================================================
// SECTION: Constraint Records
// ============================================================================

/// Constraint applied to one profile key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConstraint {
    /// Regex the value must fully match when present. `None` means the key
    /// must be omitted from the profile entirely.
    pub pattern: Option<String>,
    /// Whether the key must be present.
    pub required: bool,
}

impl ProfileConstraint {
    /// Constraint for an optional key matching the given pattern.
    #[must_use]
    pub fn optional(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            required: false,
        }
    }

    /// Constraint for a required key matching the given pattern.
    #[must_use]
    pub fn required(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            required: true,
        }
    }

    /// Constraint for a key that must be omitted entirely.
    #[must_use]
    pub const fn omitted() -> Self {
        Self {
            pattern: None,
            required: false,
        }
    }
}

/// Ordered set of profile constraints keyed by profile key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ProfileConstraintSet {
    /// Constraints keyed by profile key.
    entries: BTreeMap<String, ProfileConstraint>,
}

impl ProfileConstraintSet {
    /// Creates an empty constraint set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Inserts a constraint for a key, replacing any previous constraint.
    pub fn insert(&mut self, key: impl Into<String>, constraint: ProfileConstraint) {
        self.entries.insert(key.into(), constraint);
    }

    /// Returns the constraint for a key, if declared.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ProfileConstraint> {
        self.entries.get(key)
    }

    /// Returns true when the set declares no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates constraints in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ProfileConstraint)> {
        self.entries.iter()
    }
}

impl FromIterator<(String, ProfileConstraint)> for ProfileConstraintSet {
    fn from_iter<I: IntoIterator<Item = (String, ProfileConstraint)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// SECTION: Reference Constraint Set
// ============================================================================

/// Returns the SR-IOV profile constraint set used by the reference schema.
///
/// Virtual-function VLAN lists accept comma-separated numbers and ranges; PCI
/// slots and vendor information follow the standard PCI text forms. All keys
/// are optional.
#[must_use]
pub fn sriov_profile_constraints() -> ProfileConstraintSet {
    let mut set = ProfileConstraintSet::new();
    set.insert("vf_vlan_filter", ProfileConstraint::optional(COMMA_SEPARATED_LIST_PATTERN));
    set.insert("vf_public_vlans", ProfileConstraint::optional(COMMA_SEPARATED_LIST_PATTERN));
    set.insert("vf_private_vlans", ProfileConstraint::optional(COMMA_SEPARATED_LIST_PATTERN));
    set.insert("vf_guest_vlans", ProfileConstraint::optional(COMMA_SEPARATED_LIST_PATTERN));
    set.insert("vf_vlan_mirror", ProfileConstraint::optional(COMMA_SEPARATED_LIST_PATTERN));
    set.insert("vf_pci_slot", ProfileConstraint::optional(PCI_SLOT_PATTERN));
    set.insert("pf_pci_slot", ProfileConstraint::optional(PCI_SLOT_PATTERN));
    set.insert("pf_pci_vendor_info", ProfileConstraint::optional(PCI_VENDOR_PATTERN));
    set
}

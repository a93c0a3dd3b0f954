// port-binding-core/src/core/violation.rs
// ============================================================================
// Module: Validation Violations
// Description: Structured violation taxonomy for payload screening.
// Purpose: Report every rejected attribute with enough context to correct it.
// Dependencies: crate::core::{attributes, identifiers}, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Violations are data, not errors: screening a payload collects the complete
//! list so callers can present every correction at once. Authorization
//! denials (`Forbidden`) are a distinct kind from value violations so callers
//! can tell malformed input apart from insufficient privilege.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::attributes::Operation;
use crate::core::identifiers::AttributeName;

// ============================================================================
// SECTION: Violations
// ============================================================================

/// A single screening violation.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// Payload key does not exist in the attribute schema.
    #[error("unknown attribute: {attribute}")]
    UnknownAttribute {
        /// Attribute name as supplied by the caller.
        attribute: AttributeName,
    },
    /// Value is outside the attribute's declared set.
    #[error("invalid value for {attribute}")]
    InvalidValue {
        /// Attribute that rejected the value.
        attribute: AttributeName,
        /// Rejected value.
        value: Value,
        /// Values the attribute accepts.
        allowed: Vec<String>,
    },
    /// Value does not match the attribute's declared pattern.
    #[error("invalid format for {attribute}")]
    InvalidFormat {
        /// Attribute that rejected the value.
        attribute: AttributeName,
        /// Rejected value.
        value: Value,
        /// Pattern the value must fully match.
        pattern: String,
    },
    /// Nested profile dictionary failed its constraint set.
    #[error("invalid profile for {attribute}")]
    InvalidProfile {
        /// Attribute carrying the profile.
        attribute: AttributeName,
        /// Per-key profile violations.
        violations: Vec<ProfileViolation>,
    },
    /// Attribute may not be written by this caller for this operation.
    #[error("forbidden: {attribute} on {operation}")]
    Forbidden {
        /// Attribute the caller attempted to write.
        attribute: AttributeName,
        /// Operation that was denied.
        operation: Operation,
        /// Why the write was denied.
        reason: ForbiddenReason,
    },
}

/// Why a write was denied by the mutability gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    /// Attribute does not accept values on create.
    NotAllowedOnCreate,
    /// Attribute does not accept values on update.
    NotAllowedOnUpdate,
    /// Attribute is policy-gated and the caller lacks privilege.
    PolicyDenied,
}

// ============================================================================
// SECTION: Profile Violations
// ============================================================================

/// A single violation within a profile dictionary.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileViolation {
    /// Profile value is not a mapping or `null`.
    #[error("profile must be a mapping or null")]
    NotAMapping,
    /// Profile key is not declared by the constraint set.
    #[error("unknown profile key: {key}")]
    UnknownKey {
        /// Key as supplied by the caller.
        key: String,
    },
    /// Required profile key is absent.
    #[error("missing required profile key: {key}")]
    MissingKey {
        /// Key the constraint set requires.
        key: String,
    },
    /// Profile value does not fully match the key's pattern.
    #[error("profile key {key} does not match its pattern")]
    PatternMismatch {
        /// Key whose value was rejected.
        key: String,
        /// Rejected value.
        value: Value,
        /// Pattern the value must fully match.
        pattern: String,
    },
    /// Profile key must be omitted entirely.
    #[error("profile key {key} must be omitted")]
    MustBeOmitted {
        /// Key the constraint set forbids.
        key: String,
    },
}

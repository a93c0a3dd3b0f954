// port-binding-core/src/core/mod.rs
// ============================================================================
// Module: Port Binding Core Types
// Description: Canonical schema, profile, and binding-state structures.
// Purpose: Provide stable, serializable types for binding payloads and state.
// Dependencies: regex, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Core types define attribute schemas, profile constraints, violation
//! taxonomies, and per-port binding state. These types are the canonical
//! source of truth for any derived API surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod attributes;
pub mod binding;
pub mod identifiers;
pub mod profile;
pub mod violation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use attributes::AttributeDefault;
pub use attributes::AttributeEntry;
pub use attributes::AttributeMap;
pub use attributes::AttributeSchemaSet;
pub use attributes::BINDING_SCHEMA_VERSION;
pub use attributes::ExtensionInfo;
pub use attributes::Operation;
pub use attributes::SchemaError;
pub use attributes::SchemaRegistry;
pub use attributes::ValueRule;
pub use attributes::binding_attributes;
pub use attributes::extension_info;
pub use binding::BindingUpdateError;
pub use binding::PortBindingState;
pub use binding::UnknownVnicType;
pub use binding::VifDetails;
pub use binding::VifType;
pub use binding::VnicType;
pub use identifiers::AttributeName;
pub use identifiers::DriverId;
pub use identifiers::HostId;
pub use identifiers::PortId;
pub use identifiers::SchemaVersion;
pub use profile::ProfileConstraint;
pub use profile::ProfileConstraintSet;
pub use profile::sriov_profile_constraints;
pub use violation::ForbiddenReason;
pub use violation::ProfileViolation;
pub use violation::Violation;

// port-binding-drivers/src/lib.rs
// ============================================================================
// Module: Port Binding Drivers
// Description: Built-in binding drivers and registry utilities.
// Purpose: Provide concrete VIF backends aligned with the Port Binding core.
// Dependencies: port-binding-core, serde, serde_json
// ============================================================================

//! ## Overview
//! This crate ships built-in binding drivers (Open vSwitch, SR-IOV, macvtap),
//! a priority-ordered registry implementing the core driver catalog, and a
//! bounded wrapper that enforces a deadline on blocking bind calls. Drivers
//! are deterministic with respect to the supplied binding request.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bounded;
pub mod macvtap;
pub mod ovs;
pub mod registry;
pub mod sriov;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bounded::BoundedDriver;
pub use macvtap::MacvtapDriver;
pub use macvtap::MacvtapDriverConfig;
pub use macvtap::MacvtapMode;
pub use ovs::OvsDriver;
pub use ovs::OvsDriverConfig;
pub use ovs::VhostUserConfig;
pub use ovs::VhostUserMode;
pub use registry::DriverRegistry;
pub use sriov::SriovDriver;
pub use sriov::SriovDriverConfig;

// port-binding-core/src/runtime/gate.rs
// ============================================================================
// Module: Mutability Gate
// Description: Create/update gating, policy enforcement, and visibility projection.
// Purpose: Decide which attributes a caller may write or read, independent of value validity.
// Dependencies: crate::core, crate::interfaces, crate::runtime::validator, serde_json
// ============================================================================

//! ## Overview
//! The mutability gate enforces which attributes may be set on create versus
//! update and which require an external policy decision. Denials are reported
//! as `Forbidden`, a distinct violation kind from value failures, so callers
//! can tell insufficient privilege apart from malformed input. The gate fails
//! closed: a policy decider error on a policy-gated attribute denies the
//! access. Visibility gating is operation-independent and applies to reads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::AttributeEntry;
use crate::core::AttributeMap;
use crate::core::AttributeSchemaSet;
use crate::core::ForbiddenReason;
use crate::core::PortBindingState;
use crate::core::SchemaError;
use crate::core::Violation;
use crate::core::attributes;
use crate::core::attributes::Operation;
use crate::interfaces::PolicyDecider;
use crate::interfaces::PolicyDecision;
use crate::runtime::validator::Validator;

// ============================================================================
// SECTION: Attribute Authorization
// ============================================================================

/// Decides whether an attribute may be written for the operation.
///
/// Create requires `allow_post`, update requires `allow_put`, and
/// policy-gated attributes additionally require caller privilege.
///
/// # Errors
///
/// Returns a [`Violation::Forbidden`] describing the denial.
pub fn authorize(
    entry: &AttributeEntry,
    operation: Operation,
    privileged: bool,
) -> Result<(), Violation> {
    let allowed = match operation {
        Operation::Create => entry.allow_post,
        Operation::Update => entry.allow_put,
    };
    if !allowed {
        let reason = match operation {
            Operation::Create => ForbiddenReason::NotAllowedOnCreate,
            Operation::Update => ForbiddenReason::NotAllowedOnUpdate,
        };
        return Err(Violation::Forbidden {
            attribute: entry.name.clone(),
            operation,
            reason,
        });
    }
    if entry.enforce_policy && !privileged {
        return Err(Violation::Forbidden {
            attribute: entry.name.clone(),
            operation,
            reason: ForbiddenReason::PolicyDenied,
        });
    }
    Ok(())
}

// ============================================================================
// SECTION: Payload Screening
// ============================================================================

/// Screens payloads through the mutability gate and the validator.
#[derive(Debug)]
pub struct PayloadScreen {
    /// Schema the screen enforces.
    schema: AttributeSchemaSet,
    /// Validator compiled from the schema.
    validator: Validator,
}

impl PayloadScreen {
    /// Compiles a screen for one schema version.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the schema's patterns fail to compile.
    pub fn new(schema: AttributeSchemaSet) -> Result<Self, SchemaError> {
        let validator = Validator::new(&schema)?;
        Ok(Self {
            schema,
            validator,
        })
    }

    /// Returns the schema the screen enforces.
    #[must_use]
    pub const fn schema(&self) -> &AttributeSchemaSet {
        &self.schema
    }

    /// Screens a payload for an operation on behalf of a caller.
    ///
    /// Gate denials and validation failures are collected together so the
    /// caller receives the complete correction list in one pass. Denied
    /// attributes are excluded from validation and from the normalized
    /// payload.
    ///
    /// # Errors
    ///
    /// Returns every [`Violation`] found in the payload.
    pub fn screen(
        &self,
        payload: &AttributeMap,
        operation: Operation,
        caller: &str,
        policy: &dyn PolicyDecider,
    ) -> Result<AttributeMap, Vec<Violation>> {
        let mut violations = Vec::new();
        let mut writable = AttributeMap::new();

        for (key, value) in payload {
            let Some(entry) = self.schema.get(key) else {
                // Unknown keys flow through so the validator reports them.
                writable.insert(key.clone(), value.clone());
                continue;
            };
            let privileged = if entry.enforce_policy {
                matches!(
                    policy.authorize(caller, &entry.name, operation),
                    Ok(PolicyDecision::Permit)
                )
            } else {
                true
            };
            match authorize(entry, operation, privileged) {
                Ok(()) => {
                    writable.insert(key.clone(), value.clone());
                }
                Err(violation) => violations.push(violation),
            }
        }

        match self.validator.validate(&writable, operation) {
            Ok(normalized) => {
                if violations.is_empty() {
                    Ok(normalized)
                } else {
                    Err(violations)
                }
            }
            Err(mut value_violations) => {
                violations.append(&mut value_violations);
                Err(violations)
            }
        }
    }
}

// ============================================================================
// SECTION: Visibility Projection
// ============================================================================

/// Projects a port's binding state into the attributes visible to a caller.
///
/// Attributes with `is_visible == false` never appear; policy-gated
/// attributes are omitted for non-privileged readers. Absent host identifiers
/// render as `null` so the key remains stable for visible readers.
#[must_use]
pub fn render_visible(
    state: &PortBindingState,
    schema: &AttributeSchemaSet,
    privileged: bool,
) -> AttributeMap {
    let mut out = AttributeMap::new();
    for entry in schema.iter() {
        if !entry.is_visible {
            continue;
        }
        if entry.enforce_policy && !privileged {
            continue;
        }
        let Some(value) = state_value(state, entry.name.as_str()) else {
            continue;
        };
        out.insert(entry.name.to_string(), value);
    }
    out
}

/// Reads one attribute's current value out of binding state.
fn state_value(state: &PortBindingState, name: &str) -> Option<Value> {
    match name {
        attributes::VNIC_TYPE => Some(Value::String(state.vnic_type.as_str().to_string())),
        attributes::VIF_TYPE => Some(Value::String(state.vif_type.as_str().to_string())),
        attributes::VIF_DETAILS => {
            Some(Value::Object(state.vif_details.iter().map(|(k, v)| (k.clone(), v.clone())).collect()))
        }
        attributes::HOST_ID => Some(
            state
                .host_id
                .as_ref()
                .map_or(Value::Null, |host| Value::String(host.as_str().to_string())),
        ),
        attributes::PROFILE => {
            Some(Value::Object(state.profile.iter().map(|(k, v)| (k.clone(), v.clone())).collect()))
        }
        _ => None,
    }
}

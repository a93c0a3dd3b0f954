// port-binding-core/src/runtime/profile.rs
// ============================================================================
// Module: Profile Codec
// Description: Decoding and validation of driver profile dictionaries.
// Purpose: Enforce per-key constraint sets over untrusted profile payloads.
// Dependencies: crate::core, regex, serde_json
// ============================================================================

//! ## Overview
//! The profile codec decodes caller-supplied profile values against a
//! compiled constraint set. Unknown keys are rejected, required keys are
//! enforced, and present values must fully match their pattern. A `None`
//! pattern means the key must be omitted entirely, never merely `null`.
//! Encoding is the identity for accepted mappings: the validated shape is the
//! storage and wire shape.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::Map;
use serde_json::Value;

use crate::core::ProfileViolation;
use crate::core::SchemaError;
use crate::core::attributes::compile_full_match;
use crate::core::profile::ProfileConstraintSet;

// ============================================================================
// SECTION: Compiled Constraints
// ============================================================================

/// One compiled profile-key rule.
#[derive(Debug)]
struct CompiledConstraint {
    /// Compiled full-match regex and its source pattern; `None` means the key
    /// must be omitted.
    pattern: Option<(Regex, String)>,
    /// Whether the key must be present.
    required: bool,
}

/// Profile codec with constraints compiled once at construction.
#[derive(Debug)]
pub struct ProfileCodec {
    /// Compiled constraints keyed by profile key.
    constraints: BTreeMap<String, CompiledConstraint>,
}

impl ProfileCodec {
    /// Compiles a constraint set into a codec.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidPattern`] when a pattern fails to compile.
    pub fn new(constraints: &ProfileConstraintSet) -> Result<Self, SchemaError> {
        let mut compiled = BTreeMap::new();
        for (key, constraint) in constraints.iter() {
            let pattern = match &constraint.pattern {
                Some(pattern) => {
                    let regex = compile_full_match(pattern).map_err(|_| {
                        SchemaError::InvalidPattern {
                            attribute: key.clone(),
                            pattern: pattern.clone(),
                        }
                    })?;
                    Some((regex, pattern.clone()))
                }
                None => None,
            };
            compiled.insert(
                key.clone(),
                CompiledConstraint {
                    pattern,
                    required: constraint.required,
                },
            );
        }
        Ok(Self {
            constraints: compiled,
        })
    }

    /// Decodes a profile value into a validated mapping.
    ///
    /// `null` decodes to the empty mapping; anything other than a mapping or
    /// `null` is rejected outright.
    ///
    /// # Errors
    ///
    /// Returns the complete list of [`ProfileViolation`]s for the payload.
    pub fn decode(&self, value: &Value) -> Result<BTreeMap<String, Value>, Vec<ProfileViolation>> {
        let entries = match value {
            Value::Null => return Ok(BTreeMap::new()),
            Value::Object(entries) => entries,
            _ => return Err(vec![ProfileViolation::NotAMapping]),
        };

        let mut violations = Vec::new();
        for (key, entry_value) in entries {
            match self.constraints.get(key) {
                None => violations.push(ProfileViolation::UnknownKey {
                    key: key.clone(),
                }),
                Some(constraint) => match &constraint.pattern {
                    None => violations.push(ProfileViolation::MustBeOmitted {
                        key: key.clone(),
                    }),
                    Some((regex, pattern)) => {
                        if !value_matches(entry_value, regex) {
                            violations.push(ProfileViolation::PatternMismatch {
                                key: key.clone(),
                                value: entry_value.clone(),
                                pattern: pattern.clone(),
                            });
                        }
                    }
                },
            }
        }
        for (key, constraint) in &self.constraints {
            if constraint.required && !entries.contains_key(key) {
                violations.push(ProfileViolation::MissingKey {
                    key: key.clone(),
                });
            }
        }

        if violations.is_empty() {
            Ok(entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        } else {
            Err(violations)
        }
    }

    /// Encodes an accepted mapping back to its wire value.
    ///
    /// The identity transform: accepted profiles are stored and transmitted
    /// exactly as validated.
    #[must_use]
    pub fn encode(mapping: &BTreeMap<String, Value>) -> Value {
        Value::Object(mapping.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Map<_, _>>())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when the value is a string fully matching the regex.
fn value_matches(value: &Value, regex: &Regex) -> bool {
    match value {
        Value::String(text) => regex.is_match(text),
        _ => false,
    }
}

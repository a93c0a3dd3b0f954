// port-binding-core/src/runtime/validator.rs
// ============================================================================
// Module: Payload Validator
// Description: Attribute payload validation against a compiled schema.
// Purpose: Produce normalized payloads or the complete violation list.
// Dependencies: crate::core, crate::runtime::profile, regex, serde_json
// ============================================================================

//! ## Overview
//! The validator checks an untrusted attribute payload against one schema
//! version. Validation is total: every violation in the payload is collected,
//! never just the first. Rules are compiled once at construction so malformed
//! patterns surface as a [`SchemaError`] up front rather than at validation
//! time. Validation is pure and deterministic given schema and payload.

// ============================================================================
// SECTION: Imports
// ============================================================================

use regex::Regex;
use serde_json::Value;

use crate::core::AttributeDefault;
use crate::core::AttributeEntry;
use crate::core::AttributeMap;
use crate::core::AttributeSchemaSet;
use crate::core::SchemaError;
use crate::core::ValueRule;
use crate::core::Violation;
use crate::core::attributes::Operation;
use crate::core::attributes::compile_full_match;
use crate::core::identifiers::AttributeName;
use crate::runtime::profile::ProfileCodec;

// ============================================================================
// SECTION: Compiled Schema
// ============================================================================

/// One attribute with its rule compiled.
#[derive(Debug)]
struct CompiledAttribute {
    /// Schema entry for the attribute.
    entry: AttributeEntry,
    /// Compiled validation rule, when declared.
    rule: Option<CompiledRule>,
}

/// Compiled form of a value rule.
#[derive(Debug)]
enum CompiledRule {
    /// Enum membership over the allowed strings.
    Values(Vec<String>),
    /// Full-match regex with its source pattern.
    Pattern(Regex, String),
    /// Nested profile constraint set.
    Profile(ProfileCodec),
}

/// Payload validator for one schema version.
#[derive(Debug)]
pub struct Validator {
    /// Compiled attributes in schema declaration order.
    attributes: Vec<CompiledAttribute>,
}

impl Validator {
    /// Compiles a schema set into a validator.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidPattern`] when a declared pattern fails
    /// to compile.
    pub fn new(schema: &AttributeSchemaSet) -> Result<Self, SchemaError> {
        let mut attributes = Vec::new();
        for entry in schema.iter() {
            let rule = match &entry.rule {
                None => None,
                Some(ValueRule::Values {
                    allowed,
                }) => Some(CompiledRule::Values(allowed.clone())),
                Some(ValueRule::RegexOrNone {
                    pattern,
                }) => {
                    let regex =
                        compile_full_match(pattern).map_err(|_| SchemaError::InvalidPattern {
                            attribute: entry.name.to_string(),
                            pattern: pattern.clone(),
                        })?;
                    Some(CompiledRule::Pattern(regex, pattern.clone()))
                }
                Some(ValueRule::ProfileSubsetOrNone {
                    constraints,
                }) => Some(CompiledRule::Profile(ProfileCodec::new(constraints)?)),
            };
            attributes.push(CompiledAttribute {
                entry: entry.clone(),
                rule,
            });
        }
        Ok(Self {
            attributes,
        })
    }

    /// Validates a payload, returning the normalized payload or every violation.
    ///
    /// Normalization injects concrete defaults for attributes absent from a
    /// create payload; the not-specified sentinel injects nothing. Validating
    /// an already-normalized payload yields it unchanged.
    ///
    /// # Errors
    ///
    /// Returns the complete list of [`Violation`]s for the payload.
    pub fn validate(
        &self,
        payload: &AttributeMap,
        operation: Operation,
    ) -> Result<AttributeMap, Vec<Violation>> {
        let mut violations = Vec::new();
        let mut normalized = AttributeMap::new();

        for (key, value) in payload {
            let Some(compiled) = self.attribute(key) else {
                violations.push(Violation::UnknownAttribute {
                    attribute: AttributeName::new(key.clone()),
                });
                continue;
            };
            match check_rule(compiled, value) {
                Ok(()) => {
                    normalized.insert(key.clone(), value.clone());
                }
                Err(violation) => violations.push(violation),
            }
        }

        if operation == Operation::Create {
            for compiled in &self.attributes {
                if payload.contains_key(compiled.entry.name.as_str()) {
                    continue;
                }
                if let AttributeDefault::Value(default) = &compiled.entry.default {
                    normalized.insert(compiled.entry.name.to_string(), default.clone());
                }
            }
        }

        if violations.is_empty() {
            Ok(normalized)
        } else {
            Err(violations)
        }
    }

    /// Returns the compiled attribute for a payload key.
    fn attribute(&self, name: &str) -> Option<&CompiledAttribute> {
        self.attributes.iter().find(|compiled| compiled.entry.name.as_str() == name)
    }
}

// ============================================================================
// SECTION: Rule Evaluation
// ============================================================================

/// Applies an attribute's compiled rule to a present value.
fn check_rule(compiled: &CompiledAttribute, value: &Value) -> Result<(), Violation> {
    let Some(rule) = &compiled.rule else {
        return Ok(());
    };
    match rule {
        CompiledRule::Values(allowed) => {
            let accepted = matches!(value, Value::String(text) if allowed.contains(text));
            if accepted {
                Ok(())
            } else {
                Err(Violation::InvalidValue {
                    attribute: compiled.entry.name.clone(),
                    value: value.clone(),
                    allowed: allowed.clone(),
                })
            }
        }
        CompiledRule::Pattern(regex, pattern) => {
            let accepted = match value {
                Value::Null => true,
                Value::String(text) => regex.is_match(text),
                _ => false,
            };
            if accepted {
                Ok(())
            } else {
                Err(Violation::InvalidFormat {
                    attribute: compiled.entry.name.clone(),
                    value: value.clone(),
                    pattern: pattern.clone(),
                })
            }
        }
        CompiledRule::Profile(codec) => match codec.decode(value) {
            Ok(_) => Ok(()),
            Err(profile_violations) => Err(Violation::InvalidProfile {
                attribute: compiled.entry.name.clone(),
                violations: profile_violations,
            }),
        },
    }
}

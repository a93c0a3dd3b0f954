// port-binding-core/src/core/attributes.rs
// ============================================================================
// Module: Attribute Schema
// Description: Versioned attribute schema for port binding payloads.
// Purpose: Define canonical attribute entries with validation at construction.
// Dependencies: crate::core::{identifiers, profile, binding}, regex, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Attribute schemas describe which binding attributes exist at a published
//! version, when they may be written, whether they are policy-gated, and how
//! values are validated. A schema set is validated when constructed (unique
//! names, compilable patterns) and is immutable once published to a registry;
//! changes require a new version key. Unknown versions resolve to the empty
//! set, signalling "no extended attributes at this version" rather than an
//! error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::binding::VnicType;
use crate::core::identifiers::AttributeName;
use crate::core::identifiers::SchemaVersion;
use crate::core::profile::ProfileConstraintSet;
use crate::core::profile::sriov_profile_constraints;

// ============================================================================
// SECTION: Attribute Names
// ============================================================================

/// The kind of vNIC the port should be attached to.
pub const VNIC_TYPE: &str = "binding:vnic_type";
/// The negotiated VIF type for the port.
pub const VIF_TYPE: &str = "binding:vif_type";
/// Driver-populated details describing the negotiated VIF.
pub const VIF_DETAILS: &str = "binding:vif_details";
/// The host on which the port will be allocated.
pub const HOST_ID: &str = "binding:host_id";
/// Caller-supplied dictionary passing VIF-specific information to drivers.
pub const PROFILE: &str = "binding:profile";

// ============================================================================
// SECTION: Operations and Payloads
// ============================================================================

/// Operation kind a payload is screened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Port create request.
    Create,
    /// Port update request.
    Update,
}

impl Operation {
    /// Returns the stable wire string for the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute payload keyed by wire attribute name.
pub type AttributeMap = BTreeMap<String, Value>;

// ============================================================================
// SECTION: Attribute Entries
// ============================================================================

/// Default applied when an attribute is absent from a create payload.
///
/// The not-specified sentinel is distinct from `null`: it injects nothing,
/// while `Value(Value::Null)` would inject an explicit `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeDefault {
    /// No default; absence stays absence.
    #[default]
    NotSpecified,
    /// Concrete default injected when the attribute is absent on create.
    Value(Value),
}

/// Validation rule applied to present attribute values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueRule {
    /// Value must be one of the declared strings.
    Values {
        /// Accepted values.
        allowed: Vec<String>,
    },
    /// Value must be `null` or fully match the pattern.
    RegexOrNone {
        /// Pattern the value must fully match.
        pattern: String,
    },
    /// Value must be `null` or a mapping satisfying the constraint set.
    ProfileSubsetOrNone {
        /// Per-key constraints for the nested mapping.
        constraints: ProfileConstraintSet,
    },
}

/// One attribute entry within a schema version.
///
/// # Invariants
/// - `name` is unique within its schema set.
/// - Patterns referenced by `rule` compile; this is checked at set construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEntry {
    /// Wire attribute name.
    pub name: AttributeName,
    /// Whether the attribute may appear on create payloads.
    pub allow_post: bool,
    /// Whether the attribute may appear on update payloads.
    pub allow_put: bool,
    /// Default applied when absent on create.
    pub default: AttributeDefault,
    /// Whether writes and reads additionally require an external policy decision.
    pub enforce_policy: bool,
    /// Whether the attribute appears in responses at all.
    pub is_visible: bool,
    /// Optional validation rule for present values.
    pub rule: Option<ValueRule>,
}

// ============================================================================
// SECTION: Schema Sets
// ============================================================================

/// Immutable set of attribute entries for one published schema version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct AttributeSchemaSet {
    /// Attribute entries in declaration order.
    entries: Vec<AttributeEntry>,
}

impl AttributeSchemaSet {
    /// Creates a schema set, validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] on duplicate names or uncompilable patterns.
    pub fn new(entries: Vec<AttributeEntry>) -> Result<Self, SchemaError> {
        ensure_unique_names(&entries)?;
        ensure_patterns_compile(&entries)?;
        Ok(Self {
            entries,
        })
    }

    /// Creates the empty schema set.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the entry for an attribute name, if declared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeEntry> {
        self.entries.iter().find(|entry| entry.name.as_str() == name)
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributeEntry> {
        self.entries.iter()
    }

    /// Returns true when the set declares no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Schema construction and registry errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Duplicate attribute names within one schema set.
    #[error("duplicate attribute name: {0}")]
    DuplicateAttribute(String),
    /// An attribute or profile pattern does not compile.
    #[error("invalid pattern for {attribute}: {pattern}")]
    InvalidPattern {
        /// Attribute (or `attribute/key` path) declaring the pattern.
        attribute: String,
        /// Pattern that failed to compile.
        pattern: String,
    },
    /// A version key was published twice.
    #[error("schema version already published: {0}")]
    VersionAlreadyPublished(String),
}

// ============================================================================
// SECTION: Schema Registry
// ============================================================================

/// Registry of published schema versions.
///
/// # Invariants
/// - Published versions are immutable; republishing a version is an error.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    /// Schema sets keyed by version.
    versions: BTreeMap<SchemaVersion, AttributeSchemaSet>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            versions: BTreeMap::new(),
        }
    }

    /// Creates a registry with the reference binding schema published.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the reference schema fails validation.
    pub fn with_builtin() -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        registry.publish(SchemaVersion::new(BINDING_SCHEMA_VERSION), binding_attributes()?)?;
        Ok(registry)
    }

    /// Publishes a schema set under a new version key.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::VersionAlreadyPublished`] when the version exists.
    pub fn publish(
        &mut self,
        version: SchemaVersion,
        set: AttributeSchemaSet,
    ) -> Result<(), SchemaError> {
        if self.versions.contains_key(&version) {
            return Err(SchemaError::VersionAlreadyPublished(version.to_string()));
        }
        self.versions.insert(version, set);
        Ok(())
    }

    /// Resolves the schema set for a version.
    ///
    /// Unknown versions resolve to the empty set: the caller sees no extended
    /// attributes rather than an error.
    #[must_use]
    pub fn resolve(&self, version: &SchemaVersion) -> AttributeSchemaSet {
        self.versions.get(version).cloned().unwrap_or_else(AttributeSchemaSet::empty)
    }
}

// ============================================================================
// SECTION: Reference Schema
// ============================================================================

/// Version key under which the reference binding schema is published.
pub const BINDING_SCHEMA_VERSION: &str = "2.0";

/// Builds the reference binding attribute schema.
///
/// The negotiated outputs (`binding:vif_type`, `binding:vif_details`) are
/// never caller-writable; the requested inputs (`binding:vnic_type`,
/// `binding:host_id`, `binding:profile`) are writable on create and update.
/// Every binding attribute is policy-gated.
///
/// # Errors
///
/// Returns [`SchemaError`] when the declared patterns fail to compile.
pub fn binding_attributes() -> Result<AttributeSchemaSet, SchemaError> {
    AttributeSchemaSet::new(vec![
        AttributeEntry {
            name: AttributeName::new(VIF_TYPE),
            allow_post: false,
            allow_put: false,
            default: AttributeDefault::NotSpecified,
            enforce_policy: true,
            is_visible: true,
            rule: None,
        },
        AttributeEntry {
            name: AttributeName::new(VIF_DETAILS),
            allow_post: false,
            allow_put: false,
            default: AttributeDefault::NotSpecified,
            enforce_policy: true,
            is_visible: true,
            rule: None,
        },
        AttributeEntry {
            name: AttributeName::new(VNIC_TYPE),
            allow_post: true,
            allow_put: true,
            default: AttributeDefault::Value(Value::String(VnicType::Normal.as_str().to_string())),
            enforce_policy: true,
            is_visible: true,
            rule: Some(ValueRule::Values {
                allowed: VnicType::wire_names(),
            }),
        },
        AttributeEntry {
            name: AttributeName::new(HOST_ID),
            allow_post: true,
            allow_put: true,
            default: AttributeDefault::NotSpecified,
            enforce_policy: true,
            is_visible: true,
            rule: None,
        },
        AttributeEntry {
            name: AttributeName::new(PROFILE),
            allow_post: true,
            allow_put: true,
            default: AttributeDefault::NotSpecified,
            enforce_policy: true,
            is_visible: true,
            rule: Some(ValueRule::ProfileSubsetOrNone {
                constraints: sriov_profile_constraints(),
            }),
        },
    ])
}

// ============================================================================
// SECTION: Extension Metadata
// ============================================================================

/// Descriptive metadata for the binding attribute extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionInfo {
    /// Human-readable extension name.
    pub name: String,
    /// Short alias prefixing the wire attribute names.
    pub alias: String,
    /// Extension description.
    pub description: String,
    /// Timestamp of the last published revision.
    pub updated: String,
}

/// Returns the binding extension metadata.
#[must_use]
pub fn extension_info() -> ExtensionInfo {
    ExtensionInfo {
        name: "Port Binding".to_string(),
        alias: "binding".to_string(),
        description: "Expose port bindings of a virtual port to external application".to_string(),
        updated: "2014-02-03T10:00:00-00:00".to_string(),
    }
}

// ============================================================================
// SECTION: Pattern Compilation
// ============================================================================

/// Compiles a pattern with whole-string anchoring.
///
/// Screening requires values to *fully* match their pattern; wrapping in a
/// non-capturing group makes that hold regardless of anchors in the source
/// pattern.
///
/// # Errors
///
/// Returns [`regex::Error`] when the pattern does not compile.
pub fn compile_full_match(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Ensures attribute names are unique within the set.
fn ensure_unique_names(entries: &[AttributeEntry]) -> Result<(), SchemaError> {
    for (index, entry) in entries.iter().enumerate() {
        if entries.iter().skip(index + 1).any(|other| other.name == entry.name) {
            return Err(SchemaError::DuplicateAttribute(entry.name.to_string()));
        }
    }
    Ok(())
}

/// Ensures every declared pattern compiles.
fn ensure_patterns_compile(entries: &[AttributeEntry]) -> Result<(), SchemaError> {
    for entry in entries {
        match &entry.rule {
            Some(ValueRule::RegexOrNone {
                pattern,
            }) => {
                if compile_full_match(pattern).is_err() {
                    return Err(SchemaError::InvalidPattern {
                        attribute: entry.name.to_string(),
                        pattern: pattern.clone(),
                    });
                }
            }
            Some(ValueRule::ProfileSubsetOrNone {
                constraints,
            }) => {
                for (key, constraint) in constraints.iter() {
                    if let Some(pattern) = &constraint.pattern
                        && compile_full_match(pattern).is_err()
                    {
                        return Err(SchemaError::InvalidPattern {
                            attribute: format!("{}/{key}", entry.name),
                            pattern: pattern.clone(),
                        });
                    }
                }
            }
            Some(ValueRule::Values {
                ..
            })
            | None => {}
        }
    }
    Ok(())
}

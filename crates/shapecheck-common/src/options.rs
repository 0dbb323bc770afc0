//! Engine configuration.
//!
//! Options are plain data, deserializable from the same camelCase JSON shape a
//! `compilerOptions` block uses, so hosts can keep them next to the schemas
//! they load.

use serde::{Deserialize, Deserializer};

use crate::limits::MAX_STRUCTURAL_DEPTH;

/// Custom deserializer for boolean options that accepts both bool and string values.
/// This handles config files that contain `"strictNullChecks": "true"`.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{}'. Expected true, false, 'true', or 'false'",
                s
            ))),
        },
    }
}

/// How parameter types at a shared position are compared when checking
/// signature compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterVariance {
    /// Both parameter types must be assignable to each other.
    #[default]
    Equivalent,
    /// The required side's parameter must be assignable to the candidate's.
    Contravariant,
    /// Either direction suffices (legacy method parameter bivariance).
    Bivariant,
}

/// Options shared by the compatibility checker, the narrowing engine and
/// the default resolver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckerOptions {
    /// When false, `null` and `undefined` are assignable to every type.
    #[serde(deserialize_with = "deserialize_bool_or_string")]
    pub strict_null_checks: bool,
    pub parameter_variance: ParameterVariance,
    /// When false, an optional field may hold an explicit `undefined`.
    #[serde(deserialize_with = "deserialize_bool_or_string")]
    pub exact_optional_property_types: bool,
    /// Include `undefined` in the result of indexed element access.
    #[serde(deserialize_with = "deserialize_bool_or_string")]
    pub no_unchecked_indexed_access: bool,
    /// Check a narrowed value against its variant's shape after the
    /// predicate matched.
    #[serde(deserialize_with = "deserialize_bool_or_string")]
    pub verify_variant_shapes: bool,
    pub max_depth: u32,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        CheckerOptions {
            strict_null_checks: true,
            parameter_variance: ParameterVariance::Equivalent,
            exact_optional_property_types: false,
            no_unchecked_indexed_access: false,
            verify_variant_shapes: false,
            max_depth: MAX_STRUCTURAL_DEPTH,
        }
    }
}

/// Error returned when an options document cannot be read.
#[derive(Debug, thiserror::Error)]
#[error("invalid checker options: {0}")]
pub struct OptionsError(#[from] serde_json::Error);

impl CheckerOptions {
    /// Parse options from a JSON document. Missing keys keep their defaults.
    pub fn from_json_str(source: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Options with `verify_variant_shapes` switched on in debug builds.
    pub fn for_debug_build() -> Self {
        CheckerOptions {
            verify_variant_shapes: cfg!(debug_assertions),
            ..CheckerOptions::default()
        }
    }
}

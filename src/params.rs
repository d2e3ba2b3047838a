//! Planner parameters
//!
//! Named configurations carry plain string maps. Algorithm instances declare
//! the parameters they accept in a [`ParamSet`], which parses and validates
//! incoming values strictly.

use crate::error::PlannerError;
use std::collections::BTreeMap;

/// String key/value settings of a named configuration
pub type PlannerParams = BTreeMap<String, String>;

/// Parse a boolean flag the way configuration files spell them
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from `params`; missing keys count as `false`.
pub fn flag(params: &PlannerParams, key: &str) -> Result<bool, PlannerError> {
    match params.get(key) {
        None => Ok(false),
        Some(value) => parse_flag(value).ok_or_else(|| PlannerError::InvalidDirective {
            key: key.to_string(),
            value: value.clone(),
        }),
    }
}

/// Remove a boolean flag from `params` and return its value
pub fn take_flag(params: &mut PlannerParams, key: &str) -> Result<bool, PlannerError> {
    let value = flag(params, key)?;
    params.remove(key);
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    Int,
    Real,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
struct Param {
    kind: ParamKind,
    value: String,
}

/// Declared parameters of an algorithm instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    params: BTreeMap<String, Param>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter with its default value
    pub fn declare(&mut self, name: &str, kind: ParamKind, default: &str) -> &mut Self {
        self.params.insert(
            name.to_string(),
            Param {
                kind,
                value: default.to_string(),
            },
        );
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|p| p.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Set one declared parameter, validating the value against its kind
    pub fn set(&mut self, owner: &str, name: &str, value: &str) -> Result<(), PlannerError> {
        let param = self
            .params
            .get_mut(name)
            .ok_or_else(|| PlannerError::UnknownParameter {
                planner: owner.to_string(),
                name: name.to_string(),
            })?;

        let invalid = |reason: &str| PlannerError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match param.kind {
            ParamKind::Bool => {
                parse_flag(value).ok_or_else(|| invalid("expected a boolean"))?;
            }
            ParamKind::Int => {
                value
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| invalid(&e.to_string()))?;
            }
            ParamKind::Real => {
                value
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| invalid(&e.to_string()))?;
            }
            ParamKind::Text => {}
        }

        param.value = value.trim().to_string();
        Ok(())
    }

    /// Apply every entry of `values`. Unknown keys are an error; nothing is
    /// applied if any entry is rejected.
    pub fn set_params(&mut self, owner: &str, values: &PlannerParams) -> Result<(), PlannerError> {
        let mut staged = self.clone();
        for (name, value) in values {
            staged.set(owner, name, value)?;
        }
        *self = staged;
        Ok(())
    }
}

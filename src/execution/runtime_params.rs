//! Values supplied at invocation time with `-e name=value`

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeParameterError {
    #[error("Invalid runtime parameter '{0}', expected NAME=VALUE")]
    MalformedAssignment(String),
}

/// Parameter name → raw, unparsed value
#[derive(Debug, Clone, Default)]
pub struct RuntimeParameterProvider {
    values: BTreeMap<String, String>,
}

impl RuntimeParameterProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name=value` pairs; the value may itself contain `=`.
    /// A later assignment to the same name wins.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, RuntimeParameterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut provider = Self::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            match assignment.split_once('=') {
                Some((name, value)) if !name.trim().is_empty() => {
                    provider.set(name.trim(), value);
                }
                _ => {
                    return Err(RuntimeParameterError::MalformedAssignment(
                        assignment.to_string(),
                    ))
                }
            }
        }
        Ok(provider)
    }

    pub fn set(&mut self, name: impl Into<String>, raw: impl Into<String>) {
        self.values.insert(name.into(), raw.into());
    }

    pub fn has_value_for_runtime_parameter(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get_raw_value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

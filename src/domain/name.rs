// Copyright (c) 2025 - Cowboy AI, Inc.
//! Object Name Value Object with DNS-1123 Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Object name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Name is empty")]
    Empty,

    #[error("Name is {0} characters, over the limit")]
    TooLong(usize),

    #[error("Invalid character in name: {0}")]
    InvalidCharacter(char),

    #[error("Name must start and end with an alphanumeric character: {0}")]
    InvalidFormat(String),
}

/// Cluster object name (RFC 1123)
///
/// Tenant names double as namespace names, so [`ObjectName::new`] follows
/// the stricter label rules:
/// - Total length ≤ 63 characters
/// - Lowercase alphanumerics and hyphens only
/// - Starts and ends with an alphanumeric
///
/// Names derived for cluster-scoped objects via [`ObjectName::with_suffix`]
/// only need to be subdomains: ≤ 253 characters, dot-separated labels.
///
/// # Examples
///
/// ```rust
/// use cim_tenancy::domain::ObjectName;
///
/// assert!(ObjectName::new("acme").is_ok());
/// assert!(ObjectName::new("acme-prod-01").is_ok());
///
/// assert!(ObjectName::new("").is_err());
/// assert!(ObjectName::new("Acme").is_err());
/// assert!(ObjectName::new("acme-").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectName(String);

impl ObjectName {
    /// Maximum length for a label (RFC 1123)
    pub const MAX_LENGTH: usize = 63;

    /// Maximum length for a subdomain (RFC 1123)
    pub const MAX_SUBDOMAIN_LENGTH: usize = 253;

    /// Create a new label name with validation
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        if name.len() > Self::MAX_LENGTH {
            return Err(NameError::TooLong(name.len()));
        }
        validate_label(&name)?;
        Ok(Self(name))
    }

    /// Create a new subdomain name with validation
    pub fn subdomain(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        if name.len() > Self::MAX_SUBDOMAIN_LENGTH {
            return Err(NameError::TooLong(name.len()));
        }
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        for label in name.split('.') {
            if label.len() > Self::MAX_LENGTH {
                return Err(NameError::TooLong(label.len()));
            }
            validate_label(label).map_err(|err| match err {
                NameError::Empty => NameError::InvalidFormat(name.clone()),
                other => other,
            })?;
        }
        Ok(Self(name))
    }

    /// Derive a cluster-scoped sibling name `{self}-{suffix}`
    pub fn with_suffix(&self, suffix: impl fmt::Display) -> Result<Self, NameError> {
        Self::subdomain(format!("{}-{}", self.0, suffix))
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_label(label: &str) -> Result<(), NameError> {
    if label.is_empty() {
        return Err(NameError::Empty);
    }
    if let Some(ch) = label
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == '-'))
    {
        return Err(NameError::InvalidCharacter(ch));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(NameError::InvalidFormat(label.to_string()));
    }
    Ok(())
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ObjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ObjectName> for String {
    fn from(name: ObjectName) -> Self {
        name.0
    }
}

impl TryFrom<String> for ObjectName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ObjectName {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

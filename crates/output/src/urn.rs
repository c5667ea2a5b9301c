//! Unique names for declarations.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

const PREFIX: &str = "urn:flexfn:";
const SEPARATOR: &str = "::";

/// Uniquely identifies a declaration within a provisioning context.
///
/// Formatted as `urn:flexfn:{stack}::{project}::{qualified-type}::{name}`. The
/// qualified type chains the type tokens of all ancestors with `$`, e.g.
/// `azure-native:functionapp:FunctionAppComponent$azure-native:web:WebApp`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Urn(String);

/// An error returned when a string is not a well-formed [`Urn`].
#[derive(Debug, thiserror::Error)]
#[error("invalid URN '{0}': expected 'urn:flexfn:<stack>::<project>::<type>::<name>'")]
pub struct ParseUrnError(String);

impl Urn {
    /// Builds a URN from its parts.
    pub fn new(stack: &str, project: &str, qualified_type: &str, name: &str) -> Self {
        Self(format!(
            "{PREFIX}{stack}{SEPARATOR}{project}{SEPARATOR}{qualified_type}{SEPARATOR}{name}"
        ))
    }

    /// The full URN text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The stack the declaration belongs to.
    pub fn stack(&self) -> &str {
        self.parts()[0]
    }

    /// The project the declaration belongs to.
    pub fn project(&self) -> &str {
        self.parts()[1]
    }

    /// The `$`-separated chain of ancestor type tokens ending with this
    /// declaration's own type token.
    pub fn qualified_type(&self) -> &str {
        self.parts()[2]
    }

    /// The declaration's own type token.
    pub fn type_token(&self) -> &str {
        let qualified = self.qualified_type();
        qualified
            .rsplit_once('$')
            .map_or(qualified, |(_, token)| token)
    }

    /// The logical name given at declaration time.
    pub fn name(&self) -> &str {
        self.parts()[3]
    }

    fn parts(&self) -> [&str; 4] {
        let mut parts = [""; 4];
        let body = self.0.strip_prefix(PREFIX).unwrap_or_default();
        for (slot, part) in parts.iter_mut().zip(body.splitn(4, SEPARATOR)) {
            *slot = part;
        }
        parts
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Urn {
    type Err = ParseUrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.to_string().try_into()
    }
}

impl TryFrom<String> for Urn {
    type Error = ParseUrnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let Some(body) = value.strip_prefix(PREFIX) else {
            return Err(ParseUrnError(value));
        };
        let parts = body.splitn(4, SEPARATOR).collect::<Vec<_>>();
        if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
            return Err(ParseUrnError(value));
        }
        Ok(Self(value))
    }
}

impl From<Urn> for String {
    fn from(value: Urn) -> Self {
        value.0
    }
}

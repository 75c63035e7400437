use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::IdentifierError;

pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A namespaced id such as `minecraft:stone` or `mymod:void_spawn`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier {
    pub namespace: String,
    pub path: String,
}

impl Identifier {
    pub fn new(namespace: &str, path: &str) -> Result<Self, IdentifierError> {
        let full = format!("{}:{}", namespace, path);
        if namespace.is_empty() || path.is_empty() {
            return Err(IdentifierError::Empty);
        }
        if let Some(c) = namespace.chars().find(|c| !is_namespace_char(*c)) {
            return Err(IdentifierError::InvalidCharacter(full, c));
        }
        if let Some(c) = path.chars().find(|c| !is_path_char(*c)) {
            return Err(IdentifierError::InvalidCharacter(full, c));
        }
        Ok(Identifier {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Ids without a namespace fall into `minecraft`.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        match value.split_once(':') {
            Some((namespace, path)) => Identifier::new(namespace, path),
            None => Identifier::new(DEFAULT_NAMESPACE, value),
        }
    }

    pub fn minecraft(path: &str) -> Result<Self, IdentifierError> {
        Identifier::new(DEFAULT_NAMESPACE, path)
    }
}

fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::parse(s)
    }
}

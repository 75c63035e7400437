use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Serialize};
use crate::error::IdentifierError;
use crate::identifier::Identifier;

/// A parsed palette key: a block id plus its bracketed property list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    pub name: Identifier,
    pub properties: HashMap<String, String>,
}

impl BlockState {
    pub fn new(name: Identifier) -> Self {
        BlockState {
            name,
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: String, value: String) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Parses `ns:id` or `ns:id[key=value,...]`.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let Some(bracket) = value.find('[') else {
            return Ok(BlockState::new(Identifier::parse(value)?));
        };

        let name = Identifier::parse(&value[..bracket])?;
        let list = value[bracket + 1..]
            .strip_suffix(']')
            .ok_or_else(|| IdentifierError::UnterminatedProperties(value.to_string()))?;

        let mut properties = HashMap::new();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.split_once('=') {
                Some((key, val)) if !key.trim().is_empty() => {
                    properties.insert(key.trim().to_string(), val.trim().to_string());
                }
                _ => {
                    return Err(IdentifierError::MalformedProperty(
                        value.to_string(),
                        entry.to_string(),
                    ))
                }
            }
        }

        Ok(BlockState { name, properties })
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.properties.is_empty() {
            let mut props: Vec<_> = self.properties.iter().collect();
            props.sort();
            let joined = props
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(",");
            write!(f, "[{}]", joined)?;
        }
        Ok(())
    }
}

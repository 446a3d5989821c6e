//! Method metadata carried by agent cards.

use super::RegistryDomainError;
use serde::{Deserialize, Serialize};

/// Describes one parameter or return field of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
}

impl ParamDescriptor {
    /// Creates an optional field of the given JSON type.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            required: false,
            description: String::new(),
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared JSON type (`string`, `object`, ...).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns whether callers must supply the field.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the description, empty when none was given.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Declares a method an agent handles.
///
/// Deserialises from either a bare method name (`"login"`) or a full object
/// with description, params and returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MethodEntry")]
pub struct MethodDescriptor {
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    params: Vec<ParamDescriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    returns: Vec<ParamDescriptor>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MethodEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        params: Vec<ParamDescriptor>,
        #[serde(default)]
        returns: Vec<ParamDescriptor>,
    },
}

impl TryFrom<MethodEntry> for MethodDescriptor {
    type Error = RegistryDomainError;

    fn try_from(entry: MethodEntry) -> Result<Self, Self::Error> {
        match entry {
            MethodEntry::Name(name) => Self::new(name),
            MethodEntry::Detailed {
                name,
                description,
                params,
                returns,
            } => {
                if params.iter().chain(&returns).any(|p| p.name.trim().is_empty()) {
                    return Err(RegistryDomainError::EmptyDescriptorName("parameter"));
                }
                Ok(Self::new(name)?
                    .with_description(description)
                    .with_params(params)
                    .with_returns(returns))
            }
        }
    }
}

impl MethodDescriptor {
    /// Creates a descriptor with only a name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyDescriptorName`] when the name is
    /// blank.
    pub fn new(name: impl Into<String>) -> Result<Self, RegistryDomainError> {
        let trimmed = name.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(RegistryDomainError::EmptyDescriptorName("method"));
        }
        Ok(Self {
            name: trimmed,
            description: String::new(),
            params: Vec::new(),
            returns: Vec::new(),
        })
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the parameter descriptors.
    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = ParamDescriptor>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    /// Sets the return descriptors.
    #[must_use]
    pub fn with_returns(mut self, returns: impl IntoIterator<Item = ParamDescriptor>) -> Self {
        self.returns = returns.into_iter().collect();
        self
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, empty when none was given.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the parameter descriptors.
    #[must_use]
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    /// Returns the return descriptors.
    #[must_use]
    pub fn returns(&self) -> &[ParamDescriptor] {
        &self.returns
    }
}

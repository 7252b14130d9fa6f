//! Object registry delivered by the host in the handshake response.

use std::collections::BTreeMap;

use rmpv::Value;
use serde::{Deserialize, Serialize};

use crate::envelope::{decode, encode, ProtocolError};

/// Objects the host exposes on the channel, mapped to their method names.
///
/// The method lists are advisory: the typed proxies are the contract the
/// page compiles against. The wire shape is a plain map of object name to
/// method-name array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRegistry {
    objects: BTreeMap<String, Vec<String>>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object with its method names. Used by hosts and test doubles.
    pub fn insert(&mut self, object: &str, methods: &[&str]) {
        self.objects.insert(
            object.to_string(),
            methods.iter().map(ToString::to_string).collect(),
        );
    }

    pub fn contains(&self, object: &str) -> bool {
        self.objects.contains_key(object)
    }

    pub fn methods_of(&self, object: &str) -> Option<&[String]> {
        self.objects.get(object).map(Vec::as_slice)
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Parse a registry out of a handshake response result.
    pub fn from_value(value: &Value) -> Result<Self, ProtocolError> {
        let bytes = encode(value)?;
        rmp_serde::from_slice(&bytes).map_err(|e| ProtocolError::Registry(e.to_string()))
    }

    /// Render the registry as a wire value for a handshake response.
    pub fn to_value(&self) -> Result<Value, ProtocolError> {
        let bytes = rmp_serde::to_vec(self).map_err(|e| ProtocolError::Registry(e.to_string()))?;
        decode(&bytes)
    }
}

//! BLEST wire types
//!
//! A batch request body is a JSON array of `[id, route, parameters, headers]`
//! tuples. A batch response body is a JSON array of `[id, route, data, error]`
//! tuples; only the id, data and error slots are read.

use crate::core::types::{RequestDescriptor, RequestId};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One request inside a batch, as it travels on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub id: RequestId,
    pub route: String,
    pub parameters: Option<Value>,
    pub headers: Option<Value>,
}

impl From<RequestDescriptor> for BatchItem {
    fn from(descriptor: RequestDescriptor) -> Self {
        Self {
            id: descriptor.id,
            route: descriptor.route,
            parameters: descriptor.parameters,
            headers: descriptor.headers,
        }
    }
}

impl Serialize for BatchItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.id, &self.route, &self.parameters, &self.headers).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BatchItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (id, route, parameters, headers) =
            <(RequestId, String, Option<Value>, Option<Value>)>::deserialize(deserializer)?;
        Ok(Self {
            id,
            route,
            parameters,
            headers,
        })
    }
}

/// One per-request result inside a batch response
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResultItem {
    pub id: RequestId,
    pub route: Option<String>,
    pub data: Option<Value>,
    pub error: Option<Value>,
}

impl BatchResultItem {
    pub fn success(id: impl Into<RequestId>, route: &str, data: Value) -> Self {
        Self {
            id: id.into(),
            route: Some(route.to_string()),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(id: impl Into<RequestId>, route: &str, error: Value) -> Self {
        Self {
            id: id.into(),
            route: Some(route.to_string()),
            data: None,
            error: Some(error),
        }
    }
}

impl Serialize for BatchResultItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.id, &self.route, &self.data, &self.error).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BatchResultItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut slots = Vec::<Value>::deserialize(deserializer)?.into_iter();

        let id = match slots.next() {
            Some(Value::String(id)) => RequestId::new(id),
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "result id must be a string, got {}",
                    other
                )));
            }
            None => return Err(de::Error::custom("empty result tuple")),
        };
        let route = match slots.next() {
            Some(Value::String(route)) => Some(route),
            _ => None,
        };
        let data = slots.next().filter(|v| !v.is_null());
        let error = slots.next().filter(|v| !v.is_null());

        Ok(Self {
            id,
            route,
            data,
            error,
        })
    }
}

/// Everything a transport needs to send one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    /// Batch endpoint
    pub url: String,
    /// HTTP headers, already merged
    pub headers: HashMap<String, String>,
    /// Items in enqueue order
    pub items: Vec<BatchItem>,
}

impl BatchRequest {
    pub fn ids(&self) -> impl Iterator<Item = &RequestId> {
        self.items.iter().map(|item| &item.id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// JSON body for the wire
    pub fn body(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.items)
    }
}

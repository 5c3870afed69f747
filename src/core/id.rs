//! Identifier source for logical requests

use super::types::RequestId;
use uuid::Uuid;

/// Produces a globally unique opaque id per logical request.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> RequestId;
}

/// Default generator backed by random (v4) UUIDs
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> RequestId {
        RequestId::new(Uuid::new_v4().to_string())
    }
}

use serde_json::Value;

use crate::config::DriverKind;
use crate::driver::{Driver, Mirror};
use crate::errors::StoreError;

/// Stand-in for mechanisms without an implementation. Accepts every write,
/// persists nothing and always dumps an empty map.
pub struct NoopDriver {
    kind: DriverKind,
}

impl NoopDriver {
    pub fn new(kind: DriverKind) -> Self {
        Self { kind }
    }
}

impl Driver for NoopDriver {
    fn kind(&self) -> DriverKind {
        self.kind.clone()
    }

    fn set(&self, key: &str, _value: &Value) -> Result<(), StoreError> {
        log::debug!("{}: not persisting {key}", self.kind);
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn dump(&self) -> Result<Mirror, StoreError> {
        Ok(Mirror::new())
    }

    fn clear(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

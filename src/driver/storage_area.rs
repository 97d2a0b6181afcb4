use std::sync::Arc;

use serde_json::Value;

use crate::config::DriverKind;
use crate::driver::{decode_value, encode_value, Driver, Mirror};
use crate::errors::StoreError;
use crate::storage::StorageArea;

/// Driver over a DOM-Storage-like area. Serves both `localStorage` and
/// `sessionStorage`; the two only differ in which area they are handed.
pub struct StorageAreaDriver {
    kind: DriverKind,
    area: Arc<dyn StorageArea>,
}

impl StorageAreaDriver {
    pub fn new(kind: DriverKind, area: Arc<dyn StorageArea>) -> Self {
        Self { kind, area }
    }
}

impl Driver for StorageAreaDriver {
    fn kind(&self) -> DriverKind {
        self.kind.clone()
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let text = encode_value(value)?;
        self.area.set_item(key, &text)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.area.remove_item(key)?;
        Ok(())
    }

    fn dump(&self) -> Result<Mirror, StoreError> {
        let mut mirror = Mirror::new();
        for key in self.area.keys() {
            // keys() and get_item() are separate reads; a key may vanish in between
            let Some(text) = self.area.get_item(&key) else {
                continue;
            };
            match decode_value(&key, &text) {
                Ok(value) => {
                    mirror.insert(key, value);
                }
                Err(e) => log::warn!("{}: skipping entry: {e}", self.kind),
            }
        }
        Ok(mirror)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.area.clear()?;
        Ok(())
    }
}

//! One get/set/remove/has/clear/dump contract over local storage, session
//! storage and cookies.
//!
//! A [`Store`] picks a [`Driver`](driver::Driver) from its [`StoreConfig`],
//! loads everything the backing mechanism holds into memory, and keeps that
//! mirror in step with the mechanism on every write.

pub mod config;
pub mod cookies;
pub mod driver;
pub mod errors;
pub mod storage;
mod store;

pub use config::{CookieOptions, DriverKind, StoreConfig};
pub use driver::Backends;
pub use errors::StoreError;
pub use store::Store;

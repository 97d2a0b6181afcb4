//! Stores a value through the cookie driver, drops the store, and reads the
//! value back from a fresh store over the same cookie file.
//!
//! Run with `RUST_LOG=debug` to see what the drivers do.

use gosub_store::cookies::{cookie_jar_handle, PersistentCookieJar};
use gosub_store::storage::StorageHandles;
use gosub_store::{Backends, Store, StoreConfig};
use url::Url;

fn backends(url: &Url, cookie_file: &std::path::Path) -> anyhow::Result<Backends> {
    let jar = cookie_jar_handle(PersistentCookieJar::open(cookie_file)?);
    Ok(Backends::new(StorageHandles::in_memory(&url.origin()), jar, url.clone()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = StoreConfig::from_json(r#"{ "driver": "cookie" }"#)?;
    let url = Url::parse("https://example.com/")?;
    let cookie_file = std::env::temp_dir().join("gosub-store-demo-cookies.json");

    {
        let mut store = Store::new(config.clone(), backends(&url, &cookie_file)?);
        store.set("a", [1, 2, 3]);
        store.set("greeting", "hello; world");
        println!("stored {} entries", store.len());
    }

    let store = Store::new(config, backends(&url, &cookie_file)?);
    for (key, value) in store.dump() {
        println!("{key} = {value}");
    }

    Ok(())
}

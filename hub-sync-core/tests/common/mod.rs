pub mod fixtures;
pub mod store;

#[allow(unused_imports)]
pub use fixtures::{config_for, record, write_manifest, write_package};
#[allow(unused_imports)]
pub use store::{InMemoryStore, SlowStore};

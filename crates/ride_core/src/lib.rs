pub mod broadcast;
pub mod directory;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod pricing;
pub mod retention;
pub mod spatial;
pub mod store;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;
pub mod weather;

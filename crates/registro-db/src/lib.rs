
pub mod connection;
pub use connection::Connection;

pub mod results;
pub use results::StoreError;

pub mod schema;

// Local store
mod profiles;
mod summary;
mod entries;

// Remote store
pub mod rest;
pub use rest::{RestClient, RestConfig};

// Caching
pub mod cache;
pub use cache::{CacheConfig, Cached, TtlCache};

pub mod prune;
pub mod search;
pub mod stats;
pub mod store;
pub mod types;

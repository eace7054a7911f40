pub mod config;
pub mod geo;
pub mod record;
pub mod store;
pub mod viewport;

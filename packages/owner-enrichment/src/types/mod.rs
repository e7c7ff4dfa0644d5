pub mod config;
pub mod events;
pub mod record;
pub mod result;

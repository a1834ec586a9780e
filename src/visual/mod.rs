pub mod interactions;
pub mod melt;
pub mod plugin;
pub mod setup;

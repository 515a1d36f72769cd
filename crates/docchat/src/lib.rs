pub mod agent;
pub mod errors;
pub mod messages;
pub mod models;
pub mod providers;
pub mod tool;
pub mod translate;

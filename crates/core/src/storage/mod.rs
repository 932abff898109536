pub mod auth;
pub mod backend;
pub mod format;
pub mod google;
pub mod manager;

pub mod offline_store;
pub mod remote_api;

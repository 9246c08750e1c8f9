pub mod app;
pub mod argsets;
pub mod command;
pub mod constants;
pub mod helpers;
pub mod interfaces;
pub mod node_mgmt;
pub mod publisher;

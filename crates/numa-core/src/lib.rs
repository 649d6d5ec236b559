pub mod config;
pub mod logging;

pub mod checksum;
pub mod control;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod http;
pub mod installer;
pub mod poller;
pub mod provider;
pub mod storage;
pub mod version;

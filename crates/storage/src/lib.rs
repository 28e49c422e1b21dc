#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

use ironlog_domain as domain;

pub mod config;
pub mod log;
pub mod memory;
pub mod rest;

pub use config::Config;
pub use memory::MemoryStore;
pub use rest::REST;

/// Service backed by the REST store described by `config`.
#[must_use]
pub fn connect(config: Config) -> domain::Service<REST<rest::ReqwestSendRequest>> {
    let lookup_concurrency = config.lookup_concurrency;
    domain::Service::new(REST::new(config)).with_lookup_concurrency(lookup_concurrency)
}

#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;

pub use config::Config;

use config::{ConfigFairing, StoreFairing};
use logging::LoggerFairing;
use store::Candidates;

/// Build the server. The config and the candidate store are resolved when it
/// ignites, so a bad config or unreachable database fails ignition.
pub fn build() -> Rocket<Build> {
    base()
        .attach(ConfigFairing)
        .attach(StoreFairing)
}

/// Build the server around an already-constructed candidate store.
pub fn rocket_for_candidates(candidates: Candidates) -> Rocket<Build> {
    base().manage(candidates)
}

fn base() -> Rocket<Build> {
    rocket::build()
        .attach(LoggerFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
}

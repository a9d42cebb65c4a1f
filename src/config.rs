use log::{error, info, warn};
use mongodb::{error::Error as DbError, Client as MongoClient, Database};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::mongodb::ensure_indexes_exist;
use crate::store::{Candidates, MemoryStore, MongoStore};

/// Which backend holds the candidates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// MongoDB, the production configuration.
    #[default]
    Mongo,
    /// A process-local list; nothing survives a restart.
    Memory,
}

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    store: StoreKind,
    #[serde(default = "default_db_name")]
    db_name: String,
    #[serde(default)]
    seed_fixtures: bool,
    // secrets
    db_uri: Option<String>,
}

fn default_db_name() -> String {
    "voting".to_string()
}

impl Config {
    /// The backend selected for this process.
    pub fn store(&self) -> StoreKind {
        self.store
    }

    /// Name of the MongoDB database to use.
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// Whether to seed the in-memory store with sample candidates.
    /// Ignored for MongoDB.
    pub fn seed_fixtures(&self) -> bool {
        self.seed_fixtures
    }

    /// MongoDB connection string. Only required for the MongoDB backend.
    pub fn db_uri(&self) -> Option<&str> {
        self.db_uri.as_deref()
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the store fairing and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that builds the one candidate store for this process, according
/// to the loaded [`Config`], and places the [`Candidates`] handle into managed
/// state. Must be attached after [`ConfigFairing`].
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Candidate store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.state::<Config>() {
            Some(config) => config.clone(),
            None => {
                error!("Candidate store needs the application config to be loaded first");
                return Err(rocket);
            }
        };

        let candidates = match config.store() {
            StoreKind::Memory => {
                warn!("Using the in-memory candidate store; nothing will be persisted");
                if config.seed_fixtures() {
                    Candidates::new(MemoryStore::with_fixtures())
                } else {
                    Candidates::new(MemoryStore::new())
                }
            }
            StoreKind::Mongo => {
                let Some(db_uri) = config.db_uri() else {
                    error!("`db_uri` must be set to use the MongoDB store");
                    return Err(rocket);
                };
                info!("Loaded database config, connecting...");
                let db = match connect(db_uri, config.db_name()).await {
                    Ok(db) => db,
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                };
                info!("...database connection online!");
                Candidates::new(MongoStore::new(&db))
            }
        };

        Ok(rocket.manage(candidates))
    }
}

/// Connect to MongoDB and make sure the collections are ready for use.
pub async fn connect(db_uri: &str, db_name: &str) -> Result<Database, DbError> {
    let client = MongoClient::with_uri_str(db_uri).await?;
    let db = client.database(db_name);
    ensure_indexes_exist(&db).await?;
    Ok(db)
}

/// Connect to a throwaway test database on the server at `ROCKET_DB_URI`.
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
pub(crate) async fn test_database() -> Database {
    let db_uri = std::env::var("ROCKET_DB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let random: u32 = rand::random();
    let db_name = format!("test{random}");
    info!("Using database {db_name}");
    connect(&db_uri, &db_name)
        .await
        .expect("Test database should be reachable")
}

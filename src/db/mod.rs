use std::time::Duration;

use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};

use crate::{config::Config, errors::AppResult};

pub const QUIZZES_COLLECTION: &str = "quizzes";
pub const QUIZ_ATTEMPTS_COLLECTION: &str = "quiz_attempts";
pub const CERTIFICATES_COLLECTION: &str = "certificates";
/// Owned by the catalog service; read only here.
pub const COURSES_COLLECTION: &str = "courses";
/// Owned by the identity service; read only here.
pub const USERS_COLLECTION: &str = "users";

const APP_NAME: &str = "academy-server";

/// Handle on the service's MongoDB database. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    inner: mongodb::Database,
}

impl Database {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut options = ClientOptions::parse(&config.mongo_conn_string).await?;
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.app_name = Some(APP_NAME.to_string());
        options.max_pool_size = Some(10);
        options.min_pool_size = Some(2);
        options.connect_timeout = Some(Duration::from_secs(5));
        options.server_selection_timeout = Some(Duration::from_secs(5));

        let database = Self {
            inner: Client::with_options(options)?.database(&config.mongo_db_name),
        };
        database.health_check().await?;

        log::info!("Connected to MongoDB database '{}'", config.mongo_db_name);
        Ok(database)
    }

    pub fn get_collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.inner.collection(name)
    }

    /// Round trip used by startup and the readiness probe.
    pub async fn health_check(&self) -> AppResult<()> {
        self.inner.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_handle_is_shareable() {
        fn assert_shareable<T: Clone + Send + Sync>() {}
        assert_shareable::<Database>();
    }
}

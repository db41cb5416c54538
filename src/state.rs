use crate::{
    config::RuntimeConfiguration,
    error::{CreateSchemaSnafu, GetDatabaseConnectionSnafu, OpenDatabaseSnafu, StudentsResult},
};
use snafu::ResultExt;
use sqlx::{
    Pool, Sqlite,
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::ops::Deref;

const SCHEMA: &str = include_str!("../sql/schema.sql");

#[derive(Clone, Debug)]
pub struct StudentsState {
    pool: Pool<Sqlite>,
    config: RuntimeConfiguration,
}

impl StudentsState {
    pub async fn new(
        options: SqlitePoolOptions,
        config: RuntimeConfiguration,
    ) -> StudentsResult<Self> {
        let connect_options = SqliteConnectOptions::new()
            .filename(config.db_config().path())
            .create_if_missing(true);

        let pool = options
            .connect_with(connect_options)
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .context(CreateSchemaSnafu)?;

        Ok(Self { pool, config })
    }

    pub fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    pub async fn get_connection(&self) -> StudentsResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }

    pub async fn sensible_shutdown(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }
}

impl Deref for StudentsState {
    type Target = Pool<Sqlite>;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

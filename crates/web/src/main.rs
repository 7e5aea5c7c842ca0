use database::{DatabaseConnectionInfo, PgDatabase};
use locations::memory::MemoryDatabase;
use web::{
    config::{ServerConfig, StorageBackend},
    start_web_server, WebState,
};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = ServerConfig::from_env().expect("invalid server configuration.");
    log::info!("starting with {:?} storage", config.storage);

    let result = match config.storage {
        StorageBackend::Postgres => {
            let database_connection_info = DatabaseConnectionInfo::from_env()
                .expect("expected database connection info in env.");
            let database = PgDatabase::connect(database_connection_info)
                .await
                .expect("could not connect to database.");
            start_web_server(&config, WebState::new(database)).await
        }
        StorageBackend::Memory => {
            start_web_server(&config, WebState::new(MemoryDatabase::new())).await
        }
    };

    if let Err(why) = result {
        log::error!("web server failed: {}", why);
        std::process::exit(1);
    }
}

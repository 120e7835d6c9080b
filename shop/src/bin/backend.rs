use std::error::Error;
use std::sync::Arc;

use shop::api::AppState;
use shop::server::{initialize_executable, initialize_tracing, run_backend};
use shop::store::ShopStorage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("Starting backend...");
    let config = initialize_executable()?;
    initialize_tracing(&config.backend.log_level);

    let storage = Arc::new(ShopStorage::new(&config.common.database_url).await?);
    if config.common.initialize_schema {
        storage.initialize_schema().await?;
    }

    let state = AppState::new(
        storage.clone(),
        storage.clone(),
        storage.clone(),
        storage.clone(),
        storage,
    );
    run_backend(config.backend, state).await
}

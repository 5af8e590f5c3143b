//! Local catalog of car makes and models, seeded on first access.

pub mod handlers;
pub mod postgres;
pub mod seed;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::models::catalog::{CarListing, SeedMake};

pub use postgres::PgCatalogRepo;
pub use seed::SEED_MAKES;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Seed(String),
}

/// Storage behind the catalog.
#[async_trait]
pub trait CatalogRepo: Send + Sync {
    async fn has_models(&self) -> Result<bool, CatalogError>;

    /// Loads `makes` if the catalog is still empty. Must not duplicate rows
    /// when called concurrently.
    async fn seed(&self, makes: &[SeedMake]) -> Result<(), CatalogError>;

    async fn list_cars(&self) -> Result<Vec<CarListing>, CatalogError>;
}

/// Read-only catalog front that seeds the repo at most once per process.
/// A failed seed leaves the guard unset so the next request retries.
pub struct CatalogStore {
    repo: Arc<dyn CatalogRepo>,
    seeded: OnceCell<()>,
}

impl CatalogStore {
    pub fn new(repo: Arc<dyn CatalogRepo>) -> Self {
        Self {
            repo,
            seeded: OnceCell::new(),
        }
    }

    pub async fn list_cars(&self) -> Result<Vec<CarListing>, CatalogError> {
        self.ensure_seeded().await?;
        self.repo.list_cars().await
    }

    async fn ensure_seeded(&self) -> Result<(), CatalogError> {
        self.seeded
            .get_or_try_init(|| async {
                if !self.repo.has_models().await? {
                    info!("Catalog is empty, seeding");
                    self.repo.seed(SEED_MAKES).await?;
                }
                Ok::<_, CatalogError>(())
            })
            .await?;
        Ok(())
    }
}

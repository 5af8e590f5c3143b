use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::{CatalogError, CatalogRepo};
use crate::models::catalog::{CarListing, SeedMake};

/// Advisory lock key serializing catalog seeding across processes.
const SEED_LOCK_KEY: i64 = 0x0CA7_A106;

pub struct PgCatalogRepo {
    pool: PgPool,
}

impl PgCatalogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepo for PgCatalogRepo {
    async fn has_models(&self) -> Result<bool, CatalogError> {
        Ok(
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM car_models)")
                .fetch_one(&self.pool)
                .await?,
        )
    }

    /// Seeds inside one transaction holding an advisory lock. Emptiness is
    /// re-checked under the lock and inserts skip rows that already exist.
    async fn seed(&self, makes: &[SeedMake]) -> Result<(), CatalogError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SEED_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let already_seeded: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM car_models)")
                .fetch_one(&mut *tx)
                .await?;
        if already_seeded {
            tx.commit().await?;
            info!("Catalog already seeded by another worker");
            return Ok(());
        }

        let mut inserted = 0u64;
        for make in makes {
            let make_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO car_makes (name, description)
                VALUES ($1, $2)
                ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description
                RETURNING id
                "#,
            )
            .bind(make.name)
            .bind(make.description)
            .fetch_one(&mut *tx)
            .await?;

            for model in make.models {
                inserted += sqlx::query(
                    r#"
                    INSERT INTO car_models (car_make_id, name, car_type, year)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (car_make_id, name) DO NOTHING
                    "#,
                )
                .bind(make_id)
                .bind(model.name)
                .bind(model.body_type.as_str())
                .bind(model.year)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            }
        }

        tx.commit().await?;
        info!("Seeded catalog with {} makes and {inserted} models", makes.len());
        Ok(())
    }

    async fn list_cars(&self) -> Result<Vec<CarListing>, CatalogError> {
        Ok(sqlx::query_as::<_, CarListing>(
            r#"
            SELECT m.name AS car_model, k.name AS car_make
            FROM car_models m
            JOIN car_makes k ON k.id = m.car_make_id
            ORDER BY k.id, m.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }
}

//! # Offer Repository
//!
//! Catalog reads and writes.
//!
//! Stock is changed in exactly two places:
//! - [`OrderRepository::checkout`](crate::repository::order::OrderRepository::checkout),
//!   which decrements it inside the checkout transaction
//! - [`OfferRepository::upsert_many`], which the supplies sync uses to
//!   overwrite quantities by offer name

use chrono::Utc;
use newworld_core::validation::{
    validate_category, validate_offer_name, validate_price_cents, validate_stock,
};
use newworld_core::{NewOffer, Offer, ValidationError};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

pub(crate) const OFFER_COLUMNS: &str =
    "id, name, quantity, price_cents, category, created_at, updated_at";

/// Repository for offer database operations.
#[derive(Debug, Clone)]
pub struct OfferRepository {
    pool: SqlitePool,
}

impl OfferRepository {
    /// Creates a new OfferRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OfferRepository { pool }
    }

    /// Lists every live offer, by ID.
    pub async fn list(&self) -> DbResult<Vec<Offer>> {
        let sql = format!("SELECT {OFFER_COLUMNS} FROM offers WHERE deleted_at IS NULL ORDER BY id");

        let offers = sqlx::query_as::<_, Offer>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(offers)
    }

    /// Gets a live offer by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Offer>> {
        let sql = format!("SELECT {OFFER_COLUMNS} FROM offers WHERE id = ?1 AND deleted_at IS NULL");

        let offer = sqlx::query_as::<_, Offer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(offer)
    }

    /// Inserts a new offer.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` (`offers.name`) if the name is taken.
    pub async fn create(&self, offer: &NewOffer) -> DbResult<Offer> {
        validate_new_offer(offer)?;
        debug!(name = %offer.name, quantity = offer.quantity, "Inserting offer");
        let now = Utc::now();

        let sql = format!(
            "INSERT INTO offers (name, quantity, price_cents, category, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             RETURNING {OFFER_COLUMNS}"
        );

        let created = sqlx::query_as::<_, Offer>(&sql)
            .bind(&offer.name)
            .bind(offer.quantity)
            .bind(offer.price_cents)
            .bind(&offer.category)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// Inserts or overwrites a single offer, matched by name.
    pub async fn upsert_by_name(&self, offer: &NewOffer) -> DbResult<Offer> {
        let mut upserted = self.upsert_many(std::slice::from_ref(offer)).await?;
        upserted
            .pop()
            .ok_or_else(|| DbError::Internal("upsert returned no row".to_string()))
    }

    /// Inserts or overwrites offers by name, all in one transaction.
    ///
    /// An existing row keeps its ID; quantity, price and category are
    /// replaced and a soft-deleted row is revived.
    pub async fn upsert_many(&self, offers: &[NewOffer]) -> DbResult<Vec<Offer>> {
        for offer in offers {
            validate_new_offer(offer)?;
        }

        let mut tx = self.pool.begin().await?;
        let mut upserted = Vec::with_capacity(offers.len());

        for offer in offers {
            upserted.push(upsert_with(&mut *tx, offer).await?);
        }

        tx.commit().await?;

        info!(count = upserted.len(), "Offers upserted");
        Ok(upserted)
    }

    /// Counts live offers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM offers WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

async fn upsert_with(conn: &mut SqliteConnection, offer: &NewOffer) -> DbResult<Offer> {
    let now = Utc::now();

    let sql = format!(
        "INSERT INTO offers (name, quantity, price_cents, category, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)
         ON CONFLICT(name) DO UPDATE SET
             quantity = excluded.quantity,
             price_cents = excluded.price_cents,
             category = excluded.category,
             updated_at = excluded.updated_at,
             deleted_at = NULL
         RETURNING {OFFER_COLUMNS}"
    );

    let row = sqlx::query_as::<_, Offer>(&sql)
        .bind(&offer.name)
        .bind(offer.quantity)
        .bind(offer.price_cents)
        .bind(&offer.category)
        .bind(now)
        .fetch_one(conn)
        .await?;

    Ok(row)
}

fn validate_new_offer(offer: &NewOffer) -> Result<(), ValidationError> {
    validate_offer_name(&offer.name)?;
    validate_category(&offer.category)?;
    validate_stock(offer.quantity)?;
    validate_price_cents(offer.price_cents)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use newworld_core::Money;

    #[tokio::test]
    async fn test_create_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.offers();

        repo.create(&NewOffer::new("water", 10, Money::from_cents(100), "drink"))
            .await
            .unwrap();
        repo.create(&NewOffer::new("meat", 3, Money::from_cents(400), "food"))
            .await
            .unwrap();

        let offers = repo.list().await.unwrap();
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].name, "water");
        assert_eq!(offers[1].price(), Money::from_cents(400));
    }

    #[tokio::test]
    async fn test_upsert_keeps_id_and_overwrites() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.offers();

        let first = repo
            .upsert_by_name(&NewOffer::new("fruits", 10, Money::from_cents(200), "food"))
            .await
            .unwrap();
        let second = repo
            .upsert_by_name(&NewOffer::new("fruits", 4, Money::from_cents(250), "food"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 4);
        assert_eq!(second.price_cents, 250);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_negative_stock_is_refused() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .offers()
            .create(&NewOffer::new("water", -1, Money::from_cents(100), "drink"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }
}

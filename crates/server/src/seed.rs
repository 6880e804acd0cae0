//! Startup seeding.
//!
//! An empty catalog makes every order fail product validation, so a
//! fresh database gets a small set of single-origin coffees and a demo
//! member. A non-empty database is left alone.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use beanhouse_core::{ApiKey, Email, PostalCode};

use crate::db::members::NewMember;
use crate::db::products::NewProduct;
use crate::db::{MemberRepository, ProductRepository, RepositoryError};

const STARTER_CATALOG: &[NewProduct<'static>] = &[
    NewProduct {
        product_name: "Colombia Narino",
        product_price: 5000,
        product_origin: "Colombia",
        product_stock: 100,
        image_url: "/images/colombia-narino.jpg",
    },
    NewProduct {
        product_name: "Brazil Serra Do Caparao",
        product_price: 6000,
        product_origin: "Brazil",
        product_stock: 100,
        image_url: "/images/brazil-serra-do-caparao.jpg",
    },
    NewProduct {
        product_name: "Ethiopia Sidamo",
        product_price: 7000,
        product_origin: "Ethiopia",
        product_stock: 100,
        image_url: "/images/ethiopia-sidamo.jpg",
    },
];

/// Seed the starter catalog and a demo member into an empty database.
///
/// # Errors
///
/// Returns [`RepositoryError`] on storage failure, or
/// [`RepositoryError::DataCorruption`] if the built-in seed values fail
/// their own parsing.
pub async fn seed_catalog(pool: &SqlitePool, now: NaiveDateTime) -> Result<(), RepositoryError> {
    let products = ProductRepository::new(pool);
    if products.count().await? > 0 {
        tracing::debug!("catalog already populated, skipping seed");
        return Ok(());
    }

    for product in STARTER_CATALOG {
        products.create(product, now).await?;
    }

    let members = MemberRepository::new(pool);
    if members.count().await? == 0 {
        let email = Email::parse("demo@beanhouse.dev")
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let postal_code = PostalCode::parse("04524")
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let member = members
            .create(
                &NewMember {
                    email: &email,
                    password: "demo1234",
                    nickname: "demo",
                    address: "Seoul",
                    postal_code: &postal_code,
                },
                &ApiKey::generate(),
                now,
            )
            .await?;
        tracing::info!(member_id = %member.id, "seeded demo member");
    }

    tracing::info!(products = STARTER_CATALOG.len(), "seeded starter catalog");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn seeds_once_and_only_once() {
        let pool = test_pool().await;
        seed_catalog(&pool, now()).await.unwrap();
        seed_catalog(&pool, now()).await.unwrap();

        let products = ProductRepository::new(&pool).list().await.unwrap();
        assert_eq!(products.len(), STARTER_CATALOG.len());
    }
}

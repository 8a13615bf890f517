use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use tokio::task;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::companies},
};
use domain::{
    entities::companies::{CompanyEntity, UpsertCompanyEntity},
    repositories::companies::CompanyRepository,
};

pub struct CompanyPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CompanyPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CompanyRepository for CompanyPostgres {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<CompanyEntity>> {
        let slug = slug.to_owned();
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<CompanyEntity>> {
            let mut conn = db_pool.get()?;

            let row = companies::table
                .filter(companies::slug.eq(slug))
                .select(CompanyEntity::as_select())
                .first::<CompanyEntity>(&mut conn)
                .optional()?;

            Ok(row)
        })
        .await??)
    }

    async fn upsert_by_slug(&self, company: UpsertCompanyEntity) -> Result<CompanyEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<CompanyEntity> {
            let mut conn = db_pool.get()?;

            let row = insert_into(companies::table)
                .values(&company)
                .on_conflict(companies::slug)
                .do_update()
                .set(&company)
                .returning(CompanyEntity::as_returning())
                .get_result::<CompanyEntity>(&mut conn)?;

            Ok(row)
        })
        .await??)
    }
}

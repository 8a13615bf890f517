use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{OptionalExtension, RunQueryDsl, delete, insert_into, prelude::*, update};
use serde_json::Value;
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::applications},
};
use domain::{
    entities::applications::{ApplicationEntity, InsertApplicationEntity, UpdateApplicationEntity},
    repositories::applications::ApplicationRepository,
    value_objects::enums::{
        application_statuses::ApplicationStatus, research_statuses::ResearchStatus,
    },
};

pub struct ApplicationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ApplicationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ApplicationRepository for ApplicationPostgres {
    async fn insert(&self, application: InsertApplicationEntity) -> Result<ApplicationEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<ApplicationEntity> {
            let mut conn = db_pool.get()?;

            let row = insert_into(applications::table)
                .values(&application)
                .returning(ApplicationEntity::as_returning())
                .get_result::<ApplicationEntity>(&mut conn)?;

            Ok(row)
        })
        .await??)
    }

    async fn find_by_id(&self, application_id: Uuid) -> Result<Option<ApplicationEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<ApplicationEntity>> {
            let mut conn = db_pool.get()?;

            let row = applications::table
                .filter(applications::id.eq(application_id))
                .select(ApplicationEntity::as_select())
                .first::<ApplicationEntity>(&mut conn)
                .optional()?;

            Ok(row)
        })
        .await??)
    }

    async fn find_by_id_for_user(
        &self,
        user_id: Uuid,
        application_id: Uuid,
    ) -> Result<Option<ApplicationEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<ApplicationEntity>> {
            let mut conn = db_pool.get()?;

            let row = applications::table
                .filter(applications::id.eq(application_id))
                .filter(applications::user_id.eq(user_id))
                .select(ApplicationEntity::as_select())
                .first::<ApplicationEntity>(&mut conn)
                .optional()?;

            Ok(row)
        })
        .await??)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ApplicationEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<ApplicationEntity>> {
            let mut conn = db_pool.get()?;

            let rows = applications::table
                .filter(applications::user_id.eq(user_id))
                .order(applications::created_at.desc())
                .select(ApplicationEntity::as_select())
                .load::<ApplicationEntity>(&mut conn)?;

            Ok(rows)
        })
        .await??)
    }

    async fn update(
        &self,
        user_id: Uuid,
        application_id: Uuid,
        changes: UpdateApplicationEntity,
    ) -> Result<Option<ApplicationEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<ApplicationEntity>> {
            let mut conn = db_pool.get()?;

            let changes = UpdateApplicationEntity {
                updated_at: Some(changes.updated_at.unwrap_or_else(Utc::now)),
                ..changes
            };

            let row = update(
                applications::table
                    .filter(applications::id.eq(application_id))
                    .filter(applications::user_id.eq(user_id)),
            )
            .set(&changes)
            .returning(ApplicationEntity::as_returning())
            .get_result::<ApplicationEntity>(&mut conn)
            .optional()?;

            Ok(row)
        })
        .await??)
    }

    async fn update_status(
        &self,
        user_id: Uuid,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<ApplicationEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<ApplicationEntity>> {
            let mut conn = db_pool.get()?;

            let row = update(
                applications::table
                    .filter(applications::id.eq(application_id))
                    .filter(applications::user_id.eq(user_id)),
            )
            .set((
                applications::status.eq(status.to_string()),
                applications::updated_at.eq(Utc::now()),
            ))
            .returning(ApplicationEntity::as_returning())
            .get_result::<ApplicationEntity>(&mut conn)
            .optional()?;

            Ok(row)
        })
        .await??)
    }

    async fn link_company(&self, application_id: Uuid, company_id: Uuid) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<()> {
            let mut conn = db_pool.get()?;

            update(applications::table.filter(applications::id.eq(application_id)))
                .set((
                    applications::company_id.eq(Some(company_id)),
                    applications::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)?;

            Ok(())
        })
        .await??)
    }

    async fn set_research_status(
        &self,
        application_id: Uuid,
        status: ResearchStatus,
    ) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<()> {
            let mut conn = db_pool.get()?;

            update(applications::table.filter(applications::id.eq(application_id)))
                .set(applications::research_status.eq(status.to_string()))
                .execute(&mut conn)?;

            Ok(())
        })
        .await??)
    }

    async fn save_interview_questions(
        &self,
        application_id: Uuid,
        questions: Value,
        generated_at: DateTime<Utc>,
    ) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<()> {
            let mut conn = db_pool.get()?;

            update(applications::table.filter(applications::id.eq(application_id)))
                .set((
                    applications::interview_questions.eq(Some(questions)),
                    applications::interview_prep_generated_at.eq(Some(generated_at)),
                    applications::updated_at.eq(generated_at),
                ))
                .execute(&mut conn)?;

            Ok(())
        })
        .await??)
    }

    async fn delete_for_user(&self, user_id: Uuid, application_ids: Vec<Uuid>) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            let deleted = delete(
                applications::table
                    .filter(applications::user_id.eq(user_id))
                    .filter(applications::id.eq_any(application_ids)),
            )
            .execute(&mut conn)?;

            Ok(deleted)
        })
        .await??)
    }
}

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::deletion_log;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = deletion_log)]
pub struct DeletionLogEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub application_id: Uuid,
    pub deleted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = deletion_log)]
pub struct InsertDeletionLogEntity {
    pub user_id: Uuid,
    pub application_id: Uuid,
    pub deleted_at: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::invoices;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = invoices)]
pub struct InvoiceEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stripe_invoice_id: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub invoice_pdf: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, PartialEq)]
#[diesel(table_name = invoices)]
pub struct InsertInvoiceEntity {
    pub user_id: Uuid,
    pub stripe_invoice_id: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub invoice_pdf: Option<String>,
}

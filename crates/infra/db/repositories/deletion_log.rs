use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{Connection, OptionalExtension, RunQueryDsl, delete, insert_into, prelude::*};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{applications, deletion_log, profiles},
    },
};
use domain::{
    entities::deletion_log::InsertDeletionLogEntity,
    repositories::deletion_log::{DeletionLogRepository, FreeTierDeletionOutcome},
    value_objects::deletion::{check_free_tier_batch, min_age_cutoff, window_start},
};

pub struct DeletionLogPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl DeletionLogPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[derive(Debug, PartialEq)]
enum BatchDecision {
    Delete,
    Stop(FreeTierDeletionOutcome),
}

/// Decides a free-tier batch from the rows loaded under the profile lock.
/// Anything but `Delete` leaves the batch untouched.
fn decide_free_tier_batch(
    requested: &[Uuid],
    profile_locked: bool,
    owned: &[(Uuid, DateTime<Utc>)],
    used_in_window: i64,
    now: DateTime<Utc>,
) -> BatchDecision {
    if !profile_locked || owned.len() != requested.len() {
        return BatchDecision::Stop(FreeTierDeletionOutcome::NotFound);
    }

    match check_free_tier_batch(owned, used_in_window, now) {
        Ok(()) => BatchDecision::Delete,
        Err(violation) => BatchDecision::Stop(FreeTierDeletionOutcome::Rejected(violation)),
    }
}

/// A partial delete aborts the transaction.
fn ensure_whole_batch_deleted(
    deleted: usize,
    requested: usize,
    used_in_window: i64,
) -> Result<FreeTierDeletionOutcome> {
    if deleted != requested {
        bail!("deleted {deleted} of {requested} applications, rolling back");
    }

    Ok(FreeTierDeletionOutcome::Deleted {
        deleted,
        used_in_window: used_in_window + deleted as i64,
    })
}

#[async_trait]
impl DeletionLogRepository for DeletionLogPostgres {
    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<i64> {
            let mut conn = db_pool.get()?;

            let count = deletion_log::table
                .filter(deletion_log::user_id.eq(user_id))
                .filter(deletion_log::deleted_at.gt(since))
                .count()
                .get_result::<i64>(&mut conn)?;

            Ok(count)
        })
        .await??)
    }

    async fn delete_with_audit(
        &self,
        user_id: Uuid,
        mut application_ids: Vec<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<FreeTierDeletionOutcome> {
        application_ids.sort_unstable();
        application_ids.dedup();

        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<FreeTierDeletionOutcome> {
            let mut conn = db_pool.get()?;

            conn.transaction::<_, anyhow::Error, _>(|tx| {
                // Serializes concurrent deletes for the same user.
                let profile_locked = profiles::table
                    .filter(profiles::id.eq(user_id))
                    .select(profiles::id)
                    .for_update()
                    .first::<Uuid>(tx)
                    .optional()?
                    .is_some();

                let owned = applications::table
                    .filter(applications::user_id.eq(user_id))
                    .filter(applications::id.eq_any(application_ids.clone()))
                    .select((applications::id, applications::created_at))
                    .load::<(Uuid, DateTime<Utc>)>(tx)?;

                let used_in_window = deletion_log::table
                    .filter(deletion_log::user_id.eq(user_id))
                    .filter(deletion_log::deleted_at.gt(window_start(now)))
                    .count()
                    .get_result::<i64>(tx)?;

                let decision = decide_free_tier_batch(
                    &application_ids,
                    profile_locked,
                    &owned,
                    used_in_window,
                    now,
                );
                if let BatchDecision::Stop(outcome) = decision {
                    return Ok(outcome);
                }

                let deleted = delete(
                    applications::table
                        .filter(applications::user_id.eq(user_id))
                        .filter(applications::id.eq_any(application_ids.clone()))
                        .filter(applications::created_at.le(min_age_cutoff(now))),
                )
                .execute(tx)?;

                let outcome =
                    ensure_whole_batch_deleted(deleted, application_ids.len(), used_in_window)?;

                let logs: Vec<InsertDeletionLogEntity> = application_ids
                    .iter()
                    .map(|application_id| InsertDeletionLogEntity {
                        user_id,
                        application_id: *application_id,
                        deleted_at: now,
                    })
                    .collect();

                insert_into(deletion_log::table)
                    .values(&logs)
                    .execute(tx)?;

                Ok(outcome)
            })
        })
        .await??)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain::value_objects::deletion::{FREE_TIER_DELETIONS_PER_WINDOW, FreeTierViolation};

    fn aged(ids: &[Uuid], now: DateTime<Utc>, days: i64) -> Vec<(Uuid, DateTime<Utc>)> {
        ids.iter().map(|id| (*id, now - Duration::days(days))).collect()
    }

    #[test]
    fn missing_profile_stops_the_batch() {
        let now = Utc::now();
        let ids = vec![Uuid::new_v4()];

        assert_eq!(
            decide_free_tier_batch(&ids, false, &aged(&ids, now, 30), 0, now),
            BatchDecision::Stop(FreeTierDeletionOutcome::NotFound)
        );
    }

    #[test]
    fn unowned_id_stops_the_whole_batch() {
        let now = Utc::now();
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let owned = aged(&ids[..1], now, 30);

        assert_eq!(
            decide_free_tier_batch(&ids, true, &owned, 0, now),
            BatchDecision::Stop(FreeTierDeletionOutcome::NotFound)
        );
    }

    #[test]
    fn young_application_rejects_before_any_delete() {
        let now = Utc::now();
        let old = Uuid::new_v4();
        let young = Uuid::new_v4();
        let ids = vec![old, young];
        let owned = vec![(old, now - Duration::days(40)), (young, now - Duration::days(2))];

        assert_eq!(
            decide_free_tier_batch(&ids, true, &owned, 0, now),
            BatchDecision::Stop(FreeTierDeletionOutcome::Rejected(
                FreeTierViolation::TooRecent { application_id: young }
            ))
        );
    }

    #[test]
    fn window_count_never_passes_the_limit() {
        let now = Utc::now();
        let mut used_in_window = 0;

        for _ in 0..6 {
            let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
            match decide_free_tier_batch(&ids, true, &aged(&ids, now, 20), used_in_window, now) {
                BatchDecision::Delete => {
                    let outcome = ensure_whole_batch_deleted(ids.len(), ids.len(), used_in_window)
                        .unwrap();
                    let FreeTierDeletionOutcome::Deleted {
                        used_in_window: used,
                        ..
                    } = outcome
                    else {
                        panic!("expected a completed delete");
                    };
                    used_in_window = used;
                }
                BatchDecision::Stop(outcome) => {
                    assert_eq!(
                        outcome,
                        FreeTierDeletionOutcome::Rejected(FreeTierViolation::QuotaExceeded {
                            requested: 3,
                            remaining: 1,
                        })
                    );
                }
            }
            assert!(used_in_window <= FREE_TIER_DELETIONS_PER_WINDOW);
        }

        assert_eq!(used_in_window, 9);
    }

    #[test]
    fn partial_delete_rolls_back() {
        assert!(ensure_whole_batch_deleted(2, 3, 0).is_err());
        assert_eq!(
            ensure_whole_batch_deleted(3, 3, 4).unwrap(),
            FreeTierDeletionOutcome::Deleted {
                deleted: 3,
                used_in_window: 7
            }
        );
    }

    // Manual check against a migrated database:
    // cargo test -p crates deletion_log::tests::rejected_batch_keeps_rows -- --ignored
    #[tokio::test]
    #[ignore = "needs a migrated Postgres at DATABASE_URL"]
    async fn rejected_batch_keeps_rows() -> Result<()> {
        use crate::infra::db::postgres::postgres_connection::establish_connection;

        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL")?;
        let pool = Arc::new(establish_connection(&database_url, 2)?);

        let user_id = Uuid::new_v4();
        let application_id = {
            let mut conn = pool.get()?;
            insert_into(profiles::table)
                .values(profiles::id.eq(user_id))
                .execute(&mut conn)?;
            insert_into(applications::table)
                .values((
                    applications::user_id.eq(user_id),
                    applications::job_title.eq("Engineer"),
                    applications::company_name.eq("Acme"),
                ))
                .returning(applications::id)
                .get_result::<Uuid>(&mut conn)?
        };

        let repo = DeletionLogPostgres::new(Arc::clone(&pool));
        let outcome = repo
            .delete_with_audit(user_id, vec![application_id], Utc::now())
            .await?;

        let mut conn = pool.get()?;
        let remaining = applications::table
            .filter(applications::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)?;
        let logged = deletion_log::table
            .filter(deletion_log::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)?;
        delete(profiles::table.filter(profiles::id.eq(user_id))).execute(&mut conn)?;

        assert_eq!(
            outcome,
            FreeTierDeletionOutcome::Rejected(FreeTierViolation::TooRecent { application_id })
        );
        assert_eq!(remaining, 1);
        assert_eq!(logged, 0);
        Ok(())
    }
}

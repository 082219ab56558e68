//! Parent-chain rollup propagation.
//!
//! Any event that can change a goal's completion (progress crossing a
//! target, manual completion, a child being created or deleted) walks the
//! chain of container ancestors and recomputes each one from its direct
//! children. The walk always runs inside the caller's transaction, so a
//! reader either sees none of the event or all of its consequences.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::ContainerRollup;

use super::goal_repository::{fetch_goal, persist_goal_state};
use super::stats_repository::append_stat_credit;

/// Ancestor chains deeper than this abort the transaction. Well-formed data
/// never gets close; a cycle introduced by hand-edited rows would otherwise
/// spin forever.
pub(super) const MAX_PROPAGATION_DEPTH: usize = 64;

/// Recompute the rollup state of `start` and every container above it.
///
/// `start` is the parent of the goal that changed; `None` makes the whole
/// call a no-op so callers can pass `goal.parent_goal_id` unconditionally.
/// The walk does not stop early on an unchanged level: a child becoming
/// un-complete must clear completion all the way up.
pub(super) async fn recompute_chain(
    conn: &mut SqliteConnection,
    start: Option<Uuid>,
    now: DateTime<Utc>,
) -> DomainResult<()> {
    let mut current = start;
    let mut depth = 0usize;

    while let Some(container_id) = current {
        if depth >= MAX_PROPAGATION_DEPTH {
            return Err(DomainError::IntegrityViolation(format!(
                "parent chain exceeds {MAX_PROPAGATION_DEPTH} levels at goal {container_id}"
            )));
        }
        depth += 1;

        // A parent deleted mid-walk ends the chain.
        let Some(mut container) = fetch_goal(conn, container_id).await? else {
            break;
        };
        if !container.goal_type.is_container() {
            return Err(DomainError::IntegrityViolation(format!(
                "goal {container_id} has children but is not a container"
            )));
        }

        let rollup = child_counts(conn, container_id).await?;
        let newly_completed = container.apply_rollup(rollup, now);
        persist_goal_state(conn, &container).await?;

        if newly_completed {
            if let Some((unit_id, amount)) = container.completion_bonus() {
                append_stat_credit(conn, container.user_id, unit_id, amount, now).await?;
            }
        }

        current = container.parent_goal_id;
    }

    Ok(())
}

async fn child_counts(
    conn: &mut SqliteConnection,
    parent_id: Uuid,
) -> DomainResult<ContainerRollup> {
    // COUNT over a nullable column counts the non-null rows.
    let (total, completed): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COUNT(completed_at) FROM goals WHERE parent_goal_id = ?")
            .bind(parent_id.to_string())
            .fetch_one(&mut *conn)
            .await?;
    Ok(ContainerRollup::new(total, completed))
}

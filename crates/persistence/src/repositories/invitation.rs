//! Invitation repository for database operations.

use domain::models::{Invitation, InvitationsQuery};
use domain::services::{InvitationStore, StoreError};
use shared::pagination::Page;
use shared::validation::is_blank;
use sqlx::PgPool;

use crate::entities::InvitationEntity;
use crate::error::from_sqlx;
use crate::metrics::QueryTimer;

const COLUMNS: &str = "id, username, email, name, photo_url, event_id, title, description, \
                       invited_by, status, is_accepted, accepted_date, created_at, updated_at";

/// Moves a row out of pending. Matches nothing once the row is resolved.
const RESOLVE_SQL: &str = r#"
    UPDATE event_invitations
    SET status = $2, is_accepted = $3, accepted_date = $4, updated_at = $5
    WHERE id = $1 AND status = 'pending'
"#;

/// Filter value that is present and not blank.
fn filter_value(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !is_blank(v))
}

/// Builds the dynamic WHERE clause for invitation listings.
///
/// Placeholders are numbered in the same order as [`bind_invitation_filters`]
/// binds them.
struct InvitationFilterBuilder {
    conditions: Vec<String>,
    param_count: usize,
}

impl InvitationFilterBuilder {
    fn build(query: &InvitationsQuery) -> Self {
        let mut builder = Self {
            conditions: Vec::new(),
            param_count: 0,
        };

        if filter_value(&query.username).is_some() {
            builder.push("username = ${}");
        }
        if filter_value(&query.email).is_some() {
            builder.push("LOWER(email) = LOWER(${})");
        }
        if filter_value(&query.name).is_some() {
            builder.push("LOWER(name) = LOWER(${})");
        }
        if filter_value(&query.event_id).is_some() {
            builder.push("event_id = ${}");
        }
        if filter_value(&query.title).is_some() {
            builder.push("STRPOS(LOWER(title), LOWER(${})) > 0");
        }
        if filter_value(&query.invited_by).is_some() {
            builder.push("invited_by = ${}");
        }
        if query.is_accepted.is_some() {
            builder.push("is_accepted = ${}");
        }
        if query.accepted_date.is_some() {
            builder.push("(accepted_date AT TIME ZONE 'UTC')::date = ${}");
        }

        builder
    }

    fn push(&mut self, template: &str) {
        self.param_count += 1;
        self.conditions
            .push(template.replace("${}", &format!("${}", self.param_count)));
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            "TRUE".to_string()
        } else {
            self.conditions.join(" AND ")
        }
    }

    fn param_count(&self) -> usize {
        self.param_count
    }
}

/// Bind the filter values in the order [`InvitationFilterBuilder`] numbers them.
macro_rules! bind_invitation_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(username) = filter_value(&$query.username) {
            b = b.bind(username);
        }
        if let Some(email) = filter_value(&$query.email) {
            b = b.bind(email);
        }
        if let Some(name) = filter_value(&$query.name) {
            b = b.bind(name);
        }
        if let Some(event_id) = filter_value(&$query.event_id) {
            b = b.bind(event_id);
        }
        if let Some(title) = filter_value(&$query.title) {
            b = b.bind(title);
        }
        if let Some(invited_by) = filter_value(&$query.invited_by) {
            b = b.bind(invited_by);
        }
        if let Some(is_accepted) = $query.is_accepted {
            b = b.bind(is_accepted);
        }
        if let Some(accepted_date) = $query.accepted_date {
            b = b.bind(accepted_date);
        }
        b
    }};
}

/// Postgres-backed invitation store.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InvitationStore for InvitationRepository {
    async fn get(&self, id: &str) -> Result<Option<Invitation>, StoreError> {
        let timer = QueryTimer::new("find_invitation_by_id");
        let query = format!("SELECT {} FROM event_invitations WHERE id = $1", COLUMNS);
        let entity = sqlx::query_as::<_, InvitationEntity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();

        entity
            .map_err(from_sqlx)?
            .map(Invitation::try_from)
            .transpose()
    }

    async fn create(&self, invitation: &Invitation) -> Result<(), StoreError> {
        let timer = QueryTimer::new("create_invitation");
        let result = sqlx::query(
            r#"
            INSERT INTO event_invitations (
                id, username, email, name, photo_url, event_id, title, description,
                invited_by, status, is_accepted, accepted_date, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(&invitation.id)
        .bind(&invitation.username)
        .bind(&invitation.email)
        .bind(&invitation.name)
        .bind(&invitation.photo_url)
        .bind(&invitation.event_id)
        .bind(&invitation.title)
        .bind(&invitation.description)
        .bind(&invitation.invited_by)
        .bind(invitation.status.as_str())
        .bind(invitation.is_accepted)
        .bind(invitation.accepted_date)
        .bind(invitation.created_at)
        .bind(invitation.updated_at)
        .execute(&self.pool)
        .await;
        timer.record();

        result.map_err(from_sqlx)?;
        Ok(())
    }

    async fn resolve(&self, invitation: &Invitation) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("resolve_invitation");
        let result = sqlx::query(RESOLVE_SQL)
            .bind(&invitation.id)
            .bind(invitation.status.as_str())
            .bind(invitation.is_accepted)
            .bind(invitation.accepted_date)
            .bind(invitation.updated_at)
            .execute(&self.pool)
            .await;
        timer.record();

        Ok(result.map_err(from_sqlx)?.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let timer = QueryTimer::new("delete_invitation");
        let result = sqlx::query("DELETE FROM event_invitations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();

        if result.map_err(from_sqlx)?.rows_affected() == 0 {
            return Err(StoreError::NotApplied(format!(
                "invitation {} was not deleted",
                id
            )));
        }
        Ok(())
    }

    async fn list(&self, query: &InvitationsQuery) -> Result<Page<Invitation>, StoreError> {
        let request = query.page_request();
        let filter = InvitationFilterBuilder::build(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let timer = QueryTimer::new("count_invitations");
        let count_query = format!(
            "SELECT COUNT(*) FROM event_invitations WHERE {}",
            where_clause
        );
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let count_builder = bind_invitation_filters!(count_builder, query);
        let total = count_builder.fetch_one(&self.pool).await;
        timer.record();
        let total = total.map_err(from_sqlx)?;

        let order = query.sort_order().as_sql();
        let list_query = format!(
            r#"
            SELECT {}
            FROM event_invitations
            WHERE {}
            ORDER BY created_at {}, id {}
            LIMIT ${} OFFSET ${}
            "#,
            COLUMNS,
            where_clause,
            order,
            order,
            param_count + 1,
            param_count + 2
        );

        let timer = QueryTimer::new("list_invitations");
        let list_builder = sqlx::query_as::<_, InvitationEntity>(&list_query);
        let list_builder = bind_invitation_filters!(list_builder, query);
        let entities = list_builder
            .bind(request.limit() as i64)
            .bind(request.offset() as i64)
            .fetch_all(&self.pool)
            .await;
        timer.record();

        let invitations = entities
            .map_err(from_sqlx)?
            .into_iter()
            .map(Invitation::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(invitations, request, total.max(0) as u64))
    }

    async fn pending_for(&self, username: &str) -> Result<Vec<Invitation>, StoreError> {
        let timer = QueryTimer::new("list_pending_invitations");
        let query = format!(
            "SELECT {} FROM event_invitations WHERE username = $1 AND status = 'pending' \
             ORDER BY created_at",
            COLUMNS
        );
        let entities = sqlx::query_as::<_, InvitationEntity>(&query)
            .bind(username)
            .fetch_all(&self.pool)
            .await;
        timer.record();

        entities
            .map_err(from_sqlx)?
            .into_iter()
            .map(Invitation::try_from)
            .collect()
    }
}

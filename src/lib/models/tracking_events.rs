use serde::{Deserialize, Serialize};
use sqlx::{query_as, Error, FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;

// Event rows are append-only. Nothing in the system updates or deletes them.

#[derive(Debug, FromRow)]
pub struct EmailOpen {
    pub id: i64,
    pub campaign_id: i64,
    pub email: String,
    pub opened_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct EmailClick {
    pub id: i64,
    pub campaign_id: i64,
    pub email: String,
    pub clicked_at: OffsetDateTime,
}

#[derive(Debug, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipientOpens {
    pub email: String,
    pub opens: i64,
}

#[derive(Debug, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipientClicks {
    pub email: String,
    pub clicks: i64,
}

pub struct TrackingEventModel<'a> {
    pub db_pool: &'a PgPool,
}

impl TrackingEventModel<'_> {
    // Inserts take the caller's transaction, the campaign counter update and
    // the event row must commit or roll back together.
    pub async fn insert_open(
        transaction: &mut Transaction<'_, Postgres>,
        campaign_id: i64,
        email: &str,
        opened_at: OffsetDateTime,
    ) -> Result<EmailOpen, Error> {
        query_as::<_, EmailOpen>(
            r#"INSERT INTO email_opens (campaign_id, email, opened_at)
            VALUES ($1, $2, $3)
            RETURNING *"#,
        )
        .bind(campaign_id)
        .bind(email)
        .bind(opened_at)
        .fetch_one(&mut *transaction)
        .await
    }

    pub async fn insert_click(
        transaction: &mut Transaction<'_, Postgres>,
        campaign_id: i64,
        email: &str,
        clicked_at: OffsetDateTime,
    ) -> Result<EmailClick, Error> {
        query_as::<_, EmailClick>(
            r#"INSERT INTO email_clicks (campaign_id, email, clicked_at)
            VALUES ($1, $2, $3)
            RETURNING *"#,
        )
        .bind(campaign_id)
        .bind(email)
        .bind(clicked_at)
        .fetch_one(&mut *transaction)
        .await
    }

    /// Per-recipient open counts. Grouping, not ordering, is the contract.
    pub async fn opens_by_email(&self, campaign_id: i64) -> Result<Vec<RecipientOpens>, Error> {
        query_as::<_, RecipientOpens>(
            r#"SELECT email, COUNT(id) AS opens
            FROM email_opens
            WHERE campaign_id = $1
            GROUP BY email"#,
        )
        .bind(campaign_id)
        .fetch_all(self.db_pool)
        .await
    }

    pub async fn clicks_by_email(&self, campaign_id: i64) -> Result<Vec<RecipientClicks>, Error> {
        query_as::<_, RecipientClicks>(
            r#"SELECT email, COUNT(id) AS clicks
            FROM email_clicks
            WHERE campaign_id = $1
            GROUP BY email"#,
        )
        .bind(campaign_id)
        .fetch_all(self.db_pool)
        .await
    }
}

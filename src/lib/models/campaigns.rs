use sqlx::{query, query_as, Error, FromRow, PgPool};
use strum_macros::{Display, EnumString};
use time::OffsetDateTime;

use crate::models::tracking_events::TrackingEventModel;

#[derive(Debug, Display, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum CampaignStatus {
    Created,
    Running,
}

#[derive(Debug, FromRow)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    pub subject: String,
    pub template: String,
    pub employees: Vec<String>,
    pub status: String,
    pub opened: i32,
    pub clicked: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Campaign {
    /// clicked / opened as a percentage, two decimal places. A campaign with
    /// zero opens reports 0.00% rather than dividing by zero.
    pub fn click_through_rate(&self) -> String {
        if self.opened == 0 {
            return "0.00%".to_string();
        }
        format!(
            "{:.2}%",
            self.clicked as f64 / self.opened as f64 * 100.0
        )
    }
}

pub struct CampaignModel<'a> {
    pub db_pool: &'a PgPool,
}

impl CampaignModel<'_> {
    pub async fn create(
        &self,
        name: &str,
        subject: &str,
        template: &str,
        employees: &[String],
    ) -> Result<Campaign, Error> {
        let now = OffsetDateTime::now_utc();
        query_as::<_, Campaign>(
            r#"INSERT INTO campaigns
                (name, subject, template, employees, status, opened, clicked, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 0, 0, $6, $6)
            RETURNING *"#,
        )
        .bind(name)
        .bind(subject)
        .bind(template)
        .bind(employees.to_vec())
        .bind(CampaignStatus::Created.to_string())
        .bind(now)
        .fetch_one(self.db_pool)
        .await
    }

    pub async fn fetch_one_by_id(&self, id: i64) -> Result<Campaign, Error> {
        query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1")
            .bind(id)
            .fetch_one(self.db_pool)
            .await
    }

    pub async fn mark_running(&self, id: i64) -> Result<Campaign, Error> {
        query_as::<_, Campaign>(
            r#"UPDATE campaigns
            SET status = $1, updated_at = $2
            WHERE id = $3
            RETURNING *"#,
        )
        .bind(CampaignStatus::Running.to_string())
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .fetch_one(self.db_pool)
        .await
    }

    /// Counter increment and event row go through one transaction so the
    /// `opened` counter always equals the number of email_opens rows. The
    /// increment happens SQL-side, concurrent requests cannot lose updates.
    /// Returns false, without error, when the campaign id is unknown.
    pub async fn record_open(&self, id: i64, email: &str) -> Result<bool, Error> {
        let now = OffsetDateTime::now_utc();
        let mut transaction = self.db_pool.begin().await?;
        let updated = query(
            r#"UPDATE campaigns
            SET opened = opened + 1, updated_at = $1
            WHERE id = $2"#,
        )
        .bind(now)
        .bind(id)
        .execute(&mut transaction)
        .await?;
        if updated.rows_affected() == 0 {
            transaction.rollback().await?;
            return Ok(false);
        }
        TrackingEventModel::insert_open(&mut transaction, id, email, now).await?;
        transaction.commit().await?;
        Ok(true)
    }

    pub async fn record_click(&self, id: i64, email: &str) -> Result<bool, Error> {
        let now = OffsetDateTime::now_utc();
        let mut transaction = self.db_pool.begin().await?;
        let updated = query(
            r#"UPDATE campaigns
            SET clicked = clicked + 1, updated_at = $1
            WHERE id = $2"#,
        )
        .bind(now)
        .bind(id)
        .execute(&mut transaction)
        .await?;
        if updated.rows_affected() == 0 {
            transaction.rollback().await?;
            return Ok(false);
        }
        TrackingEventModel::insert_click(&mut transaction, id, email, now).await?;
        transaction.commit().await?;
        Ok(true)
    }
}

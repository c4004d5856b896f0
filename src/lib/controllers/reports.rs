use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::models::{
    campaigns::CampaignModel,
    tracking_events::{RecipientClicks, RecipientOpens, TrackingEventModel},
};

#[derive(Serialize, Deserialize, Debug)]
pub struct DetailedReportResponse {
    pub campaign: String,
    pub status: String,
    pub total_opened: i32,
    pub total_clicked: i32,
    pub opened_details: Vec<RecipientOpens>,
    pub clicked_details: Vec<RecipientClicks>,
}

/// Campaign counters plus per-recipient engagement, grouped by email.
pub async fn detail(path: web::Path<i64>, pool: web::Data<PgPool>) -> HttpResponse {
    let campaign_id = path.into_inner();
    let campaigns = CampaignModel {
        db_pool: pool.as_ref(),
    };
    let campaign = match campaigns.fetch_one_by_id(campaign_id).await {
        Ok(campaign) => campaign,
        Err(e) => match e {
            sqlx::Error::RowNotFound => return HttpResponse::NotFound().finish(),
            _ => return HttpResponse::InternalServerError().finish(),
        },
    };
    let events = TrackingEventModel {
        db_pool: pool.as_ref(),
    };
    let opened_details = match events.opens_by_email(campaign_id).await {
        Ok(details) => details,
        Err(_) => return HttpResponse::InternalServerError().finish(),
    };
    let clicked_details = match events.clicks_by_email(campaign_id).await {
        Ok(details) => details,
        Err(_) => return HttpResponse::InternalServerError().finish(),
    };
    HttpResponse::Ok().json(DetailedReportResponse {
        campaign: campaign.name,
        status: campaign.status,
        total_opened: campaign.opened,
        total_clicked: campaign.clicked,
        opened_details,
        clicked_details,
    })
}

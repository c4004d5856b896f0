use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{
    email::client::Mailer,
    jobs::send_campaign::send_campaign_emails,
    models::campaigns::CampaignModel,
    settings::Settings,
    telemetry::{error, StatsD, TraceType},
};

#[derive(Serialize, Deserialize)]
pub struct CampaignCreateRequest {
    pub name: String,
    pub subject: String,
    pub template: String,
    pub employees: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CampaignCreateResponse {
    pub campaign_id: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CampaignStartResponse {
    pub message: String,
    pub sent: usize,
    pub failed: usize,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CampaignStatusResponse {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub opened: i32,
    pub clicked: i32,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CampaignReportResponse {
    pub opened: i32,
    pub clicked: i32,
    pub click_rate: String,
}

pub async fn create(
    data: web::Json<CampaignCreateRequest>,
    pool: web::Data<PgPool>,
    statsd: web::Data<StatsD>,
) -> HttpResponse {
    let campaigns = CampaignModel {
        db_pool: pool.as_ref(),
    };
    match campaigns
        .create(&data.name, &data.subject, &data.template, &data.employees)
        .await
    {
        Ok(created) => {
            statsd.incr(&TraceType::CampaignCreate, "created");
            HttpResponse::Created().json(CampaignCreateResponse {
                campaign_id: created.id,
            })
        }
        Err(e) => {
            error(
                &TraceType::CampaignCreateFailed,
                "Could not create campaign",
                Some(Box::new(e)),
            );
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Marks the campaign running and runs a full dispatch pass inline. Starting
/// twice runs two full passes; nothing guards against the resend.
pub async fn start(
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
    settings: web::Data<Settings>,
    mailer: web::Data<dyn Mailer>,
    statsd: web::Data<StatsD>,
) -> HttpResponse {
    let campaign_id = path.into_inner();
    let campaigns = CampaignModel {
        db_pool: pool.as_ref(),
    };
    let campaign = match campaigns.mark_running(campaign_id).await {
        Ok(campaign) => campaign,
        Err(e) => match e {
            sqlx::Error::RowNotFound => return HttpResponse::NotFound().finish(),
            _ => {
                error(
                    &TraceType::CampaignStartFailed,
                    "Could not mark campaign running",
                    Some(Box::new(e)),
                );
                return HttpResponse::InternalServerError().finish();
            }
        },
    };
    statsd.incr(&TraceType::CampaignStart, "started");
    let summary =
        send_campaign_emails(&campaign, mailer.as_ref(), settings.as_ref(), statsd.as_ref()).await;
    HttpResponse::Ok().json(CampaignStartResponse {
        message: "Campaign started and emails sent".to_string(),
        sent: summary.sent,
        failed: summary.failed,
    })
}

pub async fn status(path: web::Path<i64>, pool: web::Data<PgPool>) -> HttpResponse {
    let campaigns = CampaignModel {
        db_pool: pool.as_ref(),
    };
    match campaigns.fetch_one_by_id(path.into_inner()).await {
        Ok(campaign) => HttpResponse::Ok().json(CampaignStatusResponse {
            id: campaign.id,
            name: campaign.name,
            status: campaign.status,
            opened: campaign.opened,
            clicked: campaign.clicked,
        }),
        Err(e) => match e {
            sqlx::Error::RowNotFound => HttpResponse::NotFound().finish(),
            _ => HttpResponse::InternalServerError().finish(),
        },
    }
}

pub async fn report(path: web::Path<i64>, pool: web::Data<PgPool>) -> HttpResponse {
    let campaigns = CampaignModel {
        db_pool: pool.as_ref(),
    };
    match campaigns.fetch_one_by_id(path.into_inner()).await {
        Ok(campaign) => HttpResponse::Ok().json(CampaignReportResponse {
            opened: campaign.opened,
            clicked: campaign.clicked,
            click_rate: campaign.click_through_rate(),
        }),
        Err(e) => match e {
            sqlx::Error::RowNotFound => HttpResponse::NotFound().finish(),
            _ => HttpResponse::InternalServerError().finish(),
        },
    }
}

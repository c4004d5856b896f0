use actix_web::{http::header, web, HttpResponse};
use sqlx::PgPool;

use crate::{
    links,
    models::campaigns::CampaignModel,
    settings::Settings,
    telemetry::{error, StatsD, TraceType},
};

/* Tracking endpoints
 * ------------------
 * These are fetched by recipients' mail clients and browsers. Whatever
 * happens internally - unknown campaign id, database down - the response is
 * the pixel or the redirect. A visible failure would leak which campaign
 * ids exist.
 */

// 1x1 transparent PNG
pub static PIXEL_PNG: [u8; 68] = [
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x04, 0x00, 0x00, 0x00, 0xb5,
    0x1c, 0x0c, 0x02, 0x00, 0x00, 0x00, 0x0b, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0x64,
    0x60, 0x00, 0x00, 0x00, 0x06, 0x00, 0x02, 0x30, 0x81, 0xd0, 0x2f, 0x00, 0x00, 0x00, 0x00,
    0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

pub async fn open(
    path: web::Path<(i64, String)>,
    pool: web::Data<PgPool>,
    statsd: web::Data<StatsD>,
) -> HttpResponse {
    let (campaign_id, encoded_email) = path.into_inner();
    let email = links::decode_email(&encoded_email);
    let campaigns = CampaignModel {
        db_pool: pool.as_ref(),
    };
    match campaigns.record_open(campaign_id, &email).await {
        Ok(true) => statsd.incr(&TraceType::TrackOpen, "recorded"),
        Ok(false) => statsd.incr(&TraceType::TrackUnknownCampaign, "open"),
        Err(e) => error(
            &TraceType::TrackOpen,
            "Could not record open event",
            Some(Box::new(e)),
        ),
    }
    HttpResponse::Ok()
        .content_type("image/png")
        .body(&PIXEL_PNG[..])
}

pub async fn click(
    path: web::Path<(i64, String)>,
    pool: web::Data<PgPool>,
    settings: web::Data<Settings>,
    statsd: web::Data<StatsD>,
) -> HttpResponse {
    let (campaign_id, encoded_email) = path.into_inner();
    let email = links::decode_email(&encoded_email);
    let campaigns = CampaignModel {
        db_pool: pool.as_ref(),
    };
    match campaigns.record_click(campaign_id, &email).await {
        Ok(true) => statsd.incr(&TraceType::TrackClick, "recorded"),
        Ok(false) => statsd.incr(&TraceType::TrackUnknownCampaign, "click"),
        Err(e) => error(
            &TraceType::TrackClick,
            "Could not record click event",
            Some(Box::new(e)),
        ),
    }
    HttpResponse::Found()
        .append_header((header::LOCATION, settings.landing_url.clone()))
        .finish()
}

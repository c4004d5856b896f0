use actix_web::{Error, HttpResponse};
use serde_json::json;

use crate::telemetry::{info, TraceType};

/*
 * Custodial Helpers
 * -----------------
 * Any small helpers that are for general maintenance purposes
 */

#[tracing::instrument(name = "request-index")]
pub async fn index() -> Result<HttpResponse, Error> {
    info(&TraceType::RequestIndexSuccess, "");
    Ok(HttpResponse::Ok().json(json!({ "status": "Phishing awareness backend running" })))
}

pub async fn heartbeat() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().body("OK"))
}

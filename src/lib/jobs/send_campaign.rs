use time::OffsetDateTime;

use crate::{
    email::{client::Mailer, template::render_email_body},
    links::{encode_click_url, encode_open_url},
    models::campaigns::Campaign,
    settings::Settings,
    telemetry::{error, info, StatsD, TraceType},
};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
}

/// Sends one email per recipient, sequentially. A failed send is logged and
/// counted but does not abort the rest of the pass; the caller gets the
/// per-recipient outcome totals.
pub async fn send_campaign_emails(
    campaign: &Campaign,
    mailer: &dyn Mailer,
    settings: &Settings,
    statsd: &StatsD,
) -> DispatchSummary {
    let started_at = OffsetDateTime::now_utc();
    let mut summary = DispatchSummary::default();

    for employee in &campaign.employees {
        let recipient = employee.trim();
        let open_url = encode_open_url(&settings.base_url, campaign.id, recipient);
        let click_url = encode_click_url(&settings.base_url, campaign.id, recipient);
        let body = render_email_body(&campaign.template, &click_url, &open_url);
        match mailer.send(recipient, &campaign.subject, &body).await {
            Ok(()) => {
                statsd.incr(&TraceType::EmailSend, "sent");
                info(
                    &TraceType::EmailSend,
                    &format!("Sent campaign {} email to {}", campaign.id, recipient),
                );
                summary.sent += 1;
            }
            Err(e) => {
                statsd.incr(&TraceType::EmailSendFailed, "failed");
                error(
                    &TraceType::EmailSendFailed,
                    &format!(
                        "Could not send campaign {} email to {}",
                        campaign.id, recipient
                    ),
                    Some(Box::new(e)),
                );
                summary.failed += 1;
            }
        }
    }

    statsd.time(
        &TraceType::CampaignStart,
        "dispatch",
        OffsetDateTime::now_utc() - started_at,
    );
    summary
}

use urlencoding::{decode, encode};

/* Tracking links
 * --------------
 * The recipient address rides inside the URL path, percent-encoded, so no
 * per-recipient token table is needed. Decoding must round-trip every
 * address we accept at campaign creation.
 */

pub fn encode_open_url(base_url: &str, campaign_id: i64, email: &str) -> String {
    format!(
        "{}/track/open/{}/{}",
        base_url.trim_end_matches('/'),
        campaign_id,
        encode(email)
    )
}

pub fn encode_click_url(base_url: &str, campaign_id: i64, email: &str) -> String {
    format!(
        "{}/track/click/{}/{}",
        base_url.trim_end_matches('/'),
        campaign_id,
        encode(email)
    )
}

/// Inverse of the encoders for the path segment. The router has usually
/// percent-decoded the segment already, so decoding is applied only when
/// re-encoding the result reproduces the input - an address with a literal
/// %XX-looking sequence in its local part must not be decoded a second time.
/// Input that does not decode to valid UTF-8 is passed through untouched,
/// the tracking path never fails.
pub fn decode_email(path_segment: &str) -> String {
    match decode(path_segment) {
        Ok(decoded) if encode(&decoded) == path_segment => decoded.into_owned(),
        _ => path_segment.to_string(),
    }
}

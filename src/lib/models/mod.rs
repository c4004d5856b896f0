pub mod campaigns;
pub mod tracking_events;

pub mod campaigns;
pub mod custodial;
pub mod reports;
pub mod tracking;

pub mod send_campaign;

pub mod client;
pub mod template;

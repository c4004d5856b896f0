pub mod appconfig;
pub mod controllers;
pub mod email;
pub mod jobs;
pub mod links;
pub mod models;
pub mod settings;
pub mod telemetry;

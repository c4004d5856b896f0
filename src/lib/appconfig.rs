use actix_cors::Cors;
use actix_web::{
    dev::Server,
    http,
    web::{get, head, post, resource, Data, ServiceConfig},
    App, HttpServer,
};
use sqlx::{migrate, PgPool};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web_mozlog::MozLog;

use crate::{controllers, email::client::Mailer, settings::Settings, telemetry::StatsD};

/// Route table, shared between `run_server` and in-process test services.
pub fn config_app(cfg: &mut ServiceConfig) {
    cfg
        // Custodial
        .service(resource("/").route(get().to(controllers::custodial::index)))
        .service(resource("/__heartbeat__").route(get().to(controllers::custodial::heartbeat)))
        .service(resource("/__lbheartbeat__").route(get().to(controllers::custodial::heartbeat)))
        // Campaigns
        .service(resource("/campaigns").route(post().to(controllers::campaigns::create)))
        .service(
            resource("/campaigns/{campaign_id}").route(get().to(controllers::campaigns::status)),
        )
        .service(
            resource("/campaigns/{campaign_id}/start")
                .route(post().to(controllers::campaigns::start)),
        )
        .service(
            resource("/campaigns/{campaign_id}/report")
                .route(get().to(controllers::campaigns::report)),
        )
        // Reports
        .service(resource("/reports/{campaign_id}").route(get().to(controllers::reports::detail)))
        // Tracking. Mail clients fetch the pixel with GET or HEAD.
        .service(
            resource("/track/open/{campaign_id}/{email}")
                .route(get().to(controllers::tracking::open))
                .route(head().to(controllers::tracking::open)),
        )
        .service(
            resource("/track/click/{campaign_id}/{email}")
                .route(get().to(controllers::tracking::click)),
        );
}

pub fn run_server(
    settings: Settings,
    listener: TcpListener,
    db_pool: PgPool,
    mailer: Arc<dyn Mailer>,
) -> Result<Server, std::io::Error> {
    let db_pool = Data::new(db_pool);
    let mailer: Data<dyn Mailer> = Data::from(mailer);
    let statsd = Data::new(StatsD::new(&settings));
    let server = HttpServer::new(move || {
        let cors = get_cors(&settings);
        let moz_log = MozLog::default();
        App::new()
            .wrap(moz_log)
            .wrap(cors)
            .configure(config_app)
            // Make collaborators available to all routes
            .app_data(db_pool.clone())
            .app_data(mailer.clone())
            .app_data(statsd.clone())
            .app_data(Data::new(settings.clone()))
    })
    .listen(listener)?
    .run();
    Ok(server)
}

pub async fn connect_to_database_and_migrate(database_url: &str) -> PgPool {
    let connection_pool = PgPool::connect(database_url)
        .await
        .expect("Failed to connect to Postgres.");
    migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate database.");
    connection_pool
}

fn get_cors(settings: &Settings) -> Cors {
    // Tracking requests arrive as plain image/navigation fetches; CORS only
    // matters for dashboards calling the management endpoints.
    match settings.environment.as_str() {
        "local" | "dev" | "stage" => Cors::permissive(),
        "prod" => Cors::default()
            .allow_any_method()
            .allowed_headers(vec![http::header::ACCEPT, http::header::CONTENT_TYPE]),
        _ => panic!("Invalid settings value"),
    }
}

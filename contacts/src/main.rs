use std::sync::Arc;

use actix_web::HttpServer;
use common::{
    config::Config,
    context::ServiceState,
    mail::SmtpMailer,
    notification::NotificationDispatcher,
    repository::{connector::Connector, ContactRepository},
};
use contacts::create_app;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("CRITICAL: invalid configuration, refusing to start: {}", err);
            return Err(err.into());
        }
    };

    let repository = match Connector::new(config.database.clone()).connect().await {
        Ok(repository) => repository,
        Err(err) => {
            log::error!("CRITICAL: storage backend unavailable, refusing to start: {}", err);
            return Err(err.into());
        }
    };

    let mailer = Arc::new(SmtpMailer::new(&config.mail));
    let dispatcher = NotificationDispatcher::new(mailer, config.mail.business_email.clone());
    let state = Arc::new(ServiceState::new(repository, dispatcher));

    log::info!(
        "Contact API listening on port {} ({} backend)",
        config.port,
        state.repository.backend()
    );

    let allowed_origins = config.allowed_origins.clone();
    HttpServer::new(move || create_app(state.clone(), &allowed_origins))
        .bind(("0.0.0.0", config.port))?
        .run()
        .await?;

    Ok(())
}

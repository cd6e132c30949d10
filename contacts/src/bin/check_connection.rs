//! Inserts, lists and deletes one marked contact against the configured
//! backend, to confirm credentials and the `contacts` table before deploying.

use anyhow::{bail, Context as _};
use common::{
    config::Config,
    entities::contact::NewContact,
    repository::{connector::Connector, ContactRepository},
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("Invalid configuration")?;
    let repository = Connector::new(config.database)
        .connect()
        .await
        .context("Connection failed")?;

    log::info!("Testing {} connection...", repository.backend());

    let probe = NewContact {
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
        phone: "1234567890".to_string(),
        service: Some("other".to_string()),
        message: "This is a test message from the verification script.".to_string(),
        ip_address: None,
        user_agent: Some("check_connection".to_string()),
    };

    let created = repository
        .create(&probe)
        .await
        .context("Insert failed; does the contacts table exist?")?;
    log::info!("Test record inserted with ID {}", created.id);

    let visible = repository
        .list()
        .await
        .context("Listing contacts failed")?
        .iter()
        .any(|contact| contact.id == created.id);

    match repository.delete(&created.id).await {
        Ok(true) => log::info!("Test record deleted"),
        Ok(false) => log::warn!("Test record {} was not found for deletion", created.id),
        Err(err) => log::warn!("Could not delete test record {}: {}", created.id, err),
    }

    if !visible {
        bail!("Inserted test record {} is missing from the contact list", created.id);
    }

    log::info!("Connection successful");
    Ok(())
}

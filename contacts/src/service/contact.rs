use common::{
    context::Context,
    entities::contact::{Contact, CreateContact},
    error::{self, FieldViolation, ServiceError},
};

use super::validation::validate;

/// Terminal result of one form submission.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Accepted(Contact),
    Rejected(Vec<FieldViolation>),
    PersistFailed(ServiceError),
}

pub struct ContactService {
    context: Context,
}

impl ContactService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    /// Validate, store, then notify in the background. Notification
    /// results never change the outcome.
    pub async fn submit(&self, input: CreateContact) -> SubmissionOutcome {
        let contact = match validate(&input, self.context.provenance()) {
            Ok(contact) => contact,
            Err(errors) => {
                log::warn!("Rejected contact submission: {:?}", errors);
                return SubmissionOutcome::Rejected(errors);
            }
        };

        let contact = match self.context.repository().create(&contact).await {
            Ok(contact) => contact,
            Err(err) => {
                log::error!("Error processing contact form: {}", err);
                return SubmissionOutcome::PersistFailed(err);
            }
        };

        log::info!("New contact saved with ID: {}", contact.id);

        self.context.dispatcher().dispatch(contact.clone());

        SubmissionOutcome::Accepted(contact)
    }

    pub async fn list(&self) -> error::Result<Vec<Contact>> {
        self.context.repository().list().await.map_err(|err| {
            log::error!("Error fetching contacts: {}", err);
            err
        })
    }
}

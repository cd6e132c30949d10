use std::sync::Arc;

use actix_web::rt::task::JoinHandle;

use crate::{
    entities::{
        contact::{Contact, ServiceType},
        letter::Letter,
    },
    error::{self, ServiceError},
    mail::MailerObject,
};

const COMPANY: &str = "Georgia Air and Heating LLC";
const PREVIEW_CHARS: usize = 100;

/// Outcome of both sends for one contact. Only ever logged.
#[derive(Debug)]
pub struct DispatchReport {
    pub operator: error::Result<()>,
    pub submitter: error::Result<()>,
}

/// Sends the operator notification and the submitter confirmation for an
/// accepted contact. Each send is attempted once and independently.
pub struct NotificationDispatcher {
    mailer: MailerObject,
    operator_email: Option<String>,
}

impl NotificationDispatcher {
    pub fn new(mailer: MailerObject, operator_email: Option<String>) -> Self {
        Self {
            mailer,
            operator_email,
        }
    }

    /// Runs [`NotificationDispatcher::notify`] in the background. The
    /// handle exists for tests; the request path drops it.
    pub fn dispatch(self: &Arc<Self>, contact: Contact) -> JoinHandle<DispatchReport> {
        let dispatcher = Arc::clone(self);
        actix_web::rt::spawn(async move { dispatcher.notify(&contact).await })
    }

    pub async fn notify(&self, contact: &Contact) -> DispatchReport {
        let operator = async {
            match &self.operator_email {
                Some(email) => self.mailer.send(operator_letter(email, contact)).await,
                None => Err(ServiceError::notification("BUSINESS_EMAIL is not configured")),
            }
        };
        let submitter = self.mailer.send(submitter_letter(contact));

        let (operator, submitter) = futures::join!(operator, submitter);

        match &operator {
            Ok(()) => log::info!("Business notification sent for contact {}", contact.id),
            Err(err) => log::error!(
                "Error sending business notification for contact {}: {}",
                contact.id,
                err
            ),
        }
        match &submitter {
            Ok(()) => log::info!("Customer confirmation sent for contact {}", contact.id),
            Err(err) => log::error!(
                "Error sending customer confirmation for contact {}: {}",
                contact.id,
                err
            ),
        }

        DispatchReport {
            operator,
            submitter,
        }
    }
}

fn service_label(contact: &Contact) -> &'static str {
    contact
        .service_type()
        .map(|service| service.label())
        .unwrap_or("Not specified")
}

/// First 100 characters of `message`, with `...` appended when cut.
pub fn preview(message: &str) -> String {
    if message.chars().count() <= PREVIEW_CHARS {
        return message.to_string();
    }
    let mut preview: String = message.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

pub fn operator_letter(operator_email: &str, contact: &Contact) -> Letter {
    let service = service_label(contact);
    Letter {
        email: operator_email.to_string(),
        subject: format!("New Contact Form Submission - {}", service),
        message: format!(
            "You have received a new inquiry from your website:\n\n\
             Name: {}\n\
             Email: {}\n\
             Phone: {}\n\
             Service Needed: {}\n\n\
             Message:\n{}\n\n\
             Submitted on: {}\n",
            contact.name,
            contact.email,
            contact.phone,
            service,
            contact.message,
            contact.created_at.format("%A, %B %-d, %Y at %-I:%M %p UTC"),
        ),
    }
}

pub fn submitter_letter(contact: &Contact) -> Letter {
    Letter {
        email: contact.email.clone(),
        subject: format!("Thank You for Contacting {}", COMPANY),
        message: format!(
            "Dear {},\n\n\
             We've received your inquiry and appreciate you considering {} for your HVAC needs.\n\n\
             Our team will review your request and get back to you within 24 hours. \
             For urgent matters, please call us directly at:\n\
             English: 770-376-7161\n\
             Español: 770-852-0216\n\n\
             Your Submission Details:\n\
             Service: {}\n\
             Message: {}\n\n\
             Best regards,\n{} Team\n",
            contact.name,
            COMPANY,
            service_label(contact),
            preview(&contact.message),
            COMPANY,
        ),
    }
}

use actix_web::{
    get, post,
    web::{self, Json},
    HttpResponse, ResponseError,
};
use common::{context::Context, entities::contact::CreateContact, error::ServiceError};
use serde_json::json;

use crate::service::contact::{ContactService, SubmissionOutcome};

const ACCEPTED: &str = "Thank you for contacting us! We'll get back to you within 24 hours.";
const PERSIST_FAILED: &str =
    "Sorry, there was an error processing your request. Please try again or call us directly.";

#[post("/api/contact")]
pub async fn post_contact(context: Context, Json(data): web::Json<CreateContact>) -> HttpResponse {
    match ContactService::new(context).submit(data).await {
        SubmissionOutcome::Accepted(contact) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": ACCEPTED,
            "contactId": contact.id,
        })),
        SubmissionOutcome::Rejected(errors) => ServiceError::Validation(errors).error_response(),
        SubmissionOutcome::PersistFailed(_) => HttpResponse::InternalServerError().json(json!({
            "success": false,
            "message": PERSIST_FAILED,
        })),
    }
}

// Unauthenticated.
#[get("/api/contact")]
pub async fn get_contacts(context: Context) -> HttpResponse {
    match ContactService::new(context).list().await {
        Ok(contacts) => HttpResponse::Ok().json(json!({
            "success": true,
            "count": contacts.len(),
            "contacts": contacts,
        })),
        Err(_) => HttpResponse::InternalServerError().json(json!({
            "success": false,
            "message": "Error fetching contacts",
        })),
    }
}

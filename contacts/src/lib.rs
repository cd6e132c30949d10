pub mod handlers;
pub mod service;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::error::InternalError;
use actix_web::{http, middleware, web, App, HttpResponse};
use serde_json::json;

use common::context::ServiceState;

pub use crate::handlers::contact::*;
pub use crate::handlers::health::*;

fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec![http::Method::GET, http::Method::POST])
        .allow_any_header()
        .supports_credentials()
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected malformed request body: {}", err);
        let response = HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "Invalid request body",
        }));
        InternalError::from_response(err, response).into()
    })
}

pub fn create_app(
    state: Arc<ServiceState>,
    allowed_origins: &[String],
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    App::new()
        .wrap(cors(allowed_origins))
        .wrap(middleware::Logger::default())
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .service(post_contact)
        .service(get_contacts)
        .service(health)
        .service(index)
        .default_service(web::to(not_found))
}

use std::sync::Arc;

use actix_web::{dev::Payload, http::header, web::Data, FromRequest, HttpRequest};

use crate::{
    error::{self, ServiceError},
    notification::NotificationDispatcher,
    repository::RepositoryObject,
};

/// Process-wide state, built once at startup and shared by every request.
pub struct ServiceState {
    pub repository: RepositoryObject,
    pub dispatcher: Arc<NotificationDispatcher>,
}

impl ServiceState {
    pub fn new(repository: RepositoryObject, dispatcher: NotificationDispatcher) -> Self {
        Self {
            repository,
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// Where a request came from. Captured server-side, never taken from the body.
#[derive(Debug, Clone, Default)]
pub struct HandlerContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone)]
pub struct Context(pub Arc<ServiceState>, pub HandlerContext);

impl Context {
    pub fn repository(&self) -> &RepositoryObject {
        &self.0.repository
    }

    pub fn dispatcher(&self) -> &Arc<NotificationDispatcher> {
        &self.0.dispatcher
    }

    pub fn provenance(&self) -> &HandlerContext {
        &self.1
    }
}

impl FromRequest for Context {
    type Error = ServiceError;

    type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        fn from_request_inner(req: &HttpRequest, _payload: &mut Payload) -> error::Result<Context> {
            // the site sits behind a proxy, so forwarded headers win
            let ip_address = req
                .connection_info()
                .realip_remote_addr()
                .map(|x| x.to_string());

            let user_agent = req
                .headers()
                .get(header::USER_AGENT)
                .and_then(|x| x.to_str().ok())
                .map(|x| x.to_string());

            let Some(state) = req.app_data::<Data<Arc<ServiceState>>>() else {
                return Err(ServiceError::configuration("No state provided"));
            };

            Ok(Context(
                state.get_ref().clone(),
                HandlerContext {
                    ip_address,
                    user_agent,
                },
            ))
        }

        futures_util::future::ready(from_request_inner(req, payload))
    }
}

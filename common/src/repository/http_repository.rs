use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    entities::contact::{Contact, NewContact, DEFAULT_SERVICE},
    error::{self, ServiceError},
};

use super::{Backend, ContactRepository};

const TABLE: &str = "contacts";

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    service: &'a str,
    message: &'a str,
    ip_address: Option<&'a str>,
    user_agent: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct HostedRow {
    id: Value,
    name: String,
    email: String,
    phone: String,
    service: Option<String>,
    message: String,
    #[serde(default)]
    ip_address: Option<String>,
    #[serde(default)]
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl HostedRow {
    fn into_contact(self) -> error::Result<Contact> {
        let id = match self.id {
            Value::String(id) => id,
            Value::Number(id) => id.to_string(),
            other => {
                return Err(ServiceError::persistence(format!(
                    "Unexpected contact id from hosted database: {}",
                    other
                )))
            }
        };
        Ok(Contact {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            service: self.service.unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
            message: self.message,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            created_at: self.created_at,
        })
    }
}

/// Contacts table behind a Supabase (PostgREST) HTTP API. The database
/// assigns `id` and `created_at`.
pub struct HttpRepository {
    client: Client,
    base_url: String,
    key: String,
}

impl HttpRepository {
    pub fn new(base_url: &str, key: &str) -> error::Result<Self> {
        if base_url.is_empty() || key.is_empty() {
            return Err(ServiceError::configuration(
                "SUPABASE_URL and SUPABASE_KEY are required for the hosted backend",
            ));
        }
        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.key))
    }

    async fn check(response: Response) -> error::Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ServiceError::persistence(format!(
            "Hosted database answered {}: {}",
            status, body
        )))
    }
}

#[async_trait]
impl ContactRepository for HttpRepository {
    fn backend(&self) -> Backend {
        Backend::Hosted
    }

    async fn create(&self, contact: &NewContact) -> error::Result<Contact> {
        let row = InsertRow {
            name: &contact.name,
            email: &contact.email,
            phone: &contact.phone,
            service: contact.service_or_default(),
            message: &contact.message,
            ip_address: contact.ip_address.as_deref(),
            user_agent: contact.user_agent.as_deref(),
        };

        let response = self
            .request(reqwest::Method::POST, self.table_url())
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;

        let mut rows = Self::check(response).await?.json::<Vec<HostedRow>>().await?;
        if rows.is_empty() {
            return Err(ServiceError::persistence(
                "Hosted database returned no row for the inserted contact",
            ));
        }
        rows.remove(0).into_contact()
    }

    async fn list(&self) -> error::Result<Vec<Contact>> {
        let url = format!("{}?select=*&order=created_at.desc,id.desc", self.table_url());
        let response = self.request(reqwest::Method::GET, url).send().await?;

        Self::check(response)
            .await?
            .json::<Vec<HostedRow>>()
            .await?
            .into_iter()
            .map(HostedRow::into_contact)
            .collect()
    }

    async fn delete(&self, id: &str) -> error::Result<bool> {
        let url = format!("{}?id=eq.{}", self.table_url(), id);
        let response = self
            .request(reqwest::Method::DELETE, url)
            .header("Prefer", "return=representation")
            .send()
            .await?;

        let rows = Self::check(response).await?.json::<Vec<Value>>().await?;
        Ok(!rows.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicI64, Ordering},
        Mutex,
    };

    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    const KEY: &str = "service-key";

    /// Minimal PostgREST stand-in for the `contacts` table.
    #[derive(Default)]
    struct Stub {
        rows: Mutex<Vec<Value>>,
        queries: Mutex<Vec<String>>,
        next_id: AtomicI64,
    }

    fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
        req.headers().get(name).and_then(|x| x.to_str().ok())
    }

    fn authorized(req: &HttpRequest) -> bool {
        header(req, "apikey") == Some(KEY)
            && header(req, "Authorization") == Some(format!("Bearer {}", KEY).as_str())
    }

    async fn insert(stub: web::Data<Stub>, req: HttpRequest, body: web::Json<Vec<Value>>) -> HttpResponse {
        if !authorized(&req) {
            return HttpResponse::Unauthorized().json(json!({"message": "Invalid API key"}));
        }
        if header(&req, "Prefer") != Some("return=representation") {
            return HttpResponse::Created().finish();
        }

        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut rows = stub.rows.lock().unwrap();
        let mut created = Vec::new();
        for mut row in body.into_inner() {
            let id = stub.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            row["id"] = json!(id);
            row["created_at"] = json!((base + chrono::Duration::seconds(id)).to_rfc3339());
            rows.push(row.clone());
            created.push(row);
        }
        HttpResponse::Created().json(created)
    }

    async fn select(stub: web::Data<Stub>, req: HttpRequest) -> HttpResponse {
        if !authorized(&req) {
            return HttpResponse::Unauthorized().json(json!({"message": "Invalid API key"}));
        }
        stub.queries.lock().unwrap().push(req.query_string().to_string());

        let mut rows = stub.rows.lock().unwrap().clone();
        if req.query_string().contains("order=created_at.desc,id.desc") {
            rows.reverse();
        }
        HttpResponse::Ok().json(rows)
    }

    async fn remove(stub: web::Data<Stub>, req: HttpRequest) -> HttpResponse {
        if !authorized(&req) {
            return HttpResponse::Unauthorized().json(json!({"message": "Invalid API key"}));
        }
        let Some(id) = req.query_string().strip_prefix("id=eq.") else {
            return HttpResponse::BadRequest().json(json!({"message": "missing filter"}));
        };

        let mut rows = stub.rows.lock().unwrap();
        let (removed, kept): (Vec<Value>, Vec<Value>) =
            rows.drain(..).partition(|row| row["id"].to_string() == id);
        *rows = kept;
        HttpResponse::Ok().json(removed)
    }

    async fn start_stub() -> (String, web::Data<Stub>) {
        let stub = web::Data::new(Stub::default());
        let data = stub.clone();
        let server = HttpServer::new(move || {
            App::new().app_data(data.clone()).service(
                web::resource("/rest/v1/contacts")
                    .route(web::post().to(insert))
                    .route(web::get().to(select))
                    .route(web::delete().to(remove)),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let address = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        (format!("http://{}/", address), stub)
    }

    fn new_contact(name: &str, service: Option<&str>) -> NewContact {
        NewContact {
            name: name.to_string(),
            email: "jo@example.com".to_string(),
            phone: "770-376-7161".to_string(),
            service: service.map(|x| x.to_string()),
            message: "Need annual furnace tune-up please.".to_string(),
            ip_address: Some("10.0.0.7".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        }
    }

    #[actix_web::test]
    async fn create_list_and_delete_against_postgrest() {
        let (url, stub) = start_stub().await;
        let repo = HttpRepository::new(&url, KEY).unwrap();

        let first = repo.create(&new_contact("Ann Aker", None)).await.unwrap();
        let second = repo.create(&new_contact("Bob Baker", Some("repair"))).await.unwrap();
        assert_eq!(first.id, "1");
        assert_eq!(first.service, "other");
        assert_eq!(first.ip_address.as_deref(), Some("10.0.0.7"));
        assert_eq!(second.service, "repair");

        let stored = stub.rows.lock().unwrap().clone();
        assert_eq!(stored[0]["service"], "other");
        assert_eq!(stored[0]["user_agent"], "Mozilla/5.0");

        let listed = repo.list().await.unwrap();
        assert_eq!(listed, vec![second.clone(), first.clone()]);
        assert_eq!(
            stub.queries.lock().unwrap().as_slice(),
            ["select=*&order=created_at.desc,id.desc"]
        );

        assert!(repo.delete(&first.id).await.unwrap());
        assert!(!repo.delete(&first.id).await.unwrap());
        assert_eq!(repo.list().await.unwrap(), vec![second]);
    }

    #[actix_web::test]
    async fn rejected_requests_are_persistence_errors() {
        let (url, _stub) = start_stub().await;
        let repo = HttpRepository::new(&url, "wrong-key").unwrap();

        let err = repo.create(&new_contact("Ann Aker", None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)));
        assert!(err.to_string().contains("401"));

        assert!(matches!(repo.list().await, Err(ServiceError::Persistence(_))));
        assert!(matches!(repo.delete("1").await, Err(ServiceError::Persistence(_))));
    }

    #[test]
    fn requires_credentials() {
        assert!(matches!(
            HttpRepository::new("", "key"),
            Err(ServiceError::Configuration(_))
        ));
        assert!(matches!(
            HttpRepository::new("https://project.supabase.co", ""),
            Err(ServiceError::Configuration(_))
        ));
    }

    #[test]
    fn builds_table_url() {
        let repo = HttpRepository::new("https://project.supabase.co/", "key").unwrap();
        assert_eq!(repo.table_url(), "https://project.supabase.co/rest/v1/contacts");
        assert_eq!(repo.backend(), Backend::Hosted);
    }

    #[test]
    fn numeric_and_uuid_ids_become_strings() {
        let row: HostedRow = serde_json::from_value(json!({
            "id": 42,
            "name": "Jo Lee",
            "email": "jo@example.com",
            "phone": "770-376-7161",
            "service": null,
            "message": "Need annual furnace tune-up please.",
            "created_at": "2024-05-01T12:00:00.123456+00:00"
        }))
        .unwrap();
        let contact = row.into_contact().unwrap();
        assert_eq!(contact.id, "42");
        assert_eq!(contact.service, "other");

        let row: HostedRow = serde_json::from_value(json!({
            "id": "7d0c6f7e-4b8e-4a5e-9f59-3a1f6f0b2c11",
            "name": "Jo Lee",
            "email": "jo@example.com",
            "phone": "770-376-7161",
            "service": "maintenance",
            "message": "Need annual furnace tune-up please.",
            "ip_address": "10.0.0.7",
            "user_agent": "curl/8.0",
            "created_at": "2024-05-01T12:00:00Z"
        }))
        .unwrap();
        let contact = row.into_contact().unwrap();
        assert_eq!(contact.id, "7d0c6f7e-4b8e-4a5e-9f59-3a1f6f0b2c11");
        assert_eq!(contact.user_agent.as_deref(), Some("curl/8.0"));
    }
}

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{ClientOptions, FindOptions},
    Client, Collection,
};
use serde::{Deserialize, Serialize};

use crate::{
    entities::contact::{Contact, NewContact},
    error::{self, ServiceError},
};

use super::{Backend, ContactRepository};

const COLLECTION: &str = "contacts";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    email: String,
    phone: String,
    service: String,
    message: String,
    #[serde(default)]
    ip_address: Option<String>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl ContactDocument {
    fn into_contact(self) -> error::Result<Contact> {
        let id = self
            .id
            .ok_or_else(|| ServiceError::persistence("Stored contact has no _id"))?;
        Ok(Contact {
            id: id.to_hex(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            service: self.service,
            message: self.message,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            created_at: self.created_at,
        })
    }
}

pub struct MongoRepository {
    collection: Collection<ContactDocument>,
}

impl MongoRepository {
    /// Connects and pings the server, so an unreachable database is
    /// reported here instead of on the first request.
    pub async fn connect(mongo_uri: &str, database: &str, timeout: Duration) -> error::Result<Self> {
        let mut options = ClientOptions::parse(mongo_uri).await?;
        options.server_selection_timeout = Some(timeout);
        options.connect_timeout = Some(timeout);
        options.app_name = Some("contacts".to_string());

        let client = Client::with_options(options)?;
        let database = client.database(database);
        database.run_command(doc! {"ping": 1}, None).await?;

        log::info!("MongoDB connected: database {}", database.name());

        Ok(Self {
            collection: database.collection(COLLECTION),
        })
    }
}

#[async_trait]
impl ContactRepository for MongoRepository {
    fn backend(&self) -> Backend {
        Backend::Document
    }

    async fn create(&self, contact: &NewContact) -> error::Result<Contact> {
        let document = ContactDocument {
            id: None,
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            service: contact.service_or_default().to_string(),
            message: contact.message.clone(),
            ip_address: contact.ip_address.clone(),
            user_agent: contact.user_agent.clone(),
            // BSON dates keep milliseconds only
            created_at: mongodb::bson::DateTime::now().to_chrono(),
        };

        let result = self.collection.insert_one(&document, None).await?;
        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| ServiceError::persistence("Inserted contact id is not an ObjectId"))?;

        Ok(Contact::from_new(id.to_hex(), contact, document.created_at))
    }

    async fn list(&self) -> error::Result<Vec<Contact>> {
        let find_options = FindOptions::builder()
            .sort(doc! {"createdAt": -1, "_id": -1})
            .build();

        let results: Vec<mongodb::error::Result<ContactDocument>> = self
            .collection
            .find(None, find_options)
            .await?
            .collect()
            .await;

        results
            .into_iter()
            .map(|document| document?.into_contact())
            .collect()
    }

    async fn delete(&self, id: &str) -> error::Result<bool> {
        let Ok(id) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let result = self.collection.delete_one(doc! {"_id": id}, None).await?;
        Ok(result.deleted_count > 0)
    }
}

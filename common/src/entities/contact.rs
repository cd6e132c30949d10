use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVICE: &str = "other";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    HeatingInstall,
    HeatingRepair,
    CoolingInstall,
    CoolingRepair,
    Maintenance,
    AirQuality,
    Commercial,
    Emergency,
    Other,
}

impl ServiceType {
    pub const ALL: [ServiceType; 9] = [
        ServiceType::HeatingInstall,
        ServiceType::HeatingRepair,
        ServiceType::CoolingInstall,
        ServiceType::CoolingRepair,
        ServiceType::Maintenance,
        ServiceType::AirQuality,
        ServiceType::Commercial,
        ServiceType::Emergency,
        ServiceType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::HeatingInstall => "heating-install",
            ServiceType::HeatingRepair => "heating-repair",
            ServiceType::CoolingInstall => "cooling-install",
            ServiceType::CoolingRepair => "cooling-repair",
            ServiceType::Maintenance => "maintenance",
            ServiceType::AirQuality => "air-quality",
            ServiceType::Commercial => "commercial",
            ServiceType::Emergency => "emergency",
            ServiceType::Other => "other",
        }
    }

    /// Human readable name used in operator emails.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::HeatingInstall => "Heating Installation",
            ServiceType::HeatingRepair => "Heating Repair",
            ServiceType::CoolingInstall => "AC Installation",
            ServiceType::CoolingRepair => "AC Repair",
            ServiceType::Maintenance => "Maintenance Plan",
            ServiceType::AirQuality => "Indoor Air Quality",
            ServiceType::Commercial => "Commercial HVAC",
            ServiceType::Emergency => "Emergency Service",
            ServiceType::Other => "Other",
        }
    }
}

impl FromStr for ServiceType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceType::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown service type: {}", s))
    }
}

/// Raw form body as posted by the website.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A submission that passed validation and is ready to be stored.
///
/// `service` is `None` when the submitter left it blank; repositories
/// store [`DEFAULT_SERVICE`] in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: Option<String>,
    pub message: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl NewContact {
    pub fn service_or_default(&self) -> &str {
        self.service.as_deref().unwrap_or(DEFAULT_SERVICE)
    }
}

/// A stored submission. `id` is whatever the backing store generated,
/// rendered as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub fn from_new(id: String, contact: &NewContact, created_at: DateTime<Utc>) -> Self {
        Contact {
            id,
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            service: contact.service_or_default().to_string(),
            message: contact.message.clone(),
            ip_address: contact.ip_address.clone(),
            user_agent: contact.user_agent.clone(),
            created_at,
        }
    }

    pub fn service_type(&self) -> Option<ServiceType> {
        self.service.parse().ok()
    }
}

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime, Time};
use validator::{Validate, ValidationError};

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+0-9\s()-]{7,20}$").expect("phone pattern is valid"));

/// Offerings a visitor can pick on the booking form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize)]
#[sqlx(type_name = "meeting_service", rename_all = "snake_case")]
pub enum Service {
    #[serde(rename = "General Consultation")]
    GeneralConsultation,
    #[serde(rename = "Website Development")]
    WebsiteDevelopment,
    #[serde(rename = "Social Media Marketing")]
    SocialMediaMarketing,
    #[serde(rename = "SEO & Content Marketing")]
    SeoContentMarketing,
    #[serde(rename = "PPC & Google Ads")]
    PpcGoogleAds,
    #[serde(rename = "Branding & Design")]
    BrandingDesign,
}

impl Service {
    pub const ALL: [Service; 6] = [
        Service::GeneralConsultation,
        Service::WebsiteDevelopment,
        Service::SocialMediaMarketing,
        Service::SeoContentMarketing,
        Service::PpcGoogleAds,
        Service::BrandingDesign,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Service::GeneralConsultation => "General Consultation",
            Service::WebsiteDevelopment => "Website Development",
            Service::SocialMediaMarketing => "Social Media Marketing",
            Service::SeoContentMarketing => "SEO & Content Marketing",
            Service::PpcGoogleAds => "PPC & Google Ads",
            Service::BrandingDesign => "Branding & Design",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Service::ALL
            .into_iter()
            .find(|service| service.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown service: {}", s))
    }
}

/// A confirmed meeting. One row per `(meeting_date, start_time)`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Reservation {
    pub id: Uuid,
    pub meeting_date: Date,
    pub start_time: Time,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub company: Option<String>,
    pub service: Service,
    pub message: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Contact details as submitted by the visitor, before any checks.
#[derive(Debug, Clone, Default, Validate)]
pub struct ContactFields {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Please enter a valid email")
    )]
    pub email: String,
    #[validate(regex(path = *PHONE_PATTERN, message = "Please enter a valid phone number"))]
    pub phone: Option<String>,
    pub company: Option<String>,
    /// Free text until the handler resolves it to a [`Service`].
    pub service: String,
    pub message: Option<String>,
}

impl ContactFields {
    /// Field names in the order they appear on the form.
    pub const FIELD_ORDER: [&'static str; 3] = ["name", "email", "phone"];

    /// Trims values and drops optional fields that were sent as blanks.
    pub fn normalized(self) -> Self {
        fn optional(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: optional(self.phone),
            company: optional(self.company),
            service: self.service.trim().to_string(),
            message: optional(self.message),
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("Name is required")));
    }
    Ok(())
}

/// Everything needed to write a reservation row.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub meeting_date: Date,
    pub start_time: Time,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub company: Option<String>,
    pub service: Service,
    pub message: Option<String>,
}

impl NewReservation {
    pub fn into_reservation(self, id: Uuid, created_at: OffsetDateTime) -> Reservation {
        Reservation {
            id,
            meeting_date: self.meeting_date,
            start_time: self.start_time,
            contact_name: self.contact_name,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            company: self.company,
            service: self.service,
            message: self.message,
            created_at,
        }
    }
}

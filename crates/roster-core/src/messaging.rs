//! Outbound WhatsApp text messages.
//!
//! [`MessageSender`] is the seam: [`WhatsAppClient`] talks to the HTTP API,
//! tests substitute their own sender. [`broadcast`] sends to many members and
//! records a result per recipient instead of stopping at the first failure.

use crate::assessment::Assessment;
use crate::config::MessagingConfig;
use crate::error::{Result, RosterError};
use crate::member::Member;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const MIN_DIGITS: usize = 11;
const MAX_DIGITS: usize = 15;
const LOCAL_DIGITS: usize = 10;

// ---------------------------------------------------------------------------
// Phone numbers
// ---------------------------------------------------------------------------

/// Normalise a phone number to international digits without `+`.
///
/// Spaces, dashes, dots and parentheses are stripped. Ten-digit local numbers
/// get `country_code` prepended.
pub fn normalize_phone(raw: &str, country_code: &str) -> Result<String> {
    let trimmed = raw.trim();
    let without_plus = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let mut digits = String::with_capacity(without_plus.len());
    for c in without_plus.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return Err(RosterError::InvalidPhone(raw.to_string())),
        }
    }
    if digits.len() == LOCAL_DIGITS {
        digits.insert_str(0, country_code);
    }
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
        return Err(RosterError::InvalidPhone(raw.to_string()));
    }
    Ok(digits)
}

// ---------------------------------------------------------------------------
// MessageSender
// ---------------------------------------------------------------------------

pub trait MessageSender {
    /// Send `body` to a normalised number. Returns the provider's message id
    /// when it reports one.
    fn send(&self, to: &str, body: &str) -> Result<Option<String>>;
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody<'a>,
}

#[derive(Debug, Default, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

pub struct WhatsAppClient {
    http: reqwest::blocking::Client,
    api_url: String,
    token: String,
}

impl WhatsAppClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            token: token.into(),
        })
    }

    /// Build a client from config, reading the token from the environment
    /// variable the config names.
    pub fn from_config(cfg: &MessagingConfig) -> Result<Self> {
        if cfg.api_url.trim().is_empty() {
            return Err(RosterError::MessagingNotConfigured(
                "messaging.api_url is empty".to_string(),
            ));
        }
        let token = std::env::var(&cfg.token_env)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                RosterError::MessagingNotConfigured(format!("{} is not set", cfg.token_env))
            })?;
        Self::new(cfg.api_url.clone(), token)
    }
}

impl MessageSender for WhatsAppClient {
    fn send(&self, to: &str, body: &str) -> Result<Option<String>> {
        let payload = OutgoingMessage {
            to,
            kind: "text",
            text: TextBody { body },
        };
        let resp = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().unwrap_or_default();
            return Err(RosterError::Delivery(format!("{status}: {}", detail.trim())));
        }
        let parsed: SendResponse = resp.json().unwrap_or_default();
        Ok(parsed.messages.into_iter().next().map(|m| m.id))
    }
}

// ---------------------------------------------------------------------------
// Audience
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Audience {
    Member(String),
    /// Members whose assessment assigns them to this vertical.
    Vertical(String),
    Chapter(String),
    All,
}

/// Active members addressed by `audience`.
pub fn recipients(root: &Path, audience: &Audience) -> Result<Vec<Member>> {
    let members = match audience {
        Audience::Member(id) => vec![Member::load_active(root, id)?],
        Audience::Vertical(slug) => {
            crate::vertical::Vertical::load(root, slug)?;
            let assigned: Vec<String> = Assessment::list(root)?
                .into_iter()
                .filter(|a| a.assigned_vertical.as_deref() == Some(slug.as_str()))
                .map(|a| a.member_id)
                .collect();
            Member::list(root)?
                .into_iter()
                .filter(|m| m.is_active() && assigned.contains(&m.id))
                .collect()
        }
        Audience::Chapter(chapter) => Member::list(root)?
            .into_iter()
            .filter(|m| m.is_active() && m.chapter.as_deref() == Some(chapter.as_str()))
            .collect(),
        Audience::All => Member::list(root)?
            .into_iter()
            .filter(|m| m.is_active())
            .collect(),
    };
    Ok(members)
}

// ---------------------------------------------------------------------------
// Broadcast
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed,
    Skipped,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub member_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BroadcastReport {
    pub deliveries: Vec<Delivery>,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Send `body` to every recipient. Members without a usable phone are
/// skipped; a failed send is recorded and the rest continue.
pub fn broadcast(
    sender: &dyn MessageSender,
    recipients: &[Member],
    body: &str,
    country_code: &str,
) -> BroadcastReport {
    let mut report = BroadcastReport::default();
    for member in recipients {
        let mut delivery = Delivery {
            member_id: member.id.clone(),
            name: member.name.clone(),
            phone: None,
            status: DeliveryStatus::Skipped,
            message_id: None,
            error: None,
        };

        let phone = match member.phone.as_deref() {
            None => {
                delivery.error = Some("no phone number".to_string());
                None
            }
            Some(raw) => match normalize_phone(raw, country_code) {
                Ok(p) => Some(p),
                Err(e) => {
                    delivery.error = Some(e.to_string());
                    None
                }
            },
        };

        if let Some(phone) = phone {
            match sender.send(&phone, body) {
                Ok(id) => {
                    delivery.status = DeliveryStatus::Sent;
                    delivery.message_id = id;
                }
                Err(e) => {
                    tracing::warn!(member = %member.id, error = %e, "message delivery failed");
                    delivery.status = DeliveryStatus::Failed;
                    delivery.error = Some(e.to_string());
                }
            }
            delivery.phone = Some(phone);
        }

        match delivery.status {
            DeliveryStatus::Sent => report.sent += 1,
            DeliveryStatus::Failed => report.failed += 1,
            DeliveryStatus::Skipped => report.skipped += 1,
        }
        report.deliveries.push(delivery);
    }
    tracing::info!(
        sent = report.sent,
        failed = report.failed,
        skipped = report.skipped,
        "broadcast finished"
    );
    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

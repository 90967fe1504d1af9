//! Creator notification relay.
//!
//! # Responsibility
//! - Accept `{pageId, screenshotUrl, receiverName}` notification requests.
//! - Resolve the page's creator email and hand an email to the webhook.
//!
//! # Invariants
//! - A page without creator email is skipped and reported as success.
//! - A missing webhook URL is an error only when there is someone to notify.
//! - Email addresses and names never reach the log.

use crate::model::page::PageId;
use crate::relay::{check_status, RelayError, RelayResult};
use crate::repo::page_repo::PageRepository;
use chrono::{DateTime, Utc};
use log::{info, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(15);
const FALLBACK_DISPLAY_NAME: &str = "They";

/// Notification request sent when the recipient accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    pub page_id: PageId,
    pub screenshot_url: Option<String>,
    pub receiver_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// The page has no creator email configured.
    SkippedNoEmail,
}

impl NotifyOutcome {
    pub fn message(self) -> &'static str {
        match self {
            Self::Sent => "Notification sent",
            Self::SkippedNoEmail => "No email configured",
        }
    }
}

/// Client-side contract for notifying a page creator.
pub trait CreatorNotifier {
    fn notify(&self, request: &NotifyRequest) -> RelayResult<NotifyOutcome>;
}

/// Email payload posted to the automation webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Email-sending webhook.
pub trait EmailWebhook {
    fn send(&self, email: &WebhookEmail) -> RelayResult<()>;
}

/// Webhook reached over HTTP with a JSON body.
pub struct HttpEmailWebhook {
    client: Client,
    url: String,
}

impl HttpEmailWebhook {
    pub fn new(url: impl Into<String>) -> RelayResult<Self> {
        let client = Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl EmailWebhook for HttpEmailWebhook {
    fn send(&self, email: &WebhookEmail) -> RelayResult<()> {
        let response = self.client.post(&self.url).json(email).send()?;
        let response = check_status(response)?;
        info!(
            "event=webhook_send module=relay status=ok http_status={}",
            response.status().as_u16()
        );
        Ok(())
    }
}

/// Server-side relay: looks the page up and emails its creator.
pub struct NotifyRelay<P: PageRepository, W: EmailWebhook> {
    pages: P,
    webhook: Option<W>,
}

impl<P: PageRepository, W: EmailWebhook> NotifyRelay<P, W> {
    /// `webhook` is `None` when no webhook URL is configured.
    pub fn new(pages: P, webhook: Option<W>) -> Self {
        Self { pages, webhook }
    }

    /// Handles one request at the given wall-clock time.
    pub fn handle_at(
        &self,
        request: &NotifyRequest,
        now: DateTime<Utc>,
    ) -> RelayResult<NotifyOutcome> {
        let page_id = request.page_id.trim();
        if page_id.is_empty() {
            return Err(RelayError::MissingPageId);
        }

        let page = self
            .pages
            .get_page(page_id)?
            .ok_or_else(|| RelayError::PageNotFound(page_id.to_string()))?;

        let Some(creator_email) = page.creator_email else {
            info!("event=notify module=relay status=skipped reason=no_creator_email");
            return Ok(NotifyOutcome::SkippedNoEmail);
        };

        let Some(webhook) = self.webhook.as_ref() else {
            warn!("event=notify module=relay status=error error_code=webhook_not_configured");
            return Err(RelayError::NotConfigured("email webhook URL"));
        };

        let display_name = non_blank(request.receiver_name.as_deref())
            .or_else(|| non_blank(page.receiver_name.as_deref()))
            .unwrap_or(FALLBACK_DISPLAY_NAME);

        let email = compose_email(
            creator_email,
            display_name,
            request.screenshot_url.as_deref(),
            now,
        );
        webhook.send(&email)?;
        info!(
            "event=notify module=relay status=ok has_screenshot={}",
            request.screenshot_url.is_some()
        );
        Ok(NotifyOutcome::Sent)
    }
}

impl<P: PageRepository, W: EmailWebhook> CreatorNotifier for NotifyRelay<P, W> {
    fn notify(&self, request: &NotifyRequest) -> RelayResult<NotifyOutcome> {
        self.handle_at(request, Utc::now())
    }
}

/// Builds the "they said yes" email.
pub fn compose_email(
    to: String,
    display_name: &str,
    screenshot_url: Option<&str>,
    now: DateTime<Utc>,
) -> WebhookEmail {
    let timestamp = now.format("%b %-d, %-I:%M %p").to_string();
    let screenshot_section = screenshot_url
        .map(|url| {
            let url = escape_html(url);
            format!(
                r#"<p style="margin: 20px 0;"><a href="{url}" style="background: #ec4899; color: white; padding: 12px 24px; border-radius: 8px; text-decoration: none; display: inline-block;">📸 View Screenshot</a></p>"#
            )
        })
        .unwrap_or_default();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1.0"></head>
<body style="font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background: #fdf2f8; padding: 40px 20px; margin: 0;">
  <div style="max-width: 500px; margin: 0 auto; background: white; border-radius: 16px; padding: 40px; text-align: center;">
    <h1 style="color: #db2777; font-size: 28px; margin: 0 0 10px;">{name} SAID YES!</h1>
    <p style="color: #6b7280; font-size: 14px; margin: 0 0 30px;">{timestamp}</p>
    <div style="background: linear-gradient(135deg, #fce7f3, #fbcfe8); padding: 24px; border-radius: 12px; margin: 20px 0;">
      <p style="color: #831843; font-size: 18px; margin: 0; font-weight: 500;">Your Valentine card worked! 💕</p>
      <p style="color: #9d174d; font-size: 14px; margin: 10px 0 0;">{name} clicked "Yes" on your Valentine</p>
    </div>
    {screenshot_section}
  </div>
</body>
</html>"#,
        name = escape_html(display_name),
    );

    WebhookEmail {
        to,
        subject: format!("🎉 {display_name} said YES to your Valentine! 💕"),
        html,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|name| !name.is_empty())
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

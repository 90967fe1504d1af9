use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};
use valentine_core::db::open_db_in_memory;
use valentine_core::relay::notify::{
    CreatorNotifier, EmailWebhook, NotifyOutcome, NotifyRelay, NotifyRequest, WebhookEmail,
};
use valentine_core::{
    ComposeService, PageDraft, RelayError, RelayResult, ShareLinkConfig, SqlitePageRepository,
};

#[derive(Clone, Default)]
struct RecordingWebhook {
    sent: Arc<Mutex<Vec<WebhookEmail>>>,
}

impl EmailWebhook for RecordingWebhook {
    fn send(&self, email: &WebhookEmail) -> RelayResult<()> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

fn create_page(conn: &rusqlite::Connection, creator_email: &str, receiver_name: &str) -> String {
    let service = ComposeService::new(SqlitePageRepository::new(conn), ShareLinkConfig::default());
    let draft = PageDraft {
        sender_name: "Jordan".to_string(),
        receiver_name: receiver_name.to_string(),
        creator_email: creator_email.to_string(),
        ..PageDraft::default()
    };
    service.create_page(&draft).unwrap().page.id
}

fn request(page_id: &str, receiver_name: Option<&str>) -> NotifyRequest {
    NotifyRequest {
        page_id: page_id.to_string(),
        screenshot_url: Some("https://cdn.example/shot.png".to_string()),
        receiver_name: receiver_name.map(ToString::to_string),
    }
}

#[test]
fn sends_email_to_creator() {
    let conn = open_db_in_memory().unwrap();
    let page_id = create_page(&conn, "jordan@example.com", "Alex");
    let webhook = RecordingWebhook::default();
    let relay = NotifyRelay::new(SqlitePageRepository::new(&conn), Some(webhook.clone()));

    let now = Utc.with_ymd_and_hms(2026, 2, 14, 20, 30, 0).unwrap();
    let outcome = relay.handle_at(&request(&page_id, Some("Sam")), now).unwrap();
    assert_eq!(outcome, NotifyOutcome::Sent);

    let sent = webhook.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jordan@example.com");
    assert_eq!(sent[0].subject, "🎉 Sam said YES to your Valentine! 💕");
    assert!(sent[0].html.contains("Feb 14, 8:30 PM"));
    assert!(sent[0].html.contains("https://cdn.example/shot.png"));
}

#[test]
fn display_name_falls_back_to_page_then_generic() {
    let conn = open_db_in_memory().unwrap();
    let named = create_page(&conn, "jordan@example.com", "Alex");
    let anonymous = create_page(&conn, "jordan@example.com", "");
    let webhook = RecordingWebhook::default();
    let relay = NotifyRelay::new(SqlitePageRepository::new(&conn), Some(webhook.clone()));

    relay.notify(&request(&named, Some("  "))).unwrap();
    relay.notify(&request(&anonymous, None)).unwrap();

    let sent = webhook.sent.lock().unwrap();
    assert!(sent[0].subject.starts_with("🎉 Alex said YES"));
    assert!(sent[1].subject.starts_with("🎉 They said YES"));
}

#[test]
fn empty_request_name_does_not_hide_page_receiver_name() {
    let conn = open_db_in_memory().unwrap();
    let page_id = create_page(&conn, "jordan@example.com", "Alex");
    let webhook = RecordingWebhook::default();
    let relay = NotifyRelay::new(SqlitePageRepository::new(&conn), Some(webhook.clone()));

    relay.notify(&request(&page_id, Some(""))).unwrap();

    let sent = webhook.sent.lock().unwrap();
    assert_eq!(sent[0].subject, "🎉 Alex said YES to your Valentine! 💕");
    assert!(sent[0].html.contains("Alex SAID YES!"));
}

#[test]
fn page_without_creator_email_is_skipped() {
    let conn = open_db_in_memory().unwrap();
    let page_id = create_page(&conn, "", "Alex");
    let webhook = RecordingWebhook::default();
    let relay = NotifyRelay::new(SqlitePageRepository::new(&conn), Some(webhook.clone()));

    let outcome = relay.notify(&request(&page_id, None)).unwrap();
    assert_eq!(outcome, NotifyOutcome::SkippedNoEmail);
    assert_eq!(outcome.message(), "No email configured");
    assert!(webhook.sent.lock().unwrap().is_empty());
}

#[test]
fn missing_webhook_is_reported_only_when_email_exists() {
    let conn = open_db_in_memory().unwrap();
    let with_email = create_page(&conn, "jordan@example.com", "Alex");
    let without_email = create_page(&conn, "", "Alex");
    let relay: NotifyRelay<_, RecordingWebhook> =
        NotifyRelay::new(SqlitePageRepository::new(&conn), None);

    let err = relay.notify(&request(&with_email, None)).unwrap_err();
    assert!(matches!(err, RelayError::NotConfigured(_)));
    assert_eq!(
        relay.notify(&request(&without_email, None)).unwrap(),
        NotifyOutcome::SkippedNoEmail
    );
}

#[test]
fn unknown_or_blank_page_ids_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let relay = NotifyRelay::new(
        SqlitePageRepository::new(&conn),
        Some(RecordingWebhook::default()),
    );

    let err = relay.notify(&request("nope123", None)).unwrap_err();
    assert_eq!(err.code(), "page_not_found");
    let err = relay.notify(&request("  ", None)).unwrap_err();
    assert_eq!(err.code(), "missing_page_id");
}

#[test]
fn request_uses_camel_case_wire_names() {
    let json = serde_json::to_value(request("abc", Some("Sam"))).unwrap();
    assert_eq!(json["pageId"], "abc");
    assert_eq!(json["screenshotUrl"], "https://cdn.example/shot.png");
    assert_eq!(json["receiverName"], "Sam");
}

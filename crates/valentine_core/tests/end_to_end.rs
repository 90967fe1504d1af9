use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;
use valentine_core::db::open_db;
use valentine_core::effects::evasion::{
    EvasionState, Point, PointerKind, RejectionSignal, Viewport, DODGE_COOLDOWN,
};
use valentine_core::effects::floating::FloatingField;
use valentine_core::relay::notify::{EmailWebhook, NotifyRelay, WebhookEmail};
use valentine_core::relay::snapshot::PngSnapshot;
use valentine_core::relay::storage::DirSnapshotStore;
use valentine_core::service::acceptance_service::AcceptSteps;
use valentine_core::service::compose_service::parse_share_link;
use valentine_core::{
    AcceptState, AcceptanceRepository, ComposeService, PageDraft, PageView, RelayResult,
    ShareLinkConfig, SqliteAcceptanceRepository, SqlitePageRepository, ViewerService,
};

#[derive(Default)]
struct Outbox {
    emails: Mutex<Vec<WebhookEmail>>,
}

impl EmailWebhook for &Outbox {
    fn send(&self, email: &WebhookEmail) -> RelayResult<()> {
        self.emails.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[test]
fn alex_refuses_twice_then_says_yes() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("valentine.db");
    let mut rng = StdRng::seed_from_u64(2026);

    // Sender composes.
    let sender_conn = open_db(&db_path).unwrap();
    let composer = ComposeService::new(
        SqlitePageRepository::new(&sender_conn),
        ShareLinkConfig::default(),
    );
    let draft = PageDraft {
        sender_name: "Jordan".to_string(),
        receiver_name: "Alex".to_string(),
        creator_email: "jordan@example.com".to_string(),
        decoration_type: "flowers".to_string(),
        ..PageDraft::default()
    };
    let created = composer.create_page_with_rng(&draft, &mut rng).unwrap();
    let page_id = parse_share_link(&created.share_link).unwrap();

    // Recipient opens the link on another connection.
    let viewer_conn = open_db(&db_path).unwrap();
    let viewer = ViewerService::new(
        SqlitePageRepository::new(&viewer_conn),
        SqliteAcceptanceRepository::new(&viewer_conn),
    );
    let PageView::Ready(loaded) = viewer.load_page(&page_id) else {
        panic!("shared page should load");
    };
    assert_eq!(loaded.initial_state(), AcceptState::Undecided);

    let mut style = BTreeMap::new();
    let _theme = loaded.apply_theme(&mut style);
    let mut field = FloatingField::new();
    assert_eq!(
        field
            .items(
                &loaded.page.decoration_type,
                loaded.page.custom_decoration_url.as_deref(),
                &mut rng
            )
            .len(),
        15
    );

    // Two refusals.
    let mut evasion = EvasionState::new();
    let viewport = Viewport::new(1280.0, 720.0);
    for step in 0..2u64 {
        evasion
            .on_rejection_signal(
                RejectionSignal {
                    kind: PointerKind::Fine,
                    pointer: Point::new(660.0, 400.0),
                    viewport,
                    now_ms: step * DODGE_COOLDOWN.as_millis() as u64,
                },
                &mut rng,
            )
            .unwrap();
    }
    assert_eq!(evasion.attempts(), 2);
    assert_eq!(
        evasion.begging_message(&loaded.page.begging_messages),
        Some(loaded.page.begging_messages[1].as_str())
    );
    assert_eq!(evasion.accept_scale(), 2.0);
    assert!(!evasion.decline_hidden());

    // Acceptance, relayed to the sender.
    let outbox = Outbox::default();
    let relay = NotifyRelay::new(SqlitePageRepository::new(&viewer_conn), Some(&outbox));
    let snapshots = tempfile::tempdir().unwrap();
    let store = DirSnapshotStore::new(snapshots.path(), None);
    let mut png = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
    png.extend_from_slice(b"celebration");
    let steps = AcceptSteps {
        capturer: &PngSnapshot(png),
        store: &store,
        notifier: &relay,
    };
    let flow = loaded.acceptance_flow(SqliteAcceptanceRepository::new(&viewer_conn), Duration::ZERO);
    let mut celebrated_by = None;
    let report = flow
        .accept(&steps, |celebration| {
            celebrated_by = celebration.sender_name.clone();
        })
        .unwrap();
    assert!(flow.accept(&steps, |_| {}).is_none());

    assert_eq!(celebrated_by.as_deref(), Some("Jordan"));
    assert!(report.snapshot_url.unwrap().starts_with("file://"));
    let emails = outbox.emails.lock().unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, "jordan@example.com");
    assert!(emails[0].subject.contains("Alex said YES"));

    // Sender side sees exactly one yes event.
    let count: i64 = sender_conn
        .query_row(
            "SELECT COUNT(*) FROM yes_events WHERE page_id = ?1;",
            [page_id.as_str()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
    assert!(SqliteAcceptanceRepository::new(&sender_conn)
        .get_acceptance(&page_id)
        .unwrap()
        .is_some());
}

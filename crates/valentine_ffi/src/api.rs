//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Flatten core types into plain envelopes the shell can render directly.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported inside the envelope, never thrown.
//! - Creator email addresses never cross back to the shell.

use log::warn;
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Duration;
use valentine_core::db::open_db;
use valentine_core::effects::evasion::{self, Edge, Point, Viewport};
use valentine_core::effects::floating::{generate_floating_items, FloatingVisual};
use valentine_core::model::theme::{decorations, themes};
use valentine_core::relay::notify::{HttpEmailWebhook, NotifyRelay};
use valentine_core::relay::snapshot::{DataUrlSnapshot, NoSnapshot, SnapshotCapturer};
use valentine_core::relay::storage::{DirSnapshotStore, HttpBucketStore, SnapshotStore};
use valentine_core::service::acceptance_service::AcceptSteps;
use valentine_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, lookup_decoration,
    ping as ping_inner, AppConfig, ComposeService, PageDraft, PageView, RelayResult,
    SqliteAcceptanceRepository, SqlitePageRepository, StorageConfig, ViewerService,
};

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();
static ACCEPTS_IN_FLIGHT: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Selectable theme with its color tokens flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeItem {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub gradient: String,
    /// `(name, value)` CSS custom properties, values as HSL triplets.
    pub css_variables: Vec<CssVariable>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssVariable {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationItem {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub symbols: Vec<String>,
}

/// One floating ornament. Exactly one of `glyph` and `image_url` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingDecoration {
    pub glyph: Option<String>,
    pub image_url: Option<String>,
    pub left_percent: f64,
    pub delay_secs: f64,
    pub duration_secs: f64,
    pub size_px: f64,
}

/// Composer input. Blank strings mean "not provided".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePageRequest {
    pub question: String,
    pub begging_messages: Vec<String>,
    pub final_message: String,
    pub social_label: String,
    pub social_link: String,
    pub sender_name: String,
    pub receiver_name: String,
    pub creator_email: String,
    pub theme: String,
    pub decoration_type: String,
    pub custom_decoration_url: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageActionResponse {
    pub ok: bool,
    pub page_id: Option<String>,
    pub share_link: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl PageActionResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            page_id: None,
            share_link: None,
            message: message.into(),
        }
    }
}

/// Viewer envelope. `found=false` renders the not-found view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageViewResponse {
    pub found: bool,
    pub page_id: String,
    pub question: String,
    pub begging_messages: Vec<String>,
    pub final_message: String,
    pub byline: Option<String>,
    pub sender_name: Option<String>,
    pub social_label: Option<String>,
    pub social_link: Option<String>,
    pub theme: Option<ThemeItem>,
    pub decoration_type: String,
    pub main_emoji: String,
    pub custom_decoration_url: Option<String>,
    pub accepted: bool,
    pub snapshot_url: Option<String>,
    pub snapshot_download_name: String,
}

/// Dodge plan in viewport-center-relative pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DodgeResponse {
    pub edge: String,
    pub fake_out_x: f64,
    pub fake_out_y: f64,
    pub target_x: f64,
    pub target_y: f64,
    pub jump_delay_ms: u64,
    pub transition_ms: u64,
}

/// Pressure applied to the recipient after `attempts` refusals.
#[derive(Debug, Clone, PartialEq)]
pub struct EvasionPressure {
    pub accept_scale: f64,
    pub decline_shaking: bool,
    pub decline_hidden: bool,
    pub begging_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptResponse {
    pub ok: bool,
    /// True when an earlier session had already accepted.
    pub already_accepted: bool,
    pub snapshot_url: Option<String>,
    pub notified: bool,
    pub message: String,
}

impl AcceptResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            already_accepted: false,
            snapshot_url: None,
            notified: false,
            message: message.into(),
        }
    }
}

/// Lists selectable themes, default first.
#[flutter_rust_bridge::frb(sync)]
pub fn list_themes() -> Vec<ThemeItem> {
    themes().iter().map(to_theme_item).collect()
}

/// Lists selectable decoration sets, default first.
#[flutter_rust_bridge::frb(sync)]
pub fn list_decorations() -> Vec<DecorationItem> {
    decorations()
        .iter()
        .map(|decoration| DecorationItem {
            id: decoration.id.to_string(),
            name: decoration.name.to_string(),
            emoji: decoration.emoji.to_string(),
            symbols: decoration
                .effective_symbols()
                .iter()
                .map(ToString::to_string)
                .collect(),
        })
        .collect()
}

/// Generates a fresh floating field. The shell memoizes per page view.
#[flutter_rust_bridge::frb(sync)]
pub fn floating_decorations(
    decoration_type: String,
    custom_image_url: Option<String>,
) -> Vec<FloatingDecoration> {
    generate_floating_items(
        lookup_decoration(&decoration_type),
        custom_image_url.as_deref(),
        &mut rand::rng(),
    )
    .into_iter()
    .map(|item| {
        let (glyph, image_url) = match item.visual {
            FloatingVisual::Glyph(glyph) => (Some(glyph.to_string()), None),
            FloatingVisual::Image(url) => (None, Some(url)),
        };
        FloatingDecoration {
            glyph,
            image_url,
            left_percent: item.left_percent,
            delay_secs: item.delay_secs,
            duration_secs: item.duration_secs,
            size_px: item.size_px,
        }
    })
    .collect()
}

/// Persists a composed page and returns its share link.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn create_page(request: CreatePageRequest) -> PageActionResponse {
    let config = app_config();
    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => return PageActionResponse::failure(format!("create_page failed: {err}")),
    };
    let service = ComposeService::new(SqlitePageRepository::new(&conn), config.share.clone());
    let draft = PageDraft {
        question: request.question,
        begging_messages: request.begging_messages,
        final_message: request.final_message,
        social_label: request.social_label,
        social_link: request.social_link,
        sender_name: request.sender_name,
        receiver_name: request.receiver_name,
        creator_email: request.creator_email,
        theme: request.theme,
        decoration_type: request.decoration_type,
        custom_decoration_url: request.custom_decoration_url,
    };

    match service.create_page(&draft) {
        Ok(created) => PageActionResponse {
            ok: true,
            page_id: Some(created.page.id),
            share_link: Some(created.share_link),
            message: "Page created.".to_string(),
        },
        Err(err) => PageActionResponse::failure(format!("create_page failed: {err}")),
    }
}

/// Loads a page for the recipient.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Unknown ids and storage failures both return `found=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn load_page(page_id: String) -> PageViewResponse {
    let config = app_config();
    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            warn!("event=ffi_load_page module=ffi status=error error={err}");
            return PageViewResponse::default();
        }
    };
    let viewer = ViewerService::new(
        SqlitePageRepository::new(&conn),
        SqliteAcceptanceRepository::new(&conn),
    );

    let PageView::Ready(loaded) = viewer.load_page(&page_id) else {
        return PageViewResponse::default();
    };
    let snapshot_url = loaded.stored_snapshot_url().map(ToString::to_string);
    let page = &loaded.page;
    PageViewResponse {
        found: true,
        page_id: page.id.clone(),
        question: page.question.clone(),
        begging_messages: page.begging_messages.clone(),
        final_message: page.final_message.clone(),
        byline: page.byline(),
        sender_name: page.sender_name.clone(),
        social_label: page.social().map(|(label, _)| label.to_string()),
        social_link: page.social().map(|(_, link)| link.to_string()),
        theme: Some(to_theme_item(loaded.theme)),
        decoration_type: loaded.decoration.id.to_string(),
        main_emoji: loaded.decoration.main_emoji().to_string(),
        custom_decoration_url: page.custom_decoration_url.clone(),
        accepted: loaded.acceptance.is_some(),
        snapshot_url,
        snapshot_download_name: page.snapshot_download_name(),
    }
}

/// Plans the next decline-control dodge.
///
/// Stateless: the shell owns the attempt counter and the cooldown timer.
#[flutter_rust_bridge::frb(sync)]
pub fn plan_dodge(
    pointer_x: f64,
    pointer_y: f64,
    viewport_width: f64,
    viewport_height: f64,
    current_x: f64,
    current_y: f64,
) -> DodgeResponse {
    let plan = evasion::plan_dodge(
        Point::new(pointer_x, pointer_y),
        Viewport::new(viewport_width, viewport_height),
        Point::new(current_x, current_y),
        &mut rand::rng(),
    );
    DodgeResponse {
        edge: edge_label(plan.edge).to_string(),
        fake_out_x: plan.fake_out.x,
        fake_out_y: plan.fake_out.y,
        target_x: plan.target.x,
        target_y: plan.target.y,
        jump_delay_ms: plan.jump_delay.as_millis() as u64,
        transition_ms: plan.transition.as_millis() as u64,
    }
}

/// Derived pressure for the given refusal count.
#[flutter_rust_bridge::frb(sync)]
pub fn evasion_pressure(attempts: u32, begging_messages: Vec<String>) -> EvasionPressure {
    EvasionPressure {
        accept_scale: evasion::accept_scale(attempts),
        decline_shaking: attempts > evasion::SHAKE_AFTER,
        decline_hidden: attempts > evasion::HIDE_DECLINE_AFTER,
        begging_message: evasion::begging_message(attempts, &begging_messages)
            .map(ToString::to_string),
    }
}

/// Milliseconds the shell waits after the celebration starts before it
/// captures the snapshot passed to [`accept_page`].
#[flutter_rust_bridge::frb(sync)]
pub fn settle_delay_ms() -> u64 {
    app_config().settle_delay.as_millis() as u64
}

/// Records the recipient's acceptance, uploads the snapshot and notifies the
/// creator.
///
/// # FFI contract
/// - Sync call; performs DB and network I/O.
/// - Idempotent per page: later calls report `already_accepted=true`.
/// - Snapshot, upload and notification failures still return `ok=true`.
#[flutter_rust_bridge::frb(sync)]
pub fn accept_page(page_id: String, snapshot_data_url: Option<String>) -> AcceptResponse {
    let page_id = page_id.trim().to_string();
    let Some(_guard) = InFlightGuard::acquire(&page_id) else {
        return AcceptResponse {
            ok: true,
            already_accepted: true,
            snapshot_url: None,
            notified: false,
            message: "Acceptance already in progress.".to_string(),
        };
    };

    let config = app_config();
    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => return AcceptResponse::failure(format!("accept_page failed: {err}")),
    };
    let viewer = ViewerService::new(
        SqlitePageRepository::new(&conn),
        SqliteAcceptanceRepository::new(&conn),
    );
    let PageView::Ready(loaded) = viewer.load_page(&page_id) else {
        return AcceptResponse::failure("accept_page failed: page not found");
    };

    let store = match build_store(&config.storage) {
        Ok(store) => store,
        Err(err) => return AcceptResponse::failure(format!("accept_page failed: {err}")),
    };
    let webhook = config.webhook_url.as_deref().and_then(|url| {
        HttpEmailWebhook::new(url)
            .map_err(|err| {
                warn!(
                    "event=ffi_accept module=ffi status=degraded error_code={} error={err}",
                    err.code()
                );
            })
            .ok()
    });
    let notifier = NotifyRelay::new(SqlitePageRepository::new(&conn), webhook);
    let capturer: Box<dyn SnapshotCapturer> = match snapshot_data_url {
        Some(data_url) => Box::new(DataUrlSnapshot(data_url)),
        None => Box::new(NoSnapshot),
    };
    let steps = AcceptSteps {
        capturer: capturer.as_ref(),
        store: store.as_ref(),
        notifier: &notifier,
    };

    // The shell already waited before capturing.
    let flow = loaded.acceptance_flow(SqliteAcceptanceRepository::new(&conn), Duration::ZERO);
    match flow.accept(&steps, |_| {}) {
        Some(report) => AcceptResponse {
            ok: true,
            already_accepted: false,
            notified: report.notification.is_some(),
            message: match (&report.record, &report.notification) {
                (Some(_), Some(outcome)) => outcome.message().to_string(),
                (Some(_), None) => "Accepted; notification failed.".to_string(),
                (None, _) => "Accepted; record failed.".to_string(),
            },
            snapshot_url: report.snapshot_url,
        },
        None => AcceptResponse {
            ok: true,
            already_accepted: true,
            snapshot_url: flow.snapshot_url(),
            notified: false,
            message: "Already accepted.".to_string(),
        },
    }
}

fn app_config() -> &'static AppConfig {
    APP_CONFIG.get_or_init(AppConfig::from_env)
}

fn build_store(storage: &StorageConfig) -> RelayResult<Box<dyn SnapshotStore>> {
    Ok(match storage {
        StorageConfig::Http {
            base_url,
            bucket,
            api_key,
        } => Box::new(HttpBucketStore::new(
            base_url.as_str(),
            bucket.as_str(),
            api_key.clone(),
        )?),
        StorageConfig::Dir {
            dir,
            public_base_url,
        } => Box::new(DirSnapshotStore::new(dir.clone(), public_base_url.clone())),
    })
}

fn to_theme_item(theme: &valentine_core::Theme) -> ThemeItem {
    ThemeItem {
        id: theme.id.to_string(),
        name: theme.name.to_string(),
        emoji: theme.emoji.to_string(),
        gradient: theme.gradient.to_string(),
        css_variables: theme
            .css_variables()
            .iter()
            .map(|(name, value)| CssVariable {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
    }
}

fn edge_label(edge: Edge) -> &'static str {
    match edge {
        Edge::Left => "left",
        Edge::Right => "right",
        Edge::Top => "top",
        Edge::Bottom => "bottom",
    }
}

/// Serializes concurrent `accept_page` calls for one page within the process.
struct InFlightGuard {
    page_id: String,
}

impl InFlightGuard {
    fn acquire(page_id: &str) -> Option<Self> {
        let mut in_flight = in_flight()
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(page_id.to_string()) {
            return None;
        }
        Some(Self {
            page_id: page_id.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        in_flight()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.page_id);
    }
}

fn in_flight() -> &'static Mutex<HashSet<String>> {
    ACCEPTS_IN_FLIGHT.get_or_init(|| Mutex::new(HashSet::new()))
}

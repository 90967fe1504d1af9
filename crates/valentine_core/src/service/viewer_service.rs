//! Page viewer use-case.
//!
//! # Responsibility
//! - Load a page and any prior acceptance for the recipient.
//! - Scope theme styling to the lifetime of one view.
//!
//! # Invariants
//! - Unknown, malformed or unreadable pages resolve to `PageView::NotFound`.
//! - A loaded acceptance always yields the accepted view with its stored
//!   snapshot URL.
//! - Theme properties applied through [`ThemeScope`] are removed on drop.

use crate::model::acceptance::AcceptanceRecord;
use crate::model::page::{is_valid_page_id, Page};
use crate::model::theme::{DecorationSet, Theme};
use crate::repo::acceptance_repo::AcceptanceRepository;
use crate::repo::page_repo::PageRepository;
use crate::service::acceptance_service::{AcceptState, AcceptanceFlow};
use log::{info, warn};
use std::collections::BTreeMap;
use std::time::Duration;

/// Presentation context receiving CSS custom properties.
pub trait StyleTarget {
    fn set_property(&mut self, name: &str, value: &str);
    fn remove_property(&mut self, name: &str);
}

impl StyleTarget for BTreeMap<String, String> {
    fn set_property(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }

    fn remove_property(&mut self, name: &str) {
        self.remove(name);
    }
}

/// Theme applied to a style target for as long as the scope lives.
pub struct ThemeScope<'t, T: StyleTarget + ?Sized> {
    target: &'t mut T,
    applied: Vec<&'static str>,
}

impl<'t, T: StyleTarget + ?Sized> ThemeScope<'t, T> {
    pub fn apply(theme: &Theme, target: &'t mut T) -> Self {
        let mut applied = Vec::new();
        for (name, value) in theme.css_variables() {
            target.set_property(name, value);
            applied.push(name);
        }
        Self { target, applied }
    }

    /// Read access to the styled target while the scope is active.
    pub fn target(&self) -> &T {
        &*self.target
    }
}

impl<T: StyleTarget + ?Sized> Drop for ThemeScope<'_, T> {
    fn drop(&mut self) {
        for name in self.applied.drain(..) {
            self.target.remove_property(name);
        }
    }
}

/// A page ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPage {
    pub page: Page,
    pub theme: &'static Theme,
    pub decoration: &'static DecorationSet,
    pub acceptance: Option<AcceptanceRecord>,
}

impl LoadedPage {
    pub fn initial_state(&self) -> AcceptState {
        if self.acceptance.is_some() {
            AcceptState::Accepted
        } else {
            AcceptState::Undecided
        }
    }

    pub fn stored_snapshot_url(&self) -> Option<&str> {
        self.acceptance
            .as_ref()
            .and_then(|record| record.snapshot_url.as_deref())
    }

    pub fn apply_theme<'t, T: StyleTarget + ?Sized>(&self, target: &'t mut T) -> ThemeScope<'t, T> {
        ThemeScope::apply(self.theme, target)
    }

    /// Acceptance flow for this view, already `Accepted` when a record exists.
    pub fn acceptance_flow<A: AcceptanceRepository>(
        &self,
        repo: A,
        settle_delay: Duration,
    ) -> AcceptanceFlow<A> {
        AcceptanceFlow::new(
            &self.page,
            self.theme,
            repo,
            self.acceptance.as_ref(),
            settle_delay,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageView {
    NotFound,
    Ready(Box<LoadedPage>),
}

pub struct ViewerService<P: PageRepository, A: AcceptanceRepository> {
    pages: P,
    acceptances: A,
}

impl<P: PageRepository, A: AcceptanceRepository> ViewerService<P, A> {
    pub fn new(pages: P, acceptances: A) -> Self {
        Self { pages, acceptances }
    }

    /// Loads a page and its acceptance for the recipient.
    pub fn load_page(&self, page_id: &str) -> PageView {
        let page_id = page_id.trim();
        if !is_valid_page_id(page_id) {
            info!("event=page_load module=service status=not_found reason=malformed_id");
            return PageView::NotFound;
        }

        let page = match self.pages.get_page(page_id) {
            Ok(Some(page)) => page,
            Ok(None) => {
                info!("event=page_load module=service status=not_found reason=missing");
                return PageView::NotFound;
            }
            Err(err) => {
                warn!(
                    "event=page_load module=service status=not_found reason=lookup_failed error={err}"
                );
                return PageView::NotFound;
            }
        };

        let acceptance = match self.acceptances.get_acceptance(page_id) {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    "event=page_load module=service status=degraded error_code=acceptance_lookup_failed error={err}"
                );
                None
            }
        };

        info!(
            "event=page_load module=service status=ok accepted={}",
            acceptance.is_some()
        );
        PageView::Ready(Box::new(LoadedPage {
            theme: page.resolved_theme(),
            decoration: page.resolved_decoration(),
            page,
            acceptance,
        }))
    }
}

use crate::api::{ApiErrorKind, ApiResult, RemoteStore, UploadFile, UploadResponse};
use crate::config::SyncTimings;
use crate::debounce::Debouncer;
use crate::document::DocumentStore;
use crate::models::{ContactField, ListItem, ListKey, ProfileDocument, UiMode, UploadKind};
use crate::mutations::{self, ItemField};
use crate::reconcile::{self, PushEvent, Reconciled};
use crate::saved::{SaveStatus, SaveStatusTracker, StatusIndicator};
use crate::util::{Clock, SystemClock};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Which item triggered the latest scheduled save. Only feeds the saved badges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveContext {
    pub list: Option<ListKey>,
    pub index: Option<usize>,
}

impl SaveContext {
    pub fn list(list: ListKey) -> Self {
        Self {
            list: Some(list),
            index: None,
        }
    }

    pub fn item(list: ListKey, index: usize) -> Self {
        Self {
            list: Some(list),
            index: Some(index),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A toast for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// What the engine needs from the rendering side.
pub trait UiSink {
    /// Redraw from the current document (and save/status state).
    fn redraw(&self);

    fn notify(&self, notice: Notice);

    /// A debounced save is now due at `deadline_ms`. The shell arms a timer
    /// that calls [`SyncEngine::flush_due`].
    fn save_scheduled(&self, deadline_ms: i64);

    /// Presentation mode changed locally or from the server.
    fn ui_mode_changed(&self, mode: Option<UiMode>);

    /// The backend rejected the session; send the user to the login page.
    fn redirect_to_login(&self);
}

#[derive(Clone, Debug, PartialEq)]
pub struct UploadOutcome {
    pub response: UploadResponse,
    /// Where the uploaded entry landed after the re-pull, for list kinds.
    pub entry: Option<(ListKey, usize)>,
    /// Image the admin panel previews for a profile-photo upload.
    pub preview_url: Option<String>,
}

struct Inner<S, U, C> {
    store: S,
    ui: U,
    clock: C,
    timings: SyncTimings,
    doc: DocumentStore,
    debounce: RefCell<Debouncer<SaveContext>>,
    saved: RefCell<SaveStatusTracker>,
    status: RefCell<StatusIndicator>,
    manual_save_in_flight: Cell<bool>,
}

/// Optimistic sync of the profile document.
///
/// Local edits apply immediately, redraw, and schedule a debounced push of the
/// whole document. Pulls swap the whole document. Server-sent events are
/// merged locally without going through the push path. Clones share state.
pub struct SyncEngine<S, U, C = SystemClock> {
    inner: Rc<Inner<S, U, C>>,
}

impl<S, U, C> Clone for SyncEngine<S, U, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: RemoteStore, U: UiSink> SyncEngine<S, U, SystemClock> {
    pub fn new(store: S, ui: U) -> Self {
        Self::with_clock(store, ui, SystemClock, SyncTimings::default())
    }
}

impl<S: RemoteStore, U: UiSink, C: Clock> SyncEngine<S, U, C> {
    pub fn with_clock(store: S, ui: U, clock: C, timings: SyncTimings) -> Self {
        Self {
            inner: Rc::new(Inner {
                store,
                ui,
                clock,
                timings,
                doc: DocumentStore::default(),
                debounce: RefCell::new(Debouncer::new()),
                saved: RefCell::new(SaveStatusTracker::new(timings.saved_window_ms)),
                status: RefCell::new(StatusIndicator::default()),
                manual_save_in_flight: Cell::new(false),
            }),
        }
    }

    pub fn document(&self) -> &DocumentStore {
        &self.inner.doc
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub fn ui(&self) -> &U {
        &self.inner.ui
    }

    fn now(&self) -> i64 {
        self.inner.clock.now_ms()
    }

    // ---- local mutations -------------------------------------------------

    pub fn append(&self, list: ListKey, item: impl Into<ListItem>) -> Option<usize> {
        let item = item.into();
        let index = self
            .inner
            .doc
            .update(|d| mutations::append(d.list_mut(list), item))?;
        tracing::debug!(%list, index, "appended item");
        self.after_mutation(SaveContext::item(list, index));
        Some(index)
    }

    /// The add control of a list: media lists get a record carrying the
    /// optional description, other lists a bare string.
    pub fn add_entry(&self, list: ListKey, name: &str, description: &str) -> Option<usize> {
        self.append(list, mutations::new_entry(list, name, description))
    }

    pub fn remove(&self, list: ListKey, index: usize) -> bool {
        let removed = self
            .inner
            .doc
            .update(|d| mutations::remove(d.list_mut(list), index));
        if removed.is_none() {
            return false;
        }
        tracing::debug!(%list, index, "removed item");
        self.after_mutation(SaveContext::list(list));
        true
    }

    pub fn move_up(&self, list: ListKey, index: usize) -> bool {
        let moved = self
            .inner
            .doc
            .update(|d| mutations::move_up(d.list_mut(list), index));
        if moved {
            self.after_mutation(SaveContext::list(list));
        }
        moved
    }

    pub fn move_down(&self, list: ListKey, index: usize) -> bool {
        let moved = self
            .inner
            .doc
            .update(|d| mutations::move_down(d.list_mut(list), index));
        if moved {
            self.after_mutation(SaveContext::list(list));
        }
        moved
    }

    pub fn edit_field(&self, list: ListKey, index: usize, field: ItemField, value: &str) -> bool {
        let edited = self
            .inner
            .doc
            .update(|d| mutations::edit_field(d.list_mut(list), index, field, value));
        if edited {
            self.after_mutation(SaveContext::item(list, index));
        }
        edited
    }

    pub fn set_contact(&self, field: ContactField, value: &str) {
        self.inner
            .doc
            .update(|d| *d.contact_mut(field) = value.to_string());
        self.after_mutation(SaveContext::default());
    }

    /// Redraw first, then schedule; always in that order and synchronously.
    fn after_mutation(&self, context: SaveContext) {
        self.inner.ui.redraw();
        self.schedule_save(context);
    }

    // ---- debounced persistence -------------------------------------------

    pub fn schedule_save(&self, context: SaveContext) {
        let deadline = self.inner.debounce.borrow_mut().schedule(
            context,
            self.now(),
            self.inner.timings.autosave_ms,
        );
        tracing::trace!(deadline, ?context, "save scheduled");
        self.inner.ui.save_scheduled(deadline);
    }

    pub fn save_deadline(&self) -> Option<i64> {
        self.inner.debounce.borrow().deadline()
    }

    /// Fires the debounced push if its quiet interval has elapsed.
    ///
    /// Returns `None` when nothing was due, otherwise whether the push
    /// succeeded. Success marks the last-touched item saved. A timer that
    /// fires before the pending deadline re-announces it so the shell arms
    /// another one.
    pub async fn flush_due(&self) -> Option<bool> {
        let due = self.inner.debounce.borrow_mut().take_due(self.now());
        let Some(context) = due else {
            if let Some(deadline) = self.save_deadline() {
                tracing::debug!(deadline, "timer fired early, re-arming");
                self.inner.ui.save_scheduled(deadline);
            }
            return None;
        };
        tracing::debug!(?context, "debounced save firing");
        let ok = self.push_document(false).await;
        if ok {
            if let SaveContext {
                list: Some(list),
                index: Some(index),
            } = context
            {
                self.inner
                    .saved
                    .borrow_mut()
                    .mark_saved(list, index, self.now());
                self.inner.ui.redraw();
            }
        }
        Some(ok)
    }

    /// Manual "save now". Skips the debouncer and does not cancel a pending
    /// debounced push. Returns `None` if a manual save is already running.
    pub async fn save_now(&self) -> Option<bool> {
        if self.inner.manual_save_in_flight.replace(true) {
            return None;
        }
        self.inner.ui.redraw();
        let ok = self.push_document(true).await;
        self.inner.manual_save_in_flight.set(false);
        self.inner.ui.redraw();
        Some(ok)
    }

    pub fn is_manual_save_in_flight(&self) -> bool {
        self.inner.manual_save_in_flight.get()
    }

    /// Pushes the whole local document and records the outcome on the status
    /// line. A failure leaves the local document exactly as it was.
    async fn push_document(&self, announce: bool) -> bool {
        match self.try_push().await {
            Ok(()) => {
                if announce {
                    self.inner.ui.notify(Notice::success("Details updated"));
                }
                true
            }
            Err(_) => {
                self.inner.ui.notify(Notice::error("Save failed"));
                false
            }
        }
    }

    async fn try_push(&self) -> ApiResult<()> {
        let body = self.inner.doc.snapshot();
        let res = self.inner.store.push(&body).await;
        let (status, visible_ms) = match &res {
            Ok(()) => {
                tracing::info!("profile document saved");
                (SaveStatus::Saved, self.inner.timings.saved_status_ms)
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind, "profile document save failed");
                (SaveStatus::Failed, self.inner.timings.failed_status_ms)
            }
        };
        self.inner
            .status
            .borrow_mut()
            .record(status, self.now(), visible_ms);
        self.inner.ui.redraw();
        res
    }

    // ---- whole-document operations ---------------------------------------

    /// Pulls the server copy and swaps it in.
    pub async fn load(&self) -> ApiResult<()> {
        match self.inner.store.pull().await {
            Ok(doc) => {
                let mode = doc.ui_mode;
                self.replace_document(doc);
                if mode.is_some() {
                    self.inner.ui.ui_mode_changed(mode);
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "profile document load failed");
                self.inner.ui.notify(Notice::error("Load failed"));
                Err(e)
            }
        }
    }

    fn replace_document(&self, doc: ProfileDocument) {
        self.inner.doc.replace(doc);
        tracing::debug!(revision = self.inner.doc.revision(), "document swapped");
        self.inner.ui.redraw();
    }

    /// Restores the backend defaults, then re-pulls.
    pub async fn reset(&self) -> ApiResult<()> {
        if let Err(e) = self.inner.store.reset_remote().await {
            tracing::warn!(error = %e, "reset failed");
            self.inner.ui.notify(Notice::error("Reset failed"));
            return Err(e);
        }
        self.inner.ui.notify(Notice::success("Reset done"));
        self.load().await
    }

    /// Upload, re-pull, patch in the description, push.
    ///
    /// Each step short-circuits on failure. An unauthorized upload redirects
    /// to the login page instead of showing a generic error.
    pub async fn upload(
        &self,
        kind: UploadKind,
        file: UploadFile,
        description: Option<String>,
    ) -> ApiResult<UploadOutcome> {
        tracing::info!(%kind, file = %file.file_name, "uploading");
        let response = match self.inner.store.upload(kind, file).await {
            Ok(r) => r,
            Err(e) => {
                self.report_upload_error(&e.kind);
                tracing::warn!(error = %e, %kind, "upload failed");
                return Err(e);
            }
        };

        // The backend has appended the entry; learn its canonical form.
        self.load().await?;

        let mut outcome = UploadOutcome {
            response,
            entry: None,
            preview_url: None,
        };

        if kind == UploadKind::Profile {
            outcome.preview_url = self
                .inner
                .doc
                .read(|d| d.profile.as_ref().and_then(|p| p.picture_thumb.clone()))
                .or_else(|| outcome.response.thumb.clone())
                .or_else(|| outcome.response.url.clone());
        }

        if let Some(list) = kind.list_key() {
            let found = self
                .inner
                .doc
                .read(|d| find_uploaded(d.list(list), &outcome.response));
            outcome.entry = found.map(|index| (list, index));

            let description = description.filter(|s| !s.trim().is_empty());
            if let (Some(index), Some(desc)) = (found, description) {
                self.inner.doc.update(|d| {
                    mutations::edit_field(d.list_mut(list), index, ItemField::Description, &desc)
                });
                if let Err(e) = self.try_push().await {
                    self.inner.ui.notify(Notice::error("Save failed"));
                    return Err(e);
                }
            }
        }

        self.inner.ui.notify(Notice::success("Uploaded"));
        self.inner.ui.redraw();
        let context = match outcome.entry {
            Some((list, index)) => SaveContext::item(list, index),
            None => SaveContext::default(),
        };
        self.schedule_save(context);
        Ok(outcome)
    }

    fn report_upload_error(&self, kind: &ApiErrorKind) {
        match kind {
            ApiErrorKind::Unauthorized => {
                self.inner
                    .ui
                    .notify(Notice::error("Unauthorized \u{2014} please login"));
                self.inner.ui.redirect_to_login();
            }
            ApiErrorKind::Network => self.inner.ui.notify(Notice::error("Network error")),
            ApiErrorKind::Parse => self.inner.ui.notify(Notice::error("Server error")),
            ApiErrorKind::Http => self.inner.ui.notify(Notice::error("Upload error")),
        }
    }

    /// Applies a presentation mode locally and persists it right away.
    pub async fn set_ui_mode(&self, mode: Option<UiMode>) -> bool {
        self.inner.doc.update(|d| d.ui_mode = mode);
        self.inner.ui.ui_mode_changed(mode);
        self.inner.ui.notify(Notice::success("UI mode applied"));
        self.inner.ui.redraw();
        let ok = self.push_document(true).await;
        if !ok {
            self.inner
                .ui
                .notify(Notice::error("Failed to persist UI mode"));
        }
        ok
    }

    // ---- server-sent events ----------------------------------------------

    /// Merges one server notification. Never schedules a push.
    pub fn apply_push_event(&self, event: PushEvent) -> Reconciled {
        let outcome = self.inner.doc.update(|d| reconcile::apply(d, event));
        match &outcome {
            Reconciled::Appended { list, index } => {
                tracing::info!(%list, index, "appended processed item");
                self.inner.ui.redraw();
            }
            Reconciled::UiModeChanged(mode) => {
                tracing::info!(mode = ?mode, "ui mode changed on server");
                self.inner.ui.ui_mode_changed(*mode);
                self.inner.ui.redraw();
            }
            Reconciled::AlreadyPresent { list } => {
                tracing::debug!(%list, "processed item already present");
            }
            Reconciled::Ignored => {}
        }
        outcome
    }

    /// Raw SSE entry point: event name plus JSON data.
    pub fn handle_stream_message(&self, event: &str, data: &str) -> Option<Reconciled> {
        match PushEvent::parse(event, data) {
            Ok(Some(ev)) => Some(self.apply_push_event(ev)),
            Ok(None) => {
                tracing::debug!(event, "ignoring stream event");
                None
            }
            Err(e) => {
                tracing::warn!(event, error = %e, "malformed stream event");
                None
            }
        }
    }

    // ---- render-time queries ---------------------------------------------

    pub fn is_recently_saved(&self, list: ListKey, index: usize) -> bool {
        self.inner
            .saved
            .borrow()
            .is_recently_saved(list, index, self.now())
    }

    pub fn status(&self) -> Option<SaveStatus> {
        self.inner.status.borrow().current(self.now())
    }
}

/// Locates the entry an upload created, preferring the most recent match.
fn find_uploaded(items: &[ListItem], response: &UploadResponse) -> Option<usize> {
    let url = response.url.as_deref();
    let name = response.name.as_deref();
    items.iter().rposition(|item| match item {
        ListItem::Record(r) => {
            (url.is_some() && r.url.as_deref() == url)
                || url == Some(r.name.as_str())
                || name == Some(r.name.as_str())
        }
        ListItem::Text(s) => url == Some(s.as_str()) || name == Some(s.as_str()),
    })
}

use crate::api::ApiClient;
use crate::config::{EnvConfig, SyncTimings};
use crate::engine::{Notice, SyncEngine, UiSink};
use crate::models::UiMode;
use crate::storage::{load_ui_mode_preview, save_ui_mode_preview};
use crate::util::{now_ms, sleep_ms};
use leptos::prelude::*;
use leptos::task::spawn_local;

pub(crate) type AdminEngine = SyncEngine<ApiClient, LeptosSink>;

/// Bridges engine callbacks onto signals the admin view tracks.
#[derive(Clone, Copy)]
pub(crate) struct LeptosSink {
    /// Bumped on every redraw request; views read the document after tracking it.
    pub revision: RwSignal<u64>,
    pub notice: RwSignal<Option<Notice>>,
    pub ui_mode: RwSignal<Option<UiMode>>,
    /// Latest debounced-save deadline. An effect arms a timer per value.
    pub save_deadline: RwSignal<Option<i64>>,
    /// Bumped when a badge or the status line may have expired.
    pub expiry_tick: RwSignal<u64>,
    login_path: StoredValue<String>,
}

impl LeptosSink {
    fn new(login_path: String) -> Self {
        Self {
            revision: RwSignal::new(0),
            notice: RwSignal::new(None),
            ui_mode: RwSignal::new(load_ui_mode_preview()),
            save_deadline: RwSignal::new(None),
            expiry_tick: RwSignal::new(0),
            login_path: StoredValue::new(login_path),
        }
    }

    /// Subscribes the current reactive scope to every redraw source.
    pub fn track(&self) {
        self.revision.track();
        self.expiry_tick.track();
    }
}

impl UiSink for LeptosSink {
    fn redraw(&self) {
        self.revision.update(|r| *r += 1);
    }

    fn notify(&self, notice: Notice) {
        tracing::debug!(level = ?notice.level, message = %notice.message, "notice");
        self.notice.set(Some(notice));
    }

    fn save_scheduled(&self, deadline_ms: i64) {
        self.save_deadline.set(Some(deadline_ms));
    }

    fn ui_mode_changed(&self, mode: Option<UiMode>) {
        save_ui_mode_preview(mode);
        self.ui_mode.set(mode);
    }

    fn redirect_to_login(&self) {
        self.login_path.with_value(|path| {
            let _ = window().location().set_href(path);
        });
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub config: EnvConfig,
    pub sink: LeptosSink,
    pub engine: StoredValue<AdminEngine, LocalStorage>,

    /// Keeps the event stream open for the app's lifetime.
    #[cfg(target_arch = "wasm32")]
    stream: StoredValue<Option<crate::stream::PushStream>, LocalStorage>,
}

impl AppState {
    pub fn new() -> Self {
        let config = EnvConfig::new();
        let sink = LeptosSink::new(config.login_path.clone());
        let engine = SyncEngine::new(ApiClient::new(config.clone()), sink);

        Self {
            config,
            sink,
            engine: StoredValue::new_local(engine),
            #[cfg(target_arch = "wasm32")]
            stream: StoredValue::new_local(None),
        }
    }

    pub fn engine(&self) -> AdminEngine {
        self.engine.get_value()
    }

    /// Initial pull, autosave timer, event stream.
    pub fn start(&self) {
        let engine = self.engine();
        spawn_local(async move {
            let _ = engine.load().await;
        });

        self.arm_autosave();
        self.arm_expiry();
        self.open_stream();
    }

    /// Each announced deadline arms a one-shot timer. Superseded timers find
    /// nothing due; a timer that fires early gets the deadline re-announced.
    fn arm_autosave(&self) {
        let engine = self.engine;
        let deadline = self.sink.save_deadline;
        Effect::new(move |_| {
            let Some(deadline) = deadline.get() else {
                return;
            };
            let delay = (deadline - now_ms()).max(0) as u32;
            let engine = engine.get_value();
            spawn_local(async move {
                sleep_ms(delay).await;
                engine.flush_due().await;
            });
        });
    }

    /// Saved badges and the status line expire without a redraw of their own.
    fn arm_expiry(&self) {
        let revision = self.sink.revision;
        let tick = self.sink.expiry_tick;
        let timings = SyncTimings::default();
        Effect::new(move |_| {
            revision.track();
            for after in [timings.saved_window_ms, timings.failed_status_ms] {
                spawn_local(async move {
                    sleep_ms(after as u32).await;
                    tick.update(|t| *t += 1);
                });
            }
        });
    }

    #[cfg(target_arch = "wasm32")]
    fn open_stream(&self) {
        let engine = self.engine();
        let url = self.config.url(&self.config.stream_path);
        match crate::stream::PushStream::open(&url, move |event, data| {
            engine.handle_stream_message(event, data);
        }) {
            Ok(stream) => self.stream.set_value(Some(stream)),
            Err(e) => tracing::warn!(error = %e, "could not open event stream"),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn open_stream(&self) {}
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);

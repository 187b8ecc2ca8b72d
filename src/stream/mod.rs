//! Server-sent event subscription. The browser's `EventSource` handles
//! reconnects; this only wires named events to a handler.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Named events the backend emits on the stream.
pub const STREAM_EVENTS: [&str; 3] = ["processed", "ui_mode", "connected"];

pub struct PushStream {
    source: web_sys::EventSource,
    _listeners: Vec<Closure<dyn FnMut(web_sys::MessageEvent)>>,
    _on_error: Closure<dyn FnMut(web_sys::Event)>,
}

impl PushStream {
    /// Opens `url` and calls `on_message(event_name, data)` for every named
    /// event. Closing happens on drop.
    pub fn open(url: &str, on_message: impl Fn(&str, &str) + 'static) -> Result<Self, String> {
        let source = web_sys::EventSource::new(url).map_err(|e| format!("{e:?}"))?;
        let on_message = std::rc::Rc::new(on_message);

        let mut listeners = Vec::with_capacity(STREAM_EVENTS.len());
        for name in STREAM_EVENTS {
            let handler = std::rc::Rc::clone(&on_message);
            let cb = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
                move |ev: web_sys::MessageEvent| {
                    let data = ev.data().as_string().unwrap_or_default();
                    handler(name, &data);
                },
            );
            source
                .add_event_listener_with_callback(name, cb.as_ref().unchecked_ref())
                .map_err(|e| format!("{e:?}"))?;
            listeners.push(cb);
        }

        let on_error = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
            tracing::warn!("event stream error; browser will retry");
        });
        source.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        tracing::info!(url, "event stream opened");
        Ok(Self {
            source,
            _listeners: listeners,
            _on_error: on_error,
        })
    }
}

impl Drop for PushStream {
    fn drop(&mut self) {
        self.source.set_onerror(None);
        self.source.close();
    }
}

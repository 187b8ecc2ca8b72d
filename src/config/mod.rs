use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EnvConfig {
    pub api_url: String,
    pub data_path: String,
    pub upload_path: String,
    pub stream_path: String,
    pub login_path: String,
}

impl EnvConfig {
    /// Reads `window.ENV.API_URL` (or `window.ENV.api_url`), falling back to
    /// the page origin, since the admin panel is served by the same backend.
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::with_api_url(Self::DEFAULT_API_URL);
        };

        if let Some(env) = window.get("ENV") {
            if !env.is_undefined() && env.is_object() {
                for key in ["API_URL", "api_url"] {
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &key.into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self::with_api_url(url_str);
                        }
                    }
                }
            }
        }

        match window.location().origin() {
            Ok(origin) => Self::with_api_url(origin),
            Err(_) => Self::with_api_url(Self::DEFAULT_API_URL),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self::with_api_url(Self::DEFAULT_API_URL)
    }

    pub const DEFAULT_API_URL: &'static str = "http://localhost:5000";

    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            data_path: "/api/data".to_string(),
            upload_path: "/api/upload".to_string(),
            stream_path: "/stream".to_string(),
            login_path: "/admin/login".to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Timing knobs of the sync engine, in milliseconds.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncTimings {
    /// Quiet interval before a debounced push fires.
    pub autosave_ms: i64,
    /// How long an item shows its "Saved" badge.
    pub saved_window_ms: i64,
    /// How long the status line shows "Saved".
    pub saved_status_ms: i64,
    /// How long the status line shows "Save failed".
    pub failed_status_ms: i64,
}

impl Default for SyncTimings {
    fn default() -> Self {
        Self {
            autosave_ms: 800,
            saved_window_ms: 2_400,
            saved_status_ms: 2_400,
            failed_status_ms: 4_200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_paths() {
        let cfg = EnvConfig::with_api_url("http://127.0.0.1:5000/");
        assert_eq!(cfg.api_url, "http://127.0.0.1:5000");
        assert_eq!(cfg.url(&cfg.data_path), "http://127.0.0.1:5000/api/data");
        assert_eq!(cfg.url(&cfg.stream_path), "http://127.0.0.1:5000/stream");
        assert_eq!(cfg.login_path, "/admin/login");
    }

    #[test]
    fn test_native_default_api_url() {
        assert_eq!(EnvConfig::default().api_url, EnvConfig::DEFAULT_API_URL);
    }

    #[test]
    fn test_default_timings() {
        let t = SyncTimings::default();
        assert_eq!(t.autosave_ms, 800);
        assert_eq!(t.saved_window_ms, 2_400);
        assert_eq!(t.failed_status_ms, 4_200);
    }
}

use crate::models::UiMode;

/// Local preview of the presentation mode, stored as `mode-<token>`.
pub(crate) const UI_MODE_KEY: &str = "ui-mode";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_ui_mode_preview() -> Option<UiMode> {
    let raw = local_storage()?.get_item(UI_MODE_KEY).ok().flatten()?;
    UiMode::parse_token(&raw)
}

/// Mirrors the mode into localStorage. `None` clears the preview.
pub(crate) fn save_ui_mode_preview(mode: Option<UiMode>) {
    let Some(storage) = local_storage() else {
        return;
    };
    match mode {
        Some(mode) => {
            let _ = storage.set_item(UI_MODE_KEY, &mode.css_class());
        }
        None => {
            let _ = storage.remove_item(UI_MODE_KEY);
        }
    }
}

/// Drops only the local preview; the server copy is untouched.
pub(crate) fn clear_ui_mode_preview() {
    save_ui_mode_preview(None);
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_ui_mode_preview_roundtrip() {
        clear_ui_mode_preview();
        assert_eq!(load_ui_mode_preview(), None);

        save_ui_mode_preview(Some(UiMode::Glam));
        let raw = local_storage()
            .and_then(|s| s.get_item(UI_MODE_KEY).ok().flatten())
            .expect("preview should be stored");
        assert_eq!(raw, "mode-glam");
        assert_eq!(load_ui_mode_preview(), Some(UiMode::Glam));

        clear_ui_mode_preview();
        assert_eq!(load_ui_mode_preview(), None);
    }
}

//! Theme preference: `localStorage`, the `data-theme` attribute and the
//! toggle button.

use wasm_bindgen::prelude::*;
use web_sys::{Document, MouseEvent, Storage, Window};

use super::events::listen;
use crate::theme::{Theme, ThemeObserver, STORAGE_KEY, THEME_ATTRIBUTE};

const TOGGLE_ID: &str = "themeToggle";

fn storage(window: &Window) -> Option<Storage> {
    window.local_storage().ok().flatten()
}

fn apply(document: &Document, theme: Theme) -> Result<(), JsValue> {
    if let Some(root) = document.document_element() {
        root.set_attribute(THEME_ATTRIBUTE, theme.as_str())?;
    }
    Ok(())
}

/// Reads the stored preference (dark when absent or unreadable) and mirrors
/// it onto `<html>`.
pub fn bootstrap(window: &Window, document: &Document) -> Result<Theme, JsValue> {
    let stored = storage(window).and_then(|s| s.get_item(STORAGE_KEY).ok().flatten());
    let theme = match stored.as_deref().map(str::parse::<Theme>) {
        Some(Ok(theme)) => theme,
        Some(Err(e)) => {
            log::warn!("{e}; falling back to dark");
            Theme::Dark
        }
        None => Theme::Dark,
    };
    apply(document, theme)?;
    Ok(theme)
}

/// Wires `#themeToggle`: flip, persist, then notify `observer`.
pub fn install_toggle(
    window: &Window,
    document: &Document,
    mut observer: Option<Box<dyn ThemeObserver>>,
) -> Result<(), JsValue> {
    let Some(button) = document.get_element_by_id(TOGGLE_ID) else {
        return Ok(());
    };
    let window = window.clone();
    let document = document.clone();
    listen(&button, "click", false, move |_: MouseEvent| {
        let current = Theme::from_attribute(
            document
                .document_element()
                .and_then(|el| el.get_attribute(THEME_ATTRIBUTE))
                .as_deref(),
        );
        let next = current.toggled();
        if let Err(e) = apply(&document, next) {
            log::warn!("could not set {THEME_ATTRIBUTE}: {e:?}");
        }
        if let Some(store) = storage(&window) {
            if let Err(e) = store.set_item(STORAGE_KEY, next.as_str()) {
                log::warn!("could not persist theme: {e:?}");
            }
        }
        if let Some(observer) = observer.as_mut() {
            observer.theme_changed(next);
        }
    })
}

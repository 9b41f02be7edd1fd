//! Dot-and-ring cursor. The dot tracks the pointer exactly, the ring eases
//! toward it every frame.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, MouseEvent};

use super::animation_loop;
use super::events::listen;
use crate::pointer::{PointerState, CURSOR_RING_SMOOTHING};

const HOVER_TARGETS: &str = "a, button, .tilt-card, input, textarea, .filter-btn, .magnetic-btn";
const HOVER_CLASS: &str = "hover";

fn element(document: &Document, id: &str) -> Option<HtmlElement> {
    document.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok()
}

fn place(el: &HtmlElement, x: f32, y: f32) {
    let style = el.style();
    style.set_property("left", &format!("{x}px")).ok();
    style.set_property("top", &format!("{y}px")).ok();
}

/// Skipped silently when either element is missing.
pub fn install(document: &Document) -> Result<(), JsValue> {
    let (Some(dot), Some(ring)) = (element(document, "cursorDot"), element(document, "cursorRing")) else {
        return Ok(());
    };

    // Pixel-space reuse of the pointer smoother.
    let state = Rc::new(RefCell::new(PointerState::default()));

    {
        let state = state.clone();
        let dot = dot.clone();
        listen(document, "mousemove", false, move |e: MouseEvent| {
            let (x, y) = (e.client_x() as f32, e.client_y() as f32);
            state.borrow_mut().set_target(x, y);
            place(&dot, x, y);
        })?;
    }

    {
        let ring = ring.clone();
        animation_loop(move |_| {
            let mut s = state.borrow_mut();
            s.smooth(CURSOR_RING_SMOOTHING);
            place(&ring, s.x, s.y);
        })?;
    }

    let targets = document.query_selector_all(HOVER_TARGETS)?;
    for i in 0..targets.length() {
        let Some(target) = targets.get(i) else { continue };
        for (event, on) in [("mouseenter", true), ("mouseleave", false)] {
            let (dot, ring) = (dot.clone(), ring.clone());
            listen(&target, event, false, move |_: MouseEvent| {
                for el in [&dot, &ring] {
                    let classes = el.class_list();
                    let result = if on { classes.add_1(HOVER_CLASS) } else { classes.remove_1(HOVER_CLASS) };
                    result.ok();
                }
            })?;
        }
    }
    Ok(())
}

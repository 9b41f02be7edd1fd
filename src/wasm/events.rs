//! DOM input wiring. Handlers only record input on the scene; the next
//! animation frame picks it up.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, DeviceOrientationEvent, Document, EventTarget, MouseEvent, TouchEvent, Window,
};

use super::SharedLoop;
use crate::camera::Viewport;

/// Quiet period before a burst of `resize` events is applied.
const RESIZE_DEBOUNCE_MS: i32 = 150;
/// Delay after `orientationchange` so the new layout has settled.
const ORIENTATION_DELAY_MS: i32 = 300;

pub fn viewport(window: &Window) -> Result<Viewport, JsValue> {
    let width = window.inner_width()?.as_f64().ok_or("innerWidth is not a number")?;
    let height = window.inner_height()?.as_f64().ok_or("innerHeight is not a number")?;
    Ok(Viewport::new(width, height, window.device_pixel_ratio()))
}

/// Adds `handler` for `event` on `target`, downcasting the event to `E`.
/// The closure lives for the rest of the page.
pub(crate) fn listen<E, F>(target: &EventTarget, event: &str, passive: bool, mut handler: F) -> Result<(), JsValue>
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::wrap(Box::new(move |e: web_sys::Event| {
        if let Ok(e) = e.dyn_into::<E>() {
            handler(e);
        }
    }) as Box<dyn FnMut(web_sys::Event)>);
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    closure.forget();
    Ok(())
}

pub fn install(window: &Window, document: &Document, shared: &SharedLoop) -> Result<(), JsValue> {
    {
        let shared = shared.clone();
        let window = window.clone();
        listen(document, "mousemove", false, move |e: MouseEvent| {
            if let Ok(vp) = viewport(&window) {
                shared.borrow_mut().scene_mut().pointer_mut().set_target_from_client(
                    e.client_x() as f64,
                    e.client_y() as f64,
                    vp.width,
                    vp.height,
                );
            }
        })?;
    }

    {
        let shared = shared.clone();
        let window = window.clone();
        listen(document, "touchmove", true, move |e: TouchEvent| {
            let (Some(touch), Ok(vp)) = (e.touches().get(0), viewport(&window)) else {
                return;
            };
            shared.borrow_mut().scene_mut().pointer_mut().set_target_from_client(
                touch.client_x() as f64,
                touch.client_y() as f64,
                vp.width,
                vp.height,
            );
        })?;
    }

    let tier = shared.borrow().scene().config().tier;
    let has_sensor = js_sys::Reflect::has(window, &JsValue::from_str("DeviceOrientationEvent")).unwrap_or(false);
    if tier.is_mobile() && has_sensor {
        let shared = shared.clone();
        listen(window, "deviceorientation", true, move |e: DeviceOrientationEvent| {
            shared
                .borrow_mut()
                .scene_mut()
                .pointer_mut()
                .set_target_from_orientation(e.gamma(), e.beta());
        })?;
    }

    // Applies the current window size; shared by resize and orientation.
    let apply_resize: js_sys::Function = {
        let shared = shared.clone();
        let window = window.clone();
        let closure = Closure::wrap(Box::new(move || match viewport(&window) {
            Ok(vp) => {
                log::debug!("viewport {}x{} -> {:?}", vp.width, vp.height, vp.tier());
                shared.borrow_mut().scene_mut().resize(vp);
            }
            Err(e) => log::warn!("resize skipped: {e:?}"),
        }) as Box<dyn FnMut()>);
        let function = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
        closure.forget();
        function
    };

    {
        let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let apply = apply_resize.clone();
        let timer_window = window.clone();
        listen(window, "resize", false, move |_: web_sys::Event| {
            if let Some(handle) = pending.take() {
                timer_window.clear_timeout_with_handle(handle);
            }
            match timer_window.set_timeout_with_callback_and_timeout_and_arguments_0(&apply, RESIZE_DEBOUNCE_MS) {
                Ok(handle) => pending.set(Some(handle)),
                Err(e) => log::warn!("setTimeout failed: {e:?}"),
            }
        })?;
    }

    {
        let timer_window = window.clone();
        listen(window, "orientationchange", false, move |_: web_sys::Event| {
            if let Err(e) =
                timer_window.set_timeout_with_callback_and_timeout_and_arguments_0(&apply_resize, ORIENTATION_DELAY_MS)
            {
                log::warn!("setTimeout failed: {e:?}");
            }
        })?;
    }

    {
        let shared = shared.clone();
        let scroll_window = window.clone();
        listen(window, "scroll", true, move |_: web_sys::Event| {
            if let Ok(y) = scroll_window.scroll_y() {
                shared.borrow_mut().scene_mut().set_scroll(y);
            }
        })?;
    }

    Ok(())
}

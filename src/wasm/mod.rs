use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, Window};

use crate::clock::{ElapsedClock, FrameLoop};
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::scene::SceneContext;
use crate::theme::{Theme, ThemeObserver, THEME_ATTRIBUTE};

mod cursor;
mod events;
mod render;
mod theme;

/// Canvas the page reserves for the background.
pub const CANVAS_ID: &str = "heroCanvas";

type SharedLoop = Rc<RefCell<FrameLoop<ElapsedClock, render::Renderer>>>;

impl From<SceneError> for JsValue {
    fn from(e: SceneError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

impl From<JsValue> for SceneError {
    fn from(v: JsValue) -> Self {
        SceneError::Dom(v.as_string().unwrap_or_else(|| format!("{v:?}")))
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let initial = theme::bootstrap(&window, &document)?;
    cursor::install(&document)?;

    let handle = mount_on(&window, &document, CANVAS_ID, initial)?;
    theme::install_toggle(&window, &document, handle.map(|h| Box::new(h) as Box<dyn ThemeObserver>))?;
    Ok(())
}

/// Mounts a scene on the canvas with id `canvas_id`. Resolves to `undefined`
/// when the canvas or WebGL2 is missing; the page carries on without it.
#[wasm_bindgen]
pub fn mount(canvas_id: &str) -> Result<Option<SceneHandle>, JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let theme = current_theme(&document);
    mount_on(&window, &document, canvas_id, theme)
}

fn mount_on(
    window: &Window,
    document: &Document,
    canvas_id: &str,
    theme: Theme,
) -> Result<Option<SceneHandle>, JsValue> {
    let Some(canvas) = document
        .get_element_by_id(canvas_id)
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
    else {
        log::warn!("{}", SceneError::CanvasMissing { id: canvas_id.to_owned() });
        return Ok(None);
    };

    let viewport = events::viewport(window)?;
    let config = SceneConfig::load(viewport.tier());
    let renderer = match render::Renderer::new(canvas, &config, viewport) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("{e}; background disabled");
            return Ok(None);
        }
    };

    let scene = SceneContext::new(config, viewport, theme, StdRng::from_entropy())?;
    log::info!(
        "scene mounted on #{canvas_id}: {:?}, {} particles, {} solids",
        scene.config().tier,
        scene.particles().len(),
        scene.solids().len()
    );

    let shared: SharedLoop = Rc::new(RefCell::new(FrameLoop::new(scene, ElapsedClock::default(), renderer)));
    events::install(window, document, &shared)?;

    let frame_loop = shared.clone();
    animation_loop(move |now_ms| frame_loop.borrow_mut().tick(now_ms))?;

    Ok(Some(SceneHandle { inner: shared }))
}

fn current_theme(document: &Document) -> Theme {
    let attr = document
        .document_element()
        .and_then(|el| el.get_attribute(THEME_ATTRIBUTE));
    Theme::from_attribute(attr.as_deref())
}

/// Handle given to the page. Its only job is relaying theme switches.
#[wasm_bindgen]
#[derive(Clone)]
pub struct SceneHandle {
    inner: SharedLoop,
}

#[wasm_bindgen]
impl SceneHandle {
    /// Re-reads `data-theme` from `<html>` and recolours the scene.
    #[wasm_bindgen(js_name = updateTheme)]
    pub fn update_theme(&self) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        self.inner.borrow_mut().scene_mut().set_theme(current_theme(&document));
    }
}

impl ThemeObserver for SceneHandle {
    fn theme_changed(&mut self, theme: Theme) {
        self.inner.borrow_mut().scene_mut().set_theme(theme);
    }
}

/// Calls `frame` with the animation-frame timestamp (ms) on every frame for
/// the lifetime of the page.
pub(crate) fn animation_loop(mut frame: impl FnMut(f64) + 'static) -> Result<(), JsValue> {
    // `f` holds the animation-frame closure so that we can keep calling
    // `request_animation_frame` recursively. Storing it inside an `Option`
    // allows us to create the `Closure` first and then obtain a reference to
    // it from within itself.
    let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |now_ms: f64| {
        frame(now_ms);

        // schedule next
        if let (Some(window), Some(cb)) = (web_sys::window(), f.borrow().as_ref()) {
            if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                log::error!("requestAnimationFrame failed: {e:?}");
            }
        }
    }) as Box<dyn FnMut(f64)>));

    let window = web_sys::window().ok_or("no window")?;
    if let Some(cb) = g.borrow().as_ref() {
        window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    }
    Ok(())
}

use folio_core::Viewport;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
const FX_ATTR_PREFIX: &str = "data-fx-";

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn js_err(e: JsValue) -> anyhow::Error {
    anyhow::anyhow!("{:?}", e)
}

/// Match the canvas backing store to its CSS size times the device pixel
/// ratio, optionally clamped to `max_dpr`. Returns the CSS-pixel viewport.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, max_dpr: Option<f64>) -> Viewport {
    let mut dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    if !(dpr.is_finite() && dpr > 0.0) {
        dpr = 1.0;
    }
    if let Some(max) = max_dpr {
        dpr = dpr.clamp(1.0, max);
    }
    let rect = canvas.get_bounding_client_rect();
    let viewport = Viewport::new(rect.width() as f32, rect.height() as f32, dpr as f32);
    let (w_px, h_px) = viewport.backing_size();
    canvas.set_width(w_px.max(1));
    canvas.set_height(h_px.max(1));
    viewport
}

/// `data-fx-*` attributes of `el` with the prefix stripped, in document order.
pub fn fx_attrs(el: &web::Element) -> Vec<(String, String)> {
    el.get_attribute_names()
        .iter()
        .filter_map(|name| name.as_string())
        .filter_map(|name| {
            let key = name.strip_prefix(FX_ATTR_PREFIX)?.to_string();
            let value = el.get_attribute(&name).unwrap_or_default();
            Some((key, value))
        })
        .collect()
}

pub fn query_all(root: &web::Document, selector: &str) -> Vec<web::Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        log::warn!("bad selector {:?}", selector);
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<web::Element>().ok())
        .collect()
}

pub fn query_all_within(root: &web::Element, selector: &str) -> Vec<web::Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<web::Element>().ok())
        .collect()
}

/// A registered DOM listener. Removing it is tied to `Drop`, so whoever
/// owns the guard owns the registration.
pub struct EventListener {
    target: web::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl EventListener {
    pub fn new(
        target: &web::EventTarget,
        kind: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Result<Self, JsValue> {
        Self::register(target, kind, false, handler)
    }

    /// Passive listeners never call `preventDefault`, so the browser can
    /// keep scrolling without waiting on us.
    pub fn passive(
        target: &web::EventTarget,
        kind: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Result<Self, JsValue> {
        Self::register(target, kind, true, handler)
    }

    fn register(
        target: &web::EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        let options = web::AddEventListenerOptions::new();
        options.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

/// Live view of a media query. The flag is updated from the query's
/// `change` event for as long as the watch is alive.
pub struct MediaWatch {
    matches: Rc<Cell<bool>>,
    _listener: Option<EventListener>,
}

impl MediaWatch {
    pub fn new(query: &str, mut on_change: impl FnMut(bool) + 'static) -> Self {
        let matches = Rc::new(Cell::new(false));
        let list = web::window().and_then(|w| w.match_media(query).ok().flatten());
        let Some(list) = list else {
            log::debug!("matchMedia unavailable for {:?}", query);
            return Self {
                matches,
                _listener: None,
            };
        };
        matches.set(list.matches());
        let flag = matches.clone();
        let watched = list.clone();
        let listener = EventListener::new(list.as_ref(), "change", move |_| {
            let now = watched.matches();
            if flag.replace(now) != now {
                on_change(now);
            }
        })
        .map_err(|e| log::warn!("media listener for {:?} failed: {:?}", query, e))
        .ok();
        Self {
            matches,
            _listener: listener,
        }
    }

    pub fn reduced_motion(on_change: impl FnMut(bool) + 'static) -> Self {
        Self::new(REDUCED_MOTION_QUERY, on_change)
    }

    #[inline]
    pub fn matches(&self) -> bool {
        self.matches.get()
    }

    /// Shared flag for per-frame readers.
    pub fn flag(&self) -> Rc<Cell<bool>> {
        self.matches.clone()
    }
}

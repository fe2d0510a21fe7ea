use crate::dom::EventListener;
use anyhow::Context;
use folio_core::{clamp01, document_progress, ProgressMapping, ScrollSample};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use web_sys as web;

pub const PROGRESS_PROPERTY: &str = "--fx-progress";

/// Shared progress value. Writers replace it whole, readers copy it out.
pub type ProgressCell = Rc<Cell<f32>>;

/// Where a consumer reads its progress from each frame.
#[derive(Clone)]
pub enum ProgressSource {
    /// Progress owned by an enclosing tracked section.
    External(ProgressCell),
    /// Whole-document scroll progress, read on demand.
    Document,
}

impl ProgressSource {
    /// Sections hold their consumers at the start under reduced motion.
    pub fn read(&self, reduced_motion: bool) -> f32 {
        match self {
            ProgressSource::External(_) if reduced_motion => 0.0,
            ProgressSource::External(cell) => clamp01(cell.get()),
            ProgressSource::Document => read_document_progress(),
        }
    }
}

pub fn read_document_progress() -> f32 {
    let Some(window) = web::window() else {
        return 0.0;
    };
    let Some(document) = window.document() else {
        return 0.0;
    };
    let Some(root) = document.document_element() else {
        return 0.0;
    };
    let mut scroll_top = root.scroll_top();
    if scroll_top == 0 {
        scroll_top = document.body().map(|b| b.scroll_top()).unwrap_or(0);
    }
    document_progress(
        scroll_top as f32,
        root.scroll_height() as f32,
        viewport_height(&window),
    )
}

fn viewport_height(window: &web::Window) -> f32 {
    window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0) as f32
}

fn sample(window: &web::Window, section: &web::HtmlElement) -> ScrollSample {
    let rect = section.get_bounding_client_rect();
    ScrollSample {
        scroll_y: window.scroll_y().unwrap_or(0.0) as f32,
        viewport_height: viewport_height(window),
        section_top: rect.top() as f32,
        section_height: rect.height() as f32,
    }
}

/// Keeps one section's progress current from scroll and resize events.
pub struct ScrollTracker {
    progress: ProgressCell,
    update: Rc<RefCell<dyn FnMut()>>,
    _scroll: EventListener,
    _resize: EventListener,
}

impl ScrollTracker {
    /// Track `section` with `mapping`. `on_change` runs synchronously with
    /// each new value, including once during mount.
    pub fn mount(
        section: &web::HtmlElement,
        mapping: ProgressMapping,
        mut on_change: impl FnMut(f32) + 'static,
    ) -> anyhow::Result<Self> {
        let window = web::window().context("no window")?;
        let progress: ProgressCell = Rc::new(Cell::new(0.0));

        let update: Rc<RefCell<dyn FnMut()>> = {
            let window = window.clone();
            let section = section.clone();
            let progress = progress.clone();
            Rc::new(RefCell::new(move || {
                let t = mapping.progress(&sample(&window, &section));
                progress.set(t);
                let _ = section
                    .style()
                    .set_property(PROGRESS_PROPERTY, &format!("{:.4}", t));
                on_change(t);
            }))
        };
        (&mut *update.borrow_mut())();

        let on_scroll = update.clone();
        let scroll = EventListener::passive(&window, "scroll", move |_| {
            if let Ok(mut f) = on_scroll.try_borrow_mut() {
                (&mut *f)();
            }
        })
        .map_err(crate::dom::js_err)?;
        let on_resize = update.clone();
        let resize = EventListener::passive(&window, "resize", move |_| {
            if let Ok(mut f) = on_resize.try_borrow_mut() {
                (&mut *f)();
            }
        })
        .map_err(crate::dom::js_err)?;

        log::debug!("[scroll] tracking section ({:?})", mapping);
        Ok(Self {
            progress,
            update,
            _scroll: scroll,
            _resize: resize,
        })
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress.get()
    }

    pub fn cell(&self) -> ProgressCell {
        self.progress.clone()
    }

    /// Recompute now, e.g. after the reduced-motion preference flips.
    pub fn refresh(&self) {
        if let Ok(mut f) = self.update.try_borrow_mut() {
            (&mut *f)();
        }
    }
}

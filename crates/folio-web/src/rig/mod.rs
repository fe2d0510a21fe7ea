//! Scroll-driven 3D object: asset fetch, WebGPU renderer and the frame loop
//! that feeds section progress into [`ObjectRig`].

pub mod asset;
mod helpers;
pub mod render;

use crate::dom::{self, EventListener};
use crate::frame::FrameLoop;
use crate::scroll::ProgressSource;
use folio_core::constants::CAMERA_MAX_DPR;
use folio_core::{FrameClock, ObjectRig, RigConfig};
use render::ModelRenderer;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use web_sys as web;

struct RigEffect {
    _frame: FrameLoop,
    _resize: EventListener,
}

/// Handle for a rig whose asset may still be loading. Dropping it before the
/// load finishes abandons the mount; dropping it afterwards stops rendering.
pub struct RigMount {
    alive: Rc<Cell<bool>>,
    effect: Rc<RefCell<Option<RigEffect>>>,
}

impl RigMount {
    pub fn mount(
        canvas: &web::HtmlCanvasElement,
        config: RigConfig,
        source: ProgressSource,
        reduced_motion: Rc<Cell<bool>>,
    ) -> Self {
        let alive = Rc::new(Cell::new(true));
        let effect = Rc::new(RefCell::new(None));

        let canvas = canvas.clone();
        let task_alive = alive.clone();
        let slot = effect.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let url = config.model_url.clone();
            match build(canvas, config, source, reduced_motion, &task_alive).await {
                Ok(Some(built)) => {
                    *slot.borrow_mut() = Some(built);
                    log::info!("[rig] mounted {}", url);
                }
                Ok(None) => log::debug!("[rig] {} unmounted before it was ready", url),
                // Failures stay local to this canvas; the rest of the page keeps running.
                Err(e) => log::error!("[rig] {} failed: {:#}", url, e),
            }
        });

        Self { alive, effect }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.effect.borrow().is_some()
    }
}

impl Drop for RigMount {
    fn drop(&mut self) {
        self.alive.set(false);
        if self.effect.borrow_mut().take().is_some() {
            log::info!("[rig] unmounted");
        }
    }
}

async fn build(
    canvas: web::HtmlCanvasElement,
    config: RigConfig,
    source: ProgressSource,
    reduced_motion: Rc<Cell<bool>>,
    alive: &Cell<bool>,
) -> anyhow::Result<Option<RigEffect>> {
    let asset = asset::load(&config.model_url).await?;
    if !alive.get() {
        return Ok(None);
    }

    dom::sync_canvas_backing_size(&canvas, Some(CAMERA_MAX_DPR));
    let mut renderer =
        ModelRenderer::new(&canvas, &asset, &config.materials, config.fov_deg).await?;
    if !alive.get() {
        return Ok(None);
    }

    let mut rig = ObjectRig::new(config);
    rig.attach_fit(&asset.bounds);

    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let resize_canvas = canvas.clone();
    let resize = EventListener::new(&window, "resize", move |_| {
        dom::sync_canvas_backing_size(&resize_canvas, Some(CAMERA_MAX_DPR));
    })
    .map_err(dom::js_err)?;

    let mut clock = FrameClock::new();
    let mut warned = false;
    let frame = FrameLoop::start(move |now_ms| {
        let time = clock.tick(now_ms);
        let reduced = reduced_motion.get();
        let frame = rig.update(source.read(reduced), time, reduced);
        renderer.resize_if_needed(canvas.width(), canvas.height());
        if let Err(e) = renderer.render(&frame) {
            if !std::mem::replace(&mut warned, true) {
                log::warn!("[rig] frame skipped: {:?}", e);
            }
        }
    })
    .map_err(dom::js_err)?;

    Ok(Some(RigEffect {
        _frame: frame,
        _resize: resize,
    }))
}

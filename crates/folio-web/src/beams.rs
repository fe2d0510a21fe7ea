use crate::dom::{self, EventListener};
use crate::frame::FrameLoop;
use folio_core::{BeamConfig, BeamField, Viewport};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

struct BeamSurface {
    canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
    field: BeamField,
    viewport: Viewport,
}

impl BeamSurface {
    fn resize(&mut self) {
        self.viewport = dom::sync_canvas_backing_size(&self.canvas, None);
        let dpr = self.viewport.dpr as f64;
        let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    }

    fn draw(&self, time_ms: f64) {
        let ctx = &self.ctx;
        ctx.clear_rect(
            0.0,
            0.0,
            self.viewport.width as f64,
            self.viewport.height as f64,
        );
        let _ = ctx.set_global_composite_operation("lighter");

        let stops = self.field.config().gradient_stops();
        for quad in self.field.quads(&self.viewport, time_ms) {
            let (w, h) = (quad.width as f64, quad.height as f64);
            ctx.save();
            let _ = ctx.translate(quad.x as f64, quad.y as f64);
            let _ = ctx.rotate(quad.rotation as f64);
            let gradient = ctx.create_linear_gradient(0.0, -h, 0.0, h);
            for (offset, color) in &stops {
                let _ = gradient.add_color_stop(*offset, color);
            }
            ctx.set_fill_style_canvas_gradient(&gradient);
            ctx.fill_rect(-w / 2.0, -h, w, h * 2.0);
            ctx.restore();
        }
    }
}

/// Drifting light bars painted on a 2D canvas until dropped.
pub struct BeamsEffect {
    frame: FrameLoop,
    _resize: EventListener,
}

impl BeamsEffect {
    /// `None` when the canvas cannot provide a 2D context; nothing is drawn
    /// and nothing is registered in that case.
    pub fn mount(canvas: &web::HtmlCanvasElement, config: BeamConfig) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<web::CanvasRenderingContext2d>().ok());
        let Some(ctx) = ctx else {
            log::warn!("[beams] no 2d context; skipping");
            return None;
        };
        let window = web::window()?;

        let count = config.beam_count;
        let field = BeamField::new(config, &mut rand::thread_rng());
        let surface = Rc::new(RefCell::new(BeamSurface {
            canvas: canvas.clone(),
            ctx,
            field,
            viewport: Viewport::default(),
        }));
        surface.borrow_mut().resize();

        let on_resize = surface.clone();
        let resize = EventListener::new(&window, "resize", move |_| {
            on_resize.borrow_mut().resize();
        })
        .map_err(|e| log::warn!("[beams] resize listener failed: {:?}", e))
        .ok()?;

        let on_frame = surface.clone();
        let frame = FrameLoop::start(move |time_ms| on_frame.borrow().draw(time_ms))
            .map_err(|e| log::warn!("[beams] frame loop failed: {:?}", e))
            .ok()?;

        log::info!("[beams] mounted {} beams", count);
        Some(Self {
            frame,
            _resize: resize,
        })
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.frame.is_running()
    }
}

impl Drop for BeamsEffect {
    fn drop(&mut self) {
        self.frame.stop();
        log::info!("[beams] unmounted");
    }
}

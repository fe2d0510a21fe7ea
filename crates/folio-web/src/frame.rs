//! requestAnimationFrame loop owned by an effect instance.
//!
//! The loop reschedules itself from inside its own callback. A single
//! `running` token is checked before every reschedule, and `stop` cancels
//! the frame that is already pending, so no callback outlives the owner.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

struct LoopState {
    running: Cell<bool>,
    pending: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl LoopState {
    fn request(&self) -> Result<(), JsValue> {
        let window = web::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return Ok(());
        };
        let handle = window.request_animation_frame(callback.as_ref().unchecked_ref())?;
        self.pending.set(Some(handle));
        Ok(())
    }
}

pub struct FrameLoop {
    state: Rc<LoopState>,
}

impl FrameLoop {
    /// Start calling `frame` once per display refresh with the frame
    /// timestamp in milliseconds.
    pub fn start(mut frame: impl FnMut(f64) + 'static) -> Result<Self, JsValue> {
        let state = Rc::new(LoopState {
            running: Cell::new(true),
            pending: Cell::new(None),
            callback: RefCell::new(None),
        });
        let weak: Weak<LoopState> = Rc::downgrade(&state);
        let tick = Closure::wrap(Box::new(move |timestamp: f64| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.pending.set(None);
            if !state.running.get() {
                return;
            }
            frame(timestamp);
            if state.running.get() {
                if let Err(e) = state.request() {
                    log::error!("requestAnimationFrame failed: {:?}", e);
                    state.running.set(false);
                }
            }
        }) as Box<dyn FnMut(f64)>);
        *state.callback.borrow_mut() = Some(tick);
        state.request()?;
        Ok(Self { state })
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    pub fn stop(&self) {
        if !self.state.running.replace(false) {
            return;
        }
        if let Some(handle) = self.state.pending.take() {
            if let Some(w) = web::window() {
                let _ = w.cancel_animation_frame(handle);
            }
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
        self.state.callback.borrow_mut().take();
    }
}

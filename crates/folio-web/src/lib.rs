#![cfg(target_arch = "wasm32")]
//! Browser entry points. `start` runs when the module loads and mounts
//! every `data-fx` effect on the page; `unmount` and `remount` are exported
//! for hosts that swap page content or change configuration.

pub mod beams;
pub mod dom;
pub mod frame;
mod page;
pub mod reveal;
pub mod rig;
pub mod scroll;

use page::Page;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("folio-web starting");
    mount_page();
    Ok(())
}

/// Tear down every mounted effect: frame loops are cancelled, listeners
/// removed and split text restored.
#[wasm_bindgen]
pub fn unmount() {
    // Dropped outside the borrow so teardown never re-enters the slot.
    let page = PAGE.with(|slot| slot.borrow_mut().take());
    drop(page);
}

/// Unmount, then scan the document again and read fresh configuration.
#[wasm_bindgen]
pub fn remount() {
    unmount();
    mount_page();
}

fn mount_page() {
    let Some(document) = dom::window_document() else {
        log::warn!("no document; nothing mounted");
        return;
    };
    let page = Page::mount(&document);
    let previous = PAGE.with(|slot| slot.borrow_mut().replace(page));
    drop(previous);
}

#![cfg(target_arch = "wasm32")]

use folio_core::{BeamConfig, ProgressMapping, RevealCurve};
use folio_web::beams::BeamsEffect;
use folio_web::dom::{EventListener, MediaWatch};
use folio_web::frame::FrameLoop;
use folio_web::reveal::RevealText;
use folio_web::rig::asset;
use folio_web::scroll::{ProgressSource, ScrollTracker, PROGRESS_PROPERTY};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

async fn sleep_ms(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    wasm_bindgen_futures::JsFuture::from(promise).await.unwrap();
}

fn append<T: JsCast>(tag: &str) -> T {
    let document = web_sys::window().unwrap().document().unwrap();
    let el = document.create_element(tag).unwrap();
    document.body().unwrap().append_child(&el).unwrap();
    el.dyn_into::<T>().unwrap()
}

#[wasm_bindgen_test(async)]
async fn frame_loop_stops_calling_back_after_stop() {
    let count = Rc::new(Cell::new(0u32));
    let counter = count.clone();
    let frames = FrameLoop::start(move |_| counter.set(counter.get() + 1)).unwrap();

    sleep_ms(150).await;
    assert!(count.get() > 0, "no frames ran");
    assert!(frames.is_running());

    frames.stop();
    assert!(!frames.is_running());
    let stopped_at = count.get();
    sleep_ms(150).await;
    assert_eq!(count.get(), stopped_at);
}

#[wasm_bindgen_test(async)]
async fn dropping_a_frame_loop_cancels_the_pending_frame() {
    let count = Rc::new(Cell::new(0u32));
    let counter = count.clone();
    let frames = FrameLoop::start(move |_| counter.set(counter.get() + 1)).unwrap();
    drop(frames);

    sleep_ms(150).await;
    assert_eq!(count.get(), 0);
}

#[wasm_bindgen_test]
fn listener_is_removed_when_dropped() {
    let target: web_sys::HtmlElement = append("div");
    let count = Rc::new(Cell::new(0u32));
    let counter = count.clone();
    let listener =
        EventListener::new(&target, "fx-ping", move |_| counter.set(counter.get() + 1)).unwrap();

    let ping = || {
        let event = web_sys::Event::new("fx-ping").unwrap();
        target.dispatch_event(&event).unwrap();
    };
    ping();
    assert_eq!(count.get(), 1);

    drop(listener);
    ping();
    assert_eq!(count.get(), 1);
    target.remove();
}

#[wasm_bindgen_test(async)]
async fn beams_run_until_dropped() {
    let canvas: web_sys::HtmlCanvasElement = append("canvas");
    let _ = canvas.style().set_property("width", "200px");
    let _ = canvas.style().set_property("height", "100px");

    let beams = BeamsEffect::mount(&canvas, BeamConfig::default()).expect("2d context");
    assert!(beams.is_running());
    assert!(canvas.width() >= 200);
    sleep_ms(50).await;
    drop(beams);
    canvas.remove();
}

#[wasm_bindgen_test]
fn reveal_splits_words_and_restores_text() {
    let el: web_sys::HtmlElement = append("p");
    el.set_text_content(Some("  light   moves\tslowly "));

    let reveal = RevealText::mount(&el, RevealCurve::HEADLINE).unwrap();
    assert_eq!(reveal.word_count(), 3);
    assert_eq!(el.children().length(), 3);
    assert_eq!(el.text_content().unwrap(), "light moves slowly");

    reveal.apply(0.0, true);
    let first = el
        .first_element_child()
        .unwrap()
        .dyn_into::<web_sys::HtmlElement>()
        .unwrap();
    assert_eq!(first.style().get_property_value("opacity").unwrap(), "1");

    drop(reveal);
    assert_eq!(el.text_content().unwrap(), "  light   moves\tslowly ");
    el.remove();
}

#[wasm_bindgen_test]
fn failed_reveal_keeps_the_original_text() {
    // Elements created by an XML document are not HTML elements, so the
    // word spans cannot be built.
    let xml = web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .implementation()
        .unwrap()
        .create_document(None, "root")
        .unwrap();
    let el = xml
        .create_element_ns(Some("http://www.w3.org/1999/xhtml"), "p")
        .unwrap()
        .dyn_into::<web_sys::HtmlElement>()
        .unwrap();
    el.set_text_content(Some("light moves slowly"));

    assert!(RevealText::mount(&el, RevealCurve::HEADLINE).is_err());
    assert_eq!(el.text_content().unwrap(), "light moves slowly");
    assert_eq!(el.children().length(), 0);
}

#[wasm_bindgen_test]
fn tracker_publishes_progress_on_mount() {
    let section: web_sys::HtmlElement = append("section");
    let _ = section.style().set_property("height", "400px");

    let seen = Rc::new(Cell::new(-1.0f32));
    let sink = seen.clone();
    let tracker =
        ScrollTracker::mount(&section, ProgressMapping::ViewportEntry, move |t| sink.set(t))
            .unwrap();

    let t = tracker.progress();
    assert!((0.0..=1.0).contains(&t));
    assert_eq!(seen.get(), t);
    assert!(!section
        .style()
        .get_property_value(PROGRESS_PROPERTY)
        .unwrap()
        .is_empty());

    let source = ProgressSource::External(tracker.cell());
    assert_eq!(source.read(false), t);
    assert_eq!(source.read(true), 0.0);

    drop(tracker);
    section.remove();
}

#[wasm_bindgen_test]
fn reduced_motion_flag_mirrors_the_query() {
    let watch = MediaWatch::reduced_motion(|_| {});
    assert_eq!(watch.flag().get(), watch.matches());
}

fn base64(bytes: &[u8]) -> String {
    let latin1: String = bytes.iter().map(|&b| b as char).collect();
    web_sys::window().unwrap().btoa(&latin1).unwrap()
}

/// A one-triangle glTF with its buffer inlined, served as a `data:` URL.
fn triangle_model_url() -> String {
    let bin: Vec<u8> = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let json = format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "mesh": 0 }}],
  "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }} }}] }}],
  "buffers": [{{ "byteLength": 36, "uri": "data:application/octet-stream;base64,{}" }}],
  "bufferViews": [{{ "buffer": 0, "byteLength": 36 }}],
  "accessors": [{{
    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
    "min": [0, 0, 0], "max": [1, 1, 0]
  }}]
}}"#,
        base64(&bin)
    );
    format!("data:model/gltf+json;base64,{}", base64(json.as_bytes()))
}

#[wasm_bindgen_test(async)]
async fn concurrent_loads_share_one_download() {
    let url = triangle_model_url();
    let before = asset::fetches_started();

    let first = Rc::new(RefCell::new(None));
    let slot = first.clone();
    let first_url = url.clone();
    wasm_bindgen_futures::spawn_local(async move {
        *slot.borrow_mut() = asset::load(&first_url).await.ok();
    });
    let second = asset::load(&url).await.unwrap();
    sleep_ms(50).await;

    assert_eq!(asset::fetches_started() - before, 1);
    assert_eq!(second.primitive_count(), 1);
    let first = first.borrow().clone().expect("first load finished");
    assert!(Rc::ptr_eq(&first, &second));
    assert!(Rc::ptr_eq(&asset::cached(&url).unwrap(), &second));
}

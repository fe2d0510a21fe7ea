use crate::dom::js_err;
use anyhow::Context;
use fnv::FnvHashMap;
use folio_core::{resolve_uri, ExternalResources, ModelAsset, ModelSource};
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

thread_local! {
    // Decoded assets are immutable once cached; every mount shares them.
    static ASSETS: RefCell<FnvHashMap<String, Rc<ModelAsset>>> = RefCell::new(FnvHashMap::default());
    // One promise per URL still in flight. It settles after ASSETS is filled.
    static PENDING: RefCell<FnvHashMap<String, js_sys::Promise>> = RefCell::new(FnvHashMap::default());
    static FETCHES: Cell<u32> = const { Cell::new(0) };
}

pub fn cached(url: &str) -> Option<Rc<ModelAsset>> {
    ASSETS.with(|cache| cache.borrow().get(url).cloned())
}

/// Number of model downloads started so far on this thread.
pub fn fetches_started() -> u32 {
    FETCHES.with(Cell::get)
}

/// Fetch and decode `url`, or reuse the copy decoded (or being decoded) for
/// an earlier mount.
pub async fn load(url: &str) -> anyhow::Result<Rc<ModelAsset>> {
    if let Some(asset) = cached(url) {
        log::debug!("[asset] cache hit {}", url);
        return Ok(asset);
    }

    let in_flight = PENDING.with(|pending| pending.borrow().get(url).cloned());
    let promise = match in_flight {
        Some(promise) => {
            log::debug!("[asset] joining in-flight load of {}", url);
            promise
        }
        None => {
            let promise = start_load(url);
            PENDING.with(|pending| {
                pending
                    .borrow_mut()
                    .insert(url.to_string(), promise.clone())
            });
            promise
        }
    };

    JsFuture::from(promise).await.map_err(|e| {
        anyhow::anyhow!(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
    })?;
    cached(url).with_context(|| format!("{} settled without an asset", url))
}

// The returned promise is polled from the microtask queue, so the caller
// registers it in PENDING before the download begins.
fn start_load(url: &str) -> js_sys::Promise {
    FETCHES.with(|n| n.set(n.get() + 1));
    let url = url.to_string();
    wasm_bindgen_futures::future_to_promise(async move {
        let result = fetch_and_decode(&url).await;
        PENDING.with(|pending| pending.borrow_mut().remove(&url));
        match result {
            Ok(asset) => {
                ASSETS.with(|cache| cache.borrow_mut().insert(url, Rc::new(asset)));
                Ok(JsValue::UNDEFINED)
            }
            // Not cached: a later mount retries the download.
            Err(e) => Err(JsValue::from_str(&format!("{:#}", e))),
        }
    })
}

async fn fetch_and_decode(url: &str) -> anyhow::Result<ModelAsset> {
    let started = Instant::now();
    let bytes = fetch_bytes(url).await?;
    let source = ModelSource::parse(&bytes).with_context(|| format!("parsing {}", url))?;

    let mut resources = ExternalResources::default();
    for uri in source.external_uris() {
        let data = fetch_bytes(&resolve_uri(url, &uri))
            .await
            .with_context(|| format!("resource {:?} of {}", uri, url))?;
        resources.insert(uri, data);
    }
    let total = bytes.len() + resources.values().map(Vec::len).sum::<usize>();

    let asset = source
        .decode(&resources)
        .with_context(|| format!("decoding {}", url))?;
    log::info!(
        "[asset] {} decoded: {} bytes from {} files, {} primitives in {:.1} ms",
        url,
        total,
        resources.len() + 1,
        asset.primitive_count(),
        started.elapsed().as_secs_f64() * 1000.0
    );
    Ok(asset)
}

async fn fetch_bytes(url: &str) -> anyhow::Result<Vec<u8>> {
    let window = web::window().context("no window")?;
    let response: web::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;
    if !response.ok() {
        anyhow::bail!("GET {} returned HTTP {}", url, response.status());
    }
    let buffer = JsFuture::from(response.array_buffer().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

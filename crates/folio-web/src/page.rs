use crate::beams::BeamsEffect;
use crate::dom::{self, MediaWatch};
use crate::reveal::RevealText;
use crate::rig::RigMount;
use crate::scroll::{ProgressCell, ProgressSource, ScrollTracker};
use anyhow::Context;
use folio_core::{AttrConfig, BeamConfig, ProgressMapping, RevealCurve, RigConfig};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

const SECTION_SELECTOR: &str = "[data-fx-section]";
const REVEAL_SELECTOR: &str = "[data-fx-reveal]";
const BEAMS_SELECTOR: &str = "[data-fx=\"beams\"]";
const RIG_SELECTOR: &str = "[data-fx=\"rig\"]";

struct Section {
    element: web::Element,
    tracker: ScrollTracker,
}

/// Every effect mounted from one scan of the document. Dropping the page
/// unmounts all of them.
pub struct Page {
    rigs: Vec<RigMount>,
    beams: Vec<BeamsEffect>,
    sections: Rc<RefCell<Vec<Section>>>,
    _reduced_motion: MediaWatch,
}

impl Page {
    pub fn mount(document: &web::Document) -> Self {
        let sections: Rc<RefCell<Vec<Section>>> = Rc::new(RefCell::new(Vec::new()));

        // Sections re-apply their reveals when the preference flips; the rig
        // reads the shared flag on its next frame.
        let weak_sections = Rc::downgrade(&sections);
        let watch = MediaWatch::reduced_motion(move |reduced| {
            log::info!("[page] reduced motion {}", if reduced { "on" } else { "off" });
            if let Some(sections) = weak_sections.upgrade() {
                if let Ok(sections) = sections.try_borrow() {
                    sections.iter().for_each(|s| s.tracker.refresh());
                }
            }
        });
        let reduced = watch.flag();

        for el in dom::query_all(document, SECTION_SELECTOR) {
            match mount_section(&el, reduced.clone()) {
                Ok(section) => sections.borrow_mut().push(section),
                Err(e) => log::warn!("[scroll] section skipped: {:#}", e),
            }
        }

        let beams: Vec<BeamsEffect> = dom::query_all(document, BEAMS_SELECTOR)
            .into_iter()
            .filter_map(|el| mount_beams(&el))
            .collect();

        let rigs: Vec<RigMount> = dom::query_all(document, RIG_SELECTOR)
            .into_iter()
            .filter_map(|el| mount_rig(&el, &sections.borrow(), reduced.clone()))
            .collect();

        log::info!(
            "[page] mounted {} sections, {} beam fields, {} rigs",
            sections.borrow().len(),
            beams.len(),
            rigs.len()
        );
        Self {
            rigs,
            beams,
            sections,
            _reduced_motion: watch,
        }
    }

    pub fn effect_count(&self) -> usize {
        self.rigs.len() + self.beams.len() + self.sections.borrow().len()
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        log::info!("[page] unmounting {} effects", self.effect_count());
    }
}

fn mount_section(el: &web::Element, reduced: Rc<Cell<bool>>) -> anyhow::Result<Section> {
    let mapping = ProgressMapping::parse(&el.get_attribute("data-fx-section").unwrap_or_default())?;
    let html: web::HtmlElement = el
        .clone()
        .dyn_into()
        .map_err(|_| anyhow::anyhow!("section is not an HTML element"))?;

    let mut reveals = Vec::new();
    for target in dom::query_all_within(el, REVEAL_SELECTOR) {
        let curve = match RevealCurve::parse(&target.get_attribute("data-fx-reveal").unwrap_or_default())
        {
            Ok(curve) => curve,
            Err(e) => {
                log::warn!("[scroll] reveal skipped: {}", e);
                continue;
            }
        };
        let Ok(target) = target.dyn_into::<web::HtmlElement>() else {
            continue;
        };
        reveals.push(RevealText::mount(&target, curve).context("splitting reveal text")?);
    }

    let tracker = ScrollTracker::mount(&html, mapping, move |progress| {
        let reduced = reduced.get();
        for reveal in &reveals {
            reveal.apply(progress, reduced);
        }
    })?;
    Ok(Section {
        element: el.clone(),
        tracker,
    })
}

fn mount_beams(el: &web::Element) -> Option<BeamsEffect> {
    let Some(canvas) = el.dyn_ref::<web::HtmlCanvasElement>() else {
        log::warn!("[beams] data-fx=\"beams\" needs a <canvas>");
        return None;
    };
    let attrs = dom::fx_attrs(el);
    let config = BeamConfig::from_attrs(attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .map_err(|e| log::warn!("[config] beams skipped: {}", e))
        .ok()?;
    BeamsEffect::mount(canvas, config)
}

fn mount_rig(
    el: &web::Element,
    sections: &[Section],
    reduced: Rc<Cell<bool>>,
) -> Option<RigMount> {
    let Some(canvas) = el.dyn_ref::<web::HtmlCanvasElement>() else {
        log::warn!("[rig] data-fx=\"rig\" needs a <canvas>");
        return None;
    };
    let attrs = dom::fx_attrs(el);
    let config = RigConfig::from_attrs(attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .map_err(|e| log::warn!("[config] rig skipped: {}", e))
        .ok()?;
    let source = match enclosing_progress(el, sections) {
        Some(cell) => ProgressSource::External(cell),
        None => ProgressSource::Document,
    };
    Some(RigMount::mount(canvas, config, source, reduced))
}

fn enclosing_progress(el: &web::Element, sections: &[Section]) -> Option<ProgressCell> {
    let section = el.closest(SECTION_SELECTOR).ok().flatten()?;
    sections
        .iter()
        .find(|s| s.element == section)
        .map(|s| s.tracker.cell())
}

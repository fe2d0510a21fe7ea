use crate::dom::js_err;
use anyhow::Context;
use folio_core::{split_words, RevealCurve};
use wasm_bindgen::JsCast;
use web_sys as web;

/// Text element whose words fade and slide in with section progress. The
/// original text is put back when this is dropped.
pub struct RevealText {
    element: web::HtmlElement,
    original: String,
    words: Vec<web::HtmlElement>,
    curve: RevealCurve,
}

impl RevealText {
    pub fn mount(element: &web::HtmlElement, curve: RevealCurve) -> anyhow::Result<Self> {
        let document = element.owner_document().context("detached element")?;
        let original = element.text_content().unwrap_or_default();

        // Build every node before touching the element so a failure leaves
        // the text as it was.
        let mut nodes: Vec<web::Node> = Vec::new();
        let mut words = Vec::new();
        for (i, word) in split_words(&original).into_iter().enumerate() {
            if i > 0 {
                nodes.push(document.create_text_node(" ").into());
            }
            let span = document
                .create_element("span")
                .map_err(js_err)?
                .dyn_into::<web::HtmlElement>()
                .map_err(|_| anyhow::anyhow!("span is not an HtmlElement"))?;
            span.set_text_content(Some(word));
            let style = span.style();
            let _ = style.set_property("display", "inline-block");
            let _ = style.set_property("will-change", "transform, opacity");
            nodes.push(span.clone().into());
            words.push(span);
        }

        element.set_text_content(None);
        if let Err(e) = nodes.iter().try_for_each(|node| element.append_child(node).map(drop)) {
            element.set_text_content(Some(&original));
            return Err(js_err(e));
        }

        Ok(Self {
            element: element.clone(),
            original,
            words,
            curve,
        })
    }

    pub fn apply(&self, progress: f32, reduced_motion: bool) {
        for (i, span) in self.words.iter().enumerate() {
            let word = self.curve.word(progress, i, reduced_motion);
            let style = span.style();
            let _ = style.set_property("opacity", &format!("{:.3}", word.opacity));
            let _ = style.set_property("transform", &word.css_transform());
        }
    }

    #[inline]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

impl Drop for RevealText {
    fn drop(&mut self) {
        self.element.set_text_content(Some(&self.original));
    }
}

//! [`ObserverHost`] over the browser's `IntersectionObserver`,
//! `MutationObserver` and `ResizeObserver`.

use crate::dom::WebNode;
use crate::error::host_error;
use poi_dom::{DomError, DomNode};
use poi_traits::{
    IntersectionCallback, IntersectionEntry, IntersectionObservation, MutationCallback,
    MutationKind, MutationRecord, ObserverHost, ResizeCallback, Teardown,
};
use std::cell::RefCell;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    MutationObserver, MutationObserverInit, ResizeObserver,
};

/// Drops `value` on a later microtask.
///
/// A teardown can run from inside the very callback it releases (a resize
/// re-attaching its own tracker); the closure must outlive that call.
fn release<T: 'static>(value: T) {
    wasm_bindgen_futures::spawn_local(async move {
        drop(value);
    });
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserObservers;

impl BrowserObservers {
    pub fn new() -> Self {
        Self
    }
}

struct NativeIntersection {
    observer: IntersectionObserver,
    callback: RefCell<Option<Closure<dyn FnMut(js_sys::Array)>>>,
}

impl IntersectionObservation<WebNode> for NativeIntersection {
    fn observe(&self, target: &WebNode) -> Result<(), DomError> {
        if self.callback.borrow().is_none() {
            return Err(DomError::Host("intersection observer is disconnected".to_string()));
        }
        if !target.is_connected() {
            return Err(DomError::Detached(target.tag_name()));
        }
        self.observer.observe(target.element());
        Ok(())
    }

    fn disconnect(&self) {
        let callback = self.callback.borrow_mut().take();
        if let Some(callback) = callback {
            self.observer.disconnect();
            release(callback);
        }
    }
}

impl Drop for NativeIntersection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn intersection_batch(entries: js_sys::Array) -> Vec<IntersectionEntry<WebNode>> {
    entries
        .iter()
        .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
        .map(|entry| IntersectionEntry {
            target: WebNode::new(entry.target()),
            ratio: entry.intersection_ratio(),
            bounding_top: entry.bounding_client_rect().top(),
        })
        .collect()
}

fn mutation_record(record: web_sys::MutationRecord) -> Option<MutationRecord<WebNode>> {
    let kind = match record.type_().as_str() {
        "childList" => MutationKind::ChildList,
        "attributes" => MutationKind::Attributes,
        "characterData" => MutationKind::CharacterData,
        _ => return None,
    };
    // Character data records target the text node; report its element.
    let node = record.target()?;
    let target = match node.dyn_ref::<Element>() {
        Some(element) => element.clone(),
        None => node.parent_element()?,
    };
    Some(MutationRecord {
        kind,
        target: WebNode::new(target),
        added_nodes: record.added_nodes().length() as usize,
        removed_nodes: record.removed_nodes().length() as usize,
    })
}

impl ObserverHost<WebNode> for BrowserObservers {
    fn observe_intersections(
        &self,
        root: &WebNode,
        thresholds: &[f64],
        mut callback: IntersectionCallback<WebNode>,
    ) -> Result<Box<dyn IntersectionObservation<WebNode>>, DomError> {
        let closure = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            callback(intersection_batch(entries));
        });

        let options = js_sys::Object::new();
        let threshold: js_sys::Array = thresholds.iter().map(|t| JsValue::from_f64(*t)).collect();
        js_sys::Reflect::set(&options, &"root".into(), root.element()).map_err(host_error)?;
        js_sys::Reflect::set(&options, &"threshold".into(), &threshold).map_err(host_error)?;

        let observer = IntersectionObserver::new_with_options(
            closure.as_ref().unchecked_ref(),
            options.unchecked_ref::<IntersectionObserverInit>(),
        )
        .map_err(host_error)?;

        Ok(Box::new(NativeIntersection {
            observer,
            callback: RefCell::new(Some(closure)),
        }))
    }

    fn observe_mutations(
        &self,
        root: &WebNode,
        mut callback: MutationCallback<WebNode>,
    ) -> Result<Teardown, DomError> {
        let closure = Closure::<dyn FnMut(js_sys::Array)>::new(move |records: js_sys::Array| {
            let batch = records
                .iter()
                .filter_map(|record| record.dyn_into::<web_sys::MutationRecord>().ok())
                .filter_map(mutation_record)
                .collect();
            callback(batch);
        });

        let observer = MutationObserver::new(closure.as_ref().unchecked_ref()).map_err(host_error)?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer
            .observe_with_options(root.element(), &init)
            .map_err(host_error)?;

        Ok(Teardown::new(move || {
            observer.disconnect();
            release(closure);
        }))
    }

    fn observe_resize(&self, target: &WebNode, mut callback: ResizeCallback) -> Result<Teardown, DomError> {
        let closure = Closure::<dyn FnMut()>::new(move || callback());
        let observer = ResizeObserver::new(closure.as_ref().unchecked_ref()).map_err(host_error)?;
        observer.observe(target.element());

        Ok(Teardown::new(move || {
            observer.disconnect();
            release(closure);
        }))
    }
}

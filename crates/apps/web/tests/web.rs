//! Browser tests for the DOM glue
//!
//! Run with `wasm-pack test --headless --firefox crates/apps/web`.

#![cfg(target_arch = "wasm32")]

use arview_web::dom;
use arview_web::ui::{ArUiState, ENTER_AR, ENTER_AR_INFO, STABILIZATION, UNSUPPORTED_INFO};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

fn panel(id: &str) -> HtmlElement {
    let document = dom::document().unwrap();
    if let Some(existing) = document.get_element_by_id(id) {
        return existing.dyn_into().unwrap();
    }
    let element: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    element.set_id(id);
    document.body().unwrap().append_child(&element).unwrap();
    element
}

#[wasm_bindgen_test]
fn test_panels_follow_state() {
    let ids = [ENTER_AR, ENTER_AR_INFO, UNSUPPORTED_INFO, STABILIZATION];
    let panels: Vec<HtmlElement> = ids.iter().map(|id| panel(id)).collect();

    dom::apply_ui(ArUiState::EnterAr).unwrap();
    let hidden: Vec<bool> = panels.iter().map(|p| p.hidden()).collect();
    assert_eq!(hidden, vec![false, false, true, true]);

    dom::apply_ui(ArUiState::InAr { stabilized: false }).unwrap();
    let hidden: Vec<bool> = panels.iter().map(|p| p.hidden()).collect();
    assert_eq!(hidden, vec![true, true, true, false]);

    let body = dom::document().unwrap().body().unwrap();
    assert!(body.class_list().contains("ar"));
    assert!(!body.class_list().contains("stabilized"));

    dom::apply_ui(ArUiState::Unsupported).unwrap();
    let hidden: Vec<bool> = panels.iter().map(|p| p.hidden()).collect();
    assert_eq!(hidden, vec![true, true, false, true]);
    assert!(!body.class_list().contains("ar"));
}

#[wasm_bindgen_test]
fn test_missing_model_param_is_none() {
    // The test runner page carries no query string
    assert_eq!(dom::model_param().unwrap(), None);
}

#[wasm_bindgen_test]
fn test_scoped_listener_stops_after_unlisten() {
    use std::cell::Cell;
    use std::rc::Rc;
    use web_sys::{Event, EventTarget};

    let document = dom::document().unwrap();
    let element = document.create_element("div").unwrap();
    let target: &EventTarget = element.as_ref();

    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let listener = dom::listen_scoped(target, "select", move |_: Event| {
        counter.set(counter.get() + 1);
    })
    .unwrap();

    target.dispatch_event(&Event::new("select").unwrap()).unwrap();
    assert_eq!(calls.get(), 1);

    dom::unlisten(target, "select", &listener).unwrap();
    drop(listener);
    target.dispatch_event(&Event::new("select").unwrap()).unwrap();
    assert_eq!(calls.get(), 1);
}

#[wasm_bindgen_test]
fn test_failed_pointer_capture_converts_to_readable_error() {
    use arview_web::WebError;
    use web_sys::HtmlCanvasElement;

    let canvas: HtmlCanvasElement = dom::document()
        .unwrap()
        .create_element("canvas")
        .unwrap()
        .dyn_into()
        .unwrap();

    // No such pointer is active
    let error = canvas.set_pointer_capture(4242).unwrap_err();
    match WebError::from(error) {
        WebError::Js(message) => assert!(!message.is_empty()),
        other => panic!("expected a JS error, got {:?}", other),
    }
}

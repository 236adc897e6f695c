//! Browser-side tests run under `wasm-pack test --headless`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

use adkit::{RenderMethod, RenderOptions, SdkContext, render_banner};

wasm_bindgen_test_configure!(run_in_browser);

fn attached_container() -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let element: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    document.body().unwrap().append_child(&element).unwrap();
    element
}

fn detached_container() -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    document.create_element("div").unwrap().dyn_into().unwrap()
}

#[wasm_bindgen_test]
async fn invalid_slot_degrades_to_placeholder() {
    let ctx = SdkContext::with_defaults();
    let container = attached_container();

    let result = render_banner(&ctx, "9bad", &container, &RenderOptions::default()).await;

    assert!(result.success);
    assert_eq!(result.method, RenderMethod::Fallback);
    assert!(container.inner_html().contains("Advertisement"));
}

#[wasm_bindgen_test]
async fn detached_container_fails_when_fallback_is_off() {
    let ctx = SdkContext::with_defaults();
    let container = detached_container();

    let options = RenderOptions {
        fallback_enabled: Some(false),
        ..RenderOptions::default()
    };
    let result = render_banner(&ctx, "ad-1", &container, &options).await;

    assert!(!result.success);
    assert!(result.error.is_some());
    assert_eq!(container.inner_html(), "");
}

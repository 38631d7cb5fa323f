#![cfg(target_arch = "wasm32")]

use wasm_bindgen::prelude::*;

use crate::runtime::Task;

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(js_name = queueMicrotask)]
	fn queue_microtask(closure: &JsValue);
}

pub(crate) fn queue(task: Task) {
	queue_microtask(&Closure::once_into_js(move || task()));
}

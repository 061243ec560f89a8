//! Index Flywheel - animated token-ecosystem visualization
//!
//! A rotating ring of satellite assets around an index hub, powered by a
//! driver asset wired to the center with a pulsing beam. A single velocity
//! value (manual, or a bounded random walk in auto mode) drives rotation,
//! beam pulse and the vortex trails pulled from each satellite to the hub.
//!
//! - `core`: platform-agnostic engine, shared by the dashboard and the CLI
//! - `app`: egui dashboard (feature `wasm`, wasm32 only)
//! - `config`: headless simulator flags (feature `cli`)

#[cfg(feature = "cli")]
pub mod config;
pub mod core;
pub mod time;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod app;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod theme;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod web {
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::app::FlywheelApp;

    #[wasm_bindgen(start)]
    pub fn main() {
        console_error_panic_hook::set_once();

        // Initialize tracing for browser console
        tracing_wasm::set_as_global_default();

        let web_options = eframe::WebOptions::default();

        wasm_bindgen_futures::spawn_local(async {
            let canvas = web_sys::window()
                .expect("no window")
                .document()
                .expect("no document")
                .get_element_by_id("canvas")
                .expect("no canvas element")
                .dyn_into::<web_sys::HtmlCanvasElement>()
                .expect("not a canvas element");

            eframe::WebRunner::new()
                .start(
                    canvas,
                    web_options,
                    Box::new(|cc| Ok(Box::new(FlywheelApp::new(cc)))),
                )
                .await
                .expect("Failed to start eframe");
        });
    }
}

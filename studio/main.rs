/// lamina-nn Studio
///
/// A browser-based workbench for sketching, training, and probing a
/// multilayer perceptron. Served by a synchronous tiny_http server; no
/// JavaScript frameworks required.
///
/// Run with:
///   cargo run --bin studio --release
/// Then open http://127.0.0.1:7878
///
/// Tabs:
///   1. Setup — topology, hyperparameters, and a built-in dataset
///   2. Train — background training with a live SSE error chart
///   3. Test  — run inference and inspect weights/activations

mod state;
mod render;
mod routes;
mod handlers;
mod datasets;
mod util;

use std::sync::{Arc, Mutex};

use tiny_http::Server;

use state::StudioState;

fn main() {
    let addr = "127.0.0.1:7878";
    let server = Server::http(addr).expect("Failed to bind HTTP server");

    let shared_state = Arc::new(Mutex::new(StudioState::new()));

    println!("lamina-nn studio listening on http://{}", addr);
    println!("Tabs: Setup > Train > Test");

    // Ensure trained_models/ directory exists.
    let _ = std::fs::create_dir_all("trained_models");

    // Each request is dispatched on its own thread so the SSE handler
    // (which blocks for the entire training duration) does not stall
    // regular page loads and form submissions.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
}

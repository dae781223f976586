use std::io::{Cursor, Read};

use tiny_http::{Request, Response};

use crate::handlers::setup::{html_escape, render_flash_html};
use crate::render::{render_page, Page};
use crate::state::{SharedState, TrainingStatus};
use crate::util::form::parse_form;

// ---------------------------------------------------------------------------
// GET /test
// ---------------------------------------------------------------------------

pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = state.lock().unwrap();
    let flash = st.take_flash();
    let mask = st.tab_unlock_mask();
    let is_running = matches!(st.training, TrainingStatus::Running { .. });
    let summary = model_summary(&st);
    let fields = input_fields(&st);
    drop(st);

    crate::routes::html_response(render_page(Page::Test, mask, is_running, |tmpl| {
        tmpl.replace("{{FLASH_TEST}}", &render_flash_html(flash.as_ref()))
            .replace("{{TEST_MODEL_SUMMARY}}", &summary)
            .replace("{{TEST_INPUT_FIELDS}}", &fields)
            .replace("{{TEST_RESULT}}", "")
            .replace("{{TEST_SNAPSHOT}}", "")
    }))
}

// ---------------------------------------------------------------------------
// POST /test/infer
// ---------------------------------------------------------------------------

pub fn handle_infer(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);
    let form = parse_form(&body);
    let raw = form.get("inputs").map(String::as_str).unwrap_or("");

    let parsed: Result<Vec<f64>, _> = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect();

    let mut st = state.lock().unwrap();
    let mask = st.tab_unlock_mask();
    let is_running = matches!(st.training, TrainingStatus::Running { .. });
    let summary = model_summary(&st);
    let fields = input_fields(&st);

    let (result_html, snapshot_html) = match (&mut st.trained_network, parsed) {
        (Some(network), Ok(inputs)) => match network.compute(&inputs) {
            Ok(outputs) => {
                let result = format!(
                    "<div class=\"metric-card\"><div class=\"val\">{}</div><div class=\"lbl\">Output</div></div>",
                    outputs.iter().map(|o| format!("{:.4}", o)).collect::<Vec<_>>().join(", ")
                );
                (result, snapshot(network))
            }
            Err(e) => (
                format!("<div class=\"flash flash-error\">{}</div>", html_escape(&e.to_string())),
                String::new(),
            ),
        },
        (None, _) => (
            "<div class=\"flash flash-error\">Train a model first.</div>".to_owned(),
            String::new(),
        ),
        (_, Err(_)) => (
            "<div class=\"flash flash-error\">Inputs must be comma-separated numbers.</div>".to_owned(),
            String::new(),
        ),
    };
    drop(st);

    crate::routes::html_response(render_page(Page::Test, mask, is_running, |tmpl| {
        tmpl.replace("{{FLASH_TEST}}", "")
            .replace("{{TEST_MODEL_SUMMARY}}", &summary)
            .replace("{{TEST_INPUT_FIELDS}}", &fields)
            .replace("{{TEST_RESULT}}", &result_html)
            .replace("{{TEST_SNAPSHOT}}", &snapshot_html)
    }))
}

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

fn model_summary(st: &crate::state::StudioState) -> String {
    match (&st.trained_network, &st.plan) {
        (Some(network), Some(plan)) => {
            let topology = network.topology();
            format!(
                r#"<div class="summary-grid">
                  <div class="row"><span class="lbl">Model</span><span class="val">{name}</span></div>
                  <div class="row"><span class="lbl">Layers</span><span class="val">{layers}</span></div>
                  <div class="row"><span class="lbl">Connections</span><span class="val">{count}</span></div>
                </div>"#,
                name = html_escape(&plan.name),
                layers = topology.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" × "),
                count = network.weight_count(),
            )
        }
        _ => "<p class=\"hint\">No trained model in memory. Train one first.</p>".to_owned(),
    }
}

fn input_fields(st: &crate::state::StudioState) -> String {
    let placeholder = st.trained_network.as_ref()
        .map(|network| {
            std::iter::repeat("0.5")
                .take(network.input_size())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_else(|| "0.5".to_owned());
    format!(
        r#"<input type="text" name="inputs" placeholder="{placeholder}" required>"#,
        placeholder = placeholder
    )
}

/// Weight and activation snapshot rendered after an inference run —
/// the diagnostic view of the last forward pass.
fn snapshot(network: &lamina_nn::Perceptron) -> String {
    let weights = network.get_weights();
    let min = weights.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = weights.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let activation_rows: String = network.activations().iter().enumerate()
        .map(|(layer, values)| {
            let cells = values.iter()
                .map(|v| format!("{:.4}", v))
                .collect::<Vec<_>>()
                .join(", ");
            format!("<tr><td>layer {}</td><td>{}</td></tr>", layer, cells)
        })
        .collect();

    format!(
        r#"<h3>Snapshot</h3>
        <div class="metrics-row">
          <div class="metric-card"><div class="val">{count}</div><div class="lbl">Weights</div></div>
          <div class="metric-card"><div class="val">{min:.4}</div><div class="lbl">Min weight</div></div>
          <div class="metric-card"><div class="val">{max:.4}</div><div class="lbl">Max weight</div></div>
        </div>
        <table class="preview"><tr><th>layer</th><th>activations (bias first)</th></tr>{rows}</table>"#,
        count = weights.len(),
        min = min,
        max = max,
        rows = activation_rows,
    )
}

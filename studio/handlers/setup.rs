use std::io::{Cursor, Read};

use tiny_http::{Request, Response};

use crate::datasets;
use crate::render::{render_page, Page};
use crate::state::{FlashKind, FlashMessage, Hyperparams, NetworkPlan, SharedState};
use crate::util::form::parse_form;

// ---------------------------------------------------------------------------
// GET /setup
// ---------------------------------------------------------------------------

pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = state.lock().unwrap();
    let flash = st.take_flash();
    let mask = st.tab_unlock_mask();
    let plan = st.plan.clone();
    let hp = st.hyperparams.clone();
    let dataset_name = st.dataset.as_ref().map(|d| d.source_name.clone());
    let preview = st.dataset.as_ref().map(|d| d.preview_rows.clone());
    drop(st);

    let page = build_setup_page(&plan, &hp, dataset_name.as_deref(), preview.as_deref(), None, flash, mask);
    crate::routes::html_response(page)
}

// ---------------------------------------------------------------------------
// POST /setup/save
// ---------------------------------------------------------------------------

pub fn handle_post(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);
    let form = parse_form(&body);
    let field = |key: &str| form.get(key).map(String::as_str).unwrap_or("").trim().to_owned();

    let name = field("name");
    let layers_s = field("layers");
    let dataset_name = field("dataset");
    let lr_s = field("learning_rate");
    let momentum_s = field("momentum");
    let epochs_s = field("epochs");
    let init_min_s = field("init_min");
    let init_max_s = field("init_max");
    let bounds_on = form.contains_key("bounds_enabled");
    let bound_min_s = field("bound_min");
    let bound_max_s = field("bound_max");

    // Helper: re-render the form with an inline error, keeping state defaults.
    let show_err = |err: &str, state: &SharedState| -> Response<Cursor<Vec<u8>>> {
        let st = state.lock().unwrap();
        let mask = st.tab_unlock_mask();
        let plan = st.plan.clone();
        let hp = st.hyperparams.clone();
        let ds = st.dataset.as_ref().map(|d| d.source_name.clone());
        let preview = st.dataset.as_ref().map(|d| d.preview_rows.clone());
        drop(st);
        crate::routes::html_response(build_setup_page(
            &plan, &hp, ds.as_deref(), preview.as_deref(), Some(err), None, mask,
        ))
    };

    if name.is_empty() {
        return show_err("Model name must not be empty.", &state);
    }

    let layers: Vec<usize> = match parse_layer_list(&layers_s) {
        Some(v) => v,
        None => return show_err(
            "Layers must be a comma-separated list of at least two positive integers, e.g. \"1,4,1\".",
            &state,
        ),
    };

    let learning_rate: f64 = match lr_s.parse::<f64>() {
        Ok(v) if v > 0.0 => v,
        _ => return show_err("Learning rate must be a positive number.", &state),
    };

    let momentum: f64 = match momentum_s.parse::<f64>() {
        Ok(v) if (0.0..1.0).contains(&v) => v,
        _ => return show_err("Momentum must lie in [0, 1).", &state),
    };

    let epochs: usize = match epochs_s.parse() {
        Ok(v) if v > 0 => v,
        _ => return show_err("Epochs must be a positive integer.", &state),
    };

    let init_min: f64 = match init_min_s.parse() {
        Ok(v) => v,
        _ => return show_err("Initialization minimum must be a number.", &state),
    };
    let init_max: f64 = match init_max_s.parse() {
        Ok(v) => v,
        _ => return show_err("Initialization maximum must be a number.", &state),
    };
    if init_min > init_max {
        return show_err("Initialization minimum must not exceed the maximum.", &state);
    }

    let bounds = if bounds_on {
        let min: f64 = match bound_min_s.parse() {
            Ok(v) => v,
            _ => return show_err("Weight bound minimum must be a number.", &state),
        };
        let max: f64 = match bound_max_s.parse() {
            Ok(v) => v,
            _ => return show_err("Weight bound maximum must be a number.", &state),
        };
        if min > max {
            return show_err("Weight bound minimum must not exceed the maximum.", &state);
        }
        Some((min, max))
    } else {
        None
    };

    let dataset = match datasets::builtin(&dataset_name) {
        Some(ds) => ds,
        None => return show_err("Pick one of the built-in datasets.", &state),
    };

    // The plan's outer layers must fit the dataset's sample shape.
    if let Some((in_cols, out_cols)) = datasets::expected_shape(&dataset_name) {
        if layers[0] != in_cols || layers[layers.len() - 1] != out_cols {
            let err = format!(
                "The {} dataset needs {} input(s) and {} output(s); the layer list starts with {} and ends with {}.",
                dataset_name, in_cols, out_cols, layers[0], layers[layers.len() - 1]
            );
            return show_err(&err, &state);
        }
    }

    let hyperparams = Hyperparams { learning_rate, momentum, epochs, init_min, init_max, bounds };

    let mut st = state.lock().unwrap();
    st.plan = Some(NetworkPlan { name, layers });
    st.hyperparams = Some(hyperparams);
    st.dataset = Some(dataset);
    st.flash = Some(FlashMessage::success("Setup saved. The Train tab is unlocked."));
    drop(st);

    crate::routes::redirect("/setup")
}

// ---------------------------------------------------------------------------
// Page assembly
// ---------------------------------------------------------------------------

fn build_setup_page(
    plan: &Option<NetworkPlan>,
    hp: &Option<Hyperparams>,
    dataset_name: Option<&str>,
    preview: Option<&[(Vec<f64>, Vec<f64>)]>,
    inline_error: Option<&str>,
    flash: Option<FlashMessage>,
    mask: u8,
) -> String {
    let hp_or_default = hp.clone().unwrap_or_default();

    let name_value = plan.as_ref().map(|p| p.name.clone()).unwrap_or_default();
    let layers_value = plan.as_ref()
        .map(|p| p.layers.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(","))
        .unwrap_or_else(|| "1,4,1".to_owned());

    let (bound_min, bound_max) = hp_or_default.bounds.unwrap_or((-0.5, 0.5));

    let selected = |candidate: &str| {
        if dataset_name == Some(candidate) { "selected" } else { "" }
    };

    let error_html = inline_error
        .map(|e| format!("<div class=\"flash flash-error\">{}</div>", html_escape(e)))
        .unwrap_or_default();

    let preview_html = preview
        .map(render_preview_table)
        .unwrap_or_else(|| "<p class=\"hint\">Pick a dataset to see a sample preview.</p>".into());

    render_page(Page::Setup, mask, false, |tmpl| {
        tmpl.replace("{{FLASH_SETUP}}", &render_flash_html(flash.as_ref()))
            .replace("{{SETUP_ERROR}}", &error_html)
            .replace("{{SETUP_NAME}}", &html_escape(&name_value))
            .replace("{{SETUP_LAYERS}}", &html_escape(&layers_value))
            .replace("{{SETUP_LR}}", &hp_or_default.learning_rate.to_string())
            .replace("{{SETUP_MOMENTUM}}", &hp_or_default.momentum.to_string())
            .replace("{{SETUP_EPOCHS}}", &hp_or_default.epochs.to_string())
            .replace("{{SETUP_INIT_MIN}}", &hp_or_default.init_min.to_string())
            .replace("{{SETUP_INIT_MAX}}", &hp_or_default.init_max.to_string())
            .replace("{{SETUP_BOUNDS_CHECKED}}", if hp_or_default.bounds.is_some() { "checked" } else { "" })
            .replace("{{SETUP_BOUND_MIN}}", &bound_min.to_string())
            .replace("{{SETUP_BOUND_MAX}}", &bound_max.to_string())
            .replace("{{SETUP_SINE_SELECTED}}", selected("sine"))
            .replace("{{SETUP_COSINE_SELECTED}}", selected("cosine"))
            .replace("{{SETUP_XOR_SELECTED}}", selected("xor"))
            .replace("{{SETUP_PREVIEW}}", &preview_html)
    })
}

fn render_preview_table(rows: &[(Vec<f64>, Vec<f64>)]) -> String {
    let body: String = rows.iter()
        .map(|(input, target)| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                join_floats(input),
                join_floats(target)
            )
        })
        .collect();
    format!(
        "<table class=\"preview\"><tr><th>inputs</th><th>targets</th></tr>{}</table>",
        body
    )
}

fn join_floats(values: &[f64]) -> String {
    values.iter()
        .map(|v| format!("{:.4}", v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parses "1,4,1" into layer sizes; `None` unless there are at least two
/// positive entries.
fn parse_layer_list(s: &str) -> Option<Vec<usize>> {
    let layers: Option<Vec<usize>> = s.split(',')
        .map(|part| part.trim().parse::<usize>().ok().filter(|&v| v > 0))
        .collect();
    layers.filter(|v| v.len() >= 2)
}

// ---------------------------------------------------------------------------
// Shared helpers (used by the other tab handlers too)
// ---------------------------------------------------------------------------

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_flash_html(flash: Option<&FlashMessage>) -> String {
    match flash {
        Some(f) => {
            let class = match f.kind {
                FlashKind::Success => "flash flash-success",
                FlashKind::Error => "flash flash-error",
            };
            format!("<div class=\"{}\">{}</div>", class, html_escape(&f.text))
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_list_parsing() {
        assert_eq!(parse_layer_list("1,4,1"), Some(vec![1, 4, 1]));
        assert_eq!(parse_layer_list(" 2 , 3 , 1 "), Some(vec![2, 3, 1]));
        assert_eq!(parse_layer_list("3"), None);
        assert_eq!(parse_layer_list("1,0,1"), None);
        assert_eq!(parse_layer_list("1,x,1"), None);
        assert_eq!(parse_layer_list(""), None);
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(html_escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}

use std::io::Cursor;
use std::sync::{Arc, Mutex, atomic::{AtomicBool, Ordering}, mpsc};
use std::thread;

use tiny_http::Response;

use lamina_nn::{EpochStats, MomentumSgd, Perceptron, TrainConfig, train_loop};

use crate::handlers::setup::{html_escape, render_flash_html};
use crate::render::{render_page, Page};
use crate::state::{FlashMessage, SharedState, TrainingStatus};

// ---------------------------------------------------------------------------
// GET /train
// ---------------------------------------------------------------------------

pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = state.lock().unwrap();
    let flash = st.take_flash();
    let mask = st.tab_unlock_mask();
    let plan = st.plan.clone();
    let hp = st.hyperparams.clone();
    let ds = st.dataset.as_ref().map(|d| (d.inputs.len(), d.source_name.clone()));
    let history = st.epoch_history.clone();

    let (show_summary, show_live, show_done, show_failed) = match st.training {
        TrainingStatus::Idle => (true, false, false, false),
        TrainingStatus::Running { .. } => (false, true, false, false),
        TrainingStatus::Done { .. } => (false, false, true, false),
        TrainingStatus::Failed { .. } => (false, false, false, true),
    };
    let is_running = matches!(st.training, TrainingStatus::Running { .. });

    let total_epochs = match &st.training {
        TrainingStatus::Running { total_epochs, .. } => *total_epochs,
        _ => hp.as_ref().map(|h| h.epochs).unwrap_or(500),
    };

    let done_badge = match &st.training {
        TrainingStatus::Done { was_stopped: true, .. } => "Stopped",
        TrainingStatus::Done { was_stopped: false, .. } => "Done",
        _ => "",
    };

    let done_stats_html = build_done_stats(&st.training, &history);
    let download_link = build_download_link(&st.training);
    let fail_reason = match &st.training {
        TrainingStatus::Failed { reason } => reason.clone(),
        _ => String::new(),
    };
    let train_error = if plan.is_none() || ds.is_none() {
        "<div class=\"flash flash-error\">Save a setup before training.</div>"
    } else {
        ""
    };
    drop(st);

    let plan_summary = plan.as_ref().map(|p| {
        let hp = hp.clone().unwrap_or_default();
        let bounds = hp.bounds
            .map(|(min, max)| format!("[{}, {}]", min, max))
            .unwrap_or_else(|| "off".to_owned());
        format!(
            r#"<div class="summary-grid">
              <div class="row"><span class="lbl">Model name</span><span class="val">{name}</span></div>
              <div class="row"><span class="lbl">Layers</span><span class="val">{layers}</span></div>
              <div class="row"><span class="lbl">Learning rate</span><span class="val">{lr}</span></div>
              <div class="row"><span class="lbl">Momentum</span><span class="val">{momentum}</span></div>
              <div class="row"><span class="lbl">Weight bounds</span><span class="val">{bounds}</span></div>
            </div>"#,
            name = html_escape(&p.name),
            layers = p.layers.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" × "),
            lr = hp.learning_rate,
            momentum = hp.momentum,
            bounds = bounds,
        )
    }).unwrap_or_else(|| "<p class=\"hint\">No setup saved yet.</p>".into());

    let data_summary = ds.map(|(samples, source)| {
        format!(
            r#"<div class="summary-grid"><div class="row"><span class="lbl">Dataset</span><span class="val">{source}</span></div><div class="row"><span class="lbl">Samples</span><span class="val">{samples}</span></div></div>"#,
            source = html_escape(&source),
            samples = samples,
        )
    }).unwrap_or_else(|| "<p class=\"hint\">No dataset selected yet.</p>".into());

    let hide = |show: bool| if show { "" } else { "hidden" };

    crate::routes::html_response(render_page(Page::Train, mask, is_running, |tmpl| {
        tmpl.replace("{{FLASH_TRAIN}}", &render_flash_html(flash.as_ref()))
            .replace("{{TRAIN_SUMMARY_HIDE}}", hide(show_summary))
            .replace("{{TRAIN_LIVE_HIDE}}", hide(show_live))
            .replace("{{TRAIN_DONE_HIDE}}", hide(show_done))
            .replace("{{TRAIN_FAILED_HIDE}}", hide(show_failed))
            .replace("{{TRAIN_PLAN_SUMMARY}}", &plan_summary)
            .replace("{{TRAIN_DATA_SUMMARY}}", &data_summary)
            .replace("{{TRAIN_TOTAL_EPOCHS}}", &total_epochs.to_string())
            .replace("{{TRAIN_STATUS_BADGE}}", done_badge)
            .replace("{{TRAIN_DONE_STATS}}", &done_stats_html)
            .replace("{{TRAIN_DOWNLOAD_LINK}}", &download_link)
            .replace("{{TRAIN_FAIL_REASON}}", &html_escape(&fail_reason))
            .replace("{{TRAIN_ERROR}}", train_error)
    }))
}

fn build_done_stats(training: &TrainingStatus, history: &[EpochStats]) -> String {
    let final_error = history.last()
        .map(|s| format!("{:.6}", s.train_error))
        .unwrap_or_else(|| "—".into());

    let (elapsed, saved_path) = match training {
        TrainingStatus::Done { elapsed_total_ms, model_path, was_stopped } => {
            let elapsed = if *was_stopped {
                format!("stopped at epoch {}", history.len())
            } else {
                format!("{:.1}s", *elapsed_total_ms as f64 / 1000.0)
            };
            (elapsed, model_path.clone())
        }
        _ => ("—".into(), String::new()),
    };

    let saved_line = if saved_path.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p class="hint">Saved to: <code>{}</code></p>"#,
            html_escape(&saved_path)
        )
    };

    format!(
        r#"<div class="metrics-row">
          <div class="metric-card"><div class="val">{final_error}</div><div class="lbl">Final error</div></div>
          <div class="metric-card"><div class="val">{epochs}</div><div class="lbl">Epochs run</div></div>
          <div class="metric-card"><div class="val">{elapsed}</div><div class="lbl">Total time</div></div>
        </div>
        {saved_line}"#,
        final_error = final_error,
        epochs = history.len(),
        elapsed = elapsed,
        saved_line = saved_line,
    )
}

fn build_download_link(training: &TrainingStatus) -> String {
    match training {
        TrainingStatus::Done { model_path, .. } => {
            let stem = std::path::Path::new(model_path)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("model");
            format!(
                r#"<a href="/models/{stem}/download" class="btn btn-secondary">Download model JSON</a>"#,
                stem = html_escape(stem)
            )
        }
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// POST /train/start
// ---------------------------------------------------------------------------

pub fn handle_start(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = state.lock().unwrap();

    if st.plan.is_none() || st.hyperparams.is_none() || st.dataset.is_none() {
        st.flash = Some(FlashMessage::error("Save a setup before training."));
        drop(st);
        return crate::routes::redirect("/train");
    }

    // If already running, don't start another.
    if matches!(st.training, TrainingStatus::Running { .. }) {
        drop(st);
        return crate::routes::redirect("/train");
    }

    let plan = st.plan.clone().unwrap();
    let hp = st.hyperparams.clone().unwrap();
    let ds = st.dataset.clone().unwrap();

    let (tx, rx) = mpsc::channel::<EpochStats>();
    let stop_flag = Arc::new(AtomicBool::new(false));
    let epoch_rx = Arc::new(Mutex::new(rx));

    st.training = TrainingStatus::Running {
        stop_flag: stop_flag.clone(),
        epoch_rx: epoch_rx.clone(),
        total_epochs: hp.epochs,
    };
    st.epoch_history.clear();
    st.trained_network = None;
    drop(st);

    // Spawn background training thread.
    let state_clone = state.clone();
    thread::spawn(move || {
        let mut network = Perceptron::new(&plan.layers);
        let optimizer = MomentumSgd::new(hp.learning_rate, hp.momentum);

        let setup_result = network
            .randomize_weights(hp.init_min, hp.init_max)
            .and_then(|_| match hp.bounds {
                Some((min, max)) => network.set_weight_bounds(min, max),
                None => Ok(()),
            });

        let outcome = setup_result.and_then(|_| {
            let mut config = TrainConfig::new(hp.epochs);
            config.progress_tx = Some(tx);
            config.stop_flag = Some(stop_flag.clone());

            let t_start = std::time::Instant::now();
            train_loop(
                &mut network,
                &ds.inputs,
                &ds.targets,
                None,
                None,
                &optimizer,
                &config,
            )
            .map(|_| t_start.elapsed().as_millis() as u64)
        });

        let was_stopped = stop_flag.load(Ordering::Relaxed);

        let mut st = state_clone.lock().unwrap();

        // Drain any remaining EpochStats into a local buffer first, then
        // push them — avoids holding a borrow on `st.training` while
        // mutably borrowing `st.epoch_history`.
        let remaining: Vec<EpochStats> = {
            if let TrainingStatus::Running { epoch_rx, .. } = &st.training {
                let rx_guard = epoch_rx.lock().unwrap();
                let mut buf = Vec::new();
                while let Ok(s) = rx_guard.try_recv() {
                    buf.push(s);
                }
                buf
            } else {
                Vec::new()
            }
        };
        for s in remaining {
            st.epoch_history.push(s);
        }

        match outcome {
            Ok(elapsed_total_ms) => {
                let model_path = format!("trained_models/{}.json", plan.name);
                let _ = std::fs::create_dir_all("trained_models");
                if network.save_json(&model_path).is_ok() {
                    st.training = TrainingStatus::Done {
                        model_path,
                        elapsed_total_ms,
                        was_stopped,
                    };
                } else {
                    st.training = TrainingStatus::Failed {
                        reason: format!(
                            "Training finished but could not save the model to '{}'.",
                            model_path
                        ),
                    };
                }
                st.trained_network = Some(network);
            }
            Err(e) => {
                st.training = TrainingStatus::Failed { reason: e.to_string() };
            }
        }
    });

    crate::routes::redirect("/train")
}

// ---------------------------------------------------------------------------
// POST /train/stop
// ---------------------------------------------------------------------------

pub fn handle_stop(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    if let TrainingStatus::Running { stop_flag, .. } = &st.training {
        stop_flag.store(true, Ordering::Relaxed);
    }
    drop(st);
    crate::routes::redirect("/train")
}

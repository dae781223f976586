use std::time::Duration;

use tiny_http::Request;

use crate::state::{SharedState, TrainingStatus};
use crate::util::sse::{format_event, write_frame, SSE_HANDSHAKE, SSE_KEEPALIVE};

/// `GET /train/events` — Server-Sent Events handler.
///
/// Consumes `request` (ownership is needed for `into_writer`) and drives
/// a long-lived loop that:
/// 1. Replays the epoch history collected so far.
/// 2. Waits on the training channel with a 500 ms timeout.
/// 3. On stats — appends to history and writes an `epoch` frame.
/// 4. On timeout — writes a keep-alive comment.
/// 5. On disconnect (training thread finished) — writes a final `done`,
///    `stopped`, or `failed` event, then closes.
///
/// Client reconnection is handled natively by `EventSource`.
pub fn handle(request: Request, state: SharedState) {
    // tiny_http's `into_writer()` exposes the raw TCP stream so the
    // response headers and the SSE frames can be written directly.
    let mut writer = request.into_writer();

    if !write_frame(&mut writer, SSE_HANDSHAKE) {
        return;
    }

    // Clone the receiver Arc out of state so the lock is not held
    // while streaming.
    let epoch_rx = {
        let st = state.lock().unwrap();
        match &st.training {
            TrainingStatus::Running { epoch_rx, .. } => Some(epoch_rx.clone()),
            _ => None,
        }
    };

    let rx_arc = match epoch_rx {
        Some(rx) => rx,
        None => {
            // Training is not running; report the terminal state and close.
            let _ = write_frame(&mut writer, &final_event(&state));
            return;
        }
    };

    // Replay history collected before this client connected.
    {
        let st = state.lock().unwrap();
        for stats in &st.epoch_history {
            if let Ok(json) = serde_json::to_string(stats) {
                if !write_frame(&mut writer, &format_event("epoch", &json)) {
                    return;
                }
            }
        }
    }

    // Main receive loop.
    loop {
        let result = {
            let rx = rx_arc.lock().unwrap();
            rx.recv_timeout(Duration::from_millis(500))
        };

        match result {
            Ok(stats) => {
                {
                    let mut st = state.lock().unwrap();
                    st.epoch_history.push(stats.clone());
                }
                if let Ok(json) = serde_json::to_string(&stats) {
                    if !write_frame(&mut writer, &format_event("epoch", &json)) {
                        return;
                    }
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                if !write_frame(&mut writer, SSE_KEEPALIVE) {
                    return;
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                // Training thread closed the sender — report the outcome.
                let _ = write_frame(&mut writer, &final_event(&state));
                return;
            }
        }
    }
}

/// Builds the terminal SSE frame from the current training status.
fn final_event(state: &SharedState) -> String {
    let st = state.lock().unwrap();
    match &st.training {
        TrainingStatus::Done { model_path, elapsed_total_ms, was_stopped } => {
            let payload = format!(
                "{{\"model_path\":\"{}\",\"elapsed_total_ms\":{},\"epochs_completed\":{}}}",
                model_path,
                elapsed_total_ms,
                st.epoch_history.len()
            );
            let name = if *was_stopped { "stopped" } else { "done" };
            format_event(name, &payload)
        }
        TrainingStatus::Failed { reason } => {
            let payload = serde_json::json!({ "reason": reason }).to_string();
            format_event("failed", &payload)
        }
        _ => format_event("done", "{}"),
    }
}

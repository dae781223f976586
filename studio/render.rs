/// Central template renderer for the lamina-nn studio.
///
/// The studio uses a single HTML template (`studio/assets/studio.html`)
/// with placeholder tokens like `{{TOKEN}}`. This module loads the
/// template at compile time and exposes a single `render_page` function
/// that accepts a closure to do tab-specific placeholder substitution.
///
/// Global placeholders (tab unlock mask, active tab, training flag) are
/// resolved here before calling the closure; tab-specific placeholders
/// the closure did not replace are blanked so no raw `{{TOKEN}}` ever
/// reaches the browser.

const TEMPLATE: &str = include_str!("assets/studio.html");

/// Which tab is active — controls the active CSS class and the JS
/// `ACTIVE_TAB` variable injected into the page.
#[derive(Clone, Copy)]
pub enum Page {
    Setup = 0,
    Train = 1,
    Test = 2,
}

/// Renders the full studio page.
///
/// # Arguments
/// - `page`             — active tab index
/// - `tab_unlock`       — bitmask; see `StudioState::tab_unlock_mask()`
/// - `training_running` — whether a training job is currently active
/// - `fill`             — closure that fills tab-specific placeholders
pub fn render_page<F>(page: Page, tab_unlock: u8, training_running: bool, fill: F) -> String
where
    F: FnOnce(String) -> String,
{
    let html = TEMPLATE
        .replace("{{TAB_UNLOCK}}", &tab_unlock.to_string())
        .replace("{{ACTIVE_TAB}}", &(page as u8).to_string())
        .replace("{{TRAINING_RUNNING}}", if training_running { "true" } else { "false" });

    blank_remaining(fill(html))
}

/// Strips any `{{TOKEN}}` the caller did not substitute. A missed token
/// should produce a clean page rather than leak template internals.
fn blank_remaining(html: String) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html.as_str();
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        match rest[start..].find("}}") {
            Some(end) => rest = &rest[start + end + 2..],
            None => {
                rest = &rest[start..];
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

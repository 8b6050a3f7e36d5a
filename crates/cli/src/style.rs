//! Shared styling utilities for the CLI.

use console::Style;

use gitid_core::{ActiveIdentity, Identity};

/// Create a success-styled string (green with checkmark).
pub fn success(msg: &str) -> String {
    let style = Style::new().green();
    format!("{} {}", style.apply_to("✓"), msg)
}

/// Create a warning-styled string (yellow).
pub fn warn(msg: &str) -> String {
    let style = Style::new().yellow();
    format!("{} {}", style.apply_to("⚠"), msg)
}

/// Create a header-styled string (bold, cyan).
pub fn header(msg: &str) -> String {
    let style = Style::new().cyan().bold();
    style.apply_to(msg).to_string()
}

/// Create a dim-styled string.
pub fn dim(msg: &str) -> String {
    let style = Style::new().dim();
    style.apply_to(msg).to_string()
}

/// Green `[local]` marker for the repository identity.
pub fn local_marker() -> String {
    Style::new().green().apply_to("[local]").to_string()
}

/// Cyan `[global]` marker for the machine-wide identity.
pub fn global_marker() -> String {
    Style::new().cyan().apply_to("[global]").to_string()
}

/// Identity line with markers for whichever scopes it is active at.
pub fn identity_line(
    identity: &Identity,
    global: Option<&ActiveIdentity>,
    local: Option<&ActiveIdentity>,
) -> String {
    let this = ActiveIdentity::from(identity);
    let is = |active: Option<&ActiveIdentity>| active == Some(&this);
    let mut line = identity.to_string();
    if is(global) {
        line.push(' ');
        line.push_str(&global_marker());
    }
    if is(local) {
        line.push(' ');
        line.push_str(&local_marker());
    }
    line
}

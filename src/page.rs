//! Embedded slider page
//!
//! The firmware serves this page to browsers; rendering it here keeps the
//! page in step with the configured controls and WebSocket port.

use crate::control::{Control, HRCC_MAX};

const TEMPLATE: &str = include_str!("../static/index.html");

/// Render the page for `controls`, connecting to the page host on `ws_port`
pub fn render(controls: &[Control], ws_port: u16) -> String {
    let sliders = controls
        .iter()
        .map(render_control)
        .collect::<Vec<_>>()
        .join("\n");

    TEMPLATE
        .replace("{{CONTROLS}}", &sliders)
        .replace("{{WS_PORT}}", &ws_port.to_string())
}

fn render_control(control: &Control) -> String {
    let id = escape_html(control.name());
    format!(
        "  <input type=\"range\" min=\"0\" max=\"{max}\" value=\"{value}\" class=\"slider\" id=\"{id}\">\n  \
         <p>{label}: <span id=\"{id}_value\"></span></p>",
        max = HRCC_MAX,
        value = control.value(),
        id = id,
        label = escape_html(control.label()),
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_default_page() {
        let bank = AppConfig::default().control_bank().unwrap();
        let controls: Vec<Control> = bank.iter().cloned().collect();
        let html = render(&controls, 81);

        assert!(html.contains(
            r#"<input type="range" min="0" max="16383" value="8192" class="slider" id="modulation">"#
        ));
        assert!(html.contains(
            r#"<input type="range" min="0" max="16383" value="8192" class="slider" id="volume">"#
        ));
        assert!(html.contains(r#"<p>Modulation: <span id="modulation_value"></span></p>"#));
        assert!(html.contains(r#"<p>Volume: <span id="volume_value"></span></p>"#));
        assert!(html.contains("const WS_PORT = 81;"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_names_are_escaped() {
        let control = Control::new(
            "x\"y",
            "<b>Bold</b>",
            crate::control::HrccValue::MIN,
        )
        .unwrap();
        let html = render(&[control], 8081);

        assert!(html.contains(r#"id="x&quot;y""#));
        assert!(html.contains("&lt;b&gt;Bold&lt;/b&gt;"));
        assert!(html.contains("const WS_PORT = 8081;"));
    }
}

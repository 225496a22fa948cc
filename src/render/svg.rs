use std::fmt::Write as _;

use crate::{
    component::frame::PatternFrame,
    foundation::error::{GridError, GridResult},
};

/// Render a frame as a standalone SVG document.
///
/// Layout: a `<pattern>` with the grid-line path, a full-size rectangle filled with it,
/// and a nested `<svg>` shifted by the pattern offset holding one rectangle per square.
/// Passthrough attributes override generated root attributes of the same name.
#[tracing::instrument(skip(frame), fields(squares = frame.squares.len()))]
pub fn render_svg(frame: &PatternFrame) -> GridResult<String> {
    let mut out = String::with_capacity(1024 + frame.squares.len() * 160);
    write_svg(&mut out, frame).map_err(|_| GridError::render("svg text formatting failed"))?;
    Ok(out)
}

fn root_attributes(frame: &PatternFrame) -> Vec<(String, String)> {
    let o = &frame.options;
    let w = frame.bounds.width;
    let h = frame.bounds.height;
    let mut attrs: Vec<(String, String)> = vec![
        ("xmlns".into(), "http://www.w3.org/2000/svg".into()),
        ("width".into(), w.to_string()),
        ("height".into(), h.to_string()),
        ("viewBox".into(), format!("0 0 {w} {h}")),
        ("aria-hidden".into(), "true".into()),
        ("class".into(), o.class_list()),
        ("fill".into(), o.fill.color.clone()),
        ("fill-opacity".into(), o.fill.opacity.to_string()),
        ("stroke".into(), o.line.color.clone()),
        ("stroke-opacity".into(), o.line.opacity.to_string()),
        ("color".into(), o.foreground.clone()),
    ];

    for (name, value) in &o.attributes {
        match attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.clone(),
            None => attrs.push((name.clone(), value.clone())),
        }
    }
    attrs
}

fn dasharray(values: &[f64]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let parts: Vec<String> = values.iter().map(f64::to_string).collect();
    Some(parts.join(" "))
}

fn write_svg(out: &mut String, frame: &PatternFrame) -> std::fmt::Result {
    let o = &frame.options;
    let id = escape_attr(&frame.pattern_id);

    out.push_str("<svg");
    for (name, value) in root_attributes(frame) {
        write!(out, " {name}=\"{}\"", escape_attr(&value))?;
    }
    out.push_str(">\n");

    out.push_str("  <defs>\n");
    writeln!(
        out,
        "    <pattern id=\"{id}\" width=\"{}\" height=\"{}\" patternUnits=\"userSpaceOnUse\" x=\"{}\" y=\"{}\">",
        o.width, o.height, o.x, o.y
    )?;
    write!(
        out,
        "      <path d=\"M.5 {}V.5H{}\" fill=\"none\"",
        o.height, o.width
    )?;
    if let Some(dash) = dasharray(&o.stroke_dasharray) {
        write!(out, " stroke-dasharray=\"{dash}\"")?;
    }
    out.push_str("/>\n");
    out.push_str("    </pattern>\n");
    out.push_str("  </defs>\n");

    writeln!(
        out,
        "  <rect width=\"100%\" height=\"100%\" stroke-width=\"0\" fill=\"url(#{id})\"/>"
    )?;

    writeln!(out, "  <svg x=\"{}\" y=\"{}\" overflow=\"visible\">", o.x, o.y)?;
    for sq in &frame.squares {
        writeln!(
            out,
            "    <rect data-key=\"{}\" width=\"{}\" height=\"{}\" x=\"{}\" y=\"{}\" fill=\"currentColor\" fill-opacity=\"1\" stroke-width=\"0\" opacity=\"{}\"/>",
            escape_attr(&sq.key),
            sq.rect.width(),
            sq.rect.height(),
            sq.rect.x0,
            sq.rect.y0,
            round_opacity(sq.opacity),
        )?;
    }
    out.push_str("  </svg>\n");
    out.push_str("</svg>\n");
    Ok(())
}

// Four decimal places, clamped to [0, 1].
fn round_opacity(v: f64) -> f64 {
    (v.clamp(0.0, 1.0) * 10_000.0).round() / 10_000.0
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;

use std::{borrow::Cow, fmt::Write as _, sync::Arc};

use crate::foundation::{
    color::Rgb8,
    core::{BezPath, FillRule},
    error::{TraitforgeError, TraitforgeResult},
};

/// One layer's self-contained SVG document.
///
/// Ids inside are prefixed with the layer name so artifacts can be embedded side by side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerArtifact {
    name: String,
    size: u32,
    svg: Arc<str>,
}

impl LayerArtifact {
    /// Wrap finished SVG text. Call [`LayerArtifact::validate`] before trusting it.
    pub fn new(name: impl Into<String>, size: u32, svg: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            size,
            svg: svg.into(),
        }
    }

    /// Layer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Square canvas edge.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// SVG text.
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Parse the document and check it is standalone, non-empty and sized to the canvas.
    pub fn validate(&self) -> TraitforgeResult<()> {
        if self.svg.trim().is_empty() {
            return Err(TraitforgeError::validation(format!(
                "layer '{}' produced an empty document",
                self.name
            )));
        }
        if let Some(href) = external_href(&self.svg) {
            return Err(TraitforgeError::validation(format!(
                "layer '{}' references external resource '{href}'",
                self.name
            )));
        }
        let tree = usvg::Tree::from_str(&self.svg, &usvg::Options::default()).map_err(|e| {
            TraitforgeError::validation(format!("layer '{}' is not valid SVG: {e}", self.name))
        })?;
        let size = tree.size();
        let expected = self.size as f32;
        if (size.width() - expected).abs() > 1e-3 || (size.height() - expected).abs() > 1e-3 {
            return Err(TraitforgeError::validation(format!(
                "layer '{}' is {}x{}, expected {expected}x{expected}",
                self.name,
                size.width(),
                size.height()
            )));
        }
        if !tree.root().has_children() {
            return Err(TraitforgeError::validation(format!(
                "layer '{}' has no drawable content",
                self.name
            )));
        }
        Ok(())
    }
}

/// First `href` that points outside the document (anything but `#id` or `data:`).
fn external_href(svg: &str) -> Option<&str> {
    let mut rest = svg;
    while let Some(pos) = rest.find("href=") {
        rest = &rest[pos + 5..];
        let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let body = &rest[1..];
        let end = body.find(quote).unwrap_or(body.len());
        let value = &body[..end];
        if !(value.starts_with('#') || value.starts_with("data:")) {
            return Some(value);
        }
        rest = &body[end..];
    }
    None
}

/// Minimal SVG writer for layer artifacts.
///
/// Ids handed out by [`SvgDocument::id`] carry the layer prefix.
#[derive(Debug)]
pub struct SvgDocument {
    name: String,
    size: u32,
    prefix: String,
    defs: String,
    body: String,
    open_groups: usize,
}

impl SvgDocument {
    /// Empty document for layer `name` on an `size` x `size` canvas.
    pub fn new(name: &str, size: u32) -> Self {
        let prefix: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        Self {
            name: name.to_owned(),
            size,
            prefix,
            defs: String::new(),
            body: String::new(),
            open_groups: 0,
        }
    }

    /// Layer-unique id for `local`.
    pub fn id(&self, local: &str) -> String {
        format!("{}-{local}", self.prefix)
    }

    /// Register a clip path and return its id.
    pub fn clip_path(&mut self, local: &str, path: &BezPath, rule: FillRule) -> String {
        let id = self.id(local);
        let _ = write!(
            self.defs,
            r#"<clipPath id="{id}"><path d="{}" clip-rule="{}"/></clipPath>"#,
            path.to_svg(),
            rule.svg_name()
        );
        id
    }

    /// Fill the whole canvas.
    pub fn background(&mut self, fill: Rgb8) {
        let _ = write!(
            self.body,
            r#"<rect x="0" y="0" width="{0}" height="{0}" fill="{1}"/>"#,
            self.size,
            fill.to_hex()
        );
    }

    /// Filled path.
    pub fn fill_path(&mut self, path: &BezPath, fill: Rgb8, rule: FillRule) {
        let _ = write!(
            self.body,
            r#"<path d="{}" fill="{}" fill-rule="{}"/>"#,
            path.to_svg(),
            fill.to_hex(),
            rule.svg_name()
        );
    }

    /// Stroked open path with round caps.
    pub fn stroke_path(&mut self, path: &BezPath, stroke: Rgb8, width: f64) {
        let _ = write!(
            self.body,
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{width}" stroke-linecap="round" stroke-linejoin="round"/>"#,
            path.to_svg(),
            stroke.to_hex()
        );
    }

    /// Open a group clipped by a previously registered clip path.
    pub fn begin_clip_group(&mut self, clip_id: &str) {
        let _ = write!(self.body, r#"<g clip-path="url(#{clip_id})">"#);
        self.open_groups += 1;
    }

    /// Close the innermost open group.
    pub fn end_group(&mut self) {
        if self.open_groups > 0 {
            self.body.push_str("</g>");
            self.open_groups -= 1;
        }
    }

    /// Close any open groups and produce the artifact.
    pub fn finish(mut self) -> LayerArtifact {
        while self.open_groups > 0 {
            self.end_group();
        }
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{0}" height="{0}" viewBox="0 0 {0} {0}">"#,
            self.size
        );
        if !self.defs.is_empty() {
            let _ = write!(svg, "<defs>{}</defs>", self.defs);
        }
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        LayerArtifact::new(self.name, self.size, svg)
    }
}

/// Surviving layers in canonical order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Composite {
    size: u32,
    layers: Vec<LayerArtifact>,
}

impl Composite {
    pub(crate) fn new(size: u32, layers: Vec<LayerArtifact>) -> Self {
        Self { size, layers }
    }

    /// Canvas edge.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Layers bottom to top.
    pub fn layers(&self) -> &[LayerArtifact] {
        &self.layers
    }

    /// Layer names bottom to top.
    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(LayerArtifact::name).collect()
    }

    /// The sole layer when exactly one survived.
    pub fn single(&self) -> Option<&LayerArtifact> {
        match self.layers.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Composite document embedding each layer verbatim.
    pub fn to_svg(&self) -> String {
        self.to_svg_with(|a| Cow::Borrowed(a.svg()))
    }

    /// Composite document embedding the text `embed` returns for each layer.
    pub fn to_svg_with<'a, F>(&'a self, mut embed: F) -> String
    where
        F: FnMut(&'a LayerArtifact) -> Cow<'a, str>,
    {
        let mut out = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{0}" height="{0}" viewBox="0 0 {0} {0}">"#,
            self.size
        );
        for layer in &self.layers {
            let text = embed(layer);
            let _ = write!(
                out,
                r#"<image x="0" y="0" width="{0}" height="{0}" data-layer="{1}" href="{2}"/>"#,
                self.size,
                escape_attr(layer.name()),
                svg_data_uri(&text)
            );
        }
        out.push_str("</svg>");
        out
    }
}

/// `data:` URI carrying percent-encoded SVG text.
pub fn svg_data_uri(svg: &str) -> String {
    let mut out = String::with_capacity(svg.len() + 32);
    out.push_str("data:image/svg+xml;charset=utf-8,");
    for b in svg.bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'.'
            | b'_'
            | b'~'
            | b'/'
            | b':'
            | b'='
            | b','
            | b';'
            | b'('
            | b')'
            | b'!'
            | b'*'
            | b'+'
            | b'@' => out.push(char::from(b)),
            _ => {
                let _ = write!(out, "%{b:02X}");
            }
        }
    }
    out
}

fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/artifact.rs"]
mod tests;

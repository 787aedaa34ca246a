//! OMML to MathML conversion
//!
//! Walks the direct children of an `m:oMath` node in document order and emits
//! a MathML fragment. Child ordering matters: OMML is mixed content, not a
//! fixed schema, so the output must follow the authoring order. Unrecognized
//! child kinds are skipped. An equation with no convertible content yields an
//! empty string, never a bare `<math></math>` pair.

use anyhow::Result;
use quick_xml::Reader;
use quick_xml::events::Event;

/// OMML element kinds we convert
#[derive(Debug, Clone)]
enum OmmlNode {
    /// Subscript: base with a lowered script
    Subscript { base: Box<OmmlNode>, sub: Box<OmmlNode> },
    /// Superscript: base with a raised script
    Superscript { base: Box<OmmlNode>, sup: Box<OmmlNode> },
    /// Fraction with numerator over denominator
    Fraction { num: Box<OmmlNode>, den: Box<OmmlNode> },
    /// Plain text run
    Text(String),
    /// Sequence of sibling elements
    Sequence(Vec<OmmlNode>),
}

/// Convert the inner XML of one `m:oMath` node to a MathML fragment.
///
/// Returns an empty string when the node carries nothing convertible or when
/// the XML cannot be parsed; conversion failures never propagate past this
/// boundary.
pub fn omml_to_mathml(omml: &str) -> String {
    match parse_children(omml, false) {
        Ok(node) => {
            let body = render(&node);
            if body.is_empty() {
                String::new()
            } else {
                format!("<math>{body}</math>")
            }
        }
        Err(e) => {
            log::warn!("failed to parse OMML: {e}");
            String::new()
        }
    }
}

/// Escape text for embedding in markup.
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Parse a run of OMML sibling elements.
///
/// With `restricted` set, only subscript and plain-run children are
/// recognized; fraction numerators and denominators are parsed this way.
fn parse_children(xml: &str, restricted: bool) -> Result<OmmlNode> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut elements = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_ref = e.name();
                let tag = std::str::from_utf8(name_ref.as_ref()).unwrap_or("");
                match tag {
                    "m:sSub" => {
                        elements.push(parse_script(&mut reader, "m:sSub", "m:sub")?);
                    }
                    "m:sSup" if !restricted => {
                        elements.push(parse_script(&mut reader, "m:sSup", "m:sup")?);
                    }
                    "m:f" if !restricted => {
                        elements.push(parse_fraction(&mut reader)?);
                    }
                    "m:r" => {
                        elements.push(parse_run(&mut reader)?);
                    }
                    _ => {
                        // Skip the whole unrecognized subtree so its nested
                        // runs do not leak into the output.
                        let name = e.name().as_ref().to_vec();
                        let mut skip_buf = Vec::new();
                        reader
                            .read_to_end_into(quick_xml::name::QName(&name), &mut skip_buf)?;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => anyhow::bail!("XML parsing error: {}", e),
            _ => {}
        }
        buf.clear();
    }

    if elements.len() == 1 {
        Ok(elements.into_iter().next().unwrap())
    } else {
        Ok(OmmlNode::Sequence(elements))
    }
}

/// Parse an `m:sSub` or `m:sSup` structure into base and script parts
fn parse_script(reader: &mut Reader<&[u8]>, end_tag: &str, script_tag: &str) -> Result<OmmlNode> {
    let mut base = None;
    let mut script = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_ref = e.name();
                let tag = std::str::from_utf8(name_ref.as_ref()).unwrap_or("");
                if tag == "m:e" {
                    let content = read_element_content(reader, "m:e")?;
                    if base.is_none() {
                        base = Some(parse_children(&content, false)?);
                    }
                } else if tag == script_tag {
                    let content = read_element_content(reader, script_tag)?;
                    script = Some(parse_children(&content, false)?);
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == end_tag.as_bytes() => break,
            Ok(Event::Eof) => break,
            Err(e) => anyhow::bail!("script parse error: {}", e),
            _ => {}
        }
        buf.clear();
    }

    let base = Box::new(base.unwrap_or(OmmlNode::Text(String::new())));
    let script = Box::new(script.unwrap_or(OmmlNode::Text(String::new())));
    if end_tag == "m:sSub" {
        Ok(OmmlNode::Subscript { base, sub: script })
    } else {
        Ok(OmmlNode::Superscript { base, sup: script })
    }
}

/// Parse an `m:f` fraction. Numerator and denominator admit subscript and
/// plain-run children only.
fn parse_fraction(reader: &mut Reader<&[u8]>) -> Result<OmmlNode> {
    let mut num = None;
    let mut den = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_ref = e.name();
                let tag = std::str::from_utf8(name_ref.as_ref()).unwrap_or("");
                match tag {
                    "m:num" => {
                        let content = read_element_content(reader, "m:num")?;
                        num = Some(parse_children(&content, true)?);
                    }
                    "m:den" => {
                        let content = read_element_content(reader, "m:den")?;
                        den = Some(parse_children(&content, true)?);
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"m:f" => break,
            Ok(Event::Eof) => break,
            Err(e) => anyhow::bail!("fraction parse error: {}", e),
            _ => {}
        }
        buf.clear();
    }

    Ok(OmmlNode::Fraction {
        num: Box::new(num.unwrap_or(OmmlNode::Text(String::new()))),
        den: Box::new(den.unwrap_or(OmmlNode::Text(String::new()))),
    })
}

/// Parse an `m:r` text run
fn parse_run(reader: &mut Reader<&[u8]>) -> Result<OmmlNode> {
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"m:t" => {
                if let Ok(Event::Text(e)) = reader.read_event_into(&mut buf) {
                    text.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"m:r" => break,
            Ok(Event::Eof) => break,
            Err(e) => anyhow::bail!("run parse error: {}", e),
            _ => {}
        }
        buf.clear();
    }

    Ok(OmmlNode::Text(text))
}

/// Read the inner content of an XML element back out as a string
fn read_element_content(reader: &mut Reader<&[u8]>, end_tag: &str) -> Result<String> {
    let mut content = String::new();
    let mut buf = Vec::new();
    let mut depth = 1;
    let end_tag_bytes = end_tag.as_bytes();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                content.push('<');
                content.push_str(std::str::from_utf8(e.name().as_ref()).unwrap_or(""));
                for a in e.attributes().flatten() {
                    content.push(' ');
                    content.push_str(std::str::from_utf8(a.key.as_ref()).unwrap_or(""));
                    content.push_str("=\"");
                    content.push_str(&String::from_utf8_lossy(&a.value));
                    content.push('"');
                }
                content.push('>');
                depth += 1;
            }
            Ok(Event::End(ref e)) => {
                depth -= 1;
                if depth == 0 && e.name().as_ref() == end_tag_bytes {
                    break;
                }
                content.push_str("</");
                content.push_str(std::str::from_utf8(e.name().as_ref()).unwrap_or(""));
                content.push('>');
            }
            Ok(Event::Empty(ref e)) => {
                content.push('<');
                content.push_str(std::str::from_utf8(e.name().as_ref()).unwrap_or(""));
                for a in e.attributes().flatten() {
                    content.push(' ');
                    content.push_str(std::str::from_utf8(a.key.as_ref()).unwrap_or(""));
                    content.push_str("=\"");
                    content.push_str(&String::from_utf8_lossy(&a.value));
                    content.push('"');
                }
                content.push_str("/>");
            }
            Ok(Event::Text(ref e)) => {
                content.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::Eof) => break,
            Err(e) => anyhow::bail!("element content read error: {}", e),
            _ => {}
        }
        buf.clear();
    }

    Ok(content)
}

/// Render a parsed OMML node to MathML
fn render(node: &OmmlNode) -> String {
    match node {
        OmmlNode::Text(s) => render_text(s),
        OmmlNode::Sequence(elements) => elements.iter().map(render).collect(),
        OmmlNode::Subscript { base, sub } => {
            format!("<msub>{}{}</msub>", render(base), render(sub))
        }
        OmmlNode::Superscript { base, sup } => {
            format!("<msup>{}{}</msup>", render(base), render(sup))
        }
        OmmlNode::Fraction { num, den } => {
            format!("<mfrac>{}{}</mfrac>", render(num), render(den))
        }
    }
}

/// A run either carries a known operator or is wrapped as an identifier
fn render_text(text: &str) -> String {
    match text.trim() {
        "" => String::new(),
        "=" => "<mo>=</mo>".to_string(),
        "×" | "*" => "<mo>×</mo>".to_string(),
        "+" => "<mo>+</mo>".to_string(),
        "-" => "<mo>-</mo>".to_string(),
        other => format!("<mi>{}</mi>", escape_text(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscript() {
        let omml = r#"<m:sSub><m:e><m:r><m:t>v</m:t></m:r></m:e><m:sub><m:r><m:t>x</m:t></m:r></m:sub></m:sSub>"#;
        assert_eq!(
            omml_to_mathml(omml),
            "<math><msub><mi>v</mi><mi>x</mi></msub></math>"
        );
    }

    #[test]
    fn test_superscript() {
        let omml = r#"<m:sSup><m:e><m:r><m:t>c</m:t></m:r></m:e><m:sup><m:r><m:t>2</m:t></m:r></m:sup></m:sSup>"#;
        assert_eq!(
            omml_to_mathml(omml),
            "<math><msup><mi>c</mi><mi>2</mi></msup></math>"
        );
    }

    #[test]
    fn test_fraction() {
        let omml = r#"<m:f><m:num><m:r><m:t>1</m:t></m:r></m:num><m:den><m:r><m:t>2</m:t></m:r></m:den></m:f>"#;
        assert_eq!(
            omml_to_mathml(omml),
            "<math><mfrac><mi>1</mi><mi>2</mi></mfrac></math>"
        );
    }

    #[test]
    fn test_operator_runs() {
        let omml = r#"<m:r><m:t>F</m:t></m:r><m:r><m:t>=</m:t></m:r><m:r><m:t>m</m:t></m:r><m:r><m:t>*</m:t></m:r><m:r><m:t>a</m:t></m:r>"#;
        assert_eq!(
            omml_to_mathml(omml),
            "<math><mi>F</mi><mo>=</mo><mi>m</mi><mo>×</mo><mi>a</mi></math>"
        );
    }

    #[test]
    fn test_sequence_order_preserved() {
        let omml = r#"<m:r><m:t>E</m:t></m:r><m:r><m:t>=</m:t></m:r><m:sSup><m:e><m:r><m:t>c</m:t></m:r></m:e><m:sup><m:r><m:t>2</m:t></m:r></m:sup></m:sSup>"#;
        assert_eq!(
            omml_to_mathml(omml),
            "<math><mi>E</mi><mo>=</mo><msup><mi>c</mi><mi>2</mi></msup></math>"
        );
    }

    #[test]
    fn test_empty_yields_empty_string() {
        assert_eq!(omml_to_mathml(""), "");
        // A node with only unrecognized children produces nothing, not <math></math>.
        assert_eq!(omml_to_mathml("<m:ctrlPr/>"), "");
    }

    #[test]
    fn test_unrecognized_children_skipped() {
        let omml = r#"<m:rad><m:e><m:r><m:t>x</m:t></m:r></m:e></m:rad><m:r><m:t>y</m:t></m:r>"#;
        // The radical is not converted; the sibling run still is. The run
        // nested inside the radical is consumed with its parent.
        assert_eq!(omml_to_mathml(omml), "<math><mi>y</mi></math>");
    }

    #[test]
    fn test_fraction_sides_restricted() {
        // A superscript inside a numerator is not recognized; the plain run is.
        let omml = r#"<m:f><m:num><m:sSup><m:e><m:r><m:t>a</m:t></m:r></m:e><m:sup><m:r><m:t>2</m:t></m:r></m:sup></m:sSup><m:r><m:t>b</m:t></m:r></m:num><m:den><m:r><m:t>c</m:t></m:r></m:den></m:f>"#;
        let got = omml_to_mathml(omml);
        assert!(!got.contains("<msup>"), "numerator must not recurse into superscripts: {got}");
        assert!(got.contains("<mfrac>"));
    }

    #[test]
    fn test_text_escaped() {
        let omml = r#"<m:r><m:t>a&lt;b</m:t></m:r>"#;
        assert_eq!(omml_to_mathml(omml), "<math><mi>a&lt;b</mi></math>");
    }
}

//! Markup writing helpers shared by the HTML and TBX outputs.

/// Escape text for element content and single-quoted attribute values.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn open(name: &str, attrs: &[(&str, &str)], close: bool) -> String {
    let mut sorted = attrs.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut tag = format!("<{name}");
    for (attr, value) in sorted {
        tag.push_str(&format!(" {attr}='{}'", escape(value)));
    }
    tag.push_str(if close { "/>" } else { ">" });
    tag
}

/// Opening tag, attributes in name order.
pub(crate) fn stag(name: &str, attrs: &[(&str, &str)]) -> String {
    open(name, attrs, false)
}

/// Self-closing tag, attributes in name order.
pub(crate) fn empty_tag(name: &str, attrs: &[(&str, &str)]) -> String {
    open(name, attrs, true)
}

pub(crate) fn etag(name: &str) -> String {
    format!("</{name}>")
}

/// Wrap markup in an element.
pub(crate) fn wtext(content: &str, name: &str, attrs: &[(&str, &str)]) -> String {
    format!("{}{content}{}", stag(name, attrs), etag(name))
}

/// Collects indented output lines.
#[derive(Debug)]
pub(crate) struct LineAccumulator {
    unit: &'static str,
    lines: Vec<String>,
}

impl LineAccumulator {
    pub fn new(unit: &'static str) -> Self {
        Self {
            unit,
            lines: Vec::new(),
        }
    }

    /// Add a line indented `level` times.
    pub fn push(&mut self, level: usize, line: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}", self.unit.repeat(level), line.as_ref()));
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Add every line of `text` indented `level` times.
    pub fn extend(&mut self, level: usize, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.blank();
            } else {
                self.push(level, line);
            }
        }
    }

    /// The lines joined, with a final newline.
    pub fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b & 'c' \"d\""), "a &lt; b &amp; &apos;c&apos; &quot;d&quot;");
    }

    #[test]
    fn test_tags_sort_attributes() {
        assert_eq!(
            stag("td", &[("colspan", "2"), ("class", "bd-alsep-al")]),
            "<td class='bd-alsep-al' colspan='2'>"
        );
        assert_eq!(empty_tag("span", &[("id", "apple")]), "<span id='apple'/>");
        assert_eq!(wtext("x &amp; y", "p", &[]), "<p>x &amp; y</p>");
    }

    #[test]
    fn test_line_accumulator() {
        let mut accl = LineAccumulator::new("  ");
        accl.push(0, "<table>");
        accl.extend(1, "<tr>\n\n<td/>");
        accl.push(0, "</table>");
        assert_eq!(accl.finish(), "<table>\n  <tr>\n\n  <td/>\n</table>\n");
    }
}

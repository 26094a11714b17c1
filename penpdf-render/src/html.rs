use std::fmt::Write;

use penpdf_core::TextBlock;

/// Renders extracted text as a minimal HTML fragment: one `<div>` per block,
/// one absolutely positioned `<p>` per line.
pub fn blocks_to_html(blocks: &[TextBlock]) -> Vec<u8> {
    let mut out = String::from("<div class=\"page\">\n");
    for block in blocks {
        out.push_str("<div class=\"block\">\n");
        for line in &block.lines {
            let mut text = String::new();
            let mut top = f32::MAX;
            let mut left = f32::MAX;
            for ch in line.spans.iter().flat_map(|span| span.chars.iter()) {
                text.push(ch.c);
                top = top.min(ch.rect.top);
                left = left.min(ch.rect.left);
            }
            if text.is_empty() {
                continue;
            }
            let _ = writeln!(
                out,
                "<p style=\"top:{top:.1}pt;left:{left:.1}pt\">{}</p>",
                escape(&text)
            );
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n");
    out.into_bytes()
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use penpdf_core::{Rect, TextChar, TextLine, TextSpan};

    fn line(text: &str, top: f32) -> TextLine {
        TextLine {
            spans: vec![TextSpan {
                chars: text
                    .chars()
                    .enumerate()
                    .map(|(i, c)| {
                        let left = 5.0 + i as f32 * 4.0;
                        TextChar::new(c, Rect::new(left, top, left + 4.0, top + 10.0))
                    })
                    .collect(),
            }],
        }
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn emits_positioned_paragraph_per_line() {
        let blocks = vec![TextBlock {
            lines: vec![line("x < y", 20.0), TextLine::default()],
        }];
        let html = String::from_utf8(blocks_to_html(&blocks)).unwrap();
        assert!(html.contains("<p style=\"top:20.0pt;left:5.0pt\">x &lt; y</p>"));
        assert_eq!(html.matches("<p ").count(), 1);
    }
}

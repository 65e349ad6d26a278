//! Text and standalone-HTML rendering of an assembled report.

use crate::render::Report;

/// Plain-text rendering, the copyable form of the report.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&report.title);
    out.push('\n');
    out.push('\n');
    for line in &report.lines {
        out.push_str(&line.label);
        out.push(':');
        if !line.value.is_empty() {
            out.push(' ');
            out.push_str(&line.value);
        }
        out.push('\n');
        for sub in &line.sub {
            out.push_str("  ");
            out.push_str(sub);
            out.push('\n');
        }
    }
    out
}

/// The report body as an HTML fragment (the inline preview markup).
pub fn render_body_html(report: &Report) -> String {
    let mut out = String::new();
    out.push_str("<h3>");
    out.push_str(&escape(&report.title));
    out.push_str("</h3>\n<ul>\n");
    for line in &report.lines {
        out.push_str("  <li><strong>");
        out.push_str(&escape(&line.label));
        out.push_str(":</strong>");
        if !line.value.is_empty() {
            out.push(' ');
            out.push_str(&escape(&line.value));
        }
        if !line.sub.is_empty() {
            out.push_str("\n    <ul>\n");
            for sub in &line.sub {
                out.push_str("      <li>");
                out.push_str(&escape(sub));
                out.push_str("</li>\n");
            }
            out.push_str("    </ul>\n  ");
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
    out
}

/// A standalone downloadable document: markup plus embedded styling.
pub fn render_document(report: &Report) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Báo Cáo Doanh Nghiệp</title>
  <style>
     body {{ font-family: sans-serif; padding: 20px; line-height: 1.6; }}
     strong {{ color: #333; }}
     ul {{ list-style-type: none; padding: 0; }}
     li {{ margin-bottom: 8px; }}
  </style>
</head>
<body>
{}</body>
</html>
"#,
        render_body_html(report)
    )
}

/// Export file name, keyed by the tax id when one was extracted.
pub fn export_file_name(tax_id: &str) -> String {
    let id = tax_id.trim();
    if id.is_empty() {
        "Bao_cao_DN.html".to_string()
    } else {
        format!("Bao_cao_{id}.html")
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::profile::ProfileState;

    #[test]
    fn test_text_layout() {
        let report = Report::from_state(&ProfileState::new());
        let text = render_text(&report);
        assert!(text.starts_with("TỔNG HỢP THÔNG TIN DOANH NGHIỆP\n"));
        assert!(text.contains("Công ty: ....................\n"));
        assert!(text.contains("  Quý 1: ... VNĐ\n"));
    }

    #[test]
    fn test_document_embeds_styling() {
        let report = Report::from_state(&ProfileState::new());
        let doc = render_document(&report);
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<style>"));
        assert!(doc.contains("font-family: sans-serif"));
        assert!(doc.contains("<title>Báo Cáo Doanh Nghiệp</title>"));
    }

    #[test]
    fn test_body_escapes_markup() {
        let mut state = ProfileState::new();
        state.extracted.company_name = "Công ty <A&B>".to_string();
        let report = Report::from_state(&state);
        let body = render_body_html(&report);
        assert!(body.contains("Công ty &lt;A&amp;B&gt;"));
        assert!(!body.contains("<A&B>"));
    }

    #[test]
    fn test_export_file_name_uses_tax_id() {
        assert_eq!(export_file_name("0312345678"), "Bao_cao_0312345678.html");
        assert_eq!(export_file_name("  "), "Bao_cao_DN.html");
    }
}

//! dossier-report: report assembly and text/HTML export

pub mod html;
pub mod render;

pub use html::{export_file_name, render_body_html, render_document, render_text};
pub use render::{FIELD_PLACEHOLDER, PENDING, Report, ReportLine};

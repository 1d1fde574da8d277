//! PDF report of a calculation.

pub mod layout;
pub mod pdf;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::i18n::{keys, Translator};
use crate::session::Calculation;

pub use layout::{build_layout, ReportLayout};
pub use pdf::{render_pdf, RenderedReport};

/// Media type the report is served with.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Builds and renders the report in one go. Nothing is cached.
pub fn generate_pdf(
    calc: &Calculation,
    tr: &Translator,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>, ReportError> {
    let layout = build_layout(calc, tr, generated_at);
    Ok(render_pdf(&layout)?.bytes)
}

/// `CO2_report_YYYYMMDD_HHMMSS.pdf`, with the prefix in the active language.
pub fn report_file_name(tr: &Translator, now: NaiveDateTime) -> String {
    format!(
        "{}_{}.pdf",
        tr.t(keys::REPORT_FILE_PREFIX),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Writes the rendered bytes, creating parent directories as needed.
pub fn save_report(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, bytes).map_err(io_err)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "report saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn file_name_carries_timestamp() {
        let now = NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 1)
            .unwrap();
        assert_eq!(
            report_file_name(&Translator::new("en"), now),
            "CO2_report_20241231_235901.pdf"
        );
        assert_eq!(
            report_file_name(&Translator::new("nl"), now),
            "CO2_rapport_20241231_235901.pdf"
        );
    }
}

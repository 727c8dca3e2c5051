//! Report Assembler: turns an [`AnalysisReport`] into a downloadable PDF.

pub mod layout;
pub mod pdf;

use shared::AnalysisReport;

pub use layout::ReportLayout;
pub use pdf::render_pdf;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report generation failed: {0}")]
    GenerationFailed(String),
}

impl ReportError {
    fn generation(cause: impl Into<String>) -> Self {
        Self::GenerationFailed(cause.into())
    }
}

pub fn assemble(report: &AnalysisReport) -> Result<Vec<u8>, ReportError> {
    let layout = ReportLayout::build(report);
    log::debug!(
        "Rendering report {} over {} page(s)",
        report.id,
        layout.pages.len()
    );
    let bytes = render_pdf(&layout)?;
    log::info!("Generated report {} ({} bytes)", report.id, bytes.len());
    Ok(bytes)
}

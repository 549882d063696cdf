use std::path::Path;

use lopdf::{Document, ObjectId};
use pdfops_core::{ColorSpace, ContentWarning, GraphicState};
use pdfops_parse::{ContentStreamModel, ValidationSession, analyze_page};
use tracing::info;

use crate::page_range::parse_page_range;

/// Open a PDF file with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is missing,
/// unreadable, encrypted or not a PDF.
pub fn open_document(file: &Path) -> Result<Document, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }
    let bytes = std::fs::read(file).map_err(|e| {
        eprintln!("Error: failed to read {}: {e}", file.display());
        1
    })?;
    let doc = Document::load_mem(&bytes).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })?;
    if doc.is_encrypted() {
        eprintln!("Error: encrypted PDFs are not supported");
        return Err(1);
    }
    Ok(doc)
}

/// Page numbers (1-based) and object ids selected by `pages`, or every
/// page when no range is given.
pub fn selected_pages(doc: &Document, pages: Option<&str>) -> Result<Vec<(u32, ObjectId)>, i32> {
    let all: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
    let Some(range) = pages else {
        return Ok(all);
    };
    let indices = parse_page_range(range, all.len()).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    Ok(indices.into_iter().map(|i| all[i]).collect())
}

/// Analyze one page, reporting a failure on stderr.
pub fn analyze(
    doc: &Document,
    page_number: u32,
    page_id: ObjectId,
    session: &ValidationSession,
) -> Result<ContentStreamModel, i32> {
    info!(page = page_number, "analyzing page");
    analyze_page(doc, page_id, session).map_err(|e| {
        eprintln!("Error reading page {page_number}: {e}");
        1
    })
}

/// Stream warnings plus glyph decode warnings, unless collection is off.
pub fn page_warnings(model: &ContentStreamModel, session: &ValidationSession) -> Vec<ContentWarning> {
    if session.options().collect_warnings {
        model.all_warnings()
    } else {
        Vec::new()
    }
}

/// Short label of a color space, naming the pattern when one is selected.
pub fn color_space_label(cs: &ColorSpace, pattern: Option<&str>) -> String {
    match (cs, pattern) {
        (ColorSpace::Pattern { .. }, Some(name)) => format!("Pattern({name})"),
        (ColorSpace::Separation { colorant, .. }, _) => format!("Separation({colorant})"),
        (ColorSpace::Indexed { base, .. }, _) => format!("Indexed({})", base.family()),
        _ => cs.family().to_string(),
    }
}

pub fn fill_label(state: &GraphicState) -> String {
    color_space_label(
        state.fill_color_space(),
        state.fill_pattern().map(|p| p.name.as_str()),
    )
}

pub fn stroke_label(state: &GraphicState) -> String {
    color_space_label(
        state.stroke_color_space(),
        state.stroke_pattern().map(|p| p.name.as_str()),
    )
}

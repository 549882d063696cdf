use pdfops_core::Glyph;
use pdfops_parse::{OperatorNode, ValidationSession};

use crate::cli::{AnalyzeArgs, OutputFormat};
use crate::shared::{analyze, fill_label, open_document, page_warnings, selected_pages, stroke_label};

pub fn run(args: &AnalyzeArgs) -> Result<(), i32> {
    let doc = open_document(&args.file)?;
    let pages = selected_pages(&doc, args.pages.as_deref())?;
    let session = ValidationSession::new(args.options());

    if args.format == OutputFormat::Text {
        println!("page\tindex\toperator\tfill\tstroke\tfont\tglyphs");
    }

    for (page_number, page_id) in pages {
        let model = analyze(&doc, page_number, page_id, &session)?;
        let warnings = page_warnings(&model, &session);

        match args.format {
            OutputFormat::Text => {
                for (index, node) in model.operators.iter().enumerate() {
                    println!("{}", text_row(page_number, index, node));
                }
                for warning in &warnings {
                    eprintln!("page {page_number}: {warning}");
                }
            }
            OutputFormat::Json => {
                let operators: Vec<serde_json::Value> = model
                    .operators
                    .iter()
                    .enumerate()
                    .map(|(index, node)| json_operator(index, node))
                    .collect::<Result<_, _>>()
                    .map_err(json_error)?;
                let obj = serde_json::json!({
                    "page": page_number,
                    "operators": operators,
                    "contains_transparency": model.contains_transparency,
                    "stack_depth": model.stack_depth,
                    "warnings": serde_json::to_value(&warnings).map_err(json_error)?,
                });
                println!("{obj}");
            }
        }
    }
    Ok(())
}

fn json_error(e: serde_json::Error) -> i32 {
    eprintln!("Error: failed to serialize output: {e}");
    1
}

fn text_row(page_number: u32, index: usize, node: &OperatorNode) -> String {
    let (fill, stroke) = match node.state.as_deref() {
        Some(state) => (fill_label(state), stroke_label(state)),
        None => ("-".to_string(), "-".to_string()),
    };
    let font = font_label(node).unwrap_or_else(|| "-".to_string());
    let glyphs = if node.is_text_show() {
        glyph_summary(node.glyphs())
    } else {
        "-".to_string()
    };
    format!(
        "{page_number}\t{index}\t{}\t{fill}\t{stroke}\t{font}\t{glyphs}",
        node.name
    )
}

fn font_label(node: &OperatorNode) -> Option<String> {
    let font = node.font()?;
    let name = font.base_font.as_deref().unwrap_or("?");
    Some(format!("{name} ({})", font.subtype.as_str()))
}

/// `count=N missing=M inconsistent=K text="..."`
fn glyph_summary(glyphs: &[Glyph]) -> String {
    let missing = glyphs.iter().filter(|g| g.present == Some(false)).count();
    let inconsistent = glyphs
        .iter()
        .filter(|g| g.width_consistent == Some(false))
        .count();
    let text: String = glyphs
        .iter()
        .map(|g| g.to_unicode.as_deref().unwrap_or("\u{FFFD}"))
        .collect();
    format!(
        "count={} missing={missing} inconsistent={inconsistent} text={text:?}",
        glyphs.len()
    )
}

fn json_operator(index: usize, node: &OperatorNode) -> Result<serde_json::Value, serde_json::Error> {
    let glyphs = if node.is_text_show() {
        serde_json::to_value(node.glyphs())?
    } else {
        serde_json::Value::Null
    };
    Ok(serde_json::json!({
        "index": index,
        "operator": node.name,
        "operands": node.operands.len(),
        "fill": node.state.as_deref().map(fill_label),
        "stroke": node.state.as_deref().map(stroke_label),
        "font": font_label(node),
        "glyphs": glyphs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfops_core::GlyphKind;

    fn glyph(present: Option<bool>, consistent: Option<bool>, text: Option<&str>) -> Glyph {
        Glyph {
            code: 65,
            name: Some("A".to_string()),
            present,
            width_consistent: consistent,
            to_unicode: text.map(str::to_string),
            kind: GlyphKind::Simple,
        }
    }

    #[test]
    fn glyph_summary_counts_problems() {
        let glyphs = vec![
            glyph(Some(true), Some(true), Some("A")),
            glyph(Some(false), None, Some("B")),
            glyph(Some(true), Some(false), None),
        ];
        assert_eq!(
            glyph_summary(&glyphs),
            "count=3 missing=1 inconsistent=1 text=\"AB\u{FFFD}\""
        );
    }

    #[test]
    fn empty_glyph_summary() {
        assert_eq!(glyph_summary(&[]), "count=0 missing=0 inconsistent=0 text=\"\"");
    }
}

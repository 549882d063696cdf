use pdfops_parse::ValidationSession;

use crate::cli::{AnalyzeArgs, OutputFormat};
use crate::shared::{analyze, open_document, page_warnings, selected_pages};

pub fn run(args: &AnalyzeArgs) -> Result<(), i32> {
    let doc = open_document(&args.file)?;
    let pages = selected_pages(&doc, args.pages.as_deref())?;
    let session = ValidationSession::new(args.options());
    let flavour = session.flavour().map(|f| f.to_string());

    let mut reports = Vec::with_capacity(pages.len());
    for (page_number, page_id) in pages {
        let model = analyze(&doc, page_number, page_id, &session)?;
        let warnings = page_warnings(&model, &session);
        reports.push((page_number, model.contains_transparency, model.operators.len(), warnings));
    }
    let any_transparency = reports.iter().any(|r| r.1);

    match args.format {
        OutputFormat::Text => {
            if let Some(ref flavour) = flavour {
                println!("# flavour: {flavour}");
            }
            println!("page\ttransparency\toperators\twarnings");
            for (page, transparent, operators, warnings) in &reports {
                let flag = if *transparent { "yes" } else { "no" };
                println!("{page}\t{flag}\t{operators}\t{}", warnings.len());
            }
            for (page, _, _, warnings) in &reports {
                for warning in warnings {
                    println!("# page {page}: {warning}");
                }
            }
        }
        OutputFormat::Json => {
            let mut page_values = Vec::with_capacity(reports.len());
            for (page, transparent, operators, warnings) in &reports {
                let warnings = serde_json::to_value(warnings).map_err(|e| {
                    eprintln!("Error: failed to serialize output: {e}");
                    1
                })?;
                page_values.push(serde_json::json!({
                    "page": page,
                    "contains_transparency": transparent,
                    "operators": operators,
                    "warnings": warnings,
                }));
            }
            let obj = serde_json::json!({
                "file": args.file.display().to_string(),
                "flavour": flavour,
                "contains_transparency": any_transparency,
                "pages": page_values,
            });
            println!("{obj}");
        }
    }
    Ok(())
}

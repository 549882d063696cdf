//! Integration tests for the `ops` and `transparency` subcommands.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cmd() -> Command {
    Command::cargo_bin("pdfops").unwrap()
}

/// Create a PDF with one page per content stream, sharing a Helvetica
/// font `F1` and a half-transparent ExtGState `GS1`.
fn pdf_with_pages(contents: &[&[u8]]) -> Vec<u8> {
    use lopdf::{Object, Stream, dictionary};

    let mut doc = lopdf::Document::with_version("1.7");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let gs_id = doc.add_object(dictionary! {
        "Type" => "ExtGState",
        "ca" => Object::Real(0.5),
    });

    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ];

    let mut page_ids = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
        let resources = dictionary! {
            "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            "ExtGState" => dictionary! { "GS1" => Object::Reference(gs_id) },
        };
        page_ids.push(doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => media_box.clone(),
            "Contents" => Object::Reference(content_id),
            "Resources" => resources,
        }));
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(contents.len() as i64),
    });
    for &pid in &page_ids {
        if let Ok(page_obj) = doc.get_object_mut(pid) {
            if let Ok(dict) = page_obj.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Write PDF bytes to a temporary file and return the path.
fn write_temp_pdf(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    f.write_all(bytes).unwrap();
    f.flush().unwrap();
    f
}

const TEXT_PAGE: &[u8] = b"BT /F1 12 Tf 72 720 Td (Hi) Tj ET";
const ALPHA_PAGE: &[u8] = b"q /GS1 gs 0 0 10 10 re f Q";

fn two_page_pdf() -> tempfile::NamedTempFile {
    write_temp_pdf(&pdf_with_pages(&[TEXT_PAGE, ALPHA_PAGE]))
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

// --- ops ---

#[test]
fn ops_text_lists_every_operator() {
    let file = two_page_pdf();
    cmd()
        .arg("ops")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "page\tindex\toperator\tfill\tstroke\tfont\tglyphs\n",
        ))
        .stdout(predicate::str::contains("1\t3\tTj\t"))
        .stdout(predicate::str::contains("Helvetica (Type1)"))
        .stdout(predicate::str::contains("count=2"))
        .stdout(predicate::str::contains("2\t1\tgs\t"));
}

#[test]
fn ops_json_one_line_per_page() {
    let file = two_page_pdf();
    let output = cmd()
        .arg("ops")
        .arg(file.path())
        .args(["--format", "json", "--pages", "1"])
        .output()
        .unwrap();
    let page = stdout_json(&output);
    assert_eq!(page["page"], 1);
    let names: Vec<&str> = page["operators"]
        .as_array()
        .unwrap()
        .iter()
        .map(|op| op["operator"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["BT", "Tf", "Td", "Tj", "ET"]);
    assert_eq!(page["operators"][3]["glyphs"].as_array().unwrap().len(), 2);
    assert!(page["operators"][0]["glyphs"].is_null());
    assert_eq!(page["contains_transparency"], false);
    assert_eq!(page["stack_depth"], 0);
}

#[test]
fn ops_text_reports_warnings_on_stderr() {
    let file = write_temp_pdf(&pdf_with_pages(&[b"/CS9 cs 0 0 1 1 re f"]));
    cmd()
        .arg("ops")
        .arg(file.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("page 1: [RESOURCE_NOT_FOUND]"));
}

// --- transparency ---

#[test]
fn transparency_text_table() {
    let file = two_page_pdf();
    cmd()
        .arg("transparency")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("page\ttransparency\toperators\twarnings"))
        .stdout(predicate::str::contains("1\tno\t5\t0"))
        .stdout(predicate::str::contains("2\tyes\t5\t0"));
}

#[test]
fn transparency_json_with_flavour() {
    let file = two_page_pdf();
    let output = cmd()
        .arg("transparency")
        .arg(file.path())
        .args(["--format", "json", "--flavour", "2b"])
        .output()
        .unwrap();
    let report = stdout_json(&output);
    assert!(report["flavour"].as_str().unwrap().starts_with("PDF/A-2"));
    assert_eq!(report["contains_transparency"], true);
    let pages = report["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0]["contains_transparency"], false);
    assert_eq!(pages[1]["contains_transparency"], true);
}

#[test]
fn transparency_respects_page_selection() {
    let file = two_page_pdf();
    let output = cmd()
        .arg("transparency")
        .arg(file.path())
        .args(["--format", "json", "--pages", "1"])
        .output()
        .unwrap();
    let report = stdout_json(&output);
    assert_eq!(report["contains_transparency"], false);
    assert_eq!(report["pages"].as_array().unwrap().len(), 1);
    assert!(report["flavour"].is_null());
}

#[test]
fn transparency_json_warnings_can_be_suppressed() {
    let file = write_temp_pdf(&pdf_with_pages(&[b"/CS9 cs 0 0 1 1 re f"]));
    let output = cmd()
        .arg("transparency")
        .arg(file.path())
        .args(["--format", "json"])
        .output()
        .unwrap();
    let report = stdout_json(&output);
    let warnings = report["pages"][0]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["code"]["type"], "ResourceNotFound");
    assert_eq!(warnings[0]["operator"], "cs");

    let output = cmd()
        .arg("transparency")
        .arg(file.path())
        .args(["--format", "json", "--no-warnings"])
        .output()
        .unwrap();
    let report = stdout_json(&output);
    assert!(report["pages"][0]["warnings"].as_array().unwrap().is_empty());
}

// --- errors ---

#[test]
fn missing_file_fails() {
    cmd()
        .args(["transparency", "/nonexistent/file.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn not_a_pdf_fails() {
    let file = write_temp_pdf(b"plain text, not a PDF");
    cmd()
        .arg("ops")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open PDF"));
}

#[test]
fn page_out_of_range_fails() {
    let file = two_page_pdf();
    cmd()
        .arg("ops")
        .arg(file.path())
        .args(["--pages", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds document page count"));
}

#[test]
fn unknown_flavour_is_a_usage_error() {
    let file = two_page_pdf();
    cmd()
        .arg("transparency")
        .arg(file.path())
        .args(["--flavour", "9z"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown PDF/A flavour"));
}

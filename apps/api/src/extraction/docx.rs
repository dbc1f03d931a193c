use std::path::Path;

use docx_rs::{DocumentChild, ParagraphChild, RunChild};

use super::ExtractionError;

/// Extracts body paragraphs from a DOCX file, one paragraph per line.
pub(super) fn extract_text(path: &Path) -> Result<String, ExtractionError> {
    let raw = std::fs::read(path)?;
    let docx = docx_rs::read_docx(&raw).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .into_iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => Some(paragraph_text(&p.children)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(children: &[ParagraphChild]) -> String {
    let mut text = String::new();
    push_paragraph_children(children, &mut text);
    text
}

// Hyperlinks nest their own runs; emails and profile URLs usually live there.
fn push_paragraph_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, text),
            _ => {}
        }
    }
}

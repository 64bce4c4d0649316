// Plain-text rendering of catalogs and review documents

use std::fmt::Write;

use crate::catalog::CapabilityCatalog;
use crate::document::{CopyTarget, ReviewDocument, SectionKey};
use crate::selection::CapabilitySelection;

const COPIED: &str = " [Copied!]";

pub fn render_catalog(catalog: &CapabilityCatalog, selection: Option<&CapabilitySelection>) -> String {
    let mut out = String::new();
    for capability in catalog.iter() {
        let marker = match selection {
            Some(s) if s.contains(capability.name) => "[x]",
            Some(_) => "[ ]",
            None => "-",
        };
        let _ = writeln!(out, "{} {}", marker, capability.name);
        for point in capability.points {
            let _ = writeln!(out, "      • {}", point);
        }
    }
    if let Some(selection) = selection {
        let _ = write!(out, "{}/3 selected", selection.len());
        if selection.is_saturated() {
            out.push_str(" (maximum reached)");
        }
        out.push('\n');
    }
    out
}

/// Render every section in display order. Targets in `copied` get a marker
/// next to their heading.
pub fn render_document(document: &ReviewDocument, copied: &[CopyTarget]) -> String {
    let is_copied = |target: CopyTarget| copied.contains(&target);
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", document.title);

    for key in SectionKey::ALL {
        let marker = if is_copied(key.into()) { COPIED } else { "" };
        let _ = writeln!(out, "## {}{}", key.title(), marker);

        if key.is_text() {
            let _ = writeln!(out, "{}\n", document.section_text(key));
            continue;
        }
        for (name, text) in &document.sections.capabilities {
            let marker = if is_copied(CopyTarget::Capability(name.clone())) {
                COPIED
            } else {
                ""
            };
            let _ = writeln!(out, "### {}{}", name, marker);
            let _ = writeln!(out, "{}\n", text);
        }
    }
    out.trim_end().to_string()
}

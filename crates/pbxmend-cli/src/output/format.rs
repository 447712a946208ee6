use pbxmend_core::{AddReport, RemoveReport, RepairReport};
use serde_json::json;

use super::OutputFormat;

/// One site pointing at a shown object.
pub struct ReferenceView {
    pub owner: String,
    pub owner_isa: String,
    pub owner_name: String,
    pub key: String,
}

pub struct ObjectView {
    pub id: String,
    pub isa: Option<String>,
    pub path: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub section: Option<String>,
    pub references: Vec<ReferenceView>,
}

pub fn format_add_report(report: &AddReport, dry_run: bool, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => json!({ "dry_run": dry_run, "report": report }).to_string(),
        OutputFormat::Text => format_add_report_text(report, dry_run),
    }
}

fn format_add_report_text(report: &AddReport, dry_run: bool) -> String {
    let verb = if dry_run { "Would add" } else { "Added" };
    let mut out = String::new();
    for group in &report.created_groups {
        out.push_str(&format!(
            "{} group {} ({}) under {}\n",
            if dry_run { "Would create" } else { "Created" },
            group.path,
            group.id,
            group.parent
        ));
    }
    for file in &report.added {
        out.push_str(&format!("{verb} {} as {} in group {}\n", file.path, file.file_ref, file.group));
        for membership in &file.build_files {
            out.push_str(&format!(
                "  build file {} in phase {}\n",
                membership.build_file, membership.phase
            ));
        }
    }
    for skipped in &report.skipped {
        out.push_str(&format!(
            "Skipped {}: already in group {} as {}\n",
            skipped.path, skipped.group, skipped.existing
        ));
    }
    if out.is_empty() {
        return "Nothing to add.".to_string();
    }
    out.trim_end().to_string()
}

pub fn format_remove_report(report: &RemoveReport, dry_run: bool, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => json!({ "dry_run": dry_run, "report": report }).to_string(),
        OutputFormat::Text => {
            let mut out = format!(
                "{} {} ({}) from group {}",
                if dry_run { "Would remove" } else { "Removed" },
                report.path,
                report.file_ref,
                report.group
            );
            for build_file in &report.build_files {
                out.push_str(&format!("\n  build file {build_file}"));
            }
            out.push_str(&format!("\n  {} membership(s)", report.memberships));
            out
        }
    }
}

pub fn format_repair_report(report: &RepairReport, dry_run: bool, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => json!({
            "dry_run": dry_run,
            "clean": report.is_clean(),
            "fixes": report.fixes,
        })
        .to_string(),
        OutputFormat::Text => format_repair_report_text(report, dry_run),
    }
}

fn format_repair_report_text(report: &RepairReport, dry_run: bool) -> String {
    if report.is_clean() {
        return "No problems found.".to_string();
    }

    let mut out = format!(
        "{} {} fix(es):\n",
        if dry_run { "Would apply" } else { "Applied" },
        report.fixes.len()
    );
    for fix in &report.fixes {
        let section = fix
            .section
            .as_deref()
            .map(|s| format!(" [{s}]"))
            .unwrap_or_default();
        out.push_str(&format!("  - {}{section}: {}\n", fix.kind, fix.detail));
    }
    out.trim_end().to_string()
}

pub fn format_object(view: &ObjectView, fmt: OutputFormat) -> String {
    match fmt {
        OutputFormat::Json => {
            let references: Vec<_> = view
                .references
                .iter()
                .map(|r| {
                    json!({
                        "owner": r.owner,
                        "owner_isa": r.owner_isa,
                        "owner_name": r.owner_name,
                        "key": r.key,
                    })
                })
                .collect();
            json!({
                "id": view.id,
                "isa": view.isa,
                "path": view.path,
                "name": view.name,
                "comment": view.comment,
                "section": view.section,
                "references": references,
            })
            .to_string()
        }
        OutputFormat::Text => format_object_text(view),
    }
}

fn format_object_text(view: &ObjectView) -> String {
    let mut out = format!("Object:  {}\n", view.id);
    out.push_str(&format!("Isa:     {}\n", view.isa.as_deref().unwrap_or("(none)")));
    if let Some(path) = &view.path {
        out.push_str(&format!("Path:    {path}\n"));
    }
    if let Some(name) = &view.name {
        out.push_str(&format!("Name:    {name}\n"));
    }
    if let Some(comment) = &view.comment {
        out.push_str(&format!("Label:   {comment}\n"));
    }
    if let Some(section) = &view.section {
        out.push_str(&format!("Section: {section}\n"));
    }

    if view.references.is_empty() {
        out.push_str("\nNot referenced.");
        return out;
    }
    out.push_str("\n--- Referenced by ---\n");
    for r in &view.references {
        out.push_str(&format!("  {} {} ({}).{}\n", r.owner_isa, r.owner, r.owner_name, r.key));
    }
    out.trim_end().to_string()
}

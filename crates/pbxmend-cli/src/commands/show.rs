use anyhow::{Context, Result};
use clap::Args;

use super::ProjectArgs;
use crate::output::format::{format_object, ObjectView, ReferenceView};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Object id
    pub id: String,
}

pub fn run(args: &ShowArgs, format: OutputFormat) -> Result<()> {
    let project = args.project.open()?;
    let doc = project
        .document()
        .with_context(|| format!("Failed to parse {}", project.path().display()))?;
    let object = doc
        .object(&args.id)
        .with_context(|| format!("Failed to find object '{}'", args.id))?;

    let references = doc
        .references_to(&args.id)
        .into_iter()
        .map(|site| {
            let owner = &doc.objects()[site.owner];
            ReferenceView {
                owner: owner.id.to_string(),
                owner_isa: owner.isa().unwrap_or("").to_string(),
                owner_name: owner.display_name().to_string(),
                key: site.key,
            }
        })
        .collect();

    let view = ObjectView {
        id: object.id.to_string(),
        isa: object.isa().map(str::to_string),
        path: object.scalar("path").map(str::to_string),
        name: object.scalar("name").map(str::to_string),
        comment: object.comment.clone(),
        section: object.section.clone(),
        references,
    };
    println!("{}", format_object(&view, format));
    Ok(())
}

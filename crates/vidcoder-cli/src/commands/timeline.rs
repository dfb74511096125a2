//! Timeline and label management commands for CLI.

use clap::Subcommand;
use vidcoder_core::{Answer, Rgba};

use super::{timeline_id, CmdResult, Context};

#[derive(Subcommand)]
pub enum TimelineAction {
    /// List timelines with their labels
    List,
    /// Add a timeline and select it
    Add {
        /// Timeline name
        name: String,
    },
    /// Rename a timeline
    Rename {
        old: String,
        new: String,
    },
    /// Remove a timeline and its annotations
    Remove {
        name: String,
        /// Confirm removal of a timeline that has annotations
        #[arg(long)]
        yes: bool,
    },
    /// Add a label to a timeline's catalog
    Event {
        timeline: String,
        /// Label name
        name: String,
        /// Label color as #rrggbb or #rrggbbaa
        #[arg(long, default_value = "#ffffff")]
        color: Rgba,
    },
}

pub fn run(ctx: &Context, action: TimelineAction) -> CmdResult {
    let mut project = ctx.open()?;

    match action {
        TimelineAction::List => {
            let registry = project.registry();
            let selected = registry.selected();
            let timelines: Vec<_> = registry
                .timelines()
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name(),
                        "selected": Some(t.id()) == selected,
                        "annotations": t.annotations().len(),
                        "events": t.events(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&timelines)?);
            return Ok(());
        }
        TimelineAction::Add { name } => {
            project.registry_mut().add_timeline(name.as_str())?;
            println!("Timeline added: {name}");
        }
        TimelineAction::Rename { old, new } => {
            let registry = project.registry_mut();
            let id = timeline_id(registry, &old)?;
            registry.rename_timeline(id, new.as_str())?;
            println!("Timeline renamed: {old} -> {new}");
        }
        TimelineAction::Remove { name, yes } => {
            let registry = project.registry_mut();
            let id = timeline_id(registry, &name)?;
            if !registry.remove_timeline(id, &mut Answer(yes))? {
                return Err(format!("timeline '{name}' has annotations; pass --yes to remove it").into());
            }
            println!("Timeline removed: {name}");
        }
        TimelineAction::Event { timeline, name, color } => {
            let registry = project.registry_mut();
            let id = timeline_id(registry, &timeline)?;
            let event = registry.add_event(id, name.as_str(), color)?;
            println!("Label added: {name} (id {}, {color})", event.0);
        }
    }

    ctx.save(&mut project)
}

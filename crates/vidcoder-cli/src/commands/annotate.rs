//! Annotation commands for CLI.
//!
//! `add` runs the same lifecycle a player would: start at `--from`, feed
//! `--to` as the playback position, then finish with the label.

use clap::Subcommand;
use tracing::debug;
use vidcoder_core::{
    AnnotationController, Answer, FinishOutcome, FrameClock, LabelByName, Rgba, StartOutcome,
};

use super::{annotation_at, annotation_json, timeline_id, CmdResult, Context};

#[derive(Subcommand)]
pub enum AnnotateAction {
    /// List the annotations of one timeline, or of all of them
    List {
        timeline: Option<String>,
    },
    /// Draw an annotation from one playback position to another
    Add {
        timeline: String,
        /// Label; created with --color if the timeline does not have it
        label: String,
        /// Position where drawing starts, in ms
        #[arg(long, allow_hyphen_values = true)]
        from: i64,
        /// Position where drawing ends, in ms
        #[arg(long, allow_hyphen_values = true)]
        to: i64,
        /// Frame rate of the coded video
        #[arg(long, default_value_t = FrameClock::DEFAULT_FPS)]
        fps: f64,
        /// Color for a new label
        #[arg(long, default_value = "#ffffff")]
        color: Rgba,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Merge the annotation at a position with its touching, same-label neighbor
    Merge {
        timeline: String,
        /// Any position inside the annotation, in ms
        at: i64,
        #[arg(long, conflicts_with = "next", required_unless_present = "next")]
        previous: bool,
        #[arg(long)]
        next: bool,
    },
    /// Delete the annotation at a position
    Delete {
        timeline: String,
        at: i64,
        /// Delete without asking
        #[arg(long)]
        yes: bool,
    },
    /// Set the comment of the annotation at a position
    Comment {
        timeline: String,
        at: i64,
        text: String,
    },
}

pub fn run(ctx: &Context, action: AnnotateAction) -> CmdResult {
    let mut project = ctx.open()?;

    match action {
        AnnotateAction::List { timeline } => {
            let registry = project.registry();
            if let Some(name) = &timeline {
                timeline_id(registry, name)?;
            }
            let mut rows = Vec::new();
            for t in registry.timelines_by_name() {
                if timeline.as_deref().is_some_and(|name| name != t.name()) {
                    continue;
                }
                rows.extend(t.annotations().iter().map(|a| annotation_json(t, a)));
            }
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }
        AnnotateAction::Add {
            timeline,
            label,
            from,
            to,
            fps,
            color,
            comment,
        } => {
            let mut controller = AnnotationController::new(FrameClock::from_fps(fps)?);
            let registry = project.registry_mut();
            let id = timeline_id(registry, &timeline)?;
            registry.select_timeline(id)?;

            if let StartOutcome::Toggled { annotation, .. } = controller.start_annotation(registry, from)? {
                let a = registry.timeline(id)?.annotation(annotation).cloned();
                let (begin, end) = a.map_or((from, from), |a| (a.start_time, a.end_time));
                return Err(format!("{from} ms is inside the annotation [{begin}, {end}] on '{timeline}'").into());
            }
            // A first update crossing the anchor only flips the draft; the
            // second one moves the free end onto the position.
            let first = controller.on_playback_position_changed(registry, to)?;
            let second = controller.on_playback_position_changed(registry, to)?;
            debug!(requested = to, reached = second.position, paused = first.pause || second.pause, "draft tracked");

            let outcome = controller.finish_annotation(registry, &mut LabelByName::new(label.as_str()).with_color(color))?;
            let FinishOutcome::Finalized { annotation, created_event, .. } = outcome else {
                return Err("annotation was not finalized".into());
            };
            if let Some(text) = comment {
                registry.set_annotation_comment(id, annotation, text)?;
            }
            if created_event {
                println!("Label created: {label}");
            }
            let t = registry.timeline(id)?;
            if let Some(a) = t.annotation(annotation) {
                let mut json = annotation_json(t, a);
                json["clamped"] = serde_json::Value::Bool(second.position != to);
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
        AnnotateAction::Merge {
            timeline,
            at,
            previous,
            next: _,
        } => {
            let (t, a) = annotation_at(project.registry(), &timeline, at)?;
            let (id, annotation) = (t.id(), a.id);
            let registry = project.registry_mut();
            let merged = if previous {
                registry.merge_previous(id, annotation)?
            } else {
                registry.merge_next(id, annotation)?
            };
            match merged {
                Some(op) => println!("{}", serde_json::to_string_pretty(&op)?),
                None => {
                    println!("nothing to merge");
                    return Ok(());
                }
            }
        }
        AnnotateAction::Delete { timeline, at, yes } => {
            let (t, a) = annotation_at(project.registry(), &timeline, at)?;
            let (id, annotation) = (t.id(), a.id);
            if !project.registry_mut().remove_annotation(id, annotation, &mut Answer(yes))? {
                return Err("pass --yes to delete the annotation".into());
            }
            println!("Annotation deleted");
        }
        AnnotateAction::Comment { timeline, at, text } => {
            let (t, a) = annotation_at(project.registry(), &timeline, at)?;
            let (id, annotation) = (t.id(), a.id);
            project.registry_mut().set_annotation_comment(id, annotation, text)?;
            println!("ok");
        }
    }

    ctx.save(&mut project)
}

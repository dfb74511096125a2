pub mod annotate;
pub mod config;
pub mod csv;
pub mod project;
pub mod timeline;

use std::error::Error;
use std::path::PathBuf;

use vidcoder_core::coders::parse_coder;
use vidcoder_core::{Annotation, ModelError, Project, Timeline, TimelineId, TimelineRegistry};

pub type CmdResult = Result<(), Box<dyn Error>>;

/// Options shared by every subcommand.
pub struct Context {
    pub project_dir: PathBuf,
    coder: Option<(String, String)>,
}

impl Context {
    pub fn new(project_dir: PathBuf, coder: Option<&str>) -> Self {
        Self {
            project_dir,
            coder: coder.and_then(parse_coder),
        }
    }

    pub fn open(&self) -> Result<Project, Box<dyn Error>> {
        Ok(Project::open(&self.project_dir)?)
    }

    pub fn save(&self, project: &mut Project) -> CmdResult {
        let coder = self.coder.as_ref().map(|(name, email)| (name.as_str(), email.as_str()));
        project.save(coder)?;
        Ok(())
    }
}

pub fn timeline_id(registry: &TimelineRegistry, name: &str) -> Result<TimelineId, ModelError> {
    registry
        .timeline_by_name(name)
        .map(Timeline::id)
        .ok_or_else(|| ModelError::UnknownTimelineName(name.to_string()))
}

/// The annotation covering `at` on the named timeline.
pub fn annotation_at<'r>(
    registry: &'r TimelineRegistry,
    timeline: &str,
    at: i64,
) -> Result<(&'r Timeline, &'r Annotation), Box<dyn Error>> {
    let t = registry.timeline(timeline_id(registry, timeline)?)?;
    let a = t
        .annotation_at(at)
        .ok_or_else(|| format!("no annotation on '{timeline}' at {at} ms"))?;
    Ok((t, a))
}

/// JSON view of an annotation, using the CSV column names.
pub fn annotation_json(timeline: &Timeline, a: &Annotation) -> serde_json::Value {
    serde_json::json!({
        "timeline": timeline.name(),
        "label": timeline.label_of(a),
        "begin": a.start_time,
        "end": a.end_time,
        "duration": a.duration_ms(),
        "comment": a.comment,
    })
}

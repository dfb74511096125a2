//! Project creation.

use vidcoder_core::storage::{CONFIG_FILE, CSV_FILE};
use vidcoder_core::Project;

use super::{CmdResult, Context};

pub fn init(ctx: &Context) -> CmdResult {
    let project = Project::init(&ctx.project_dir)?;
    println!("initialized project in {}", project.dir().display());
    println!("  {CONFIG_FILE}");
    println!("  {CSV_FILE}");
    Ok(())
}

use clap::Subcommand;
use std::path::PathBuf;
use vidcoder_core::storage::{import_csv_str, to_csv_string};

use super::{CmdResult, Context};

#[derive(Subcommand)]
pub enum CsvAction {
    /// Export all annotations (to stdout unless --out is given)
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Import rows into existing timelines and labels, then save
    Import {
        file: PathBuf,
    },
}

pub fn run(ctx: &Context, action: CsvAction) -> CmdResult {
    let mut project = ctx.open()?;

    match action {
        CsvAction::Export { out: Some(path) } => {
            let rows = project.export_to(&path)?;
            eprintln!("{rows} annotation(s) written to {}", path.display());
        }
        CsvAction::Export { out: None } => {
            print!("{}", to_csv_string(project.registry(), project.config().csv_delimiter));
        }
        CsvAction::Import { file } => {
            let text = std::fs::read_to_string(&file)?;
            let delimiter = project.config().csv_delimiter;
            let report = import_csv_str(project.registry_mut(), &text, delimiter)?;
            ctx.save(&mut project)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

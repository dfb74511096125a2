use clap::Subcommand;

use super::{CmdResult, Context};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the project configuration as JSON
    Show,
    /// Get a config value (e.g. "csv_delimiter", "timelines.0.name")
    Get {
        /// Config key
        key: String,
    },
    /// Change the CSV delimiter and rewrite annotations.csv with it
    SetDelimiter {
        /// A single character, or "\t" / "tab"
        delimiter: String,
    },
}

pub fn run(ctx: &Context, action: ConfigAction) -> CmdResult {
    let mut project = ctx.open()?;
    match action {
        ConfigAction::Show => {
            let json = serde_json::to_string_pretty(project.config())?;
            println!("{json}");
        }
        ConfigAction::Get { key } => match project.config().get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        ConfigAction::SetDelimiter { delimiter } => {
            project.config_mut().set("csv_delimiter", &delimiter)?;
            ctx.save(&mut project)?;
            println!("ok");
        }
    }
    Ok(())
}

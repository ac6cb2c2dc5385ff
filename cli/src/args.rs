use clap::{Parser, Subcommand, ValueEnum};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(about = "Manage a remote todo list from the terminal")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Base URL of the todo service
    #[arg(long, env = "TODO_API_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Page the command operates on
    #[arg(short, long, default_value_t = 1, global = true)]
    pub page: u32,

    /// Color theme for output
    #[arg(long, value_enum, env = "TODO_THEME", default_value = "light", global = true)]
    pub theme: Theme,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a page of todos
    #[command(alias = "ls")]
    List,

    /// Create a todo; the listing jumps to page 1 where it appears
    #[command(alias = "a")]
    Add {
        title: String,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Flip a todo between open and done
    Toggle { id: u64 },

    /// Change a todo's title, description or completion
    Edit {
        id: u64,

        #[arg(short, long)]
        title: Option<String>,

        /// Pass an empty string to clear the description
        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        completed: Option<bool>,
    },

    /// Delete a todo
    #[command(alias = "rm")]
    Delete { id: u64 },
}

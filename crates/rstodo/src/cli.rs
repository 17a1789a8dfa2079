use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(name = "rstodo")]
#[command(author, version, about = "A small client for a remote to-do list service", long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and remember the username for later commands
    ///
    /// The password is read from stdin when --password is not given.
    ///
    /// Examples:
    ///   rstodo login ana
    ///   rstodo login ana --password s3cret
    Login {
        username: String,

        #[arg(long, short)]
        password: Option<String>,
    },

    /// Show the whole board (default command)
    ///
    /// Lists ongoing and completed titles with their progress, followed by
    /// every task marked done.
    Show,

    /// List titles
    Titles,

    /// List the tasks of one title
    ///
    /// Examples:
    ///   rstodo lists 4
    Lists { title_id: String },

    /// Create a title with one or more tasks
    ///
    /// Examples:
    ///   rstodo add Groceries Milk Eggs
    ///   rstodo add "Weekend chores" "Clean the garage"
    Add {
        title: String,

        #[arg(required = true)]
        tasks: Vec<String>,
    },

    /// Mark tasks of a title done
    ///
    /// Examples:
    ///   rstodo done 4 11 12
    Done {
        title_id: String,

        #[arg(required = true)]
        task_ids: Vec<String>,
    },

    /// Mark done tasks of a title as not done
    Undone {
        title_id: String,

        #[arg(required = true)]
        task_ids: Vec<String>,
    },

    /// Mark every open task of a title done
    #[command(name = "done-all")]
    DoneAll { title_id: String },

    /// Rename a title
    #[command(name = "rename-title")]
    RenameTitle { title_id: String, title: String },

    /// Change the description of a task
    #[command(name = "edit-task")]
    EditTask {
        title_id: String,
        task_id: String,
        description: String,
    },

    /// Delete tasks
    #[command(name = "rm-task")]
    RmTask {
        #[arg(required = true)]
        task_ids: Vec<String>,
    },

    /// Delete titles along with their tasks
    #[command(name = "rm-title")]
    RmTitle {
        #[arg(required = true)]
        title_ids: Vec<String>,
    },

    /// Start the interactive terminal client
    Tui,

    /// Generate shell completion scripts
    ///
    /// Examples:
    ///   rstodo completions bash > /etc/bash_completion.d/rstodo
    ///   rstodo completions zsh > ~/.zfunc/_rstodo
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Parses arguments, falling back to `show` when no command is given
    pub fn parse_command() -> Commands {
        Cli::parse().command.unwrap_or(Commands::Show)
    }
}

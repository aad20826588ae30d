// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use clap::{Parser, Subcommand};
use repocache::commands::clean::CleanCommand;
use repocache::commands::fetch::FetchCommand;
use repocache::commands::info::InfoCommand;
use repocache::commands::list::{ListCommand, SortKey};
use repocache::commands::open::OpenCommand;
use repocache::commands::path::PathCommand;
use repocache::commands::prune::PruneCommand;
use repocache::commands::remove::RemoveCommand;
use repocache::commands::search::SearchCommand;
use repocache::commands::stats::StatsCommand;
use repocache::config::new_repocache_config;
use repocache::error::{
    RepoCacheError, Result, format_error_chain, format_error_json, format_error_with_color,
    get_exit_code,
};
use repocache::logging;
use repocache::storage::{CacheManager, FetchOptions};
use std::io::IsTerminal;

#[derive(Parser)]
#[command(name = "repocache")]
#[command(author, version, about = "Local cache of repository and package sources", long_about = None)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a repository or package into the cache
    #[command(visible_alias = "get")]
    Fetch {
        /// What to fetch (e.g., "tokio-rs/tokio", "npm:lodash@4.17.21", "crates:serde")
        spec: String,

        /// Discard the cached copy and fetch again
        #[arg(short, long, conflicts_with = "update")]
        force: bool,

        /// Refresh a cached checkout in place
        #[arg(short, long)]
        update: bool,

        /// Clone the full history instead of a shallow checkout
        #[arg(long)]
        full_history: bool,

        /// Output the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the cached directory of a spec
    Path {
        spec: String,
    },

    /// Show details about a cached entry
    Info {
        spec: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List cached entries
    #[command(visible_alias = "ls")]
    List {
        /// Only show entries from this registry (github, npm, pypi, crates)
        #[arg(long, value_name = "REGISTRY")]
        registry: Option<String>,

        /// Sort order
        #[arg(long, value_enum, default_value_t = SortKey::Name)]
        sort: SortKey,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Remove a cached entry
    #[command(visible_alias = "rm")]
    Remove {
        spec: String,
    },

    /// Remove entries unused for a number of days or larger than a size
    Prune {
        /// Remove entries not used in this many days
        #[arg(long, value_name = "DAYS")]
        days: Option<u32>,

        /// Remove entries larger than this size (e.g., "500M", "2G")
        #[arg(long, value_name = "SIZE")]
        max_size: Option<String>,

        /// Show what would be removed without removing anything
        #[arg(long)]
        dry_run: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Remove every cached entry
    Clean {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show cache statistics
    Stats {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Search cached sources with ripgrep
    Search {
        pattern: String,

        /// Limit the search to one cached entry
        #[arg(long, value_name = "SPEC")]
        spec: Option<String>,

        /// Extra arguments passed through to rg
        #[arg(last = true)]
        rg_args: Vec<String>,
    },

    /// Open a cached entry in an editor or the file manager
    Open {
        spec: String,

        /// Editor command (overrides config, $VISUAL and $EDITOR)
        #[arg(long, value_name = "CMD")]
        editor: Option<String>,
    },
}

impl Commands {
    fn wants_json(&self) -> bool {
        match self {
            Commands::Fetch { json, .. }
            | Commands::Info { json, .. }
            | Commands::List { json, .. }
            | Commands::Prune { json, .. }
            | Commands::Stats { json } => *json,
            _ => false,
        }
    }
}

fn run(command: Commands, manager: &mut CacheManager) -> Result<()> {
    match command {
        Commands::Fetch {
            spec,
            force,
            update,
            full_history,
            json,
        } => {
            let options = FetchOptions {
                force,
                update,
                full_history,
            };
            FetchCommand::new(manager).execute(&spec, &options, json)
        }
        Commands::Path { spec } => PathCommand::new(manager).execute(&spec),
        Commands::Info { spec, json } => InfoCommand::new(manager).execute(&spec, json),
        Commands::List {
            registry,
            sort,
            json,
        } => ListCommand::new(manager).execute(registry.as_deref(), sort, json),
        Commands::Remove { spec } => RemoveCommand::new(manager).execute(&spec),
        Commands::Prune {
            days,
            max_size,
            dry_run,
            json,
        } => PruneCommand::new(manager).execute(days, max_size.as_deref(), dry_run, json),
        Commands::Clean { yes } => CleanCommand::new(manager).execute(yes),
        Commands::Stats { json } => StatsCommand::new(manager).execute(json),
        Commands::Search {
            pattern,
            spec,
            rg_args,
        } => SearchCommand::new(manager).execute(&pattern, spec.as_deref(), &rg_args),
        Commands::Open { spec, editor } => {
            OpenCommand::new(manager).execute(&spec, editor.as_deref())
        }
    }
}

fn report_and_exit(error: &RepoCacheError, json: bool) -> ! {
    if json {
        eprintln!("{}", format_error_json(error));
    } else if std::io::stderr().is_terminal() {
        eprint!("{}", format_error_with_color(error, true));
    } else {
        eprintln!("{}", format_error_chain(error));
    }
    std::process::exit(get_exit_code(error));
}

fn main() {
    let cli = Cli::parse();

    logging::setup_logger(cli.verbose);
    let json = cli.command.wants_json();

    let config = match new_repocache_config() {
        Ok(config) => config,
        Err(e) => report_and_exit(&e, json),
    };

    let mut manager = CacheManager::new(config);
    let result = run(cli.command, &mut manager);
    let flushed = manager.flush();

    if let Err(e) = result.and(flushed) {
        report_and_exit(&e, json);
    }
}

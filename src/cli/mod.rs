//! CLI argument definitions for vsc-sync.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("VSC_SYNC_GIT_COMMIT"),
    ", built ",
    env!("VSC_SYNC_BUILD_TIMESTAMP"),
    ")"
);

/// vsc-sync - Layered configuration sync for VSCode-like editors.
///
/// Settings, keybindings, snippets and extensions live in a repository of
/// layers (base, apps, stacks, projects) that are merged and written into
/// each editor's User directory.
#[derive(Parser, Debug)]
#[command(name = "vsc-sync")]
#[command(author, version, long_version = LONG_VERSION, about = "Sync layered settings across VSCode-like editors", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Log debug output to stderr (VSC_SYNC_LOG takes precedence)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Path to config.kdl. Can also be set via VSC_SYNC_CONFIG.
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Layer repository to use instead of the configured one.
    /// Can also be set via VSC_SYNC_REPO.
    #[arg(short = 'C', long = "repo", global = true, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the layer repository and config.kdl (start here!)
    ///
    /// Lays out base/, apps/, stacks/ and projects/, writes starter base
    /// files and registers the editors found on this machine.
    Init {
        /// Repository location (defaults to --repo, then ~/vscode-configs)
        path: Option<PathBuf>,

        /// Reinitialize without asking
        #[arg(short, long)]
        force: bool,

        /// Do not register discovered editors
        #[arg(long)]
        no_discover: bool,
    },

    /// Register an editor by alias
    AddApp {
        /// Alias used in other commands and for apps/<alias>/ layers
        alias: String,

        /// The editor's User directory
        config_path: PathBuf,

        /// Editor CLI used to manage extensions
        #[arg(short, long, value_name = "PATH")]
        executable: Option<PathBuf>,
    },

    /// List registered editors
    ListApps {
        /// Include executables and whether each config dir exists
        #[arg(short, long)]
        long: bool,
    },

    /// Look for installed VSCode-like editors
    Discover {
        /// Register the discovered editors that are not registered yet
        #[arg(long)]
        add: bool,
    },

    /// Merge layers and write them into an editor's config directory
    ///
    /// The config directory is backed up first. Layers apply in order:
    /// base, apps/<APP>, then each --stack in the order given.
    Apply {
        /// Registered app alias
        app: String,

        /// Stack layers to apply on top (repeatable or comma separated)
        #[arg(short, long = "stack", value_delimiter = ',')]
        stacks: Vec<String>,

        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,

        /// Backup directory suffix (default: bak.<unix timestamp>)
        #[arg(long, value_name = "SUFFIX")]
        backup_suffix: Option<String>,

        /// Uninstall extensions that no layer recommends
        #[arg(long)]
        prune_extensions: bool,

        /// Delete the editor's extension directory and reinstall everything
        #[arg(long)]
        clean_extensions: bool,

        #[arg(long)]
        no_settings: bool,

        #[arg(long)]
        no_keybindings: bool,

        #[arg(long)]
        no_extensions: bool,

        #[arg(long)]
        no_snippets: bool,

        #[arg(long)]
        no_tasks: bool,
    },

    /// Compare an editor's live config with the merged layers
    Status {
        /// Registered app alias (default: every registered app)
        app: Option<String>,

        /// Stack layers to include (repeatable or comma separated)
        #[arg(short, long = "stack", value_delimiter = ',')]
        stacks: Vec<String>,
    },

    /// Write .vscode/settings.json and extensions.json into a project
    SetupProject {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// projects/<TYPE> layer applied before the stacks
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        project_type: Option<String>,

        /// Stack layers (repeatable or comma separated)
        #[arg(short, long = "stack", value_delimiter = ',')]
        stacks: Vec<String>,

        /// Overwrite existing files without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Copy an editor's live config into a layer
    Pull {
        /// App alias, or a project directory with --project
        source: String,

        /// Treat SOURCE as a project directory and read its .vscode/
        #[arg(long)]
        project: bool,

        /// Target layer type: base, app, stack or project
        #[arg(short = 't', long = "layer-type", default_value = "app")]
        layer_type: String,

        /// Target layer name (app and project layers default to the source name)
        #[arg(short = 'n', long = "layer-name")]
        layer_name: Option<String>,

        /// Only pull settings.json
        #[arg(long)]
        settings_only: bool,

        #[arg(long)]
        no_keybindings: bool,

        #[arg(long)]
        no_snippets: bool,

        #[arg(long)]
        no_extensions: bool,

        /// Replace existing layer files without asking
        #[arg(long)]
        overwrite: bool,

        /// Show what would be copied without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Open a layer file (or an editor's live file) in an editor
    ///
    /// LAYER is base, app, stack, project, or live for the file in a
    /// registered app's config directory.
    Edit {
        /// Layer type, or "live"
        layer: String,

        /// Layer name, or the app alias for "live"
        name: Option<String>,

        /// File to edit: settings, keybindings, extensions, tasks or snippets
        #[arg(short = 'F', long = "file", default_value = "settings")]
        file: String,

        /// Canonically sort keybindings or settings before opening
        #[arg(long)]
        sort: bool,

        /// Answer yes to create and sort prompts
        #[arg(short, long)]
        yes: bool,

        /// Prepare the file but do not launch an editor
        #[arg(long)]
        no_open: bool,
    },

    /// Canonically sort a keybindings.json or settings.json file in place
    Sort {
        /// File to sort
        file: PathBuf,

        /// keybindings or settings (inferred from the file name by default)
        #[arg(short, long)]
        kind: Option<String>,

        /// Rewrite without asking
        #[arg(short, long)]
        yes: bool,

        /// Report whether the file would change without writing it
        #[arg(long)]
        dry_run: bool,
    },
}

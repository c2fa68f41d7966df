//! vsc-sync CLI - Layered configuration sync for VSCode-like editors.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;
use vsc_sync::apps::{AppDetails, auto_discover};
use vsc_sync::cli::{Cli, Commands};
use vsc_sync::commands::{
    self, ApplyOptions, AssumeYes, Components, Context, EditOptions, EditTarget, InitOptions,
    Output, ProcessLauncher, Prompt, PullOptions, PullSource, SetupProjectOptions, TerminalPrompt,
};
use vsc_sync::config::{ConfigOverrides, expand_tilde};
use vsc_sync::extensions::ExtensionManager;
use vsc_sync::layers::LayerType;
use vsc_sync::sort::SortKind;
use vsc_sync::{Error, Result};

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "VSC_SYNC_LOG";

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;
    init_logging(cli.verbose);

    let overrides = ConfigOverrides {
        config_path: cli.config,
        repo: cli.repo,
    };

    if let Err(e) = run_command(cli.command, overrides, human) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Send tracing output to stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn prompt(yes: bool) -> Box<dyn Prompt> {
    if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalPrompt)
    }
}

fn run_command(command: Commands, overrides: ConfigOverrides, human: bool) -> Result<()> {
    let load = move || Context::load(overrides.clone());
    match command {
        // Sorting a file needs neither config.kdl nor the layer repository.
        Commands::Sort {
            file,
            kind,
            yes,
            dry_run,
        } => {
            let kind: Option<SortKind> = kind.as_deref().map(str::parse).transpose()?;
            let result = commands::sort_file(&file, kind, yes, dry_run, prompt(yes).as_mut())?;
            output(&result, human);
        }

        Commands::Init {
            path,
            force,
            no_discover,
        } => {
            let mut ctx = load()?;
            let opts = InitOptions {
                repo: path,
                force,
                no_discover,
            };
            let result = commands::init(&mut ctx, &opts, prompt(force).as_mut(), &auto_discover)?;
            output(&result, human);
        }

        Commands::AddApp {
            alias,
            config_path,
            executable,
        } => {
            let mut ctx = load()?;
            let result =
                commands::add_app(&mut ctx, &alias, &config_path, executable.as_deref())?;
            output(&result, human);
        }

        Commands::ListApps { long } => {
            let ctx = load()?;
            let result = commands::list_apps(&ctx, long)?;
            output(&result, human);
        }

        Commands::Discover { add } => {
            let mut ctx = load()?;
            let result = commands::discover(&mut ctx, add, &auto_discover)?;
            output(&result, human);
        }

        Commands::Apply {
            app,
            stacks,
            dry_run,
            force,
            backup_suffix,
            prune_extensions,
            clean_extensions,
            no_settings,
            no_keybindings,
            no_extensions,
            no_snippets,
            no_tasks,
        } => {
            let ctx = load()?;
            ctx.require_initialized()?;
            let opts = ApplyOptions {
                stacks,
                components: Components {
                    settings: !no_settings,
                    keybindings: !no_keybindings,
                    extensions: !no_extensions,
                    snippets: !no_snippets,
                    tasks: !no_tasks,
                },
                backup_suffix,
                dry_run,
                force,
                prune_extensions,
                clean_extensions,
            };
            let manager = Context::extension_manager(ctx.app(&app)?);
            let result = commands::apply(&ctx, &app, &opts, manager.as_ref(), &mut TerminalPrompt)?;
            output(&result, human);
        }

        Commands::Status { app, stacks } => {
            let ctx = load()?;
            ctx.require_initialized()?;
            let managers = |app: &AppDetails| -> Box<dyn ExtensionManager> {
                Context::extension_manager(app)
            };
            let result = commands::status(&ctx, app.as_deref(), &stacks, &managers)?;
            output(&result, human);
        }

        Commands::SetupProject {
            path,
            project_type,
            stacks,
            force,
        } => {
            let ctx = load()?;
            ctx.require_initialized()?;
            let opts = SetupProjectOptions {
                project_type,
                stacks,
                force,
            };
            let project = expand_tilde(&path);
            let result = commands::setup_project(&ctx, &project, &opts, &mut TerminalPrompt)?;
            output(&result, human);
        }

        Commands::Pull {
            source,
            project,
            layer_type,
            layer_name,
            settings_only,
            no_keybindings,
            no_snippets,
            no_extensions,
            overwrite,
            dry_run,
        } => {
            let ctx = load()?;
            ctx.require_initialized()?;
            let mut opts = PullOptions {
                layer_type: layer_type.parse()?,
                layer_name,
                keybindings: !no_keybindings,
                snippets: !no_snippets,
                extensions: !no_extensions,
                overwrite,
                dry_run,
                ..Default::default()
            };
            if settings_only {
                opts = opts.settings_only();
            }

            let (source, manager) = if project {
                (PullSource::Project(expand_tilde(&PathBuf::from(source))), None)
            } else {
                let manager = Context::extension_manager(ctx.app(&source)?);
                (PullSource::App(source), Some(manager))
            };
            let result = commands::pull(
                &ctx,
                &source,
                &opts,
                manager.as_deref(),
                &mut TerminalPrompt,
            )?;
            output(&result, human);
        }

        Commands::Edit {
            layer,
            name,
            file,
            sort,
            yes,
            no_open,
        } => {
            let ctx = load()?;
            ctx.require_initialized()?;
            let target = edit_target(&layer, name)?;
            let opts = EditOptions {
                artifact: file.parse()?,
                sort,
                yes,
                open: !no_open,
            };
            let result =
                commands::edit(&ctx, &target, &opts, prompt(yes).as_mut(), &ProcessLauncher)?;
            output(&result, human);
        }

    }
    Ok(())
}

/// `edit live <alias>` targets the app's own directory; anything else
/// names a layer type.
fn edit_target(layer: &str, name: Option<String>) -> Result<EditTarget> {
    if layer.eq_ignore_ascii_case("live") {
        let alias = name.ok_or_else(|| {
            Error::InvalidInput("'edit live' needs the alias of a registered app".to_string())
        })?;
        return Ok(EditTarget::Live(alias));
    }
    let layer_type: LayerType = layer.parse()?;
    Ok(EditTarget::Layer(layer_type, name))
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

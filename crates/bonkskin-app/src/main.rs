//! Main application entry point (native).

use bonkskin_app::{App, AppConfig, ShortcutRegistry, UiAction};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Bonkverse skin editor
#[derive(Parser, Debug)]
#[command(name = "bonkskin")]
#[command(about = "Compose round Bonkverse skins from shapes and images")]
#[command(version)]
struct Cli {
    /// Directory for the autosaved editor state
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,
    /// Directory exports are written to
    #[arg(long, global = true, default_value = ".")]
    out_dir: PathBuf,
    /// Editor config JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply toolbar actions in order (e.g. `add=circle color=#ff0000 drag=250,250:10,0 key=ctrl+z`)
    Apply {
        #[arg(required = true)]
        actions: Vec<UiAction>,
    },
    /// Show the current layer list and button state
    Show,
    /// List keyboard shortcuts
    Shortcuts,
}

fn print_state(app: &App) {
    let ui = app.ui();
    println!("Mode: {}", ui.mode.name());
    println!(
        "Undo: {}  Redo: {}",
        if ui.undo_enabled { "on" } else { "off" },
        if ui.redo_enabled { "on" } else { "off" }
    );
    println!("Layers:");
    for (i, layer) in ui.layers.iter().enumerate() {
        let marker = if layer.highlighted { '*' } else { ' ' };
        println!("  {marker} {i}: {}", layer.name);
    }
}

fn run(cli: Cli) -> Result<(), bonkskin_app::AppError> {
    let mut config = AppConfig {
        out_dir: cli.out_dir,
        storage_dir: cli.storage_dir,
        ..AppConfig::default()
    };
    if let Some(path) = &cli.config {
        config = config.with_editor_config_file(path)?;
    }

    match cli.command {
        Some(Commands::Shortcuts) => ShortcutRegistry::print_all(),
        Some(Commands::Show) => print_state(&App::new(config)?),
        Some(Commands::Apply { actions }) => {
            let mut app = App::new(config)?;
            for action in actions {
                app.handle(action);
                if let Some(message) = &app.ui().message {
                    println!("{message}");
                }
            }
            print_state(&app);
        }
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            let _ = cmd.print_help();
            println!();
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Bonkskin");

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

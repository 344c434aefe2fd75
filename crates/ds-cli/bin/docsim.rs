//! DOCSim: text-based Derby Owners Club simulation.
//!
//! Entry point: resolves launch inputs (flags, remembered config,
//! interactive prompt), then hands off to the career flow.
//!
//! Exit codes: 0 on success, 1 when the breeder HTML or revision is
//! unusable, 2 when no breeder HTML can be resolved at all.

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;

use ds_cli::app::{self, Options};
use ds_cli::console::Console;
use ds_core::config::{CONFIG_FILE, LaunchConfig};
use ds_core::model::Revision;
use ds_core::roster::RosterError;

/// DOCSim, the Derby Owners Club simulation program
#[derive(Parser, Debug)]
#[command(name = "docsim")]
#[command(author, version, about = "DOCSim - breed, train, and race!", long_about = None)]
struct Args {
    /// Global seed; 0 rolls a random seed (printed for reproducibility)
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Breeder data revision (revA, revB, revC, revD)
    #[arg(long)]
    rev: Option<String>,

    /// Path to DOC_Horse_Breeder_Lite_RevC_RevD.html
    #[arg(long = "breeder-html")]
    breeder_html: Option<PathBuf>,

    /// How many rounds to play this run (1..=16)
    #[arg(long = "max-rounds", default_value_t = 1)]
    max_rounds: u32,

    /// Save file path (.json); defaults to saves/<horse_name>.json
    #[arg(long)]
    save: Option<PathBuf>,

    /// Directory for autosaves when --save is not given
    #[arg(long = "save-dir", default_value = "saves")]
    save_dir: PathBuf,

    /// Directory containing static data files (cpu_names.txt, records defaults)
    #[arg(long = "data-dir", default_value = "data")]
    data_dir: PathBuf,

    /// Load an existing save file
    #[arg(long)]
    load: Option<PathBuf>,

    /// Reset national records from the defaults file
    #[arg(long = "reset-records")]
    reset_records: bool,

    /// National records state file
    #[arg(long = "records-state", default_value = "data/records_state.json")]
    records_state: PathBuf,

    /// National records defaults file
    #[arg(long = "records-default", default_value = "data/records_default.json")]
    records_default: PathBuf,

    /// Persistent world race-program state (advances across horses)
    #[arg(long = "world-state", default_value = "data/world_state.json")]
    world_state: PathBuf,

    /// Reset the world race program back to Round 1
    #[arg(long = "reset-world")]
    reset_world: bool,

    /// Directory where retired horses are stored for breeding
    #[arg(long = "retired-dir", default_value = "retired")]
    retired_dir: PathBuf,

    /// Directory where exported .raw files are written
    #[arg(long = "export-dir", default_value = "exports")]
    export_dir: PathBuf,

    /// Launch preferences file (remembers breeder path and revision)
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let mut console = Console::auto();

    // seed=0 means "random", still printed so the run can be reproduced.
    let seed = if args.seed == 0 {
        let rolled = rand::random::<u64>() % 2_147_483_646 + 1;
        println!("(Using random seed: {rolled})");
        rolled
    } else {
        args.seed
    };

    let mut config = LaunchConfig::load(&args.config);

    let rev = match &args.rev {
        Some(text) => match Revision::from_str(text) {
            Ok(rev) => rev,
            Err(_) => {
                eprintln!("Unknown revision '{text}'. Expected one of: revA, revB, revC, revD.");
                return ExitCode::from(1);
            }
        },
        None => config.rev.unwrap_or(Revision::RevC),
    };

    // Resolve the breeder HTML: flag, then remembered config, then an
    // interactive prompt.
    let breeder_html = args
        .breeder_html
        .clone()
        .or_else(|| config.breeder_html.clone())
        .or_else(|| {
            if console.is_interactive() {
                println!(
                    "\nNo --breeder-html provided. Enter the path to DOC_Horse_Breeder_Lite_RevC_RevD.html"
                );
                let typed = console.line("Breeder HTML path: ");
                if typed.is_empty() { None } else { Some(PathBuf::from(typed)) }
            } else {
                None
            }
        });
    let Some(breeder_html) = breeder_html else {
        eprintln!(
            "breeder-html is required (provide --breeder-html or enter it when prompted)."
        );
        return ExitCode::from(2);
    };

    let opts = Options {
        seed,
        rev,
        breeder_html: breeder_html.clone(),
        max_rounds: args.max_rounds,
        save: args.save.clone(),
        save_dir: args.save_dir.clone(),
        data_dir: args.data_dir.clone(),
        load: args.load.clone(),
        reset_records: args.reset_records,
        records_state: args.records_state.clone(),
        records_default: args.records_default.clone(),
        world_state: args.world_state.clone(),
        reset_world: args.reset_world,
        retired_dir: args.retired_dir.clone(),
        export_dir: args.export_dir.clone(),
    };

    match app::run(&mut console, &opts) {
        Ok(()) => {
            // Remember the working inputs for the next launch.
            config.remember(&breeder_html, rev);
            if let Err(e) = config.save(&args.config) {
                eprintln!("(Warning: could not save launch config: {e})");
            }
            ExitCode::SUCCESS
        }
        Err(app::AppError::Roster(err)) => {
            match &err {
                RosterError::FileNotFound { .. } => eprintln!("{err}"),
                RosterError::RevisionNotFound { .. } => eprintln!("{err}"),
                other => eprintln!("Could not read breeder HTML: {other}"),
            }
            ExitCode::from(1)
        }
        Err(err) => {
            eprintln!("docsim: {err}");
            ExitCode::from(1)
        }
    }
}

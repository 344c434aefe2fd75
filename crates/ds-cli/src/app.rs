//! The career flow: menus, breeding, the per-race loop, and retirement.
//!
//! This is a line-for-line sequencing of ds-core operations; every
//! stochastic step keys its RNG stream off the global seed plus context,
//! so re-running with the same seed replays the same career.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use ds_core::breeding::{
    BirthSpec, birth_externals, breed_ac, breed_internals, derive_leg_type, floor_avg,
    parent_from_retired,
};
use ds_core::commentary::{InsightContext, birth_comment, expected_score, race_insight_lines};
use ds_core::config::ConfigError;
use ds_core::economy::format_money;
use ds_core::engine::{draw_gates, run_race_sim};
use ds_core::export::{ExportError, ensure_horse_extras, export_state_to_raw_files};
use ds_core::feeding::{apply_feeding, build_food_offering};
use ds_core::gambling::run_gambling_chance;
use ds_core::leaderboard::{render_leaderboard, top_earnings_leaderboard};
use ds_core::model::{
    BreedingExt, ExtStat, Grade, Horse, Pedigree, RaceLogEntry, Revision, Sex,
};
use ds_core::pool::{
    POOL_SIZE, RoundPool, build_round_pool, handicap_band_shift_1r, select_cpu_field,
};
use ds_core::progression::{apply_g1_win_rewards, apply_post_race_growth};
use ds_core::records::{RecordBook, RecordsError, reset_records};
use ds_core::reporting::{format_time, render_race_card, timed_results};
use ds_core::roster::{ParentHorse, RosterError, load_roster};
use ds_core::save::{
    SaveError, SaveState, WorldSnapshot, load_state, safe_filename, save_state, scan_saves,
    unique_save_path,
};
use ds_core::schedule::{RaceMeta, base_schedule};
use ds_core::surfaces::{default_surface_overrides, enrich_schedule, roll_condition};
use ds_core::training::{
    PACE_PLANS, TRAININGS, apply_training, grade_from_minigame, preferred_plans,
};
use ds_core::world::{WorldError, load_world_state, reset_world_state, save_world_state};
use ds_core::{G1_GATE, MAX_CAREER_RACES, RETIRE_ELIGIBLE_RACES, Slot};
use ds_rng::{SimRng, sim_key};

use crate::console::Console;
use crate::screens;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Records(#[from] RecordsError),
    #[error(transparent)]
    World(#[from] WorldError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Resolved launch options (CLI flags merged with the remembered config).
#[derive(Debug, Clone)]
pub struct Options {
    pub seed: u64,
    pub rev: Revision,
    pub breeder_html: PathBuf,
    pub max_rounds: u32,
    pub save: Option<PathBuf>,
    pub save_dir: PathBuf,
    pub data_dir: PathBuf,
    pub load: Option<PathBuf>,
    pub reset_records: bool,
    pub records_state: PathBuf,
    pub records_default: PathBuf,
    pub world_state: PathBuf,
    pub reset_world: bool,
    pub retired_dir: PathBuf,
    pub export_dir: PathBuf,
}

struct RetiredCandidate {
    horse: Horse,
    earnings: i64,
    races_run: u32,
}

fn load_retired_candidates(retired_dir: &Path) -> Vec<RetiredCandidate> {
    scan_saves(retired_dir)
        .into_iter()
        .map(|(_, st)| RetiredCandidate {
            horse: st.player,
            earnings: st.earnings,
            races_run: st.races_run,
        })
        .collect()
}

fn breeding_ext_of(parent: &ParentHorse) -> BreedingExt {
    BreedingExt {
        start: parent.start,
        corner: parent.corner,
        oob: parent.oob,
        competing: parent.competing,
        tenacious: parent.tenacious,
        spurt: parent.spurt,
    }
}

fn pick_parent(
    console: &mut Console,
    label: &str,
    market: &[ParentHorse],
    retired: &[RetiredCandidate],
) -> (ParentHorse, i32) {
    println!("\n=== Choose your {label} ({}) ===", market.len());
    println!("{}", screens::parent_pick_table(market));

    let use_retired = !retired.is_empty() && {
        let src = console
            .line(&format!("{label} source: (M)arket or (R)etired stable? [M]: "))
            .to_lowercase();
        src.starts_with('r')
    };

    if use_retired {
        println!("\n=== Retired {label}s (Stable) ===");
        for (i, r) in retired.iter().enumerate() {
            println!(
                "{:2}. {} ({}) | ${} | Races {} | G1 {} | Tokens {}",
                i + 1,
                r.horse.name,
                r.horse.sex,
                format_money(r.earnings),
                r.races_run,
                r.horse.g1_wins,
                r.horse.genetic_tokens
            );
        }
        let pick = console.prompt_int(
            &format!("Pick retired {} (1-{}): ", label.to_lowercase(), retired.len()),
            1,
            retired.len() as i64,
            1,
        ) as usize
            - 1;
        let chosen = &retired[pick];
        (parent_from_retired(&chosen.horse), chosen.horse.genetic_tokens)
    } else {
        let pick = console.prompt_int(
            &format!("Pick {} (1-{}): ", label.to_lowercase(), market.len()),
            1,
            market.len() as i64,
            1,
        ) as usize
            - 1;
        (market[pick].clone(), 0)
    }
}

/// Market + retired-stable breeding flow for a new player horse.
fn create_player_horse(
    console: &mut Console,
    seed: u64,
    sires: &[ParentHorse],
    dams: &[ParentHorse],
    rev: Revision,
    retired_dir: &Path,
) -> Horse {
    let mut rng = SimRng::new(sim_key!(seed, "MARKET", rev));
    let sires_pick = rng.sample(sires, 10);
    let dams_pick = rng.sample(dams, 10);

    let retired = load_retired_candidates(retired_dir);
    let stallions: Vec<RetiredCandidate> = retired
        .iter()
        .filter(|r| r.horse.sex == Sex::M)
        .map(|r| RetiredCandidate {
            horse: r.horse.clone(),
            earnings: r.earnings,
            races_run: r.races_run,
        })
        .collect();
    let mares: Vec<RetiredCandidate> = retired
        .into_iter()
        .filter(|r| r.horse.sex == Sex::F)
        .collect();

    let (sire, sire_tokens) = pick_parent(console, "Sire", &sires_pick, &stallions);
    let (dam, dam_tokens) = pick_parent(console, "Dam", &dams_pick, &mares);

    // Roll foal sex before naming so the player can pick a fitting name.
    let sex = if rng.random() < 0.5 { Sex::M } else { Sex::F };
    println!("\nFoal sex will be: {} ({sex})", sex.word());
    println!("{}", birth_comment(seed, sex, &sire, &dam));

    let name = {
        let typed = console.line("Name your foal: ");
        if typed.is_empty() {
            "Unnamed Foal".to_string()
        } else {
            typed
        }
    };

    let ints = breed_internals(&sire, &dam);
    let mut birth_rng = SimRng::new(sim_key!(seed, "BIRTH", name));
    let ext = birth_externals(
        &sire,
        &dam,
        &mut birth_rng,
        BirthSpec {
            cap_sum: 160,
            sire_tokens,
            dam_tokens,
        },
    );
    let ac = breed_ac(&sire, &dam, &mut birth_rng);
    let leg = derive_leg_type(&ext);

    let mut horse = Horse::new("PLAYER-001", name, sex, leg, ac, ints, ext);
    horse.pedigree = Pedigree {
        sire_name: Some(sire.name.clone()),
        dam_name: Some(dam.name.clone()),
        sire_ext: Some(breeding_ext_of(&sire)),
        dam_ext: Some(breeding_ext_of(&dam)),
        breeding_ext: Some(BreedingExt {
            start: floor_avg(sire.start, dam.start),
            corner: floor_avg(sire.corner, dam.corner),
            oob: floor_avg(sire.oob, dam.oob),
            competing: floor_avg(sire.competing, dam.competing),
            tenacious: floor_avg(sire.tenacious, dam.tenacious),
            spurt: floor_avg(sire.spurt, dam.spurt),
        }),
    };
    ensure_horse_extras(&mut horse, seed);

    println!(
        "\nFoal created: {} ({}) {} [{}]  AC={}",
        horse.name,
        horse.sex,
        horse.leg.label(),
        horse.leg,
        horse.ac
    );
    println!(
        "Internals ST/SP/SH: {}/{}/{}",
        horse.internals.stamina, horse.internals.speed, horse.internals.sharp
    );
    println!("Externals:");
    println!("{}", screens::stable_card(&horse, None));
    horse
}

/// Pre-race training. Returns (training index, grade); `None` when the
/// player skips.
fn training_flow(
    console: &mut Console,
    seed: u64,
    meet_iter: u64,
    race: &RaceMeta,
    player: &mut Horse,
) -> (Option<usize>, Grade) {
    if !console.confirm("Train before race? (y/N): ", false) {
        println!("No training.");
        return (None, Grade::None);
    }

    let names: Vec<&str> = TRAININGS.iter().map(|t| t.name).collect();
    let idx = console.prompt_choice("Choose training:", &names, 0);

    // The pace plan is not user-selectable; it still rolls deterministically
    // and feeds the grade minigame.
    let mut plan_rng = SimRng::new(sim_key!(
        seed, "TRAIN_PLAN", race.round_num, race.slot, meet_iter, idx
    ));
    let plan = PACE_PLANS[plan_rng.randint(0, PACE_PLANS.len() as i64 - 1) as usize];

    let mut grade_rng = SimRng::new(sim_key!(
        seed, "TRAIN_GRADE", race.round_num, race.slot, meet_iter, idx
    ));
    let preferred = preferred_plans(&TRAININGS[idx], player.leg);
    let grade = grade_from_minigame(&mut grade_rng, plan, preferred);

    let mut delta_rng = SimRng::new(sim_key!(
        seed, "TRAIN_DELTA", race.round_num, race.slot, meet_iter, idx
    ));
    let tr = apply_training(player, idx, grade, &mut delta_rng);
    println!("Training: {} | Plan: {plan} (auto) => {grade}", tr.training_name);
    if tr.deltas.values().any(|d| *d != 0) {
        println!("{}", screens::stable_card(player, Some(&tr.deltas)));
    }
    player.last_training = Some(tr);
    (Some(idx), grade)
}

/// Feeding always happens, trained or not.
fn feeding_flow(
    console: &mut Console,
    seed: u64,
    meet_iter: u64,
    race: &RaceMeta,
    player: &mut Horse,
    training_index: Option<usize>,
    grade: Grade,
) {
    let (prim, sec): (&[ExtStat], &[ExtStat]) = match training_index {
        Some(idx) => (TRAININGS[idx].primary, TRAININGS[idx].secondary),
        None => (&[], &[]),
    };
    let offered = build_food_offering(
        seed,
        meet_iter,
        race.round_num,
        race.slot,
        grade,
        prim,
        player,
        5,
    );
    println!("\nFeeding Phase: choose a meal");
    for (i, f) in offered.iter().enumerate() {
        println!("  {}. {f}", i + 1);
    }
    let choice =
        console.prompt_int("Select food (1-5): ", 1, offered.len() as i64, 1) as usize - 1;
    let chosen = offered[choice].clone();
    let mut fr = apply_feeding(
        seed,
        meet_iter,
        race.round_num,
        race.slot,
        grade,
        prim,
        sec,
        player,
        &chosen,
    );
    fr.foods_offered = offered;
    println!("You fed: {chosen}");
    if !fr.notes.is_empty() {
        println!("{}", fr.notes);
    }
    println!("{}", screens::stable_card(player, Some(&fr.deltas)));
    player.last_feeding = Some(fr);
}

/// Export menu over saved and retired horses.
fn export_saved_horse_menu(
    console: &mut Console,
    save_dir: &Path,
    retired_dir: &Path,
    export_dir: &Path,
) -> Result<(), AppError> {
    let mut candidates: Vec<(PathBuf, &'static str, SaveState)> = Vec::new();
    for (path, st) in scan_saves(save_dir) {
        candidates.push((path, "SAVE", st));
    }
    for (path, st) in scan_saves(retired_dir) {
        candidates.push((path, "RETIRED", st));
    }

    if candidates.is_empty() {
        println!("\nNo save/retired files found to export.");
        return Ok(());
    }

    println!("\n=== Export a Saved Horse ===");
    for (i, (_, label, st)) in candidates.iter().enumerate() {
        println!(
            "  {}. {} ({}) | ${} | Races {} [{label}]",
            i + 1,
            st.player.name,
            st.player.sex,
            format_money(st.earnings),
            st.races_run
        );
    }

    let choice = console.line("Pick a save number, or press Enter to cancel: ");
    if choice.is_empty() {
        return Ok(());
    }
    let Ok(idx) = choice.parse::<usize>() else {
        println!("Invalid selection.");
        return Ok(());
    };
    if idx == 0 || idx > candidates.len() {
        println!("Invalid selection.");
        return Ok(());
    }

    let (_, _, state) = &candidates[idx - 1];
    let (raw_path, manifest_path) = export_state_to_raw_files(state, export_dir)?;
    println!("\nExport complete");
    println!("  RAW:      {}", raw_path.display());
    println!("  Manifest: {}", manifest_path.display());
    Ok(())
}

enum MenuAction {
    Play,
    Quit,
}

fn main_menu(console: &mut Console, opts: &Options) -> Result<MenuAction, AppError> {
    loop {
        screens::clear_screen();
        println!("{}", screens::splash(env!("CARGO_PKG_VERSION")));
        println!("=== Main Menu ===");
        println!("  1. Play");
        println!("  2. Leaderboard");
        println!("  3. Export Saved Horse (.raw)");
        println!("  Q. Quit");
        let sel = console.line("Select [1]: ").to_lowercase();
        match sel.as_str() {
            "" | "1" | "p" | "play" => return Ok(MenuAction::Play),
            "2" | "l" | "leaderboard" | "board" | "lb" => {
                let (title, entries) = top_earnings_leaderboard(
                    &opts.save_dir,
                    &opts.retired_dir,
                    opts.seed,
                    &opts.data_dir,
                    25,
                );
                println!("\n{}", render_leaderboard(&title, &entries));
                console.pause("\nPress Enter to return to the main menu: ");
            }
            "3" | "e" | "export" => {
                export_saved_horse_menu(
                    console,
                    &opts.save_dir,
                    &opts.retired_dir,
                    &opts.export_dir,
                )?;
                console.pause("\nPress Enter to return to the main menu: ");
            }
            s if s.starts_with('q') => {
                println!("Goodbye.");
                return Ok(MenuAction::Quit);
            }
            _ => {}
        }
    }
}

/// Interactive load-save picker. Returns the chosen path, or None for a
/// new horse.
fn load_menu(console: &mut Console, save_dir: &Path) -> Option<PathBuf> {
    loop {
        let choice = console
            .line("Start (N)ew horse or (L)oad save? [N]: ")
            .to_lowercase();
        if !choice.starts_with('l') {
            return None;
        }

        let saves = scan_saves(save_dir);
        if saves.is_empty() {
            println!("No save files found in {}. Starting a new horse.", save_dir.display());
            return None;
        }

        println!("\n=== Load a Saved Horse ===");
        for (idx, (_path, st)) in saves.iter().enumerate() {
            let suffix = if st.retired { " [Retired]" } else { "" };
            println!(
                " {}. {} ({}) | ${} | Races {}{}",
                idx + 1,
                st.player.name,
                st.player.sex,
                format_money(st.earnings),
                st.races_run,
                suffix
            );
        }

        let sel = console.line(&format!(
            "Pick save (1-{}), or press Enter to cancel: ",
            saves.len()
        ));
        if sel.is_empty() {
            return None;
        }
        if let Ok(k) = sel.parse::<usize>() {
            if k >= 1 && k <= saves.len() {
                let (path, st) = &saves[k - 1];
                if st.retired {
                    println!(
                        "That horse is retired and cannot be loaded for racing.\n\
                         Tip: start a new foal and select it as a retired sire/dam."
                    );
                    continue;
                }
                return Some(path.clone());
            }
        }
    }
}

/// Archive a retired horse's final state into the retired pool.
fn archive_retired_copy(retired_dir: &Path, save_path: &Path, state: &SaveState) {
    let base = safe_filename(&state.player.name);
    let mut target = retired_dir.join(format!("{base}.json"));
    let mut n = 2;
    while target.exists() && target != save_path {
        target = retired_dir.join(format!("{base}_{n}.json"));
        n += 1;
    }
    match save_state(&target, state) {
        Ok(()) => println!("(Retired horse archived: {})", target.display()),
        Err(e) => println!("(Warning: could not archive retired horse: {e})"),
    }
}

/// Run the game with resolved options.
pub fn run(console: &mut Console, opts: &Options) -> Result<(), AppError> {
    let (sires, dams) = load_roster(&opts.breeder_html, opts.rev)?;

    // Records: live state plus the shipped defaults for surface inference.
    if opts.reset_records {
        reset_records(&opts.records_state, &opts.records_default, opts.seed)?;
    }
    let mut records = RecordBook::load(&opts.records_state, &opts.records_default);
    let record_surfaces =
        RecordBook::load(&opts.records_default, &opts.records_default).surfaces_map();

    // World (cross-horse) race program.
    let mut world = if opts.reset_world {
        reset_world_state(&opts.world_state)?
    } else {
        load_world_state(&opts.world_state)
    };

    std::fs::create_dir_all(&opts.retired_dir).ok();
    std::fs::create_dir_all(&opts.export_dir).ok();

    let schedule = enrich_schedule(
        base_schedule(),
        &record_surfaces,
        &default_surface_overrides(),
    );

    let mut load_path = opts.load.clone();
    if load_path.is_none() && console.is_interactive() {
        match main_menu(console, opts)? {
            MenuAction::Quit => return Ok(()),
            MenuAction::Play => {}
        }
        load_path = load_menu(console, &opts.save_dir);
    }

    let mut seed = opts.seed;
    let mut rev = opts.rev;
    let mut earnings: i64 = 0;
    let mut races_run: u32 = 0;
    let mut meet_iter: u64 = 1;
    let mut start_round: u32 = world.current_round;
    let mut save_path: Option<PathBuf> = None;
    let mut retired_flag = false;
    let mut retired_reason: Option<String> = None;

    let mut player = match &load_path {
        Some(path) => match load_state(path)? {
            Some(state) if state.retired => {
                println!(
                    "This horse is retired and cannot be loaded for racing.\n\
                     Tip: start a new foal and select it as a retired sire/dam."
                );
                return Ok(());
            }
            Some(state) => {
                // Continuity: the save's seed/rev win over the flags.
                seed = state.seed;
                rev = state.rev;
                earnings = state.earnings;
                races_run = state.races_run;
                meet_iter = state.meet_iter;
                start_round = state.round_num;
                retired_reason = state.retired_reason.clone();
                // The world never goes backwards; a save that is ahead
                // (hand-edited) pulls the world forward instead.
                if start_round < world.current_round {
                    start_round = world.current_round;
                } else if start_round > world.current_round {
                    world.current_round = start_round;
                    world.race_index = 0;
                    save_world_state(&opts.world_state, &world)?;
                }
                save_path = Some(path.clone());
                println!(
                    "Loaded save from {}. (Seed: {seed} | Next round: {start_round})",
                    path.display()
                );
                state.player
            }
            None => {
                println!(
                    "Could not load save file: {}. Starting a new horse instead.",
                    path.display()
                );
                create_player_horse(console, seed, &sires, &dams, rev, &opts.retired_dir)
            }
        },
        None => create_player_horse(console, seed, &sires, &dams, rev, &opts.retired_dir),
    };

    let save_path = match (&opts.save, save_path) {
        (Some(explicit), _) => explicit.clone(),
        (None, Some(loaded)) => loaded,
        (None, None) => {
            std::fs::create_dir_all(&opts.save_dir).ok();
            unique_save_path(&opts.save_dir, &player.name)
        }
    };
    println!("(Save file: {})", save_path.display());

    let mut streak_oom: u32 = 0;
    // Anti-runaway difficulty scaler.
    let mut difficulty_offset: f64 = 0.0;

    macro_rules! build_state {
        ($next_round:expr) => {
            SaveState {
                seed,
                rev,
                round_num: $next_round,
                meet_iter,
                earnings,
                races_run,
                retired: retired_flag,
                retired_reason: retired_reason.clone(),
                player: player.clone(),
                world: Some(WorldSnapshot {
                    current_round: world.current_round,
                    cycle: world.cycle,
                }),
                saved_at: None,
                retire_note: None,
                retire_poem: None,
                retire_tier: None,
            }
        };
    }

    // The save exists from the moment the horse does.
    save_state(&save_path, &build_state!(start_round))?;

    let rounds_to_play = opts.max_rounds.clamp(1, 16);
    let mut current_round = start_round;
    let mut stop_after_round;

    for _ in 0..rounds_to_play {
        if console.is_interactive() {
            let cmd = console
                .line(&format!(
                    "\nNext up: ROUND {current_round}. Press Enter to play, or (Q)uit: "
                ))
                .to_lowercase();
            if cmd.starts_with('q') {
                break;
            }
        }

        println!("\n====================\nROUND {current_round}\n====================");
        let mut pool: RoundPool =
            build_round_pool(seed, current_round, &sires, &dams, &opts.data_dir, POOL_SIZE);

        let round_earnings_start = earnings;
        let round_stat_start = player.externals;
        let mut best_finish_this_round: u32 = 99;
        let mut best_race_name = String::new();
        stop_after_round = false;

        let round_schedule = &schedule[(current_round - 1) as usize];
        let start_race_idx = if world.current_round == current_round {
            world.race_index.min(round_schedule.len() - 1)
        } else {
            // Keep the world aligned with the round we are about to play.
            world.current_round = current_round;
            world.race_index = 0;
            save_world_state(&opts.world_state, &world)?;
            0
        };
        if start_race_idx > 0 {
            println!(
                "(Resuming Round {current_round} at race {}/{})",
                start_race_idx + 1,
                round_schedule.len()
            );
        }

        for race_idx in start_race_idx..round_schedule.len() {
            let race = &round_schedule[race_idx];
            // The world pointer always tracks the next race to run.
            world.race_index = race_idx;
            // Stable world-scoped key for this specific race: keeps
            // matchups and conditions fixed when switching horses.
            let world_iter = world.race_iter(current_round, race_idx);
            let title = race.title();
            println!("\n--- {title} ---");
            println!(
                "Winner purse: ${} | Earnings: ${} | Races: {races_run}/{MAX_CAREER_RACES}",
                format_money(race.winner_purse),
                format_money(earnings)
            );

            let cmd = console.line("Enter to continue, or (P)rofile: ").to_lowercase();
            if cmd == "p" {
                println!("\n{}", screens::profile(&player, earnings, races_run));
                console.pause("Press Enter to continue...");
            }

            let (tr_idx, grade) = training_flow(console, seed, meet_iter, race, &mut player);
            feeding_flow(console, seed, meet_iter, race, &mut player, tr_idx, grade);

            println!("\nNext race: {title}");
            let condition = roll_condition(seed, world_iter, race.round_num, race.slot, race.surface);
            println!("Track condition revealed: {condition}");

            let mut band_shift =
                if streak_oom >= 5 { -0.05 } else { 0.0 } + difficulty_offset;

            // 1R difficulty scaling: successful horses draw tougher
            // opening fields.
            let mut one_r_shift = 0.0;
            let mut one_r_wins = 0;
            let mut one_r_pct = 0.0;
            if race.slot == Slot::R1 {
                (one_r_shift, one_r_wins, one_r_pct) =
                    handicap_band_shift_1r(&player, &pool.horses);
                band_shift += one_r_shift;
            }

            // G1 gate: short bankrolls play the Gambling Chance instead.
            if race.slot == Slot::G1 && earnings < G1_GATE {
                println!(
                    "G1 entry requires ${}. You have ${}.",
                    format_money(G1_GATE),
                    format_money(earnings)
                );
                let q = console
                    .line("Press Enter to run Gambling Chance, or (Q)uit & save: ")
                    .to_lowercase();
                if q.starts_with('q') {
                    save_state(&save_path, &build_state!(current_round))?;
                    save_world_state(&opts.world_state, &world)?;
                    println!("Saved. You can load another horse and continue from this race.");
                    return Ok(());
                }
                println!("Gambling Chance round (pick the winner).");
                let cpu12 =
                    select_cpu_field(seed, &mut pool, Slot::G1, world_iter, 12, band_shift);

                let preview = run_gambling_chance(
                    seed,
                    world_iter,
                    race.round_num,
                    race.slot,
                    &cpu12,
                    &cpu12[0].id,
                );
                for (i, h) in cpu12.iter().enumerate() {
                    let name: String = h.name.chars().take(26).collect();
                    println!(
                        "{:2}. {:<26} [{}] odds ~ {:.2}",
                        i + 1,
                        name,
                        h.leg,
                        preview.odds_by_horse[&h.id]
                    );
                }

                let pick_idx =
                    console.prompt_int("Pick winner (1-12): ", 1, cpu12.len() as i64, 1) as usize - 1;
                let res = run_gambling_chance(
                    seed,
                    world_iter,
                    race.round_num,
                    race.slot,
                    &cpu12,
                    &cpu12[pick_idx].id,
                );

                let name_of = |id: &str| {
                    cpu12
                        .iter()
                        .find(|h| h.id == id)
                        .map(|h| h.name.clone())
                        .unwrap_or_default()
                };
                println!(
                    "Winner: {} | Your pick: {}",
                    name_of(&res.winner_horse_id),
                    name_of(&res.picked_horse_id)
                );
                if res.won {
                    println!("You won ${}!", format_money(res.payout));
                    earnings += res.payout;
                } else {
                    println!("No payout.");
                }

                save_state(&save_path, &build_state!(current_round))?;
                if race_idx + 1 >= round_schedule.len() {
                    world.advance_rounds(1);
                } else {
                    world.race_index = race_idx + 1;
                }
                save_world_state(&opts.world_state, &world)?;
                continue;
            }

            // Normal race.
            let cpu11 = select_cpu_field(seed, &mut pool, race.slot, world_iter, 11, band_shift);

            println!();
            if race.slot == Slot::R1 && one_r_shift > 0.0 {
                println!(
                    "1R Handicap: field strength +{one_r_shift:.2} (Wins: {one_r_wins} | Power: {:.0}th pct)",
                    one_r_pct * 100.0
                );
            }
            let runners: Vec<&Horse> = std::iter::once(&player).chain(cpu11.iter()).collect();
            let gate_by_id = draw_gates(seed, world_iter, race, condition, &runners);
            println!(
                "{}",
                ds_core::handicapping::render_handicapping_table(
                    &runners,
                    &gate_by_id,
                    race,
                    condition
                )
            );

            println!("\nNext race: {title}");
            println!("Track condition: {condition}");
            let cmd = console
                .line("Enter race? (Enter to run, S to skip, Q to quit & save): ")
                .to_lowercase();
            if cmd.starts_with('q') {
                save_state(&save_path, &build_state!(current_round))?;
                save_world_state(&opts.world_state, &world)?;
                println!("Saved. You can load another horse and continue from this race.");
                return Ok(());
            }
            if cmd.starts_with('s') {
                println!("\nYou skipped this race.");
                // Advance the program without touching earnings or counts.
                save_state(&save_path, &build_state!(current_round))?;
                if race_idx + 1 >= round_schedule.len() {
                    world.advance_rounds(1);
                } else {
                    world.race_index = race_idx + 1;
                }
                save_world_state(&opts.world_state, &world)?;
                continue;
            }

            // Expected rank on paper, for post-race commentary only.
            let mut expected: Vec<(f64, &str)> = runners
                .iter()
                .map(|h| {
                    let gate = gate_by_id.get(&h.id).copied().unwrap_or(1);
                    (expected_score(h, race, condition, gate), h.id.as_str())
                })
                .collect();
            expected.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
            let expected_rank = expected
                .iter()
                .position(|(_, id)| *id == player.id)
                .map(|i| i as u32 + 1)
                .unwrap_or(runners.len() as u32);

            let sim = run_race_sim(seed, world_iter, race, condition, &runners, Some(&gate_by_id));
            let by_id: HashMap<&str, &Horse> =
                runners.iter().map(|h| (h.id.as_str(), *h)).collect();
            let timed = timed_results(
                race,
                condition,
                &sim.finish_order,
                &sim.scores,
                &by_id,
                &mut records,
            );

            println!("\n{}", render_race_card(race, condition, &timed, &sim.payouts_by_pos));

            let player_row = timed
                .runners
                .iter()
                .find(|r| r.horse_id == player.id)
                .cloned()
                .unwrap_or_else(|| timed.runners[timed.runners.len() - 1].clone());
            let pos = player_row.pos;
            let payout = sim.payouts_by_pos.get(&pos).copied().unwrap_or(0);
            println!(
                "\nYour finish: {pos}/{} | Time: {} | {:.1}L | Payout: ${}",
                runners.len(),
                format_time(player_row.time_seconds),
                player_row.lengths_behind,
                format_money(payout)
            );

            let gate = gate_by_id.get(&player.id).copied().unwrap_or(1);
            for msg in race_insight_lines(
                seed,
                &player,
                race,
                condition,
                &InsightContext {
                    expected_rank,
                    actual_pos: pos,
                    gate,
                },
            ) {
                println!("\nTrainer's Comment: {msg}");
            }

            earnings += payout;
            races_run += 1;

            if pos < best_finish_this_round {
                best_finish_this_round = pos;
                best_race_name = race.display_name();
            }
            if pos <= 3 {
                streak_oom = 0;
            } else {
                streak_oom += 1;
            }

            // Anti-runaway difficulty: strengthen or ease future fields
            // based on recent form, clamped to stay fair.
            difficulty_offset += match pos {
                1 => 0.03,
                2 => 0.02,
                3 => 0.01,
                p if p >= 10 => -0.03,
                p if p >= 7 => -0.02,
                _ => -0.01,
            };
            difficulty_offset = difficulty_offset.clamp(-0.08, 0.10);

            let growth = apply_post_race_growth(seed, meet_iter, race, &mut player, pos);
            if !growth.is_empty() {
                let parts: Vec<String> =
                    growth.iter().map(|(k, v)| format!("{k}: +{v}")).collect();
                println!("Internal growth: {}", parts.join(", "));
            }

            if race.slot == Slot::G1 && apply_g1_win_rewards(&mut player, pos) {
                println!(
                    "G1 Win recorded! (A special food is guaranteed in next round's 1R feeding.)"
                );
            }

            player.career_log.push(RaceLogEntry {
                round_num: race.round_num,
                slot: race.slot,
                race_name: race.name.unwrap_or("").to_string(),
                track: race.track.to_string(),
                course_code: race.course_code.to_string(),
                surface: race.surface,
                condition,
                distance: race.distance,
                winner_time: timed.winner_time,
                player_pos: pos,
                player_time: player_row.time_seconds,
                player_lengths: player_row.lengths_behind,
                payout,
                earnings_total_after: earnings,
                field: timed.runners.clone(),
            });

            records.save(&opts.records_state)?;
            // Save after each race with the same round number so a crash
            // never skips ahead.
            save_state(&save_path, &build_state!(current_round))?;

            if race_idx + 1 >= round_schedule.len() {
                world.advance_rounds(1);
            } else {
                world.race_index = race_idx + 1;
            }
            save_world_state(&opts.world_state, &world)?;

            if races_run >= MAX_CAREER_RACES {
                retired_flag = true;
                retired_reason = Some("forced_64".to_string());
                println!("Reached {MAX_CAREER_RACES} races. Forced retirement.");
                stop_after_round = true;
                break;
            }
        }

        // Round summary.
        let round_earnings = earnings - round_earnings_start;
        println!("\n=== Round Summary ===");
        println!(
            "Round {current_round} earnings: ${} | Best finish: {best_finish_this_round} ({best_race_name})",
            format_money(round_earnings)
        );
        println!("External changes this round:");
        let mut deltas = ds_core::model::ExtDeltas::new();
        for stat in ExtStat::ALL {
            let d = player.externals.get(stat) - round_stat_start.get(stat);
            if d != 0 {
                deltas.insert(stat, d);
            }
        }
        println!("{}", screens::stable_card(&player, Some(&deltas)));

        // Retirement prompt between rounds, once eligible.
        if !retired_flag
            && races_run >= RETIRE_ELIGIBLE_RACES
            && console.is_interactive()
            && console.confirm("You may retire now. Retire horse? (y/N): ", false)
        {
            retired_flag = true;
            retired_reason = Some("player_choice".to_string());
            stop_after_round = true;
        }

        meet_iter += 1;

        let next_round = if current_round >= 16 { 1 } else { current_round + 1 };
        let mut final_state = build_state!(next_round);
        save_state(&save_path, &final_state)?;

        if retired_flag {
            let poem =
                ds_core::commentary::retirement_poem_lines(seed, &player, earnings, races_run);
            let (tier_sym, tier_label) = screens::retirement_tier(earnings, player.g1_wins);
            final_state.retire_note = Some(format!(
                "Retired at ${} after {races_run} races. G1 wins: {}.",
                format_money(earnings),
                player.g1_wins
            ));
            final_state.retire_poem = Some(poem.join("\n"));
            final_state.retire_tier = Some(format!("{tier_sym} {tier_label}"));

            // Archive into the retired pool, then drop the active save so
            // the horse cannot race again.
            archive_retired_copy(&opts.retired_dir, &save_path, &final_state);
            let _ = std::fs::remove_file(&save_path);

            screens::clear_screen();
            println!("{}", screens::retirement_card(&player, earnings, races_run, &poem));
            console.pause("Press Enter to continue...");
            return Ok(());
        }

        current_round = next_round;
        if stop_after_round {
            break;
        }
    }

    println!("\n=== Career Summary ===");
    println!(
        "Horse: {} ({}) [{}] AC={}",
        player.name, player.sex, player.leg, player.ac
    );
    println!(
        "Races: {races_run} | Earnings: ${}",
        format_money(earnings)
    );
    println!(
        "Internals ST/SP/SH: {}/{}/{}",
        player.internals.stamina, player.internals.speed, player.internals.sharp
    );
    println!("Externals:");
    println!("{}", screens::stable_card(&player, None));
    println!(
        "G1 wins: {} | Genetic tokens: {}",
        player.g1_wins, player.genetic_tokens
    );
    println!("Save file: {}", save_path.display());
    Ok(())
}

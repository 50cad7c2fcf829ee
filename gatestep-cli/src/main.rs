use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use gatestep_audio::SeqInputs;
use gatestep_core::{load_patch, render, save_patch, write_wav, Config, RenderSettings};
use gatestep_types::reduce::reduce_action;
use gatestep_types::{EditMode, GateMode, PanelParams, SequencerAction, SequencerState, MAX_STEPS};

const USAGE: &str = "usage: gatestep <command> [args] [--verbose|-v]

commands:
  init <patch>                          write a default patch
  show <patch>                          print the pattern
  toggle <patch> <step>                 flip one step's gate (steps are 1-16)
  mode <patch> <trigger|retrigger|gate> set the gate mode
  clear <patch>                         turn every gate off
  randomize <patch> [--seed N]          turn each gate on with probability 1/2
  render <patch> <out.wav> [--seconds S] [--ext-clock-hz F]
                                        render pitch and gate to a stereo WAV";

fn init_logging(verbose: bool) {
    use simplelog::{LevelFilter, WriteLogger};

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("gatestep")
        .join("gatestep.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(file) => file,
        Err(_) => match File::create(std::env::temp_dir().join("gatestep.log")) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("gatestep: logging disabled, cannot create log file: {}", e);
                return;
            }
        },
    };

    if WriteLogger::init(log_level, simplelog::Config::default(), log_file).is_err() {
        eprintln!("gatestep: logger already initialized");
        return;
    }

    log::info!("gatestep starting (log level: {:?})", log_level);
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    init_logging(verbose);

    let args: Vec<String> = args
        .into_iter()
        .filter(|a| a != "--verbose" && a != "-v")
        .collect();

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        eprintln!("gatestep: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let Some(command) = args.first() else {
        return Err(format!("missing command\n\n{}", USAGE));
    };
    let rest = &args[1..];
    let config = Config::load();

    match command.as_str() {
        "init" => cmd_init(&config, patch_arg(rest)?),
        "show" => cmd_show(patch_arg(rest)?),
        "toggle" => {
            let step = positional(rest, 1, "step")?;
            let step: usize = step
                .parse()
                .map_err(|_| format!("step must be a number from 1 to {}, got '{}'", MAX_STEPS, step))?;
            if step == 0 || step > MAX_STEPS {
                return Err(format!("step must be from 1 to {}, got {}", MAX_STEPS, step));
            }
            edit_patch(patch_arg(rest)?, SequencerAction::ToggleGate(step - 1))
        }
        "mode" => {
            let name = positional(rest, 1, "gate mode")?;
            let mode = GateMode::from_name(name)
                .ok_or_else(|| format!("unknown gate mode '{}' (trigger, retrigger, gate)", name))?;
            edit_patch(patch_arg(rest)?, SequencerAction::SetGateMode(mode))
        }
        "clear" => edit_patch(patch_arg(rest)?, SequencerAction::ClearGates),
        "randomize" => {
            let seed = match flag_value(rest, "--seed") {
                Some(s) => s
                    .parse()
                    .map_err(|_| format!("--seed must be an unsigned integer, got '{}'", s))?,
                None => time_seed(),
            };
            log::debug!("randomizing with seed {}", seed);
            edit_patch(patch_arg(rest)?, SequencerAction::RandomizeGates { seed })
        }
        "render" => cmd_render(&config, rest),
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => Err(format!("unknown command '{}'\n\n{}", other, USAGE)),
    }
}

fn cmd_init(config: &Config, path: &Path) -> Result<(), String> {
    save_patch(path, &config.default_params(), &config.default_state())
        .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
    println!("wrote {}", path.display());
    Ok(())
}

fn cmd_show(path: &Path) -> Result<(), String> {
    let (params, state) = open_patch(path)?;

    println!("transport: {:?}", state.run_state());
    println!("gate mode: {}", state.gate_mode);
    println!("steps:     {}", params.steps.round());
    println!("clock:     {:.2}", params.clock);
    println!("gates:     {}", gate_row(&state.gates));
    let pitches: Vec<String> = params.pitches.iter().map(|p| format!("{:.2}", p)).collect();
    println!("pitches:   {}", pitches.join(" "));
    Ok(())
}

fn cmd_render(config: &Config, rest: &[String]) -> Result<(), String> {
    let patch = patch_arg(rest)?;
    let out = PathBuf::from(positional(rest, 1, "output WAV path")?);
    let mut settings = RenderSettings::from_config(config);

    if let Some(s) = flag_value(rest, "--seconds") {
        let secs: f32 = s
            .parse()
            .map_err(|_| format!("--seconds must be a number, got '{}'", s))?;
        if !secs.is_finite() || secs <= 0.0 {
            return Err(format!("--seconds must be positive, got {}", s));
        }
        settings.seconds = secs;
    }
    if let Some(s) = flag_value(rest, "--ext-clock-hz") {
        let hz: f32 = s
            .parse()
            .map_err(|_| format!("--ext-clock-hz must be a number, got '{}'", s))?;
        if !hz.is_finite() || hz <= 0.0 {
            return Err(format!("--ext-clock-hz must be positive, got {}", s));
        }
        settings.ext_clock_hz = Some(hz);
    }

    let (params, state) = open_patch(patch)?;
    let rendered = render(&params, &state, &SeqInputs::default(), &settings);
    write_wav(&out, &rendered, settings.sample_rate)?;

    println!(
        "wrote {} ({} frames, {} steps)",
        out.display(),
        rendered.frames.len(),
        rendered.steps.len()
    );
    if rendered.telemetry.overruns > 0 {
        println!(
            "{} of {} blocks took longer than real time",
            rendered.telemetry.overruns, rendered.telemetry.blocks
        );
    }
    Ok(())
}

/// Load, apply one action, save.
fn edit_patch(path: &Path, action: SequencerAction) -> Result<(), String> {
    let (params, mut state) = open_patch(path)?;
    let mut edit_mode = EditMode::default();
    let changed = reduce_action(&action, &mut state, &mut edit_mode);
    if !changed {
        log::debug!("{:?} left {} unchanged", action, path.display());
    }
    save_patch(path, &params, &state).map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
    println!("{}", pattern_line(&state.gates, state.gate_mode));
    Ok(())
}

fn open_patch(path: &Path) -> Result<(PanelParams, SequencerState), String> {
    load_patch(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))
}

fn gate_row(gates: &[bool; MAX_STEPS]) -> String {
    gates.iter().map(|&g| if g { 'X' } else { '.' }).collect()
}

fn pattern_line(gates: &[bool; MAX_STEPS], mode: GateMode) -> String {
    format!("{} [{}]", gate_row(gates), mode)
}

/// The nth argument that is neither a flag nor a flag's value.
fn positional<'a>(args: &'a [String], n: usize, what: &str) -> Result<&'a str, String> {
    let mut skip_next = false;
    let mut found = 0;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = true;
            continue;
        }
        if found == n {
            return Ok(arg.as_str());
        }
        found += 1;
    }
    Err(format!("missing {}\n\n{}", what, USAGE))
}

fn patch_arg(args: &[String]) -> Result<&Path, String> {
    positional(args, 0, "patch path").map(Path::new)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

use calorieko_core::chart::ChartGeometry;
use calorieko_core::journal::entries_on;
use calorieko_core::met::activities_in;
use calorieko_core::metrics::{daily_net_totals, estimate_tdee, speed_kmh};
use calorieko_core::onboarding::{self, OnboardingAction};
use calorieko_core::profile::UserProfile;
use calorieko_core::sequencer::{
    self, CancelToken, DecisionSource, FixedDecision, InstantScheduler, PairingEvent,
    PairingMachine, RandomDecision, ScanEvent, ScanMachine, Scheduler, ThreadScheduler,
};
use calorieko_core::*;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "calorieko")]
#[command(about = "CalorieKo nutrition and fitness calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the onboarding wizard non-interactively and save the profile
    Onboard {
        #[arg(long)]
        age: u32,
        #[arg(long, value_enum)]
        sex: SexArg,
        #[arg(long)]
        height: f64,
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        calorie_target: Option<u32>,
        #[arg(long)]
        sodium_target: Option<u32>,
    },

    /// Body mass index (defaults to the saved profile)
    Bmi {
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
    },

    /// Estimate calories burned for an activity
    Burn {
        /// Activity name from the MET table
        #[arg(long, conflicts_with = "met", required_unless_present = "met")]
        activity: Option<String>,
        /// Explicit MET coefficient
        #[arg(long)]
        met: Option<f64>,
        #[arg(long)]
        minutes: f64,
        /// Body weight in kg (defaults to the saved profile)
        #[arg(long)]
        weight: Option<f64>,
    },

    /// Pace and speed for a tracked run
    Pace {
        #[arg(long)]
        distance_km: f64,
        #[arg(long)]
        seconds: u64,
    },

    /// Add a meal or workout to the journal
    Log {
        #[command(subcommand)]
        entry: LogCommand,
    },

    /// Today's dashboard numbers
    Summary {
        /// Use the built-in sample day instead of the journal
        #[arg(long)]
        demo: bool,
    },

    /// Daily net calories for the last seven days
    Week {
        /// Use the built-in sample week instead of the journal
        #[arg(long)]
        demo: bool,
    },

    /// Chart geometry as JSON
    Chart {
        #[arg(long, value_enum)]
        kind: ChartKindArg,
        /// CSV file with label,value rows (defaults to the sample week)
        #[arg(long, conflicts_with = "from_journal")]
        csv: Option<PathBuf>,
        /// Chart per-day totals from the activity journal
        #[arg(long)]
        from_journal: bool,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        /// Include bar rectangles at this slot width ratio
        #[arg(long)]
        bars: Option<f64>,
    },

    /// Export per-day totals from the journal to CSV
    Export {
        #[arg(long)]
        output: PathBuf,
    },

    /// List the MET reference table
    Met {
        /// Only show one category
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
    },

    /// Run the smart-scale pairing sequence
    Pair {
        /// Skip the delays
        #[arg(long)]
        instant: bool,
    },

    /// Run the meal-scan sequence
    Scan {
        /// Skip the delays
        #[arg(long)]
        instant: bool,
        /// Seed the success roll for reproducible runs
        #[arg(long, conflicts_with = "outcome")]
        seed: Option<u64>,
        /// Force the outcome
        #[arg(long, value_enum)]
        outcome: Option<OutcomeArg>,
    },
}

#[derive(Subcommand)]
enum LogCommand {
    Meal {
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = clap::value_parser!(i32).range(0..=ActivityLogEntry::MAX_CALORIES as i64))]
        calories: i32,
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=ActivityLogEntry::MAX_SODIUM_MG as i64))]
        sodium: u32,
        #[arg(long, default_value = "")]
        detail: String,
    },
    Workout {
        /// Activity name from the MET table
        #[arg(long)]
        activity: String,
        #[arg(long)]
        minutes: f64,
        /// Body weight in kg (defaults to the saved profile)
        #[arg(long)]
        weight: Option<f64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SexArg {
    Male,
    Female,
}

impl From<SexArg> for Sex {
    fn from(arg: SexArg) -> Self {
        match arg {
            SexArg::Male => Sex::Male,
            SexArg::Female => Sex::Female,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ChartKindArg {
    Calorie,
    Sodium,
    Weight,
}

impl From<ChartKindArg> for SeriesKind {
    fn from(arg: ChartKindArg) -> Self {
        match arg {
            ChartKindArg::Calorie => SeriesKind::Calorie,
            ChartKindArg::Sodium => SeriesKind::Sodium,
            ChartKindArg::Weight => SeriesKind::Weight,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Cardio,
    Strength,
    Sports,
    Daily,
}

impl From<CategoryArg> for MetCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Cardio => MetCategory::Cardio,
            CategoryArg::Strength => MetCategory::Strength,
            CategoryArg::Sports => MetCategory::Sports,
            CategoryArg::Daily => MetCategory::Daily,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutcomeArg {
    Success,
    Failure,
}

/// Resolved file locations under the data directory
struct Paths {
    profile: PathBuf,
    journal: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path) -> Self {
        Self {
            profile: data_dir.join("profile.json"),
            journal: data_dir.join("journal").join("activity.jsonl"),
        }
    }
}

fn main() -> Result<()> {
    calorieko_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    let paths = Paths::new(&data_dir);
    debug!(
        "Using profile {:?} and journal {:?}",
        paths.profile, paths.journal
    );

    match cli.command {
        Commands::Onboard {
            age,
            sex,
            height,
            weight,
            calorie_target,
            sodium_target,
        } => {
            let mut actions = vec![
                OnboardingAction::Next,
                OnboardingAction::SetAge(age),
                OnboardingAction::SetSex(sex.into()),
                OnboardingAction::Next,
                OnboardingAction::SetHeight(height),
                OnboardingAction::SetWeight(weight),
                OnboardingAction::Next,
            ];
            actions.extend(calorie_target.map(OnboardingAction::SetCalorieTarget));
            actions.extend(sodium_target.map(OnboardingAction::SetSodiumTarget));
            actions.push(OnboardingAction::Next);
            cmd_onboard(&paths, actions)
        }
        Commands::Bmi { weight, height } => cmd_bmi(&paths, weight, height),
        Commands::Burn {
            activity,
            met,
            minutes,
            weight,
        } => cmd_burn(&paths, activity, met, minutes, weight),
        Commands::Pace {
            distance_km,
            seconds,
        } => cmd_pace(distance_km, seconds),
        Commands::Log { entry } => cmd_log(&paths, entry),
        Commands::Summary { demo } => cmd_summary(&paths, &config, demo),
        Commands::Week { demo } => cmd_week(&paths, demo),
        Commands::Chart {
            kind,
            csv,
            from_journal,
            width,
            height,
            bars,
        } => {
            let source = match (csv, from_journal) {
                (Some(path), _) => ChartSource::Csv(path),
                (None, true) => ChartSource::Journal,
                (None, false) => ChartSource::Sample,
            };
            cmd_chart(&paths, &config, kind.into(), source, width, height, bars)
        }
        Commands::Export { output } => cmd_export(&paths, &output),
        Commands::Met { category } => cmd_met(category.map(MetCategory::from)),
        Commands::Pair { instant } => cmd_pair(&config, instant),
        Commands::Scan {
            instant,
            seed,
            outcome,
        } => cmd_scan(&config, instant, seed, outcome),
    }
}

fn load_profile(paths: &Paths) -> Result<Option<UserProfile>> {
    UserProfile::load(&paths.profile)
}

fn resolve_weight(paths: &Paths, weight: Option<f64>) -> Result<f64> {
    match weight {
        Some(w) => Ok(w),
        None => load_profile(paths)?
            .map(|p| p.biometrics.weight_kg)
            .ok_or_else(|| {
                Error::InvalidInput("no --weight given and no saved profile; run `calorieko onboard`".into())
            }),
    }
}

fn resolve_target(paths: &Paths, config: &Config) -> Result<NutritionTarget> {
    match load_profile(paths)? {
        Some(profile) => Ok(profile.targets),
        None => config.targets.to_target(),
    }
}

fn cmd_onboard(paths: &Paths, actions: Vec<OnboardingAction>) -> Result<()> {
    let state = OnboardingState::new().apply_all(actions);

    if let Some(ref message) = state.error {
        return Err(Error::Onboarding(message.clone()));
    }

    let profile = onboarding::finish(&state)?;
    profile.save(&paths.profile)?;
    info!("Saved profile to {:?}", paths.profile);

    let bmi = profile.biometrics.bmi()?;
    println!("✓ Profile saved");
    println!("  BMI: {:.1} ({})", bmi, BmiCategory::from_bmi(bmi));
    println!(
        "  Targets: {} kcal, {} mg sodium",
        profile.targets.daily_calories(),
        profile.targets.daily_sodium_mg()
    );
    Ok(())
}

fn cmd_bmi(paths: &Paths, weight: Option<f64>, height: Option<f64>) -> Result<()> {
    let (weight, height) = match (weight, height) {
        (Some(w), Some(h)) => (w, h),
        (w, h) => {
            let profile = load_profile(paths)?.ok_or_else(|| {
                Error::InvalidInput(
                    "pass --weight and --height, or run `calorieko onboard` first".into(),
                )
            })?;
            (
                w.unwrap_or(profile.biometrics.weight_kg),
                h.unwrap_or(profile.biometrics.height_cm),
            )
        }
    };

    let value = bmi(weight, height)?;
    println!("BMI: {:.1} ({})", value, BmiCategory::from_bmi(value));
    Ok(())
}

fn cmd_burn(
    paths: &Paths,
    activity: Option<String>,
    met: Option<f64>,
    minutes: f64,
    weight: Option<f64>,
) -> Result<()> {
    let (label, coefficient) = match (activity, met) {
        (Some(name), _) => {
            let found = find_activity(&name)
                .ok_or_else(|| Error::InvalidInput(format!("unknown activity: {}", name)))?;
            (found.name.to_string(), found.met)
        }
        (None, Some(met)) => (format!("MET {}", met), met),
        (None, None) => {
            return Err(Error::InvalidInput("pass --activity or --met".into()));
        }
    };

    let weight = resolve_weight(paths, weight)?;
    let kcal = calories_burned(coefficient, weight, minutes)?;
    println!("{}: {} kcal in {} min", label, kcal, minutes);
    Ok(())
}

fn cmd_pace(distance_km: f64, seconds: u64) -> Result<()> {
    let pace = pace_min_per_km(distance_km, seconds)?;
    let speed = speed_kmh(distance_km, seconds)?;
    println!("Pace: {} /km", pace);
    println!("Speed: {:.1} km/h", speed);
    Ok(())
}

fn cmd_log(paths: &Paths, command: LogCommand) -> Result<()> {
    let time_label = Utc::now().format("%I:%M %p").to_string();

    let entry = match command {
        LogCommand::Meal {
            name,
            calories,
            sodium,
            detail,
        } => ActivityLogEntry::meal(time_label, name, calories, sodium, detail),
        LogCommand::Workout {
            activity,
            minutes,
            weight,
        } => {
            let found = find_activity(&activity)
                .ok_or_else(|| Error::InvalidInput(format!("unknown activity: {}", activity)))?;
            let weight = resolve_weight(paths, weight)?;
            let kcal = calories_burned(found.met, weight, minutes)?;
            let kcal = i32::try_from(kcal)
                .map_err(|_| Error::InvalidInput(format!("burn of {} kcal is out of range", kcal)))?;
            ActivityLogEntry::workout(time_label, found.name, kcal, format!("{} min", minutes))
        }
    };

    let mut journal = JsonlJournal::new(&paths.journal);
    let record = journal.log_now(entry)?;
    info!("Appended {:?} entry to {:?}", record.entry.kind, journal.path());

    println!(
        "✓ Logged {:?}: {} ({} kcal)",
        record.entry.kind, record.entry.name, record.entry.calories
    );
    Ok(())
}

fn cmd_summary(paths: &Paths, config: &Config, demo: bool) -> Result<()> {
    let target = resolve_target(paths, config)?;
    let entries = if demo {
        fixtures::sample_log()
    } else {
        let records = read_journal(&paths.journal)?;
        entries_on(&records, Utc::now().date_naive())
    };

    let summary = DailySummary::from_entries(&entries, &target);

    println!("Today");
    println!("  Consumed:  {} kcal", summary.consumed);
    println!("  Burned:    {} kcal", summary.burned);
    println!("  Net:       {} kcal", summary.net);
    println!(
        "  Remaining: {} kcal ({:.0}% of {})",
        summary.remaining,
        summary.calorie_percent,
        target.daily_calories()
    );
    println!(
        "  Sodium:    {} mg ({:.0}% of {})",
        summary.sodium_mg,
        summary.sodium_percent,
        target.daily_sodium_mg()
    );

    if !entries.is_empty() {
        println!();
        for entry in &entries {
            let sign = match entry.kind {
                ActivityKind::Meal => '+',
                ActivityKind::Workout => '-',
            };
            println!(
                "  {}  {}{:>4}  {}",
                entry.time_label, sign, entry.calories, entry.name
            );
        }
    }
    Ok(())
}

fn cmd_week(paths: &Paths, demo: bool) -> Result<()> {
    let rows: Vec<(String, i32)> = if demo {
        fixtures::WEEKDAYS
            .iter()
            .zip(fixtures::WEEK_CALORIES.iter())
            .map(|(day, kcal)| (day.to_string(), *kcal as i32))
            .collect()
    } else {
        let cutoff = (Utc::now() - Duration::days(6)).date_naive();
        let records = read_journal(&paths.journal)?;
        daily_net_totals(&records)
            .into_iter()
            .filter(|(date, _)| *date >= cutoff)
            .map(|(date, net)| (date.format("%a %d").to_string(), net))
            .collect()
    };

    if rows.is_empty() {
        println!("No entries in the last 7 days.");
        return Ok(());
    }

    for (label, net) in &rows {
        println!("  {:<8} {:>6} kcal", label, net);
    }

    let values: Vec<i32> = rows.iter().map(|(_, net)| *net).collect();
    if let Some(avg) = weekly_average(&values) {
        println!();
        println!("Weekly average: {} kcal", avg);
    }
    if let Some(tdee) = estimate_tdee(&values) {
        println!("Estimated TDEE: {} kcal", tdee);
    }
    Ok(())
}

/// Where chart values come from
enum ChartSource {
    Sample,
    Csv(PathBuf),
    Journal,
}

fn cmd_chart(
    paths: &Paths,
    config: &Config,
    kind: SeriesKind,
    source: ChartSource,
    width: Option<f64>,
    height: Option<f64>,
    bars: Option<f64>,
) -> Result<()> {
    let series = match source {
        ChartSource::Csv(path) => series::load_series_csv(&path, kind)?,
        ChartSource::Journal => {
            let records = read_journal(&paths.journal)?;
            series::journal_series(&records, kind)
        }
        ChartSource::Sample => fixtures::series(kind),
    };
    debug!("Charting {} {:?} points", series.len(), kind);

    let mut frame = config.chart;
    if let Some(w) = width {
        frame.width = w;
    }
    if let Some(h) = height {
        frame.height = h;
    }

    let geometry: ChartGeometry = project(&series, &frame)?;
    let mut output = serde_json::to_value(&geometry)?;
    if let Some(ratio) = bars {
        output["bars"] = serde_json::to_value(geometry.bars(ratio)?)?;
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_export(paths: &Paths, output: &Path) -> Result<()> {
    let records = read_journal(&paths.journal)?;
    let days = series::export_daily_totals(&records, output)?;
    println!("✓ Exported {} days to {}", days, output.display());
    Ok(())
}

fn cmd_met(category: Option<MetCategory>) -> Result<()> {
    let rows: Vec<&MetActivity> = match category {
        Some(category) => activities_in(category).collect(),
        None => met_table().iter().collect(),
    };

    println!("{:<20} {:<10} {:>5}", "Activity", "Category", "MET");
    for activity in rows {
        println!(
            "{:<20} {:<10} {:>5.1}",
            activity.name,
            activity.category.to_string(),
            activity.met
        );
    }
    Ok(())
}

fn scheduler_for(instant: bool) -> Box<dyn Scheduler> {
    if instant {
        Box::new(InstantScheduler::new())
    } else {
        Box::new(ThreadScheduler::new(CancelToken::new()))
    }
}

fn cmd_pair(config: &Config, instant: bool) -> Result<()> {
    let mut machine = PairingMachine::new(config.sequencer.clone());
    let mut scheduler = scheduler_for(instant);
    info!("Starting pairing sequence (instant: {})", instant);

    let end = sequencer::run(&mut machine, PairingEvent::Start, &mut scheduler, |state| {
        println!("  {:?}", state);
    })?;

    println!("Pairing finished: {:?}", end);
    Ok(())
}

fn cmd_scan(
    config: &Config,
    instant: bool,
    seed: Option<u64>,
    outcome: Option<OutcomeArg>,
) -> Result<()> {
    let decision: Box<dyn DecisionSource> = match (outcome, seed) {
        (Some(OutcomeArg::Success), _) => Box::new(FixedDecision(true)),
        (Some(OutcomeArg::Failure), _) => Box::new(FixedDecision(false)),
        (None, Some(seed)) => Box::new(RandomDecision::seeded(seed)),
        (None, None) => Box::new(RandomDecision::new()),
    };

    let mut machine = ScanMachine::new(config.sequencer.clone(), decision);
    let mut scheduler = scheduler_for(instant);
    info!("Starting meal scan (instant: {})", instant);

    let end = sequencer::run(&mut machine, ScanEvent::Start, &mut scheduler, |state| {
        println!("  {:?}", state);
    })?;

    match end {
        sequencer::ScanState::Ready => println!("Scan finished: dish recognised"),
        sequencer::ScanState::Error => println!("Scan finished: could not recognise dish"),
        other => println!("Scan finished: {:?}", other),
    }
    Ok(())
}

use clap::{Parser, Subcommand};
use lightweight_core::metrics::start_of_week;
use lightweight_core::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lw")]
#[command(about = "LightWeight workout log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Show debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List exercises with last set, best set and a sparkline (default)
    Exercises {
        /// Only show exercises containing this text
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Log a set
    Log {
        /// Exercise name
        exercise: String,

        /// Weight lifted
        #[arg(long, short, allow_negative_numbers = true)]
        weight: f64,

        /// Repetitions
        #[arg(long, short, allow_negative_numbers = true)]
        reps: i64,

        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long, short)]
        date: Option<String>,

        /// Free-text notes
        #[arg(long, short)]
        notes: Option<String>,
    },

    /// Show best set, estimated 1RM, trend and history for one exercise
    Show {
        exercise: String,
    },

    /// Add an exercise to the list
    Add {
        name: String,
    },

    /// Rename an exercise, or type DELETE to remove it from the list
    Rename {
        exercise: String,

        /// New name or DELETE; prompts when omitted
        input: Option<String>,
    },

    /// Show the most recently logged sets
    Recent,

    /// Show totals and a trend chart
    Stats {
        /// Exercise to chart (defaults to the first listed)
        #[arg(long, short)]
        exercise: Option<String>,
    },

    /// Export a backup
    Export {
        /// Output file (defaults to lightweight-backup-<date>.json)
        #[arg(long, short)]
        out: Option<PathBuf>,

        /// Export the set log as CSV instead
        #[arg(long)]
        csv: bool,
    },

    /// Import a backup, replacing all sets
    Import {
        file: PathBuf,
    },

    /// Delete all sets and exercises
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        lightweight_core::logging::init_with_level("debug");
    } else {
        lightweight_core::logging::init();
    }

    match run(cli) {
        Err(e) if e.is_recoverable() => {
            eprintln!("✗ {}", e);
            std::process::exit(2);
        }
        other => other,
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    let mut book = Logbook::open(JsonFileBackend::new(&data_dir))?;

    match cli.command {
        Some(Commands::Exercises { search }) => {
            cmd_exercises(&book, search.as_deref(), &config)
        }
        Some(Commands::Log {
            exercise,
            weight,
            reps,
            date,
            notes,
        }) => cmd_log(&mut book, exercise, weight, reps, date, notes),
        Some(Commands::Show { exercise }) => cmd_show(&book, &exercise, &config),
        Some(Commands::Add { name }) => cmd_add(&mut book, &name),
        Some(Commands::Rename { exercise, input }) => cmd_rename(&mut book, &exercise, input),
        Some(Commands::Recent) => cmd_recent(&book, &config),
        Some(Commands::Stats { exercise }) => cmd_stats(&book, exercise, &config),
        Some(Commands::Export { out, csv }) => cmd_export(&book, out, csv),
        Some(Commands::Import { file }) => cmd_import(&mut book, &file),
        Some(Commands::Clear { yes }) => cmd_clear(&mut book, yes),
        None => cmd_exercises(&book, None, &config),
    }
}

fn cmd_exercises<P: Persistence>(
    book: &Logbook<P>,
    search: Option<&str>,
    config: &Config,
) -> Result<()> {
    let summaries = book.summaries(search.unwrap_or(""), config.charts.sparkline_points);
    let count = summaries.len();
    println!("{} exercise{}", count, if count == 1 { "" } else { "s" });

    if summaries.is_empty() {
        println!("\n  No exercises yet. Add one, then log a set.");
        return Ok(());
    }

    println!();
    for summary in summaries {
        let last = summary
            .last
            .map(|s| format!("{} · {}", set_label(s), format_date(&s.date)))
            .unwrap_or_else(|| "No sets yet".into());
        let best = summary
            .best
            .map(|b| set_label(b.set))
            .unwrap_or_else(|| "—".into());
        let one_rm = summary
            .best
            .and_then(|b| b.value)
            .map(|v| format!("~{} 1RM", v.round()))
            .unwrap_or_else(|| "—".into());

        println!("  {:<24} {}", summary.name, sparkline(&summary.sparkline));
        println!("    Last: {}  Best: {}  {}", last, best, one_rm);
    }

    Ok(())
}

fn cmd_log<P: Persistence>(
    book: &mut Logbook<P>,
    exercise: String,
    weight: f64,
    reps: i64,
    date: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    let draft = NewSet {
        exercise,
        date,
        weight,
        reps,
        notes,
    };
    let set = book.append(draft)?;

    println!(
        "✓ Set added: {} {} · {}",
        set.exercise,
        set_label(&set),
        format_date(&set.date)
    );
    Ok(())
}

fn cmd_show<P: Persistence>(book: &Logbook<P>, exercise: &str, config: &Config) -> Result<()> {
    let last = book.last_set(exercise);
    let best = book.best_set(exercise);

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", exercise.trim());
    println!("╰─────────────────────────────────────────╯");
    println!();

    match last {
        Some(s) => println!("  Last: {} · {}", set_label(s), format_date(&s.date)),
        None => println!("  No sets yet"),
    }
    println!(
        "  Best set: {}",
        best.map(|b| set_label(b.set)).unwrap_or_else(|| "—".into())
    );
    println!(
        "  Best 1RM: {}",
        best.and_then(|b| b.value)
            .map(|v| format!("~{}", v.round()))
            .unwrap_or_else(|| "—".into())
    );
    println!(
        "  Last trained: {}",
        last.map(|s| format_date(&s.date))
            .unwrap_or_else(|| "—".into())
    );
    println!();

    print_trend(
        &book.trend(exercise, config.charts.trend_points),
        "Log at least 2 sets to see a trend.",
    );

    let history = book.history(exercise, config.history.detail_limit);
    println!();
    if history.is_empty() {
        println!("  No sets yet.");
    }
    for set in history {
        print_set_line(set);
    }
    println!();

    Ok(())
}

fn cmd_add<P: Persistence>(book: &mut Logbook<P>, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("exercise name is empty".into()));
    }
    if book.add_exercise(name)? {
        println!("✓ Exercise added.");
    } else {
        println!("Already in your list.");
    }
    Ok(())
}

fn cmd_rename<P: Persistence>(
    book: &mut Logbook<P>,
    exercise: &str,
    input: Option<String>,
) -> Result<()> {
    let input = match input {
        Some(input) => Some(input),
        None => prompt_rename(exercise)?,
    };

    match book.resolve_rename(exercise, input.as_deref())? {
        RenameOutcome::Noop => println!("Nothing changed."),
        RenameOutcome::Deleted => {
            println!("✓ Removed from list.");
            if !book.sets_for(exercise).is_empty() {
                println!("  Logged sets remain stored, so it still shows up.");
            }
        }
        RenameOutcome::Renamed { name, affected } => {
            println!("✓ Renamed to {} ({} sets).", name, affected)
        }
    }
    Ok(())
}

fn cmd_recent<P: Persistence>(book: &Logbook<P>, config: &Config) -> Result<()> {
    let recent = book.recent(config.history.recent_limit);
    if recent.is_empty() {
        println!("No sets yet. Log your first set.");
        return Ok(());
    }
    for set in recent {
        print_set_line(set);
    }
    Ok(())
}

fn cmd_stats<P: Persistence>(
    book: &Logbook<P>,
    exercise: Option<String>,
    config: &Config,
) -> Result<()> {
    let today = book.today();
    println!("  Total sets: {}", book.total_sets());
    println!(
        "  This week:  {} (since {})",
        book.this_week_count(),
        start_of_week(today).format("%a %b %-d")
    );
    println!();

    let Some(name) = exercise.or_else(|| book.list_all().into_iter().next()) else {
        println!("  Log some sets first.");
        return Ok(());
    };

    println!("  {}", name.trim());
    print_trend(
        &book.trend(&name, config.charts.trend_points),
        "Need at least 2 sets for a trend.",
    );
    Ok(())
}

fn cmd_export<P: Persistence>(book: &Logbook<P>, out: Option<PathBuf>, csv: bool) -> Result<()> {
    let path = out.unwrap_or_else(|| {
        let name = book.backup_file_name();
        if csv {
            PathBuf::from(name.replace(".json", ".csv"))
        } else {
            PathBuf::from(name)
        }
    });

    if csv {
        let file = std::fs::File::create(&path)?;
        let count = book.export_csv(io::BufWriter::new(file))?;
        println!("✓ Exported {} sets to {}", count, path.display());
    } else {
        let doc = book.export();
        std::fs::write(&path, doc.to_json_pretty()?)?;
        println!(
            "✓ Exported {} sets and {} exercises to {}",
            doc.sets.len(),
            doc.exercises.len(),
            path.display()
        );
    }
    Ok(())
}

fn cmd_import<P: Persistence>(book: &mut Logbook<P>, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)?;
    let report = book.import(&text)?;

    println!("✓ Imported {} sets.", report.sets);
    if let Some(exercises) = report.exercises {
        println!("  Exercise list replaced ({} entries).", exercises);
    }
    Ok(())
}

fn cmd_clear<P: Persistence>(book: &mut Logbook<P>, yes: bool) -> Result<()> {
    if !yes && !confirm("Clear all data? This cannot be undone. [y/N] ")? {
        println!("Nothing changed.");
        return Ok(());
    }
    book.clear()?;
    println!("✓ Cleared.");
    Ok(())
}

// ----------------------------------------------------------------------------
// Presentation helpers
// ----------------------------------------------------------------------------

fn set_label(set: &WorkoutSet) -> String {
    format!("{}×{}", set.weight, set.reps)
}

/// "Jan 8" for stored dates, the raw text for malformed legacy dates
fn format_date(date: &str) -> String {
    parse_iso_date(date)
        .map(|d| d.format("%b %-d").to_string())
        .unwrap_or_else(|| date.to_string())
}

fn print_set_line(set: &WorkoutSet) {
    let notes = set
        .notes
        .as_deref()
        .map(|n| format!("  ({})", n))
        .unwrap_or_default();
    println!(
        "  {:<8} {:<24} {}{}",
        format_date(&set.date),
        set.exercise,
        set_label(set),
        notes
    );
}

fn print_trend(trend: &Trend, not_enough: &str) {
    match trend {
        Trend::Series(values) => {
            println!("  {}", sparkline(values));
            if let Some(latest) = trend.latest() {
                println!("  ~{} latest est. 1RM", latest.round());
            }
        }
        Trend::SinglePoint(value) => {
            println!("  ~{} est. 1RM", value.round());
            println!("  {}", not_enough);
        }
        Trend::NoData => println!("  {}", not_enough),
    }
}

/// Block-glyph sparkline; empty for fewer than 2 points
fn sparkline(values: &[f64]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    if values.len() < 2 {
        return String::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if max > min { max - min } else { 1.0 };

    values
        .iter()
        .map(|v| {
            let idx = (((v - min) / range) * (BARS.len() - 1) as f64).round() as usize;
            BARS[idx.min(BARS.len() - 1)]
        })
        .collect()
}

fn prompt_rename(exercise: &str) -> Result<Option<String>> {
    println!("Rename exercise '{}':", exercise.trim());
    println!("  - Type a NEW name to rename");
    println!("  - Type DELETE to remove it from your exercise list");
    println!("  (Logged sets remain stored.)");
    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input))
}

fn confirm(question: &str) -> Result<bool> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use log::{info, warn};

use glucoday::{
    CursorSync, DayWindow, GlucodayError, RecordStore, RenderContext, RenderedDay,
    config::AppConfig,
    day::parse_timezone,
    format::{format_date_time, format_minutes_as_hm, format_time_12h, resolve_time_on_day},
    load_day,
    search::search_notes,
    writer,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct DayArgs {
    /// Data dump, `.json` or `.jsonl`. Defaults to the configured data file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Local day as YYYY-MM-DD, today when omitted
    #[arg(short, long)]
    date: Option<String>,

    /// IANA timezone, overrides the configured one
    #[arg(short, long)]
    timezone: Option<String>,

    /// Show the day before the selected one
    #[arg(long, conflicts_with = "next")]
    previous: bool,

    /// Show the day after the selected one, refused once it is today
    #[arg(long)]
    next: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a day's charts and summary as JSON
    Show {
        #[command(flatten)]
        day: DayArgs,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the day's boluses, food, workouts, fasts and notes
    Logs {
        #[command(flatten)]
        day: DayArgs,
    },
    /// Print insulin, nutrition and time in range for a day
    Summary {
        #[command(flatten)]
        day: DayArgs,
    },
    /// Search notes by `#number`, `#tag`, `*title` or free text
    Notes {
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(short, long)]
        query: String,

        #[arg(short, long)]
        timezone: Option<String>,
    },
    /// Move the chart cursor to a time of day, e.g. "2:30pm"
    Jump {
        #[command(flatten)]
        day: DayArgs,

        #[arg(long)]
        time: String,
    },
    /// Update and save the local config file
    Config {
        #[arg(short, long)]
        timezone: Option<String>,

        #[arg(short, long)]
        data_file: Option<PathBuf>,

        #[arg(short, long)]
        cursor_tolerance_minutes: Option<i64>,
    },
}

fn timezone(config: &AppConfig, name: Option<&String>) -> Result<Tz, GlucodayError> {
    match name {
        Some(name) => parse_timezone(name),
        None => config.timezone(),
    }
}

fn open_store(config: &AppConfig, input: Option<&PathBuf>) -> Result<RecordStore, GlucodayError> {
    let path = input
        .or(config.data_file.as_ref())
        .ok_or(GlucodayError::InvalidUserInput {
            field: "input".to_string(),
            reason: "no data file given or configured".to_string(),
        })?;
    RecordStore::from_file(path)
}

fn render_day(config: &AppConfig, args: &DayArgs) -> Result<RenderedDay, GlucodayError> {
    let store = open_store(config, args.input.as_ref())?;
    let timezone = timezone(config, args.timezone.as_ref())?;
    let now = Utc::now();
    let day = select_day(args, timezone, now)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| GlucodayError::RuntimeError { source: e })?;
    let snapshot = runtime.block_on(load_day(&store, day));
    Ok(RenderContext::new(snapshot).at(now).render())
}

fn select_day(args: &DayArgs, timezone: Tz, now: DateTime<Utc>) -> Result<DayWindow, GlucodayError> {
    let day = match &args.date {
        Some(date) => DayWindow::parse(date, timezone)?,
        None => DayWindow::containing(now, timezone)?,
    };
    if args.previous {
        day.previous()
    } else if args.next {
        day.forward(now)
    } else {
        Ok(day)
    }
}

fn show(config: &AppConfig, args: &DayArgs, output: Option<&PathBuf>) -> Result<(), GlucodayError> {
    let rendered = render_day(config, args)?;
    match output {
        Some(path) => writer::write_json(path, &rendered),
        None => writer::to_writer(&mut std::io::stdout().lock(), &rendered),
    }
}

fn summary(config: &AppConfig, args: &DayArgs) -> Result<(), GlucodayError> {
    let rendered = render_day(config, args)?;
    let summary = &rendered.summary;
    let day = &rendered.charts.day;

    println!("{} ({})", day.date.format("%A %-d %B %Y"), day.timezone.name());
    for entity in &rendered.unavailable {
        println!("  {} unavailable", entity);
    }

    let insulin = &summary.insulin;
    println!(
        "Insulin: {:.2}u bolus, {:.2}u basal, {:.2}u total",
        insulin.total_bolus, insulin.total_basal, insulin.total_insulin
    );
    if let Some(ratio) = insulin.net_carbs_per_insulin_unit {
        println!("  {:.1}g net carbs per unit", ratio);
    }

    let nutrition = &summary.nutrition;
    println!(
        "Food: {:.0}g net carbs, {:.0}g fat, {:.0}g protein, {:.0} kcal",
        nutrition.net_carbs, nutrition.fat, nutrition.protein, nutrition.calories
    );

    let navigation = &rendered.navigation;
    if navigation.minutes != 1440. {
        println!("  {} hour day", navigation.minutes / 60.);
    }

    let glucose = &summary.glucose;
    println!("Glucose:");
    println!("  below 4:  {}", format_minutes_as_hm(glucose.time_below_4));
    println!("  4 to 6:   {}", format_minutes_as_hm(glucose.time_between_4_and_6));
    println!("  above 8:  {}", format_minutes_as_hm(glucose.time_above_8));
    println!("  above 10: {}", format_minutes_as_hm(glucose.time_above_10));
    println!("  no data:  {}", format_minutes_as_hm(glucose.uncovered_minutes()));
    Ok(())
}

fn logs(config: &AppConfig, args: &DayArgs) -> Result<(), GlucodayError> {
    let rendered = render_day(config, args)?;
    let day = &rendered.charts.day;
    println!("{}", day.date.format("%A %-d %B %Y"));
    if rendered.logs.is_empty() {
        println!("Nothing logged for this day.");
    }

    let sections = [
        ("Boluses", &rendered.logs.boluses),
        ("Food", &rendered.logs.food),
        ("Workouts", &rendered.logs.workouts),
        ("Fasts", &rendered.logs.fasts),
        ("Notes", &rendered.logs.notes),
    ];
    for (title, entries) in sections {
        if entries.is_empty() {
            continue;
        }
        println!("\n{}", title);
        for entry in entries {
            println!("  {}", entry.heading);
            for detail in &entry.details {
                println!("    {}", detail);
            }
            if !entry.tags.is_empty() {
                println!("    #{}", entry.tags.join(" #"));
            }
        }
    }

    let navigation = &rendered.navigation;
    if let Some(previous) = navigation.previous {
        println!("\n< {}", previous);
    }
    match navigation.next {
        Some(next) => println!("> {}", next),
        None if navigation.is_today => println!("Showing today"),
        None => {}
    }
    Ok(())
}

fn update_config(
    mut config: AppConfig,
    timezone: Option<&String>,
    data_file: Option<&PathBuf>,
    cursor_tolerance_minutes: Option<i64>,
) -> Result<(), GlucodayError> {
    if let Some(timezone) = timezone {
        parse_timezone(timezone)?;
        config.timezone = timezone.clone();
    }
    if let Some(data_file) = data_file {
        config.data_file = Some(data_file.clone());
    }
    if let Some(minutes) = cursor_tolerance_minutes {
        if minutes <= 0 {
            return Err(GlucodayError::InvalidUserInput {
                field: "cursor_tolerance_minutes".to_string(),
                reason: "must be at least one minute".to_string(),
            });
        }
        config.cursor_tolerance_minutes = minutes;
    }
    config.save()?;
    info!("Saved config: {:?}", config);
    Ok(())
}

fn notes(
    config: &AppConfig,
    input: Option<&PathBuf>,
    query: &str,
    timezone_name: Option<&String>,
) -> Result<(), GlucodayError> {
    let store = open_store(config, input)?;
    let timezone = timezone(config, timezone_name)?;
    let found = search_notes(&store.notes, query);
    info!("{} notes match {:?}", found.len(), query);
    for note in found {
        let title = note.title.as_deref().unwrap_or("Note");
        println!(
            "#{} {} - {}",
            note.note_number,
            format_date_time(note.timestamp, timezone),
            title
        );
        println!("  {}", note.text);
    }
    Ok(())
}

fn jump(config: &AppConfig, args: &DayArgs, time: &str) -> Result<(), GlucodayError> {
    let rendered = render_day(config, args)?;
    let day = &rendered.charts.day;
    let at = resolve_time_on_day(time, day).ok_or(GlucodayError::InvalidUserInput {
        field: "time".to_string(),
        reason: format!("could not read {:?} as a time on {}", time, day.date),
    })?;

    let cursor = CursorSync::at(&rendered.charts, at, config.cursor_tolerance());
    println!("Cursor at {}", format_time_12h(at, day.timezone));
    if cursor.highlights.is_empty() {
        warn!("No points within range of {}", at);
    }
    for highlight in &cursor.highlights {
        println!("  {:?} point {}", highlight.chart, highlight.index);
    }
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    let config = match AppConfig::from_local_file() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            warn!("Could not load config, using defaults: {}", e);
            AppConfig::default()
        }
    };

    let result = match &cli.command {
        Commands::Show { day, output } => show(&config, day, output.as_ref()),
        Commands::Logs { day } => logs(&config, day),
        Commands::Summary { day } => summary(&config, day),
        Commands::Notes {
            input,
            query,
            timezone,
        } => notes(&config, input.as_ref(), query, timezone.as_ref()),
        Commands::Jump { day, time } => jump(&config, day, time),
        Commands::Config {
            timezone,
            data_file,
            cursor_tolerance_minutes,
        } => update_config(
            config.clone(),
            timezone.as_ref(),
            data_file.as_ref(),
            *cursor_tolerance_minutes,
        ),
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use tracing::debug;

use cwb_weather_core::{
    Config, Location, Moment, RefreshOutcome, SunTimesTable, WeatherCard, WeatherState,
    dataset, location, provider::provider_from_config, resolve_moment_or_day,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cwb-weather", version, about = "Taiwan weather card from CWB open data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enter the CWB authorization key and pick a city.
    Configure,

    /// Show or change the selected city.
    City {
        /// City to select, e.g. "臺北市". Prompts when omitted.
        name: Option<String>,

        /// List available cities instead.
        #[arg(long)]
        list: bool,
    },

    /// Fetch current weather and print the card.
    Show {
        /// Use this city instead of the selected one.
        #[arg(long)]
        city: Option<String>,
    },

    /// Print whether it is day or night.
    Moment {
        /// Use this city instead of the selected one.
        #[arg(long)]
        city: Option<String>,

        /// Local time to classify, `YYYY-MM-DDTHH:MM:SS`; defaults to now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Build the sun-times table from a raw CWB A-B0062-001 download.
    BuildTable {
        /// Raw dataset JSON.
        input: PathBuf,

        /// Keep only dates after this day, `YYYY-MM-DD`.
        #[arg(long)]
        cutoff: NaiveDate,

        /// Output path; defaults to the configured sun-times path.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::City { name, list } => city(name, list),
            Command::Show { city } => show(city.as_deref()).await,
            Command::Moment { city, at } => moment(city.as_deref(), at.as_deref()),
            Command::BuildTable {
                input,
                cutoff,
                output,
            } => build_table(input, cutoff, output),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let token = Password::new("CWB authorization key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read authorization key")?;
    config.api_token = Some(token.trim().to_string());

    let chosen = prompt_city(&config)?;
    config.set_city(chosen)?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn city(name: Option<String>, list: bool) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    if list {
        let selected = config.selected_location().ok().map(|l| l.city_name);
        for loc in location::AVAILABLE_LOCATIONS {
            let marker = if Some(loc.city_name) == selected { "*" } else { " " };
            println!("{marker} {} (station {})", loc.city_name, loc.station_name);
        }
        return Ok(());
    }

    let chosen = match name {
        Some(name) => name,
        None => prompt_city(&config)?.to_string(),
    };

    let loc = config.set_city(&chosen)?;
    config.save()?;
    println!("Selected city: {}", loc.city_name);
    Ok(())
}

fn prompt_city(config: &Config) -> anyhow::Result<&'static str> {
    let names: Vec<&'static str> = location::city_names().collect();
    let current = config.selected_location().map(|l| l.city_name).ok();
    let cursor = current
        .and_then(|c| names.iter().position(|n| *n == c))
        .unwrap_or(0);

    Select::new("City:", names)
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read city selection")
}

async fn show(city_override: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let loc = resolve_location(&config, city_override)?;
    let tz = config.timezone()?;
    let provider = provider_from_config(&config)?;
    debug!(city = loc.city_name, %tz, "showing weather card");

    let mut state = WeatherState::new();
    match state
        .refresh(provider.as_ref(), loc, config.request_timeout())
        .await
    {
        RefreshOutcome::Applied => {}
        RefreshOutcome::Failed(err) => {
            return Err(anyhow::Error::new(err)
                .context(format!("Failed to refresh weather for {}", loc.city_name)));
        }
        RefreshOutcome::Stale => return Err(anyhow!("Weather refresh was superseded")),
    }

    let now = Utc::now().with_timezone(&tz);
    let moment = match current_moment(&config, loc, &now) {
        Ok(moment) => moment,
        Err(err) => {
            eprintln!("warning: {err:#}; showing the day theme");
            Moment::Day
        }
    };

    println!("{}", WeatherCard::new(state.snapshot(), loc, moment, &tz));
    Ok(())
}

fn moment(city_override: Option<&str>, at: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let loc = resolve_location(&config, city_override)?;
    let tz = config.timezone()?;

    let now = match at {
        Some(value) => parse_local_time(value, &tz)?,
        None => Utc::now().with_timezone(&tz),
    };

    let moment = current_moment(&config, loc, &now)?;
    println!("{moment}");
    Ok(())
}

fn build_table(
    input: PathBuf,
    cutoff: NaiveDate,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let output = match output {
        Some(path) => path,
        None => Config::load()?.sun_times_path()?,
    };

    let table = dataset::build_table_file(&input, &output, cutoff)
        .with_context(|| format!("Failed to build sun-times table from {}", input.display()))?;

    let dates: usize = table.locations().iter().map(|l| l.dates.len()).sum();
    println!(
        "Wrote {} locations ({dates} dates after {cutoff}) to {}",
        table.len(),
        output.display()
    );
    Ok(())
}

fn resolve_location(
    config: &Config,
    city_override: Option<&str>,
) -> anyhow::Result<&'static Location> {
    match city_override {
        Some(name) => location::find_location(name).ok_or_else(|| {
            anyhow!("Unknown city '{name}'.\nHint: run `cwb-weather city --list`.")
        }),
        None => config.selected_location(),
    }
}

fn current_moment(
    config: &Config,
    loc: &Location,
    now: &DateTime<Tz>,
) -> anyhow::Result<Moment> {
    let path = config.sun_times_path()?;
    let table = SunTimesTable::load(&path).context(
        "Sun-times table unavailable.\n\
         Hint: run `cwb-weather build-table <A-B0062-001.json> --cutoff <date>`.",
    )?;

    Ok(resolve_moment_or_day(&table, loc.sun_times_name, now)?)
}

fn parse_local_time(value: &str, tz: &Tz) -> anyhow::Result<DateTime<Tz>> {
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .with_context(|| format!("Invalid time '{value}', expected YYYY-MM-DDTHH:MM:SS"))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| anyhow!("Local time '{value}' does not exist in {tz}"))
}

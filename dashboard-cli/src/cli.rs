use anyhow::{Context, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use dashboard_core::{
    CityCatalog, ComparisonSet, Config, Dashboard, FetchCoordinator, FetchRequest,
    catalog::{DEFAULT_POPULAR_LIMIT, MIN_SEARCH_LEN},
    comparison::MIN_COMPARISON_CITIES,
    export::export_snapshot,
    source_from_config,
};

use crate::{output, prompt};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-dashboard",
    version,
    about = "Weather dashboard for cities around the world"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and preferred units.
    Configure,

    /// List cities from the built-in directory.
    Cities {
        #[command(flatten)]
        filter: CityFilter,

        /// How many entries `--popular` shows.
        #[arg(long, default_value_t = DEFAULT_POPULAR_LIMIT)]
        limit: usize,
    },

    /// Current conditions for one or more cities, fetched concurrently.
    Current {
        #[arg(required = true)]
        cities: Vec<String>,

        /// Save the last successful result; `.json` keeps the raw response,
        /// anything else the rendered report.
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Multi-day forecast for a city.
    Forecast {
        city: String,

        /// Days to request (defaults to `forecast_days` from config).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=5))]
        days: Option<u32>,
    },

    /// Side-by-side comparison of several cities.
    Compare {
        #[arg(required_unless_present = "defaults")]
        cities: Vec<String>,

        /// Compare the `default_cities` from config.
        #[arg(long, conflicts_with = "cities")]
        defaults: bool,
    },

    /// Pick a city interactively, then show its current conditions.
    Browse,
}

/// At most one filter; no filter lists every city.
#[derive(Debug, Args)]
#[group(multiple = false)]
pub struct CityFilter {
    #[arg(long)]
    pub continent: Option<String>,

    #[arg(long)]
    pub country: Option<String>,

    /// Case-insensitive substring of the city name.
    #[arg(long)]
    pub search: Option<String>,

    /// Curated list of popular destinations.
    #[arg(long)]
    pub popular: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => {
                prompt::configure(&mut config)?;
                config.save()?;
                let path = Config::config_file_path()?;
                println!("Saved configuration to {}", path.display());
            }
            Command::Cities { filter, limit } => {
                list_cities(&CityCatalog::world(), &filter, limit)?
            }
            Command::Current { cities, save } => show_current(&config, cities, save).await?,
            Command::Forecast { city, days } => {
                show_forecast(&config, city, days.unwrap_or(config.forecast_days)).await?
            }
            Command::Compare { cities, defaults } => {
                let set: ComparisonSet = if defaults {
                    config.default_cities.iter().cloned().collect()
                } else {
                    cities.into_iter().collect()
                };
                compare(&config, &set).await?;
            }
            Command::Browse => {
                let city = prompt::pick_city(&CityCatalog::world())?;
                show_current(&config, vec![city], None).await?;
            }
        }

        Ok(())
    }
}

fn connect(config: &Config) -> anyhow::Result<FetchCoordinator> {
    let source = source_from_config(config)?;
    Ok(FetchCoordinator::new(source, config.poll_interval()))
}

fn list_cities(catalog: &CityCatalog, filter: &CityFilter, limit: usize) -> anyhow::Result<()> {
    let cities = if let Some(query) = &filter.search {
        if query.trim().chars().count() < MIN_SEARCH_LEN {
            bail!("Search needs at least {MIN_SEARCH_LEN} characters");
        }
        catalog.search(query.trim())
    } else if let Some(continent) = &filter.continent {
        let cities = catalog.list_by_continent(continent);
        if cities.is_empty() {
            let known: Vec<_> = catalog.continents().collect();
            let known = known.join(", ");
            bail!("Unknown continent '{continent}'. Known: {known}");
        }
        cities
    } else if let Some(country) = &filter.country {
        catalog.list_by_country(country)
    } else if filter.popular {
        catalog.popular(limit)
    } else {
        catalog.list_all()
    };

    if cities.is_empty() {
        println!("No cities found");
    } else {
        print!("{}", output::city_table(catalog, &cities));
        println!("\n{} cities", cities.len());
    }

    Ok(())
}

async fn show_current(
    config: &Config,
    cities: Vec<String>,
    save: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut coordinator = connect(config)?;
    let mut dashboard = Dashboard::new(config.units);

    for city in cities {
        let request = FetchRequest::current(city);
        dashboard.begin(&request);
        coordinator.dispatch(request);
    }

    coordinator
        .run_until_idle(|message| {
            dashboard.apply(message, &Local::now());
            println!("{}\n", dashboard.current_panel());
        })
        .await;

    if let Some(path) = save {
        let snapshot = dashboard.snapshot().context("No weather data to save")?;
        let format = export_snapshot(snapshot, &path)?;
        println!("Saved {} ({format:?}) to {}", snapshot.city, path.display());
    }

    Ok(())
}

async fn show_forecast(config: &Config, city: String, days: u32) -> anyhow::Result<()> {
    let mut coordinator = connect(config)?;
    let mut dashboard = Dashboard::new(config.units);

    let request = FetchRequest::forecast_days(city, days);
    dashboard.begin(&request);
    coordinator.dispatch(request);

    coordinator
        .run_until_idle(|message| {
            dashboard.apply(message, &Local::now());
        })
        .await;

    println!("{}", dashboard.forecast_panel());
    let series = dashboard.forecast_series();
    if !series.points.is_empty() {
        print!("\n{}", output::series_table(series, config.units));
    }

    Ok(())
}

async fn compare(config: &Config, set: &ComparisonSet) -> anyhow::Result<()> {
    if !set.is_ready() {
        bail!("Select at least {MIN_COMPARISON_CITIES} cities to compare");
    }

    let mut coordinator = connect(config)?;
    let mut dashboard = Dashboard::new(config.units);

    dashboard.begin_comparison();
    coordinator.dispatch_comparison(set.cities().to_vec());
    coordinator
        .run_until_idle(|message| {
            dashboard.apply(message, &Local::now());
        })
        .await;

    let rows = dashboard.comparison_rows();
    if !rows.is_empty() {
        print!("{}", output::comparison_table(rows, config.units));
        println!();
    }
    println!("{}", dashboard.status());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("weather-dashboard").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn current_takes_several_cities_and_a_save_path() {
        let cli = parse(&["current", "Paris", "Oslo", "--save", "out.json"]).unwrap();

        let Command::Current { cities, save } = cli.command else {
            panic!("expected current command");
        };
        assert_eq!(cities, ["Paris", "Oslo"]);
        assert_eq!(save, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn current_requires_a_city() {
        assert!(parse(&["current"]).is_err());
    }

    #[test]
    fn forecast_days_are_bounded() {
        assert!(parse(&["forecast", "Oslo", "--days", "3"]).is_ok());
        assert!(parse(&["forecast", "Oslo", "--days", "0"]).is_err());
        assert!(parse(&["forecast", "Oslo", "--days", "6"]).is_err());
    }

    #[test]
    fn compare_needs_cities_or_defaults() {
        assert!(parse(&["compare"]).is_err());
        assert!(parse(&["compare", "--defaults"]).is_ok());
        assert!(parse(&["compare", "Oslo", "--defaults"]).is_err());
    }

    #[test]
    fn city_filters_are_exclusive() {
        assert!(parse(&["cities", "--continent", "Europe", "--popular"]).is_err());

        let cli = parse(&["cities", "--popular", "--limit", "5"]).unwrap();
        let Command::Cities { filter, limit } = cli.command else {
            panic!("expected cities command");
        };
        assert!(filter.popular);
        assert_eq!(limit, 5);
    }

    #[test]
    fn short_search_is_rejected() {
        let filter = CityFilter {
            continent: None,
            country: None,
            search: Some("a".into()),
            popular: false,
        };
        let err = list_cities(&CityCatalog::world(), &filter, DEFAULT_POPULAR_LIMIT).unwrap_err();
        assert!(err.to_string().contains("at least 2 characters"));
    }

    #[test]
    fn unknown_continent_lists_known_ones() {
        let filter = CityFilter {
            continent: Some("Atlantis".into()),
            country: None,
            search: None,
            popular: false,
        };
        let err = list_cities(&CityCatalog::world(), &filter, DEFAULT_POPULAR_LIMIT).unwrap_err();
        assert!(err.to_string().contains("Europe"));
    }

    #[tokio::test]
    async fn compare_rejects_a_single_city() {
        let set: ComparisonSet = ["Oslo", " Oslo ", "Oslo"].into_iter().collect();
        let err = compare(&Config::default(), &set).await.unwrap_err();
        assert!(err.to_string().contains("at least 2 cities"));
    }
}

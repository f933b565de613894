//! Interactive prompts built on `inquire`.

use anyhow::bail;
use inquire::{Password, PasswordDisplayMode, Select, Text, validator::Validation};
use std::fmt;

use dashboard_core::{
    CityCatalog, Config, Units,
    catalog::{DEFAULT_POPULAR_LIMIT, MIN_SEARCH_LEN},
};

const PAGE_SIZE: usize = 15;

/// Ask for the API key and unit system and store them in `config`.
pub fn configure(config: &mut Config) -> anyhow::Result<()> {
    let key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Create one at https://openweathermap.org/api")
        .prompt()?;
    let key = key.trim();
    if key.is_empty() {
        bail!("API key cannot be empty");
    }

    let options = vec![Units::Metric, Units::Imperial, Units::Standard];
    let cursor = options.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Units:", options)
        .with_starting_cursor(cursor)
        .prompt()?;
    config.set_api_key(key.to_string());

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowseMode {
    Popular,
    Continent,
    All,
    Search,
}

impl BrowseMode {
    const ALL: [BrowseMode; 4] = [Self::Popular, Self::Continent, Self::All, Self::Search];
}

impl fmt::Display for BrowseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Popular => "Popular cities",
            Self::Continent => "By continent",
            Self::All => "All cities",
            Self::Search => "Search by name",
        })
    }
}

/// Walk the user from a browse mode down to a single city name.
pub fn pick_city(catalog: &CityCatalog) -> anyhow::Result<String> {
    let mode = Select::new("Browse cities:", BrowseMode::ALL.to_vec()).prompt()?;

    let candidates = match mode {
        BrowseMode::Popular => catalog.popular(DEFAULT_POPULAR_LIMIT),
        BrowseMode::Continent => {
            let continents: Vec<&str> = catalog.continents().collect();
            let continent = Select::new("Continent:", continents).prompt()?;
            catalog.list_by_continent(continent)
        }
        BrowseMode::All => catalog.list_all(),
        BrowseMode::Search => {
            let query = Text::new("City name contains:")
                .with_validator(|input: &str| {
                    Ok(if input.trim().chars().count() >= MIN_SEARCH_LEN {
                        Validation::Valid
                    } else {
                        let hint = format!("Type at least {MIN_SEARCH_LEN} characters");
                        Validation::Invalid(hint.into())
                    })
                })
                .prompt()?;
            let matches = catalog.search(query.trim());
            if matches.is_empty() {
                bail!("No cities match '{}'", query.trim());
            }
            matches
        }
    };

    let city = Select::new("City:", candidates)
        .with_page_size(PAGE_SIZE)
        .prompt()?;
    Ok(city.to_string())
}

//! Static directory of world cities grouped by continent and country.
//!
//! The catalog is built once and shared read-only (usually behind an `Arc`).
//! Every lookup walks continents in insertion order, then countries in
//! insertion order, so a city name that exists in several countries always
//! resolves to the same first match.

use std::collections::HashSet;

use thiserror::Error;

/// Callers should not run a search for queries shorter than this.
pub const MIN_SEARCH_LEN: usize = 2;

/// Default truncation for [`CityCatalog::popular`].
pub const DEFAULT_POPULAR_LIMIT: usize = 50;

const UNKNOWN: &str = "Unknown";

#[rustfmt::skip]
const POPULAR_CITIES: &[&str] = &[
    "New York", "London", "Tokyo", "Paris", "Singapore", "Sydney", "Dubai",
    "Hong Kong", "Los Angeles", "Barcelona", "Amsterdam", "Seoul", "Berlin",
    "Rome", "Madrid", "Mumbai", "Bangkok", "Istanbul", "Vienna", "Prague",
    "Buenos Aires", "São Paulo", "Mexico City", "Cairo", "Moscow", "Delhi",
    "Shanghai", "Beijing", "Toronto", "Vancouver", "Montreal", "Chicago",
    "San Francisco", "Miami", "Las Vegas", "Orlando", "Boston", "Washington DC",
];

type CountryTable = &'static [(&'static str, &'static [&'static str])];

#[rustfmt::skip]
const WORLD: &[(&str, CountryTable)] = &[
    (
        "North America",
        &[
            (
                "United States",
                &[
                    "New York", "Los Angeles", "Chicago", "Houston", "Phoenix",
                    "Philadelphia", "San Antonio", "San Diego", "Dallas", "San Jose",
                    "Austin", "Jacksonville", "San Francisco", "Columbus", "Charlotte",
                    "Fort Worth", "Indianapolis", "Seattle", "Denver", "Washington DC",
                    "Boston", "El Paso", "Nashville", "Detroit", "Oklahoma City",
                    "Portland", "Las Vegas", "Memphis", "Louisville", "Baltimore",
                    "Milwaukee", "Albuquerque", "Tucson", "Fresno", "Sacramento",
                    "Kansas City", "Mesa", "Atlanta", "Colorado Springs", "Omaha",
                    "Raleigh", "Miami", "Cleveland", "Tulsa", "Oakland", "Minneapolis",
                ],
            ),
            (
                "Canada",
                &[
                    "Toronto", "Montreal", "Vancouver", "Calgary", "Edmonton",
                    "Ottawa", "Winnipeg", "Quebec City", "Hamilton", "Kitchener",
                    "London", "Victoria", "Halifax", "Oshawa", "Windsor",
                ],
            ),
            (
                "Mexico",
                &[
                    "Mexico City", "Guadalajara", "Monterrey", "Puebla", "Tijuana",
                    "León", "Juárez", "Torreón", "Querétaro", "San Luis Potosí",
                ],
            ),
        ],
    ),
    (
        "South America",
        &[
            (
                "Brazil",
                &[
                    "São Paulo", "Rio de Janeiro", "Brasília", "Salvador", "Fortaleza",
                    "Belo Horizonte", "Manaus", "Curitiba", "Recife", "Porto Alegre",
                ],
            ),
            (
                "Argentina",
                &[
                    "Buenos Aires", "Córdoba", "Rosario", "Mendoza", "Tucumán",
                    "La Plata", "Mar del Plata", "Salta", "Santa Fe", "San Juan",
                ],
            ),
            (
                "Chile",
                &[
                    "Santiago", "Valparaíso", "Concepción", "La Serena", "Antofagasta",
                    "Temuco", "Rancagua", "Talca", "Arica", "Chillán",
                ],
            ),
            (
                "Colombia",
                &[
                    "Bogotá", "Medellín", "Cali", "Barranquilla", "Cartagena",
                    "Cúcuta", "Bucaramanga", "Pereira", "Santa Marta", "Ibagué",
                ],
            ),
        ],
    ),
    (
        "Europe",
        &[
            (
                "United Kingdom",
                &[
                    "London", "Birmingham", "Manchester", "Glasgow", "Liverpool",
                    "Leeds", "Sheffield", "Edinburgh", "Bristol", "Cardiff",
                ],
            ),
            (
                "Germany",
                &[
                    "Berlin", "Hamburg", "Munich", "Cologne", "Frankfurt",
                    "Stuttgart", "Düsseldorf", "Dortmund", "Essen", "Leipzig",
                ],
            ),
            (
                "France",
                &[
                    "Paris", "Marseille", "Lyon", "Toulouse", "Nice",
                    "Nantes", "Strasbourg", "Montpellier", "Bordeaux", "Lille",
                ],
            ),
            (
                "Italy",
                &[
                    "Rome", "Milan", "Naples", "Turin", "Palermo",
                    "Genoa", "Bologna", "Florence", "Bari", "Catania",
                ],
            ),
            (
                "Spain",
                &[
                    "Madrid", "Barcelona", "Valencia", "Seville", "Zaragoza",
                    "Málaga", "Murcia", "Palma", "Las Palmas", "Bilbao",
                ],
            ),
            (
                "Russia",
                &[
                    "Moscow", "Saint Petersburg", "Novosibirsk", "Yekaterinburg",
                    "Nizhny Novgorod", "Kazan", "Chelyabinsk", "Omsk", "Samara",
                    "Rostov-on-Don",
                ],
            ),
        ],
    ),
    (
        "Asia",
        &[
            (
                "China",
                &[
                    "Beijing", "Shanghai", "Guangzhou", "Shenzhen", "Tianjin",
                    "Wuhan", "Dongguan", "Chengdu", "Nanjing", "Chongqing",
                ],
            ),
            (
                "India",
                &[
                    "Mumbai", "Delhi", "Bangalore", "Hyderabad", "Ahmedabad",
                    "Chennai", "Kolkata", "Surat", "Pune", "Jaipur",
                ],
            ),
            (
                "Japan",
                &[
                    "Tokyo", "Yokohama", "Osaka", "Nagoya", "Sapporo",
                    "Fukuoka", "Kobe", "Kawasaki", "Kyoto", "Saitama",
                ],
            ),
            (
                "South Korea",
                &[
                    "Seoul", "Busan", "Incheon", "Daegu", "Daejeon",
                    "Gwangju", "Suwon", "Ulsan", "Changwon", "Goyang",
                ],
            ),
            (
                "Thailand",
                &[
                    "Bangkok", "Samut Prakan", "Mueang Nonthaburi", "Udon Thani",
                    "Chon Buri", "Nakhon Ratchasima", "Chiang Mai", "Hat Yai",
                    "Pak Kret", "Si Racha",
                ],
            ),
        ],
    ),
    (
        "Africa",
        &[
            (
                "Nigeria",
                &[
                    "Lagos", "Kano", "Ibadan", "Kaduna", "Port Harcourt",
                    "Benin City", "Maiduguri", "Zaria", "Aba", "Jos",
                ],
            ),
            (
                "Egypt",
                &[
                    "Cairo", "Alexandria", "Giza", "Shubra El Kheima", "Port Said",
                    "Suez", "Luxor", "Mansoura", "El Mahalla El Kubra", "Tanta",
                ],
            ),
            (
                "South Africa",
                &[
                    "Cape Town", "Johannesburg", "Durban", "Pretoria", "Port Elizabeth",
                    "Pietermaritzburg", "Benoni", "Tembisa", "East London", "Vereeniging",
                ],
            ),
        ],
    ),
    (
        "Oceania",
        &[
            (
                "Australia",
                &[
                    "Sydney", "Melbourne", "Brisbane", "Perth", "Adelaide",
                    "Gold Coast", "Newcastle", "Canberra", "Sunshine Coast", "Wollongong",
                ],
            ),
            (
                "New Zealand",
                &[
                    "Auckland", "Wellington", "Christchurch", "Hamilton", "Tauranga",
                    "Napier-Hastings", "Dunedin", "Palmerston North", "Nelson", "Rotorua",
                ],
            ),
        ],
    ),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("City '{city}' is listed twice under {country}")]
    DuplicateCity { country: String, city: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub name: String,
    pub cities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continent {
    pub name: String,
    pub countries: Vec<Country>,
}

/// Where a city sits in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityLocation<'a> {
    pub continent: &'a str,
    pub country: &'a str,
}

impl CityLocation<'_> {
    pub const UNKNOWN: CityLocation<'static> = CityLocation {
        continent: UNKNOWN,
        country: UNKNOWN,
    };

    pub fn is_known(&self) -> bool {
        *self != Self::UNKNOWN
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityCatalog {
    continents: Vec<Continent>,
    popular: Vec<String>,
}

impl CityCatalog {
    /// Build a catalog, rejecting a city listed twice in the same country.
    pub fn new(continents: Vec<Continent>, popular: Vec<String>) -> Result<Self, CatalogError> {
        for country in continents.iter().flat_map(|c| &c.countries) {
            let mut seen = HashSet::new();
            for city in &country.cities {
                if !seen.insert(city.as_str()) {
                    return Err(CatalogError::DuplicateCity {
                        country: country.name.clone(),
                        city: city.clone(),
                    });
                }
            }
        }

        Ok(Self {
            continents,
            popular,
        })
    }

    /// The built-in catalog of major world cities.
    pub fn world() -> Self {
        let continents = WORLD
            .iter()
            .map(|(name, countries)| Continent {
                name: (*name).to_string(),
                countries: countries
                    .iter()
                    .map(|(country, cities)| Country {
                        name: (*country).to_string(),
                        cities: cities.iter().map(|c| (*c).to_string()).collect(),
                    })
                    .collect(),
            })
            .collect();
        let popular = POPULAR_CITIES.iter().map(|c| (*c).to_string()).collect();

        Self {
            continents,
            popular,
        }
    }

    /// Continent names in traversal order.
    pub fn continents(&self) -> impl Iterator<Item = &str> {
        self.continents.iter().map(|c| c.name.as_str())
    }

    /// Total number of city entries, counting duplicates across countries.
    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn list_all(&self) -> Vec<&str> {
        sorted(self.entries().map(|(_, _, city)| city))
    }

    pub fn list_by_continent(&self, continent: &str) -> Vec<&str> {
        let Some(found) = self.continents.iter().find(|c| c.name == continent) else {
            return Vec::new();
        };

        sorted(
            found
                .countries
                .iter()
                .flat_map(|c| c.cities.iter().map(String::as_str)),
        )
    }

    pub fn list_by_country(&self, country: &str) -> Vec<&str> {
        self.continents
            .iter()
            .flat_map(|c| &c.countries)
            .find(|c| c.name == country)
            .map(|c| sorted(c.cities.iter().map(String::as_str)))
            .unwrap_or_default()
    }

    pub fn continent_city_count(&self, continent: &str) -> usize {
        self.list_by_continent(continent).len()
    }

    /// Case-insensitive substring search over every city.
    ///
    /// An empty query matches everything; front-ends gate on
    /// [`MIN_SEARCH_LEN`] before calling this.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let needle = query.to_lowercase();
        sorted(
            self.entries()
                .map(|(_, _, city)| city)
                .filter(|city| city.to_lowercase().contains(&needle)),
        )
    }

    /// Curated list truncated to `limit`, in curated order.
    pub fn popular(&self, limit: usize) -> Vec<&str> {
        self.popular
            .iter()
            .take(limit)
            .map(String::as_str)
            .collect()
    }

    /// First match in traversal order, or [`CityLocation::UNKNOWN`].
    pub fn locate(&self, city: &str) -> CityLocation<'_> {
        self.locate_all(city)
            .into_iter()
            .next()
            .unwrap_or(CityLocation::UNKNOWN)
    }

    /// Every location carrying this city name, in traversal order.
    pub fn locate_all(&self, city: &str) -> Vec<CityLocation<'_>> {
        self.entries()
            .filter(|(_, _, name)| *name == city)
            .map(|(continent, country, _)| CityLocation { continent, country })
            .collect()
    }

    fn entries(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.continents.iter().flat_map(|continent| {
            continent.countries.iter().flat_map(move |country| {
                country.cities.iter().map(move |city| {
                    (
                        continent.name.as_str(),
                        country.name.as_str(),
                        city.as_str(),
                    )
                })
            })
        })
    }
}

impl Default for CityCatalog {
    fn default() -> Self {
        Self::world()
    }
}

fn sorted<'a>(cities: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&str> = cities.collect();
    out.sort_unstable();
    out
}

use crate::error::{Error, Result};
use crate::store::{CARS_FILE, Database};
use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref MODEL_REGEX: Regex = Regex::new(r"^[A-Z][A-Za-z0-9\s-]*$").unwrap();
    static ref MAKE_REGEX: Regex = Regex::new(r"^[A-Z][a-zA-Z\s-]*$").unwrap();
}

pub const MIN_YEAR: i32 = 1886;
pub const MAX_YEAR: i32 = 2026;
pub const DEFAULT_PAGE_SIZE: usize = 6;

/// A car record of the inventory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: u32,
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Year as submitted by a client, either a JSON number or a string
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawYear {
    Number(i64),
    Text(String),
}

impl RawYear {
    fn parse(&self) -> Option<i32> {
        match self {
            RawYear::Number(n) => i32::try_from(*n).ok(),
            RawYear::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Car payload of create and update requests, before validation
///
/// Any `id` in the payload is ignored; ids are assigned by the store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CarInput {
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: Option<RawYear>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl CarInput {
    pub fn new(make: &str, model: &str, year: i32, features: &[&str]) -> Self {
        Self {
            make: make.to_string(),
            model: model.to_string(),
            year: Some(RawYear::Number(year as i64)),
            features: features.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Listing filter and pagination
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CarQuery {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl CarQuery {
    /// Stable identity of the query, used as a cache key
    pub fn cache_key(&self) -> String {
        format!(
            "cars?model={}&page={}&limit={}",
            self.model.as_deref().unwrap_or("").to_lowercase(),
            self.page.unwrap_or(1),
            self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
        )
    }
}

/// One page of the car listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarPage {
    pub cars: Vec<Car>,
    /// Matching cars before pagination
    pub total_count: usize,
}

/// Trim features and drop empty or case-insensitive duplicate entries
///
/// The first spelling of a feature wins.
pub fn normalize_features(features: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut kept = Vec::new();
    for feature in features {
        let trimmed = feature.trim();
        if trimmed.is_empty() {
            continue;
        }
        let folded = trimmed.to_lowercase();
        if !seen.contains(&folded) {
            seen.push(folded);
            kept.push(trimmed.to_string());
        }
    }
    kept
}

/// Validate a car payload against the existing inventory
///
/// Rules are checked in order and the first failure is reported:
/// required fields, duplicate `(model, year)` under another id, model
/// format, make format, year range.
///
/// # Arguments
/// * `input` - The submitted payload
/// * `id` - The id the car will have; duplicates with this id are allowed
/// * `existing` - The current inventory
pub fn validate_car(input: &CarInput, id: u32, existing: &[Car]) -> Result<Car> {
    let make = input.make.trim();
    let model = input.model.trim();

    if make.is_empty() {
        return Err(Error::Validation("Make is required".to_string()));
    }
    if model.is_empty() {
        return Err(Error::Validation("Model is required".to_string()));
    }
    let raw_year = input
        .year
        .as_ref()
        .ok_or_else(|| Error::Validation("Year is required".to_string()))?;
    let year = raw_year.parse();

    if let Some(year) = year {
        if existing
            .iter()
            .any(|car| car.model == model && car.year == year && car.id != id)
        {
            return Err(Error::Validation(
                "Car with the same model and year already exists.".to_string(),
            ));
        }
    }

    if !MODEL_REGEX.is_match(model) {
        return Err(Error::Validation(
            "Model must start with an uppercase letter and contain only letters, numbers, spaces, or hyphens."
                .to_string(),
        ));
    }

    if !MAKE_REGEX.is_match(make) {
        return Err(Error::Validation(
            "Make must start with an uppercase letter and contain only letters.".to_string(),
        ));
    }

    let year = year
        .filter(|year| (MIN_YEAR..=MAX_YEAR).contains(year))
        .ok_or_else(|| {
            Error::Validation(format!(
                "Year must be a numeric value between {} and {}.",
                MIN_YEAR, MAX_YEAR
            ))
        })?;

    Ok(Car {
        id,
        make: make.to_string(),
        model: model.to_string(),
        year,
        features: normalize_features(&input.features),
    })
}

/// Every car in the inventory, in storage order
///
/// # Arguments
/// * `db` - The store holding `db.json`
///
/// # Returns
/// * `Result<Vec<Car>>` - The cars, empty when the collection does not exist yet
pub fn all_cars(db: &Database) -> Result<Vec<Car>> {
    db.read(CARS_FILE)
}

/// List cars whose model contains the query (case-insensitive), one page at a time
///
/// Pages are 1-based; page 0 is treated as page 1.
pub fn list_cars(db: &Database, query: &CarQuery) -> Result<CarPage> {
    let needle = query
        .model
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);

    let matching: Vec<Car> = all_cars(db)?
        .into_iter()
        .filter(|car| needle.is_empty() || car.model.to_lowercase().contains(&needle))
        .collect();
    let total_count = matching.len();

    let cars = matching
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();

    Ok(CarPage { cars, total_count })
}

/// Look up one car by id
///
/// # Errors
/// * `Error::NotFound("Car not found")` if no car has this id
pub fn get_car(db: &Database, id: u32) -> Result<Car> {
    all_cars(db)?
        .into_iter()
        .find(|car| car.id == id)
        .ok_or_else(|| Error::NotFound("Car not found".to_string()))
}

/// Validate and store a new car; its id is one past the highest id in use
///
/// # Errors
/// * `Error::Validation` if the payload breaks a validation rule
/// * `Error::Validation` if the highest id in use is already `u32::MAX`
pub fn create_car(db: &Database, input: &CarInput) -> Result<Car> {
    let _guard = db.lock();
    let mut cars = all_cars(db)?;
    let id = match cars.iter().map(|car| car.id).max() {
        None => 0,
        Some(highest) => highest
            .checked_add(1)
            .ok_or_else(|| Error::Validation("No car ids left to assign".to_string()))?,
    };

    let car = validate_car(input, id, &cars)?;
    cars.push(car.clone());
    db.write(CARS_FILE, &cars)?;

    info!("created car {} ({} {} {})", car.id, car.make, car.model, car.year);
    Ok(car)
}

/// Replace an existing car, keeping its id
pub fn update_car(db: &Database, id: u32, input: &CarInput) -> Result<Car> {
    let _guard = db.lock();
    let mut cars = all_cars(db)?;
    let slot = cars
        .iter()
        .position(|car| car.id == id)
        .ok_or_else(|| Error::NotFound("Car not found".to_string()))?;

    let car = validate_car(input, id, &cars)?;
    cars[slot] = car.clone();
    db.write(CARS_FILE, &cars)?;

    info!("updated car {}", id);
    Ok(car)
}

/// Remove a car, returning the removed record
pub fn delete_car(db: &Database, id: u32) -> Result<Car> {
    let _guard = db.lock();
    let mut cars = all_cars(db)?;
    let slot = cars
        .iter()
        .position(|car| car.id == id)
        .ok_or_else(|| Error::NotFound("Car not found".to_string()))?;

    let car = cars.remove(slot);
    db.write(CARS_FILE, &cars)?;

    info!("deleted car {}", id);
    Ok(car)
}

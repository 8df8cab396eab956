use crate::cars::Car;
use crate::continent;
use crate::error::Result;
use crate::sale::SaleRecord;
use crate::store::{CARS_FILE, Database, SALES_FILE};
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const CATALOG: &[(&str, &[&str])] = &[
    ("Toyota", &["Corolla", "Camry", "RAV4", "Highlander", "Tacoma", "Prius"]),
    ("Honda", &["Civic", "Accord", "CR-V", "Pilot", "Odyssey", "Fit"]),
    ("Ford", &["F-150", "Escape", "Explorer", "Mustang", "Edge", "Bronco"]),
    ("Chevrolet", &["Silverado", "Equinox", "Malibu", "Tahoe", "Camaro"]),
    ("Nissan", &["Altima", "Rogue", "Sentra", "Pathfinder", "Frontier"]),
    ("BMW", &["X3", "X5", "X1", "X7", "M3"]),
    ("Mercedes-Benz", &["C-Class", "E-Class", "GLC", "GLE", "S-Class"]),
    ("Audi", &["A4", "Q5", "A6", "Q7", "A3"]),
    ("Volkswagen", &["Jetta", "Tiguan", "Passat", "Atlas", "Golf"]),
    ("Hyundai", &["Elantra", "Tucson", "Santa Fe", "Sonata", "Kona"]),
    ("Kia", &["Forte", "Sportage", "Sorento", "Telluride", "Soul"]),
    ("Subaru", &["Outback", "Forester", "Crosstrek", "Impreza", "Ascent"]),
    ("Mazda", &["CX-5", "Mazda3", "CX-9", "Mazda6", "CX-30"]),
    ("Tesla", &["Model 3", "Model Y", "Model S", "Model X", "Cybertruck"]),
    ("Volvo", &["XC90", "XC60", "S60", "XC40", "V60"]),
    ("Porsche", &["Cayenne", "Macan", "Panamera", "Taycan"]),
];

const FEATURES: &[&str] = &[
    "Bluetooth",
    "Navigation",
    "Leather Seats",
    "Sunroof",
    "Backup Camera",
    "Heated Seats",
    "Keyless Entry",
    "Cruise Control",
    "Lane Departure Warning",
    "Blind Spot Monitoring",
    "Apple CarPlay",
    "Android Auto",
    "Wireless Charging",
    "Adaptive Cruise Control",
    "Panoramic Roof",
    "Remote Start",
    "All-Wheel Drive",
    "Towing Package",
];

/// Countries sold to that the continent table does not know
const UNMAPPED_COUNTRIES: &[&str] = &["Turkey"];

/// Shape of a generated data set
#[derive(Clone, Debug)]
pub struct GeneratorOptions {
    pub cars: usize,
    pub sales: usize,
    pub seed: u64,
    pub first_year: i32,
    /// Latest release and sale year
    pub last_year: i32,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            cars: 2000,
            sales: 10000,
            seed: 42,
            first_year: 1990,
            last_year: 2024,
        }
    }
}

/// Generate a random inventory; ids run from 0
pub fn generate_cars(rng: &mut impl Rng, options: &GeneratorOptions) -> Vec<Car> {
    (0..options.cars)
        .map(|id| {
            let (make, models) = CATALOG[rng.gen_range(0..CATALOG.len())];
            let model = models[rng.gen_range(0..models.len())];
            let feature_count = rng.gen_range(1..=5);
            Car {
                id: id as u32,
                make: make.to_string(),
                model: model.to_string(),
                year: rng.gen_range(options.first_year..=options.last_year),
                features: FEATURES
                    .choose_multiple(rng, feature_count)
                    .map(|f| f.to_string())
                    .collect(),
            }
        })
        .collect()
}

/// Generate sales of the given cars, each sold no earlier than its release year
pub fn generate_sales(rng: &mut impl Rng, cars: &[Car], options: &GeneratorOptions) -> Vec<SaleRecord> {
    if cars.is_empty() {
        return Vec::new();
    }
    let countries: Vec<&str> = continent::known_countries()
        .chain(UNMAPPED_COUNTRIES.iter().copied())
        .collect();

    (0..options.sales)
        .map(|id| {
            let car = &cars[rng.gen_range(0..cars.len())];
            let country = countries[rng.gen_range(0..countries.len())];
            let mut sale = SaleRecord::new(
                &car.make,
                &car.model,
                country,
                rng.gen_range(car.year..=options.last_year.max(car.year)),
                car.year,
                rng.gen_range(1..=100),
            );
            sale.id = Some(id as u64);
            sale.car_id = Some(car.id);
            sale
        })
        .collect()
}

/// Generate a data set and write it over the cars and sales collections
///
/// Returns the number of cars and sales written.
pub fn populate(db: &Database, options: &GeneratorOptions) -> Result<(usize, usize)> {
    let mut rng = StdRng::seed_from_u64(options.seed);
    let cars = generate_cars(&mut rng, options);
    let sales = generate_sales(&mut rng, &cars, options);

    let _guard = db.lock();
    db.write(CARS_FILE, &cars)?;
    db.write(SALES_FILE, &sales)?;

    info!(
        "generated {} cars and {} sales into {}",
        cars.len(),
        sales.len(),
        db.root().display()
    );
    Ok((cars.len(), sales.len()))
}

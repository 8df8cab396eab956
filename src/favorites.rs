use crate::cars::Car;
use crate::error::{Error, Result};
use crate::store::{Database, FAVORITES_FILE};
use log::info;
use std::collections::HashMap;

type FavoritesTable = HashMap<String, Vec<Car>>;

/// A user's favorite cars, in the order they were added
///
/// Users with no entry simply have no favorites.
pub fn list_favorites(db: &Database, username: &str) -> Result<Vec<Car>> {
    let mut table: FavoritesTable = db.read(FAVORITES_FILE)?;
    Ok(table.remove(username).unwrap_or_default())
}

/// Add a car snapshot to a user's favorites
///
/// # Errors
/// * `Error::Validation("Car already in favorites")` when the id is present
pub fn add_favorite(db: &Database, username: &str, car: Car) -> Result<()> {
    let _guard = db.lock();
    let mut table: FavoritesTable = db.read(FAVORITES_FILE)?;
    let favorites = table.entry(username.to_string()).or_default();

    if favorites.iter().any(|fav| fav.id == car.id) {
        return Err(Error::Validation("Car already in favorites".to_string()));
    }

    info!("{} added car {} to favorites", username, car.id);
    favorites.push(car);
    db.write(FAVORITES_FILE, &table)
}

/// Remove a car from a user's favorites by id
///
/// # Errors
/// * `Error::NotFound` if the user has no favorites or the car is not among them
pub fn remove_favorite(db: &Database, username: &str, car_id: u32) -> Result<()> {
    let _guard = db.lock();
    let mut table: FavoritesTable = db.read(FAVORITES_FILE)?;
    let favorites = table
        .get_mut(username)
        .ok_or_else(|| Error::NotFound("No favorites found".to_string()))?;

    let before = favorites.len();
    favorites.retain(|fav| fav.id != car_id);
    if favorites.len() == before {
        return Err(Error::NotFound("Car not found in favorites".to_string()));
    }

    info!("{} removed car {} from favorites", username, car_id);
    db.write(FAVORITES_FILE, &table)
}

/// Whether a car is among the user's favorites
pub fn is_favorite(db: &Database, username: &str, car_id: u32) -> Result<bool> {
    Ok(list_favorites(db, username)?
        .iter()
        .any(|fav| fav.id == car_id))
}

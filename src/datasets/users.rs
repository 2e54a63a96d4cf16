//! Generated user profiles with regions and locations for the geo tutorials
//!
//! Data is generated from fixed name pools with a seeded RNG, so every run
//! produces the same documents.

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use tracing::info;

use crate::core::store::{CollectionKind, DocumentMeta, DocumentStore, StoreError};

/// Number of generated users
pub const USER_COUNT: usize = 50;

const SEED: u64 = 0x5EED_0A12;

const FIRST_NAMES: &[(&str, &str)] = &[
    ("Anna", "female"),
    ("Ben", "male"),
    ("Clara", "female"),
    ("David", "male"),
    ("Elena", "female"),
    ("Felix", "male"),
    ("Greta", "female"),
    ("Henrik", "male"),
    ("Ida", "female"),
    ("Jonas", "male"),
    ("Katrin", "female"),
    ("Lukas", "male"),
];

const LAST_NAMES: &[&str] = &[
    "Becker", "Fischer", "Hoffmann", "Keller", "Lang", "Meyer", "Neumann", "Richter", "Schulz",
    "Wagner",
];

const HOBBIES: &[&str] = &[
    "swimming", "hiking", "chess", "running", "reading", "cooking", "climbing", "sailing",
];

/// Rectangular regions as (key, west, south, east, north)
const REGIONS: [(&str, f64, f64, f64, f64); 4] = [
    ("northwest", 6.0, 51.0, 10.0, 55.0),
    ("northeast", 10.0, 51.0, 15.0, 55.0),
    ("southwest", 6.0, 47.5, 10.0, 51.0),
    ("southeast", 10.0, 47.5, 13.5, 51.0),
];

fn date_after(year: i32, days: u64) -> String {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.checked_add_days(Days::new(days)))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn user_document(rng: &mut StdRng, index: usize) -> Value {
    let (first, gender) = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
    let likes: Vec<&str> = (0..rng.random_range(1..=3))
        .map(|_| HOBBIES[rng.random_range(0..HOBBIES.len())])
        .collect();

    json!({
        "_key": format!("user{}", index + 1),
        "name": {"first": first, "last": last},
        "gender": gender,
        "birthday": date_after(1950, rng.random_range(0..18_000)),
        "memberSince": date_after(2012, rng.random_range(0..3_300)),
        "likes": likes,
        "contact": {
            "email": format!("{}.{}{}@example.com", first.to_lowercase(), last.to_lowercase(), index + 1),
            "phone": format!("+49 30 {:07}", rng.random_range(0..10_000_000u32)),
        },
    })
}

/// Create the users collection with generated profiles
pub fn create_users(
    store: &dyn DocumentStore,
    collection: &str,
) -> Result<Vec<DocumentMeta>, StoreError> {
    store.create_collection(collection, CollectionKind::Document)?;

    let mut rng = StdRng::seed_from_u64(SEED);
    let docs: Vec<Value> = (0..USER_COUNT)
        .map(|i| user_document(&mut rng, i))
        .collect();
    store.insert_many(collection, docs)
}

/// Create the regions collection with one polygon per region
pub fn create_regions(
    store: &dyn DocumentStore,
    collection: &str,
) -> Result<Vec<DocumentMeta>, StoreError> {
    store.create_collection(collection, CollectionKind::Document)?;

    let docs: Vec<Value> = REGIONS
        .into_iter()
        .map(|(key, west, south, east, north)| {
            json!({
                "_key": key,
                "name": key,
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [west, south],
                        [east, south],
                        [east, north],
                        [west, north],
                        [west, south],
                    ]],
                },
            })
        })
        .collect();
    store.insert_many(collection, docs)
}

/// Create one location per user, each inside one of the regions
pub fn create_locations(
    store: &dyn DocumentStore,
    collection: &str,
    users: &[DocumentMeta],
) -> Result<Vec<DocumentMeta>, StoreError> {
    store.create_collection(collection, CollectionKind::Document)?;

    let mut rng = StdRng::seed_from_u64(SEED.rotate_left(17));
    let docs: Vec<Value> = users
        .iter()
        .map(|user| {
            let (region, west, south, east, north) = REGIONS[rng.random_range(0..REGIONS.len())];
            let lon = rng.random_range(west..east);
            let lat = rng.random_range(south..north);
            json!({
                "user": user.id,
                "region": region,
                "geometry": {"type": "Point", "coordinates": [lon, lat]},
            })
        })
        .collect();
    store.insert_many(collection, docs)
}

/// `users`, `regions` and `locations`
pub fn create_users_dataset(store: &dyn DocumentStore) -> Result<(), StoreError> {
    let users = create_users(store, "users")?;
    let regions = create_regions(store, "regions")?;
    let locations = create_locations(store, "locations", &users)?;

    info!(
        users = users.len(),
        regions = regions.len(),
        locations = locations.len(),
        "created users dataset"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::SqliteStore;

    fn inside(point: &Value, region: &(&str, f64, f64, f64, f64)) -> bool {
        let lon = point[0].as_f64().unwrap();
        let lat = point[1].as_f64().unwrap();
        lon >= region.1 && lon < region.3 && lat >= region.2 && lat < region.4
    }

    #[test]
    fn test_users_dataset_counts() {
        let store = SqliteStore::open_in_memory().unwrap();
        create_users_dataset(&store).unwrap();

        assert_eq!(store.count("users").unwrap(), USER_COUNT as u64);
        assert_eq!(store.count("regions").unwrap(), 4);
        assert_eq!(store.count("locations").unwrap(), USER_COUNT as u64);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = SqliteStore::open_in_memory().unwrap();
        let b = SqliteStore::open_in_memory().unwrap();
        create_users(&a, "users").unwrap();
        create_users(&b, "users").unwrap();
        assert_eq!(a.documents("users").unwrap(), b.documents("users").unwrap());
    }

    #[test]
    fn test_user_shape() {
        let store = SqliteStore::open_in_memory().unwrap();
        create_users(&store, "users").unwrap();
        let first = &store.documents("users").unwrap()[0];

        assert_eq!(first["_key"], "user1");
        assert!(first["name"]["first"].is_string());
        assert!(first["contact"]["email"]
            .as_str()
            .unwrap()
            .ends_with("1@example.com"));
        assert_eq!(first["birthday"].as_str().unwrap().len(), 10);
        let likes = first["likes"].as_array().unwrap();
        assert!((1..=3).contains(&likes.len()));
    }

    #[test]
    fn test_locations_reference_users_and_regions() {
        let store = SqliteStore::open_in_memory().unwrap();
        create_users_dataset(&store).unwrap();

        for location in store.documents("locations").unwrap() {
            let user = location["user"].as_str().unwrap();
            assert!(user.starts_with("users/user"));

            let region = REGIONS
                .iter()
                .find(|r| r.0 == location["region"].as_str().unwrap())
                .unwrap();
            assert!(inside(&location["geometry"]["coordinates"], region));
        }
    }

    #[test]
    fn test_date_after() {
        assert_eq!(date_after(2012, 0), "2012-01-01");
        assert_eq!(date_after(2012, 31), "2012-02-01");
    }
}

//! Location registry: the fixed catalog of hiding spots and the distances between them.

use std::collections::BTreeMap;

use contracts::Location;

use crate::error::{HuntError, HuntResult};
use crate::random::RandomSource;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// (id, name, x, y, description) for the New Orleans map, in display order.
const NEW_ORLEANS: [(&str, &str, f64, f64, &str); 12] = [
    (
        "french-quarter",
        "French Quarter",
        42.0,
        45.0,
        "Historic heart of New Orleans with iconic architecture, jazz clubs, and Bourbon Street",
    ),
    (
        "garden-district",
        "Garden District",
        20.0,
        52.0,
        "Elegant Victorian mansions and oak-lined streets upriver from downtown",
    ),
    (
        "marigny",
        "Marigny",
        58.0,
        48.0,
        "Bohemian neighborhood downriver from French Quarter, known for Frenchmen Street",
    ),
    (
        "warehouse-district",
        "Warehouse District",
        32.0,
        42.0,
        "Arts district with museums, galleries, and converted warehouse lofts",
    ),
    (
        "bywater",
        "Bywater",
        68.0,
        50.0,
        "Colorful neighborhood with shotgun houses and emerging restaurant scene",
    ),
    (
        "treme",
        "Tremé",
        45.0,
        32.0,
        "Historic African-American neighborhood, birthplace of jazz music",
    ),
    (
        "mid-city",
        "Mid-City",
        32.0,
        22.0,
        "Diverse area home to City Park, Bayou St. John, and the Fair Grounds",
    ),
    (
        "uptown",
        "Uptown",
        15.0,
        55.0,
        "University area with Tulane, Loyola, and the famous St. Charles streetcar line",
    ),
    (
        "algiers",
        "Algiers",
        10.0,
        75.0,
        "Historic neighborhood on the West Bank across the Mississippi River",
    ),
    (
        "gentilly",
        "Gentilly",
        75.0,
        28.0,
        "Large residential area extending toward Lake Pontchartrain",
    ),
    (
        "lakefront",
        "Lakefront",
        50.0,
        12.0,
        "Recreational area along Lake Pontchartrain with parks and marinas",
    ),
    (
        "cbd",
        "CBD",
        35.0,
        38.0,
        "Central Business District with skyscrapers, hotels, and the Superdome",
    ),
];

// ---------------------------------------------------------------------------
// LocationRegistry
// ---------------------------------------------------------------------------

/// Immutable catalog. Iteration order is the catalog order, which the opponent's
/// roulette wheel and every uniform draw depend on.
#[derive(Debug, Clone)]
pub struct LocationRegistry {
    locations: Vec<Location>,
    index_by_id: BTreeMap<String, usize>,
}

impl LocationRegistry {
    /// Validate and index a catalog: ids unique and non-empty, coordinates in `[0, 100]`.
    pub fn from_locations(locations: Vec<Location>) -> HuntResult<Self> {
        if locations.is_empty() {
            return Err(HuntError::InvalidCatalog("catalog is empty".to_string()));
        }

        let mut index_by_id = BTreeMap::new();
        for (idx, location) in locations.iter().enumerate() {
            if location.id.trim().is_empty() {
                return Err(HuntError::InvalidCatalog(format!(
                    "location at position {idx} has an empty id"
                )));
            }
            for (axis, value) in [("x", location.x), ("y", location.y)] {
                if !(0.0..=100.0).contains(&value) {
                    return Err(HuntError::InvalidCatalog(format!(
                        "{} has {axis}={value} outside [0, 100]",
                        location.id
                    )));
                }
            }
            if index_by_id.insert(location.id.clone(), idx).is_some() {
                return Err(HuntError::InvalidCatalog(format!(
                    "duplicate location id {}",
                    location.id
                )));
            }
        }

        Ok(Self {
            locations,
            index_by_id,
        })
    }

    pub fn from_json_str(raw: &str) -> HuntResult<Self> {
        let locations: Vec<Location> = serde_json::from_str(raw)
            .map_err(|err| HuntError::InvalidCatalog(format!("malformed catalog json: {err}")))?;
        Self::from_locations(locations)
    }

    pub fn new_orleans() -> Self {
        let locations = NEW_ORLEANS
            .iter()
            .map(|(id, name, x, y, description)| Location::new(*id, *name, *x, *y, *description))
            .collect::<Vec<_>>();
        let index_by_id = locations
            .iter()
            .enumerate()
            .map(|(idx, location)| (location.id.clone(), idx))
            .collect();
        Self {
            locations,
            index_by_id,
        }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn contains(&self, location_id: &str) -> bool {
        self.index_by_id.contains_key(location_id)
    }

    pub fn get(&self, location_id: &str) -> Option<&Location> {
        self.index_by_id
            .get(location_id)
            .map(|idx| &self.locations[*idx])
    }

    pub fn require(&self, location_id: &str) -> HuntResult<&Location> {
        self.get(location_id)
            .ok_or_else(|| HuntError::not_found("location", location_id))
    }

    /// Display name, falling back to the id for unknown entries.
    pub fn name_of<'a>(&'a self, location_id: &'a str) -> &'a str {
        self.get(location_id)
            .map(|location| location.name.as_str())
            .unwrap_or(location_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn distance(&self, from_id: &str, to_id: &str) -> HuntResult<f64> {
        let from = self.require(from_id)?;
        let to = self.require(to_id)?;
        Ok(from.distance_to(to))
    }

    pub fn random_location(&self, rng: &mut dyn RandomSource) -> &Location {
        &self.locations[rng.index(self.locations.len())]
    }
}

impl Default for LocationRegistry {
    fn default() -> Self {
        Self::new_orleans()
    }
}

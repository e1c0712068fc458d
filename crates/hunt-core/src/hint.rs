//! Flavor-text hints. No numeric distance ever leaves this module.

use std::fmt;

use contracts::Location;

const VERY_CLOSE_RADIUS: f64 = 15.0;
const WARM_RADIUS: f64 = 30.0;

/// y below this is the lake shore, above `RIVER_EDGE_Y` is the far bank.
const LAKE_EDGE_Y: f64 = 25.0;
const RIVER_EDGE_Y: f64 = 60.0;

const COLD_UPRIVER_X: f64 = 30.0;
const COLD_DOWNRIVER_X: f64 = 60.0;
const AREA_UPRIVER_X: f64 = 25.0;
const AREA_DOWNRIVER_X: f64 = 65.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    North,
    South,
    East,
    West,
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintTier {
    VeryClose,
    Warm,
    Cold,
}

/// Hint returned after a missed guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityHint {
    VeryClose,
    WarmNearLake,
    WarmAcrossRiver,
    WarmHeading(Heading),
    ColdUpriver,
    ColdDownriver,
    ColdCentral,
}

impl ProximityHint {
    pub fn tier(&self) -> HintTier {
        match self {
            Self::VeryClose => HintTier::VeryClose,
            Self::WarmNearLake | Self::WarmAcrossRiver | Self::WarmHeading(_) => HintTier::Warm,
            Self::ColdUpriver | Self::ColdDownriver | Self::ColdCentral => HintTier::Cold,
        }
    }
}

impl fmt::Display for ProximityHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VeryClose => write!(f, "Very close! Check nearby districts."),
            Self::WarmNearLake => write!(f, "Try looking near the lakefront or Mid-City area."),
            Self::WarmAcrossRiver => write!(f, "Look across the river or in the southern areas."),
            Self::WarmHeading(heading) => {
                write!(f, "Getting warmer. Try heading {heading} along the river.")
            }
            Self::ColdUpriver => write!(
                f,
                "Cold. Try the upriver neighborhoods like Garden District or Uptown."
            ),
            Self::ColdDownriver => write!(
                f,
                "Cold. Look downriver toward Marigny, Bywater, or Gentilly."
            ),
            Self::ColdCentral => write!(
                f,
                "Cold. Focus on the central districts near the French Quarter."
            ),
        }
    }
}

/// Heading from `from` toward `to`; the dominant axis wins, ties go north/south.
/// Screen coordinates: y grows southward.
pub fn heading_between(from: &Location, to: &Location) -> Heading {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() > dy.abs() {
        if dx > 0.0 {
            Heading::East
        } else {
            Heading::West
        }
    } else if dy > 0.0 {
        Heading::South
    } else {
        Heading::North
    }
}

pub fn proximity_hint(guessed: &Location, actual: &Location) -> ProximityHint {
    let distance = guessed.distance_to(actual);

    if distance < VERY_CLOSE_RADIUS {
        ProximityHint::VeryClose
    } else if distance < WARM_RADIUS {
        if actual.y < LAKE_EDGE_Y {
            ProximityHint::WarmNearLake
        } else if actual.y > RIVER_EDGE_Y {
            ProximityHint::WarmAcrossRiver
        } else {
            ProximityHint::WarmHeading(heading_between(guessed, actual))
        }
    } else if actual.x < COLD_UPRIVER_X {
        ProximityHint::ColdUpriver
    } else if actual.x > COLD_DOWNRIVER_X {
        ProximityHint::ColdDownriver
    } else {
        ProximityHint::ColdCentral
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiverBand {
    Upriver,
    Downriver,
    Central,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    Lakeside,
    AcrossRiver,
    RiverBend,
}

/// Coarse two-axis hint bought with a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaHint {
    pub band: RiverBand,
    pub bank: Bank,
}

impl fmt::Display for AreaHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let band = match self.band {
            RiverBand::Upriver => "in the upriver areas (Garden District, Uptown)",
            RiverBand::Downriver => "in the downriver neighborhoods (Bywater, Gentilly)",
            RiverBand::Central => "in the central districts (French Quarter, CBD, Tremé)",
        };
        let bank = match self.bank {
            Bank::Lakeside => "near Lake Pontchartrain",
            Bank::AcrossRiver => "across the Mississippi River",
            Bank::RiverBend => "along the river bend",
        };
        write!(f, "The fugitive was last seen {band} {bank}.")
    }
}

pub fn area_hint(actual: &Location) -> AreaHint {
    let band = if actual.x < AREA_UPRIVER_X {
        RiverBand::Upriver
    } else if actual.x > AREA_DOWNRIVER_X {
        RiverBand::Downriver
    } else {
        RiverBand::Central
    };

    let bank = if actual.y < LAKE_EDGE_Y {
        Bank::Lakeside
    } else if actual.y > RIVER_EDGE_Y {
        Bank::AcrossRiver
    } else {
        Bank::RiverBend
    };

    AreaHint { band, bank }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::LocationRegistry;

    fn hint(registry: &LocationRegistry, guessed: &str, actual: &str) -> ProximityHint {
        proximity_hint(
            registry.get(guessed).expect("guessed id"),
            registry.get(actual).expect("actual id"),
        )
    }

    #[test]
    fn adjacent_districts_are_very_close() {
        let registry = LocationRegistry::new_orleans();
        // warehouse-district (32,42) to cbd (35,38): 5 apart
        assert_eq!(hint(&registry, "warehouse-district", "cbd"), ProximityHint::VeryClose);
    }

    #[test]
    fn warm_tier_branches_on_target_position() {
        let registry = LocationRegistry::new_orleans();
        // uptown (15,55) to cbd (35,38): ~26.2, target mid-map, dx dominates eastward
        assert_eq!(
            hint(&registry, "uptown", "cbd"),
            ProximityHint::WarmHeading(Heading::East)
        );
        // treme (45,32) to lakefront (50,12): ~20.6, target on the lake shore
        assert_eq!(hint(&registry, "treme", "lakefront"), ProximityHint::WarmNearLake);
        // garden-district (20,52) to algiers (10,75): ~25.1, target across the river
        assert_eq!(hint(&registry, "garden-district", "algiers"), ProximityHint::WarmAcrossRiver);
    }

    #[test]
    fn cold_tier_branches_on_target_x() {
        let registry = LocationRegistry::new_orleans();
        assert_eq!(hint(&registry, "gentilly", "uptown"), ProximityHint::ColdUpriver);
        assert_eq!(hint(&registry, "algiers", "bywater"), ProximityHint::ColdDownriver);
        assert_eq!(hint(&registry, "algiers", "treme"), ProximityHint::ColdCentral);
        assert_eq!(hint(&registry, "algiers", "treme").tier(), HintTier::Cold);
    }

    #[test]
    fn heading_prefers_dominant_axis() {
        let origin = Location::new("o", "O", 50.0, 50.0, "");
        assert_eq!(heading_between(&origin, &Location::new("e", "E", 70.0, 55.0, "")), Heading::East);
        assert_eq!(heading_between(&origin, &Location::new("w", "W", 20.0, 45.0, "")), Heading::West);
        assert_eq!(heading_between(&origin, &Location::new("s", "S", 52.0, 80.0, "")), Heading::South);
        assert_eq!(heading_between(&origin, &Location::new("n", "N", 50.0, 10.0, "")), Heading::North);
        // tie goes to the vertical axis
        assert_eq!(heading_between(&origin, &Location::new("t", "T", 60.0, 60.0, "")), Heading::South);
    }

    #[test]
    fn area_hint_reads_both_axes() {
        let registry = LocationRegistry::new_orleans();
        let algiers = area_hint(registry.get("algiers").expect("algiers"));
        assert_eq!(algiers.band, RiverBand::Upriver);
        assert_eq!(algiers.bank, Bank::AcrossRiver);
        assert_eq!(
            algiers.to_string(),
            "The fugitive was last seen in the upriver areas (Garden District, Uptown) across the Mississippi River."
        );

        let gentilly = area_hint(registry.get("gentilly").expect("gentilly"));
        assert_eq!(gentilly.band, RiverBand::Downriver);
        assert_eq!(gentilly.bank, Bank::RiverBend);

        let lakefront = area_hint(registry.get("lakefront").expect("lakefront"));
        assert_eq!(lakefront.band, RiverBand::Central);
        assert_eq!(lakefront.bank, Bank::Lakeside);
    }
}

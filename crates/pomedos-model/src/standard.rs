//! Reference population used as weights for direct standardization.

use crate::{BracketValues, StandardBracket};

/// European Standard Population 2013 as published: `(low, high, weight)`
/// with `high` exclusive and `None` for the open-ended band.
pub const ESP_2013_BANDS: [(u32, Option<u32>, f64); 20] = [
    (0, Some(1), 1000.0),
    (1, Some(5), 4000.0),
    (5, Some(10), 5500.0),
    (10, Some(15), 5500.0),
    (15, Some(20), 5500.0),
    (20, Some(25), 6000.0),
    (25, Some(30), 6000.0),
    (30, Some(35), 6500.0),
    (35, Some(40), 7000.0),
    (40, Some(45), 7000.0),
    (45, Some(50), 7000.0),
    (50, Some(55), 7000.0),
    (55, Some(60), 6500.0),
    (60, Some(65), 6000.0),
    (65, Some(70), 5500.0),
    (70, Some(75), 5000.0),
    (75, Some(80), 4000.0),
    (80, Some(85), 2500.0),
    (85, Some(90), 1500.0),
    (90, None, 1000.0),
];

/// [`ESP_2013_BANDS`] folded into the standard brackets.
const ESP_2013_FOLDED: [(StandardBracket, f64); 7] = [
    (StandardBracket::UnderOne, 1000.0),
    (StandardBracket::OneToFifteen, 15000.0),
    (StandardBracket::FifteenToTwenty, 5500.0),
    (StandardBracket::TwentyToTwentyFive, 6000.0),
    (StandardBracket::TwentyFiveToThirty, 6000.0),
    (StandardBracket::ThirtyToSixtyFive, 47000.0),
    (StandardBracket::SixtyFiveAndOver, 19500.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct StandardPopulation {
    name: String,
    weights: BracketValues<f64>,
}

impl StandardPopulation {
    pub fn new(name: impl Into<String>, weights: BracketValues<f64>) -> Self {
        Self {
            name: name.into(),
            weights,
        }
    }

    /// The embedded European Standard Population 2013.
    pub fn esp2013() -> Self {
        let weights = BracketValues::from_fn(|bracket| {
            ESP_2013_FOLDED
                .iter()
                .find(|(candidate, _)| *candidate == bracket)
                .map_or(0.0, |(_, weight)| *weight)
        });
        Self::new("ESP 2013", weights)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weights(&self) -> &BracketValues<f64> {
        &self.weights
    }

    pub fn weight(&self, bracket: StandardBracket) -> Option<f64> {
        self.weights.get(bracket).copied()
    }

    pub fn total(&self) -> f64 {
        self.weights.total()
    }
}

impl Default for StandardPopulation {
    fn default() -> Self {
        Self::esp2013()
    }
}

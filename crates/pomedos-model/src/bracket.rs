//! Age brackets and the fold into the seven standard brackets.
//!
//! Source tables name their brackets in several styles (`unter 1 Jahr`,
//! `30 bis unter 35 Jahre`, `1 - 15`, `65 und älter`, `90+`). All of them are
//! parsed into a half-open [`AgeRange`] so that ordering and folding work on
//! ages rather than on column positions.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

const UNKNOWN_LABELS: [&str; 4] = ["alter unbekannt", "unbekannt", "unknown", "unknown age"];
const OPEN_ENDED_SUFFIXES: [&str; 6] = [
    "und mehr",
    "und älter",
    "und aelter",
    "and over",
    "and older",
    "+",
];

/// Half-open age interval `[low, high)`; `high == None` is open ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgeRange {
    low: u32,
    high: Option<u32>,
}

impl AgeRange {
    pub fn new(low: u32, high: Option<u32>) -> Result<Self, ModelError> {
        match high {
            Some(high) if high <= low => Err(ModelError::InvalidAgeRange { low, high }),
            _ => Ok(Self { low, high }),
        }
    }

    pub const fn open(low: u32) -> Self {
        Self { low, high: None }
    }

    const fn bounded(low: u32, high: u32) -> Self {
        Self {
            low,
            high: Some(high),
        }
    }

    pub const fn low(&self) -> u32 {
        self.low
    }

    pub const fn high(&self) -> Option<u32> {
        self.high
    }

    /// True when `inner` lies entirely inside `self`.
    pub fn contains_range(&self, inner: &AgeRange) -> bool {
        if inner.low < self.low {
            return false;
        }
        match (self.high, inner.high) {
            (None, _) => true,
            (Some(high), Some(inner_high)) => inner_high <= high,
            (Some(_), None) => false,
        }
    }
}

impl Ord for AgeRange {
    fn cmp(&self, other: &Self) -> Ordering {
        self.low
            .cmp(&other.low)
            .then_with(|| match (self.high, other.high) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

impl PartialOrd for AgeRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.high {
            Some(high) => write!(f, "{} - {}", self.low, high),
            None => write!(f, "{}+", self.low),
        }
    }
}

/// A bracket of the native (fine) death-record scheme.
///
/// Sorting puts known ranges in ascending age order and the unknown-age
/// bucket last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeBracket {
    Known(AgeRange),
    Unknown,
}

impl AgeBracket {
    pub fn range(&self) -> Option<AgeRange> {
        match self {
            AgeBracket::Known(range) => Some(*range),
            AgeBracket::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, AgeBracket::Unknown)
    }
}

impl From<AgeRange> for AgeBracket {
    fn from(range: AgeRange) -> Self {
        AgeBracket::Known(range)
    }
}

impl FromStr for AgeBracket {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s).ok_or_else(|| ModelError::InvalidBracketLabel(s.to_string()))
    }
}

impl Serialize for AgeBracket {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeBracket::Known(range) => range.fmt(f),
            AgeBracket::Unknown => f.write_str("Alter unbekannt"),
        }
    }
}

fn parse_label(raw: &str) -> Option<AgeBracket> {
    let normalized = raw
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    if UNKNOWN_LABELS.contains(&normalized.as_str()) {
        return Some(AgeBracket::Unknown);
    }

    let numbers: Vec<u32> = normalized
        .split(|c: char| !c.is_ascii_digit())
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;

    let range = if normalized.starts_with("unter ") || normalized.starts_with("under ") {
        match numbers.as_slice() {
            [high] => AgeRange::new(0, Some(*high)).ok()?,
            _ => return None,
        }
    } else if OPEN_ENDED_SUFFIXES
        .iter()
        .any(|suffix| normalized.ends_with(suffix))
    {
        match numbers.as_slice() {
            [low] => AgeRange::open(*low),
            _ => return None,
        }
    } else if normalized.contains("bis unter") || normalized.contains('-') {
        match numbers.as_slice() {
            [low, high] => AgeRange::new(*low, Some(*high)).ok()?,
            _ => return None,
        }
    } else {
        return None;
    };
    Some(AgeBracket::Known(range))
}

/// The aggregated scheme shared by population counts and standard weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StandardBracket {
    #[serde(rename = "0 - 1")]
    UnderOne,
    #[serde(rename = "1 - 15")]
    OneToFifteen,
    #[serde(rename = "15 - 20")]
    FifteenToTwenty,
    #[serde(rename = "20 - 25")]
    TwentyToTwentyFive,
    #[serde(rename = "25 - 30")]
    TwentyFiveToThirty,
    #[serde(rename = "30 - 65")]
    ThirtyToSixtyFive,
    #[serde(rename = "65+")]
    SixtyFiveAndOver,
}

impl StandardBracket {
    pub const ALL: [StandardBracket; 7] = [
        StandardBracket::UnderOne,
        StandardBracket::OneToFifteen,
        StandardBracket::FifteenToTwenty,
        StandardBracket::TwentyToTwentyFive,
        StandardBracket::TwentyFiveToThirty,
        StandardBracket::ThirtyToSixtyFive,
        StandardBracket::SixtyFiveAndOver,
    ];

    pub const fn range(&self) -> AgeRange {
        match self {
            StandardBracket::UnderOne => AgeRange::bounded(0, 1),
            StandardBracket::OneToFifteen => AgeRange::bounded(1, 15),
            StandardBracket::FifteenToTwenty => AgeRange::bounded(15, 20),
            StandardBracket::TwentyToTwentyFive => AgeRange::bounded(20, 25),
            StandardBracket::TwentyFiveToThirty => AgeRange::bounded(25, 30),
            StandardBracket::ThirtyToSixtyFive => AgeRange::bounded(30, 65),
            StandardBracket::SixtyFiveAndOver => AgeRange::open(65),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StandardBracket::UnderOne => "0 - 1",
            StandardBracket::OneToFifteen => "1 - 15",
            StandardBracket::FifteenToTwenty => "15 - 20",
            StandardBracket::TwentyToTwentyFive => "20 - 25",
            StandardBracket::TwentyFiveToThirty => "25 - 30",
            StandardBracket::ThirtyToSixtyFive => "30 - 65",
            StandardBracket::SixtyFiveAndOver => "65+",
        }
    }

    /// The standard bracket that fully contains `range`, if any.
    pub fn containing(range: &AgeRange) -> Option<StandardBracket> {
        Self::ALL
            .into_iter()
            .find(|bracket| bracket.range().contains_range(range))
    }
}

impl FromStr for StandardBracket {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let range = s
            .parse::<AgeBracket>()?
            .range()
            .ok_or_else(|| ModelError::InvalidBracketLabel(s.to_string()))?;
        Self::ALL
            .into_iter()
            .find(|bracket| bracket.range() == range)
            .ok_or_else(|| ModelError::InvalidBracketLabel(s.to_string()))
    }
}

impl fmt::Display for StandardBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per [`StandardBracket`], keyed by bracket identity.
///
/// Always holds all seven brackets.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketValues<T> {
    values: BTreeMap<StandardBracket, T>,
}

impl<T> BracketValues<T> {
    pub fn from_complete(values: BTreeMap<StandardBracket, T>) -> Result<Self, ModelError> {
        if let Some(missing) = StandardBracket::ALL
            .iter()
            .find(|bracket| !values.contains_key(*bracket))
        {
            return Err(ModelError::alignment(format!(
                "no value for standard bracket {missing}"
            )));
        }
        Ok(Self { values })
    }

    /// Builds a complete set by evaluating `f` for every standard bracket.
    pub fn from_fn(mut f: impl FnMut(StandardBracket) -> T) -> Self {
        Self {
            values: StandardBracket::ALL
                .into_iter()
                .map(|bracket| (bracket, f(bracket)))
                .collect(),
        }
    }

    pub fn get(&self, bracket: StandardBracket) -> Option<&T> {
        self.values.get(&bracket)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StandardBracket, &T)> {
        self.values.iter().map(|(bracket, value)| (*bracket, value))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.values.values()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn map<U>(&self, mut f: impl FnMut(StandardBracket, &T) -> U) -> BracketValues<U> {
        BracketValues {
            values: self
                .values
                .iter()
                .map(|(bracket, value)| (*bracket, f(*bracket, value)))
                .collect(),
        }
    }
}

impl<T: Copy + std::iter::Sum<T>> BracketValues<T> {
    pub fn total(&self) -> T {
        self.values.values().copied().sum()
    }
}

/// Folds fine age ranges into the seven standard brackets.
///
/// The ranges must tile `[0, ∞)` exactly: start at zero, no gaps, no
/// overlaps, one open-ended range at the end. Each range must sit inside a
/// single standard bracket. Under those conditions the fold is lossless.
pub fn fold_into_standard<T, I>(entries: I) -> Result<BracketValues<T>, ModelError>
where
    I: IntoIterator<Item = (AgeRange, T)>,
    T: Copy + Default + AddAssign,
{
    let mut sorted: Vec<(AgeRange, T)> = entries.into_iter().collect();
    if sorted.is_empty() {
        return Err(ModelError::alignment("no age brackets to fold"));
    }
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut expected_low = Some(0);
    for (range, _) in &sorted {
        let Some(expected) = expected_low else {
            return Err(ModelError::alignment(format!(
                "bracket {range} follows the open-ended bracket"
            )));
        };
        match range.low().cmp(&expected) {
            Ordering::Greater => {
                return Err(ModelError::alignment(format!(
                    "gap between age {expected} and bracket {range}"
                )));
            }
            Ordering::Less => {
                return Err(ModelError::alignment(format!(
                    "bracket {range} overlaps ages below {expected}"
                )));
            }
            Ordering::Equal => {}
        }
        expected_low = range.high();
    }
    if let Some(expected) = expected_low {
        return Err(ModelError::alignment(format!(
            "no open-ended bracket covers ages from {expected}"
        )));
    }

    let mut folded: BTreeMap<StandardBracket, T> = BTreeMap::new();
    for (range, value) in sorted {
        let target = StandardBracket::containing(&range).ok_or_else(|| {
            ModelError::alignment(format!("bracket {range} straddles a standard bracket boundary"))
        })?;
        *folded.entry(target).or_default() += value;
    }
    BracketValues::from_complete(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(low: u32, high: Option<u32>) -> AgeBracket {
        AgeBracket::Known(AgeRange::new(low, high).unwrap())
    }

    #[test]
    fn brackets_serialize_as_labels() {
        let brackets = [known(0, Some(1)), known(65, None), AgeBracket::Unknown];
        let json = serde_json::to_string(&brackets).unwrap();
        assert_eq!(json, r#"["0 - 1","65+","Alter unbekannt"]"#);
    }

    #[test]
    fn parses_destatis_labels() {
        assert_eq!("unter 1 Jahr".parse::<AgeBracket>().unwrap(), known(0, Some(1)));
        assert_eq!(
            "1 bis unter 15 Jahre".parse::<AgeBracket>().unwrap(),
            known(1, Some(15))
        );
        assert_eq!(
            "30 bis unter 35 Jahre".parse::<AgeBracket>().unwrap(),
            known(30, Some(35))
        );
        assert_eq!(
            "85 Jahre und mehr".parse::<AgeBracket>().unwrap(),
            known(85, None)
        );
        assert_eq!(
            "Alter unbekannt".parse::<AgeBracket>().unwrap(),
            AgeBracket::Unknown
        );
    }

    #[test]
    fn parses_population_and_weight_labels() {
        assert_eq!("0 - 1".parse::<AgeBracket>().unwrap(), known(0, Some(1)));
        assert_eq!("14-15".parse::<AgeBracket>().unwrap(), known(14, Some(15)));
        assert_eq!("65 und älter".parse::<AgeBracket>().unwrap(), known(65, None));
        assert_eq!("90+".parse::<AgeBracket>().unwrap(), known(90, None));
    }

    #[test]
    fn rejects_unrecognized_labels() {
        for label in ["", "Insgesamt", "5", "10 - 5", "1 - 2 - 3"] {
            assert!(label.parse::<AgeBracket>().is_err(), "accepted {label:?}");
        }
    }

    #[test]
    fn sorts_by_age_with_unknown_last() {
        let mut brackets: Vec<AgeBracket> = [
            "Alter unbekannt",
            "1 bis unter 15 Jahre",
            "85 Jahre und mehr",
            "unter 1 Jahr",
            "80 bis unter 85 Jahre",
        ]
        .iter()
        .map(|label| label.parse().unwrap())
        .collect();
        brackets.sort();
        assert_eq!(
            brackets,
            vec![
                known(0, Some(1)),
                known(1, Some(15)),
                known(80, Some(85)),
                known(85, None),
                AgeBracket::Unknown,
            ]
        );
    }

    #[test]
    fn standard_bracket_round_trips_labels() {
        for bracket in StandardBracket::ALL {
            assert_eq!(bracket.label().parse::<StandardBracket>().unwrap(), bracket);
        }
        assert_eq!(
            "65 Jahre und mehr".parse::<StandardBracket>().unwrap(),
            StandardBracket::SixtyFiveAndOver
        );
        assert!("30 - 35".parse::<StandardBracket>().is_err());
    }

    #[test]
    fn fold_sums_fine_bands() {
        let mut entries = vec![
            (AgeRange::new(0, Some(1)).unwrap(), 1u64),
            (AgeRange::new(1, Some(15)).unwrap(), 2),
            (AgeRange::new(15, Some(20)).unwrap(), 3),
            (AgeRange::new(20, Some(25)).unwrap(), 4),
            (AgeRange::new(25, Some(30)).unwrap(), 5),
        ];
        for low in (30..65).step_by(5) {
            entries.push((AgeRange::new(low, Some(low + 5)).unwrap(), 10));
        }
        entries.push((AgeRange::new(65, Some(70)).unwrap(), 100));
        entries.push((AgeRange::open(70), 200));

        let folded = fold_into_standard(entries).unwrap();
        assert_eq!(folded.len(), 7);
        assert_eq!(folded.get(StandardBracket::ThirtyToSixtyFive), Some(&70));
        assert_eq!(folded.get(StandardBracket::SixtyFiveAndOver), Some(&300));
        assert_eq!(folded.total(), 1 + 2 + 3 + 4 + 5 + 70 + 300);
    }

    #[test]
    fn fold_rejects_gap() {
        let entries = vec![
            (AgeRange::new(0, Some(1)).unwrap(), 1u64),
            (AgeRange::new(2, Some(15)).unwrap(), 1),
            (AgeRange::open(15), 1),
        ];
        assert!(matches!(
            fold_into_standard(entries),
            Err(ModelError::BracketAlignment { .. })
        ));
    }

    #[test]
    fn fold_rejects_overlap_and_missing_open_end() {
        let overlap = vec![
            (AgeRange::new(0, Some(15)).unwrap(), 1u64),
            (AgeRange::new(10, Some(20)).unwrap(), 1),
            (AgeRange::open(20), 1),
        ];
        assert!(fold_into_standard(overlap).is_err());

        let closed = vec![(AgeRange::new(0, Some(1)).unwrap(), 1u64)];
        assert!(fold_into_standard(closed).is_err());
    }

    #[test]
    fn fold_rejects_straddling_bracket() {
        // 60 - 70 crosses the 65 boundary.
        let entries = vec![
            (AgeRange::new(0, Some(1)).unwrap(), 1u64),
            (AgeRange::new(1, Some(15)).unwrap(), 1),
            (AgeRange::new(15, Some(20)).unwrap(), 1),
            (AgeRange::new(20, Some(25)).unwrap(), 1),
            (AgeRange::new(25, Some(30)).unwrap(), 1),
            (AgeRange::new(30, Some(60)).unwrap(), 1),
            (AgeRange::new(60, Some(70)).unwrap(), 1),
            (AgeRange::open(70), 1),
        ];
        let err = fold_into_standard(entries).unwrap_err();
        assert!(err.to_string().contains("straddles"));
    }
}

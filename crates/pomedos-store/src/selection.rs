use pomedos_model::Year;

/// Which years a death query sums over.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum YearSelection {
    /// Every year in the cause-of-death table.
    #[default]
    All,
    /// The listed years, in the given order.
    Years(Vec<Year>),
}

impl YearSelection {
    pub fn single(year: Year) -> Self {
        Self::Years(vec![year])
    }
}

impl From<Year> for YearSelection {
    fn from(year: Year) -> Self {
        Self::single(year)
    }
}

impl From<Vec<Year>> for YearSelection {
    fn from(years: Vec<Year>) -> Self {
        Self::Years(years)
    }
}

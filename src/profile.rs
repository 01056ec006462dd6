use crate::data::{Table, Value};
use crate::error::{DashboardError, Result};

pub const GENDER: &str = "CODE_GENDER";
pub const OWN_CAR: &str = "FLAG_OWN_CAR";
pub const OWN_REALTY: &str = "FLAG_OWN_REALTY";
pub const DAYS_BIRTH: &str = "DAYS_BIRTH";
pub const INCOME: &str = "AMT_INCOME_TOTAL";
pub const FAMILY_STATUS: &str = "NAME_FAMILY_STATUS";
pub const CHILDREN: &str = "CNT_CHILDREN";
pub const CREDIT_INCOME_PERCENT: &str = "CREDIT_INCOME_PERCENT";

/// Columns offered in the indicator comparison.
pub const COMPARABLE_INDICATORS: [&str; 2] = [INCOME, CHILDREN];

/// The client attributes shown next to the score.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientProfile {
    pub id: i64,
    pub gender: Value,
    pub owns_car: Value,
    pub owns_realty: Value,
    /// Whole years, from `DAYS_BIRTH`.
    pub age_years: i64,
    pub income: Value,
    pub family_status: Value,
    pub children: Value,
    pub credit_income_percent: Value,
}

impl ClientProfile {
    pub fn extract(clients: &Table, id: i64) -> Result<Self> {
        let row = clients.row(id)?;
        let get = |column: &str| -> Result<Value> {
            Ok(row.values[clients.column_index(column)?].clone())
        };

        let days = get(DAYS_BIRTH)?;
        let age_years = days
            .as_f64()
            .filter(|d| d.is_finite())
            .map(age_from_days)
            .ok_or_else(|| {
                DashboardError::invalid(format!("client {id}: {DAYS_BIRTH} is not numeric ({days})"))
            })?;

        Ok(ClientProfile {
            id,
            gender: get(GENDER)?,
            owns_car: get(OWN_CAR)?,
            owns_realty: get(OWN_REALTY)?,
            age_years,
            income: get(INCOME)?,
            family_status: get(FAMILY_STATUS)?,
            children: get(CHILDREN)?,
            credit_income_percent: get(CREDIT_INCOME_PERCENT)?,
        })
    }

    /// `(label, value)` lines in display order.
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Gender", self.gender.to_string()),
            ("Owns a car", self.owns_car.to_string()),
            ("Owns real estate", self.owns_realty.to_string()),
            ("Age", format!("{} years", self.age_years)),
            ("Total income", self.income.to_string()),
            ("Family status", self.family_status.to_string()),
            ("Children", self.children.to_string()),
            ("Credit amount (% of income)", self.credit_income_percent.to_string()),
        ]
    }
}

/// Whole years lived; the sign of `DAYS_BIRTH` is ignored since raw
/// exports count days before the application as negative.
pub fn age_from_days(days: f64) -> i64 {
    (days.abs() / 365.0).trunc() as i64
}

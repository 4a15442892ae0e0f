use std::{fmt::Display, ops::Deref, str::FromStr};

use thiserror::Error;

/// Problems with the rate the user typed. These are input errors, the salary is never computed
/// from an invalid rate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateError {
    #[error("Please enter an hourly rate.")]
    Missing,
    #[error("Invalid hourly rate.")]
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct HourlyRate(f64);

impl HourlyRate {
    pub fn new_opt(value: f64) -> Option<HourlyRate> {
        value.is_finite().then_some(HourlyRate(value))
    }
}

impl FromStr for HourlyRate {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RateError::Missing);
        }
        let value = s.parse::<f64>().map_err(|_| RateError::Invalid)?;
        HourlyRate::new_opt(value).ok_or(RateError::Invalid)
    }
}

impl Deref for HourlyRate {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Estimated pay, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Salary(f64);

impl Salary {
    pub fn amount(&self) -> f64 {
        self.0
    }
}

impl Display for Salary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

pub fn salary_for(rate: HourlyRate, total_minutes: u64) -> Salary {
    let amount = *rate * (total_minutes as f64 / 60.);
    Salary((amount * 100.).round() / 100.)
}

/// Validates the stored rate text and estimates the salary for `total_minutes`.
pub fn estimate_salary(rate: &str, total_minutes: u64) -> Result<Salary, RateError> {
    Ok(salary_for(rate.parse()?, total_minutes))
}

//! Validation of the trip-parameters form.
//!
//! Every field is checked independently and all violations are returned
//! together. Nothing is cached between calls, so each submit starts from a
//! clean slate.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{
    handoff::DeparturePayload,
    models::trip::{StartTime, TripRequest},
};

/// Raw values as posted by the optimize form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripForm {
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub days: String,
    #[serde(default)]
    pub people: String,
    #[serde(default, rename = "startDate")]
    pub start_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Budget,
    Days,
    People,
    StartDate,
}

impl Field {
    /// Name of the form input.
    pub fn name(self) -> &'static str {
        match self {
            Field::Budget => "budget",
            Field::Days => "days",
            Field::People => "people",
            Field::StartDate => "startDate",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Lookup by input name, for templates.
    pub fn message(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(field, _)| field.name() == name)
            .map(|(_, message)| message.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A fully validated form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripParams {
    pub budget: u64,
    pub days: u32,
    pub people: u32,
    pub start_time: StartTime,
}

impl TripParams {
    /// Merges the stored departure with the form values.
    pub fn into_request(self, departure: &DeparturePayload) -> TripRequest {
        TripRequest {
            area: departure.area.clone(),
            budget: self.budget,
            days: self.days,
            start_date: self.start_time,
            people: self.people,
            latitude: departure.location.latitude,
            longitude: departure.location.longitude,
            departure: departure.departure.clone(),
        }
    }
}

pub fn validate(form: &TripForm) -> Result<TripParams, FieldErrors> {
    let mut errors = FieldErrors::default();

    let budget = positive_integer(&form.budget, "予算")
        .map_err(|message| errors.insert(Field::Budget, message))
        .ok();
    let days = positive_integer(&form.days, "日数")
        .and_then(|value| fits_u32(value, "日数"))
        .map_err(|message| errors.insert(Field::Days, message))
        .ok();
    let people = positive_integer(&form.people, "人数")
        .and_then(|value| fits_u32(value, "人数"))
        .map_err(|message| errors.insert(Field::People, message))
        .ok();
    let start_time = start_time(&form.start_date)
        .map_err(|message| errors.insert(Field::StartDate, message))
        .ok();

    match (budget, days, people, start_time) {
        (Some(budget), Some(days), Some(people), Some(start_time)) if errors.is_empty() => {
            Ok(TripParams {
                budget,
                days,
                people,
                start_time,
            })
        }
        _ => Err(errors),
    }
}

fn positive_integer(raw: &str, label: &str) -> Result<u64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("{label}を入力してください"));
    }
    let value: i64 = trimmed
        .parse()
        .map_err(|_| format!("{label}は整数で入力してください"))?;
    if value < 1 {
        return Err(format!("{label}は1以上で入力してください"));
    }
    Ok(value as u64)
}

fn fits_u32(value: u64, label: &str) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("{label}が大きすぎます"))
}

fn start_time(raw: &str) -> Result<StartTime, String> {
    if raw.trim().is_empty() {
        return Err("開始時刻を入力してください".into());
    }
    raw.parse::<StartTime>()
        .map_err(|_| "開始時刻はHH:MMまたはHHMM（0〜2359）で入力してください".into())
}

//! Trip profile entered through the planner form

use super::SessionError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const NIGHTS_RANGE: RangeInclusive<u8> = 0..=30;
pub const PEOPLE_RANGE: RangeInclusive<u8> = 1..=20;

/// Travel style choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TravelStyle {
    #[default]
    Balanced,
    Relaxed,
    Active,
    FoodFocused,
    Luxury,
    Budget,
}

impl TravelStyle {
    pub const ALL: [TravelStyle; 6] = [
        TravelStyle::Balanced,
        TravelStyle::Relaxed,
        TravelStyle::Active,
        TravelStyle::FoodFocused,
        TravelStyle::Luxury,
        TravelStyle::Budget,
    ];

    /// Label shown in the form and used in composed prompts
    pub fn label(self) -> &'static str {
        match self {
            TravelStyle::Balanced => "Balanced",
            TravelStyle::Relaxed => "Relaxed/slow",
            TravelStyle::Active => "Active/adventure",
            TravelStyle::FoodFocused => "Food-focused",
            TravelStyle::Luxury => "Luxury",
            TravelStyle::Budget => "Budget",
        }
    }
}

/// Structured trip preferences. Saved wholesale, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripProfile {
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub nights: u8,
    pub people: u8,
    pub budget: Option<String>,
    pub travel_style: TravelStyle,
}

impl Default for TripProfile {
    fn default() -> Self {
        Self {
            destination: None,
            start_date: None,
            nights: 2,
            people: 1,
            budget: None,
            travel_style: TravelStyle::Balanced,
        }
    }
}

impl TripProfile {
    /// Check numeric fields against the form's bounds
    pub fn validate(&self) -> Result<(), SessionError> {
        check_range("nights", self.nights, &NIGHTS_RANGE)?;
        check_range("people", self.people, &PEOPLE_RANGE)?;
        Ok(())
    }

    /// Trim free-text fields and drop the ones left empty
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            destination: non_empty(self.destination),
            budget: non_empty(self.budget),
            ..self
        }
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn budget(&self) -> Option<&str> {
        self.budget.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

fn check_range(field: &'static str, value: u8, range: &RangeInclusive<u8>) -> Result<(), SessionError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(SessionError::OutOfRange {
            field,
            value: u32::from(value),
            min: u32::from(*range.start()),
            max: u32::from(*range.end()),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

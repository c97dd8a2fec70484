use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DAYS_PER_SEASON: u8 = 28;
const SEASONS_PER_YEAR: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    fn index(self) -> u32 {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Fall => 2,
            Season::Winter => 3,
        }
    }

    fn next(self) -> Season {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Fall,
            Season::Fall => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGameDate")]
pub struct GameDate {
    pub year: u32,
    pub season: Season,
    pub day_of_month: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameDateError {
    #[error("year must be at least 1, got {0}")]
    Year(u32),
    #[error("day of month must be in 1..={max}, got {day}")]
    DayOfMonth { day: u8, max: u8 },
}

#[derive(Deserialize)]
struct RawGameDate {
    year: u32,
    season: Season,
    day_of_month: u8,
}

impl TryFrom<RawGameDate> for GameDate {
    type Error = GameDateError;

    fn try_from(raw: RawGameDate) -> Result<Self, Self::Error> {
        if raw.year == 0 {
            return Err(GameDateError::Year(raw.year));
        }
        if !(1..=DAYS_PER_SEASON).contains(&raw.day_of_month) {
            return Err(GameDateError::DayOfMonth {
                day: raw.day_of_month,
                max: DAYS_PER_SEASON,
            });
        }
        Ok(Self {
            year: raw.year,
            season: raw.season,
            day_of_month: raw.day_of_month,
        })
    }
}

impl GameDate {
    pub fn new(year: u32, season: Season, day_of_month: u8) -> Self {
        Self {
            year: year.max(1),
            season,
            day_of_month: day_of_month.clamp(1, DAYS_PER_SEASON),
        }
    }

    pub fn first() -> Self {
        Self::new(1, Season::Spring, 1)
    }

    /// Days since the start of the save, starting at 1.
    pub fn absolute_day(&self) -> u32 {
        let seasons_elapsed = self.year.saturating_sub(1) * SEASONS_PER_YEAR + self.season.index();
        seasons_elapsed * u32::from(DAYS_PER_SEASON) + u32::from(self.day_of_month)
    }

    pub fn next_day(&self) -> Self {
        if self.day_of_month < DAYS_PER_SEASON {
            return Self {
                day_of_month: self.day_of_month + 1,
                ..*self
            };
        }
        let season = self.season.next();
        let year = if season == Season::Spring {
            self.year + 1
        } else {
            self.year
        };
        Self {
            year,
            season,
            day_of_month: 1,
        }
    }
}

impl fmt::Display for GameDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} Y{}", self.season, self.day_of_month, self.year)
    }
}

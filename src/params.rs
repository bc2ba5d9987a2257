//! Job parameters and the values derived from them.
//!
//! Everything here is local and pure: validation happens before a session is
//! opened, and the derived fields are computed once per job so every step of
//! the form sequence sees the same values.

use std::fmt;

/// Prefix of the GDAS1 archive file names offered by the step 3 form.
pub const DATA_FILE_PREFIX: &str = "gdas1";

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Trajectory direction as the step 4 form spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Direction {
    #[default]
    Backward,
    Forward,
}

impl Direction {
    pub fn as_form_value(self) -> &'static str {
        match self {
            Direction::Backward => "Backward",
            Direction::Forward => "Forward",
        }
    }
}

/// Run options the form accepts beyond location and start time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryOptions {
    pub direction: Direction,
    pub duration_hours: u32,
    pub source_height_m: u32,
}

impl Default for TrajectoryOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Backward,
            duration_hours: 168,
            source_height_m: 500,
        }
    }
}

/// Caller input for one trajectory job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobParameters {
    pub latitude: f64,
    pub longitude: f64,
    /// Two-digit year (`22` for 2022).
    pub start_year: u8,
    pub start_month: u8,
    pub start_day: u8,
    pub start_hour: u8,
    pub options: TrajectoryOptions,
}

/// A field that failed its range check.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterError {
    Month(u8),
    Day(u8),
    Hour(u8),
    Year(u8),
    Latitude(f64),
    Longitude(f64),
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::Month(value) => write!(f, "start month {value} is not in 1..=12"),
            ParameterError::Day(value) => write!(f, "start day {value} is not in 1..=31"),
            ParameterError::Hour(value) => write!(f, "start hour {value} is not in 0..=23"),
            ParameterError::Year(value) => write!(f, "start year {value} is not a 2-digit year"),
            ParameterError::Latitude(value) => {
                write!(f, "latitude {value} is not in -90..=90")
            }
            ParameterError::Longitude(value) => {
                write!(f, "longitude {value} is not in -180..=180")
            }
        }
    }
}

impl std::error::Error for ParameterError {}

/// Values computed from [`JobParameters`] once per job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedFields {
    pub month_abbreviation: &'static str,
    pub week_number: u8,
    pub data_file_name: String,
}

/// A coordinate split into magnitude and hemisphere letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HemisphereCoordinate {
    pub magnitude: String,
    pub hemisphere: &'static str,
}

impl JobParameters {
    pub fn new(
        latitude: f64,
        longitude: f64,
        start_year: u8,
        start_month: u8,
        start_day: u8,
        start_hour: u8,
    ) -> Self {
        Self {
            latitude,
            longitude,
            start_year,
            start_month,
            start_day,
            start_hour,
            options: TrajectoryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TrajectoryOptions) -> Self {
        self.options = options;
        self
    }

    /// Per-field range checks. No calendar cross-validation is done, so
    /// day 31 of a 30-day month passes.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(1..=12).contains(&self.start_month) {
            return Err(ParameterError::Month(self.start_month));
        }
        if !(1..=31).contains(&self.start_day) {
            return Err(ParameterError::Day(self.start_day));
        }
        if self.start_hour > 23 {
            return Err(ParameterError::Hour(self.start_hour));
        }
        if self.start_year > 99 {
            return Err(ParameterError::Year(self.start_year));
        }
        if !self.latitude.is_finite() || self.latitude.abs() > 90.0 {
            return Err(ParameterError::Latitude(self.latitude));
        }
        if !self.longitude.is_finite() || self.longitude.abs() > 180.0 {
            return Err(ParameterError::Longitude(self.longitude));
        }
        Ok(())
    }

    /// Validate, then compute the derived fields.
    pub fn derive(&self) -> Result<DerivedFields, ParameterError> {
        self.validate()?;
        let month_abbreviation = month_abbreviation(self.start_month)?;
        let week_number = week_number(self.start_day)?;
        Ok(DerivedFields {
            month_abbreviation,
            week_number,
            data_file_name: data_file_name(month_abbreviation, self.start_year, week_number),
        })
    }

    pub fn latitude_hemisphere(&self) -> HemisphereCoordinate {
        split_hemisphere(self.latitude, "N", "S")
    }

    pub fn longitude_hemisphere(&self) -> HemisphereCoordinate {
        split_hemisphere(self.longitude, "E", "W")
    }
}

pub fn month_abbreviation(month: u8) -> Result<&'static str, ParameterError> {
    match month {
        1..=12 => Ok(MONTH_ABBREVIATIONS[usize::from(month - 1)]),
        _ => Err(ParameterError::Month(month)),
    }
}

/// Week bucket used by the GDAS1 weekly files: 1-7, 8-14, 15-21, 22-28, 29-31.
pub fn week_number(day: u8) -> Result<u8, ParameterError> {
    match day {
        1..=31 => Ok((day - 1) / 7 + 1),
        _ => Err(ParameterError::Day(day)),
    }
}

pub fn data_file_name(month_abbreviation: &str, year: u8, week_number: u8) -> String {
    format!("{DATA_FILE_PREFIX}.{month_abbreviation}{year:02}.w{week_number}")
}

/// Six-decimal rendering shared by every coordinate field.
pub fn format_degrees(value: f64) -> String {
    format!("{value:.6}")
}

fn split_hemisphere(
    value: f64,
    positive: &'static str,
    negative: &'static str,
) -> HemisphereCoordinate {
    let hemisphere = if value >= 0.0 { positive } else { negative };
    HemisphereCoordinate {
        magnitude: format_degrees(value.abs()),
        hemisphere,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicago() -> JobParameters {
        JobParameters::new(41.98, -87.90, 22, 10, 29, 22)
    }

    #[test]
    fn month_abbreviations_cover_calendar() {
        let labels: Vec<&str> = (1..=12)
            .map(|month| month_abbreviation(month).unwrap())
            .collect();
        assert_eq!(labels, MONTH_ABBREVIATIONS);
        assert!(labels.iter().all(|label| label.len() == 3
            && label.chars().all(|c| c.is_ascii_lowercase())));
        assert_eq!(month_abbreviation(0), Err(ParameterError::Month(0)));
        assert_eq!(month_abbreviation(13), Err(ParameterError::Month(13)));
    }

    #[test]
    fn week_buckets_follow_seven_day_blocks() {
        for day in 1..=31u8 {
            let expected = match day {
                1..=7 => 1,
                8..=14 => 2,
                15..=21 => 3,
                22..=28 => 4,
                _ => 5,
            };
            assert_eq!(week_number(day).unwrap(), expected, "day {day}");
        }
        assert_eq!(week_number(0), Err(ParameterError::Day(0)));
        assert_eq!(week_number(32), Err(ParameterError::Day(32)));
    }

    #[test]
    fn derives_data_file_name_for_late_october() {
        let derived = chicago().derive().unwrap();
        assert_eq!(derived.month_abbreviation, "oct");
        assert_eq!(derived.week_number, 5);
        assert_eq!(derived.data_file_name, "gdas1.oct22.w5");
        assert_eq!(chicago().derive().unwrap(), derived);
    }

    #[test]
    fn pads_single_digit_years() {
        let params = JobParameters::new(0.0, 0.0, 5, 1, 3, 0);
        assert_eq!(params.derive().unwrap().data_file_name, "gdas1.jan05.w1");
    }

    #[test]
    fn accepts_day_31_in_short_month() {
        let params = JobParameters::new(0.0, 0.0, 22, 2, 31, 0);
        assert_eq!(params.derive().unwrap().data_file_name, "gdas1.feb22.w5");
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let mut params = chicago();
        params.start_month = 13;
        assert_eq!(params.validate(), Err(ParameterError::Month(13)));

        let mut params = chicago();
        params.start_day = 0;
        assert_eq!(params.validate(), Err(ParameterError::Day(0)));

        let mut params = chicago();
        params.start_hour = 24;
        assert_eq!(params.validate(), Err(ParameterError::Hour(24)));

        let mut params = chicago();
        params.latitude = f64::NAN;
        assert!(matches!(params.validate(), Err(ParameterError::Latitude(_))));

        let mut params = chicago();
        params.longitude = -181.0;
        assert_eq!(params.validate(), Err(ParameterError::Longitude(-181.0)));
    }

    #[test]
    fn splits_hemispheres_with_six_decimals() {
        let params = chicago();
        assert_eq!(
            params.latitude_hemisphere(),
            HemisphereCoordinate {
                magnitude: "41.980000".to_string(),
                hemisphere: "N"
            }
        );
        assert_eq!(
            params.longitude_hemisphere(),
            HemisphereCoordinate {
                magnitude: "87.900000".to_string(),
                hemisphere: "W"
            }
        );

        let southern = JobParameters::new(-33.8688, 151.2093, 22, 1, 1, 0);
        assert_eq!(southern.latitude_hemisphere().hemisphere, "S");
        assert_eq!(southern.latitude_hemisphere().magnitude, "33.868800");
        assert_eq!(southern.longitude_hemisphere().hemisphere, "E");
        assert_eq!(southern.longitude_hemisphere().magnitude, "151.209300");
    }

    #[test]
    fn zero_coordinates_are_north_and_east() {
        let params = JobParameters::new(0.0, 0.0, 22, 1, 1, 0);
        assert_eq!(params.latitude_hemisphere().hemisphere, "N");
        assert_eq!(params.longitude_hemisphere().hemisphere, "E");
        assert_eq!(params.latitude_hemisphere().magnitude, "0.000000");
    }
}

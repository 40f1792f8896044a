//! Daily weather record consumed by the core.
//!
//! Parsing climate files is out of scope; this module only
//! defines the shape of one day's driving data and the fallback formulas
//! used when optional fields (measured global radiation, ET0, CO2, O3) are
//! absent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of driving weather data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub date: NaiveDate,
    /// Minimum air temperature [°C].
    pub tmin: f64,
    /// Maximum air temperature [°C].
    pub tmax: f64,
    /// Mean air temperature [°C].
    pub tavg: f64,
    /// Measured global radiation [MJ m⁻² d⁻¹], if available.
    pub global_radiation: Option<f64>,
    /// Sunshine duration [h], used to derive global radiation when it
    /// wasn't measured directly.
    pub sunshine_hours: Option<f64>,
    /// Relative humidity, either as a fraction `[0,1]` or a percentage;
    /// callers normalize via [`WeatherRecord::relative_humidity_fraction`].
    pub relative_humidity: f64,
    /// Wind speed at `wind_speed_height` [m/s].
    pub wind_speed: f64,
    /// Height at which wind speed was measured [m].
    pub wind_speed_height: f64,
    /// Precipitation [mm].
    pub precipitation: f64,
    /// Reference evapotranspiration [mm], if supplied externally instead of
    /// being computed from Penman-Monteith.
    pub et0: Option<f64>,
    /// Atmospheric CO2 concentration [ppm], if supplied externally.
    pub co2: Option<f64>,
    /// Atmospheric O3 concentration [nmol/mol], if supplied externally.
    pub o3: Option<f64>,
}

impl WeatherRecord {
    /// Relative humidity as a fraction in `[0,1]`, accepting either
    /// percentage (e.g. `63.0`) or fractional (`0.63`) input.
    pub fn relative_humidity_fraction(&self) -> f64 {
        if self.relative_humidity > 1.0 {
            (self.relative_humidity / 100.0).clamp(0.0, 1.0)
        } else {
            self.relative_humidity.clamp(0.0, 1.0)
        }
    }

    /// Wind speed converted to the FAO-56 reference height of 2 m via the
    /// logarithmic wind profile law, floored at 0.5 m/s.
    pub fn wind_speed_at_2m(&self) -> f64 {
        if (self.wind_speed_height - 2.0).abs() < 1e-9 {
            return self.wind_speed.max(0.5);
        }
        let u2 = self.wind_speed * (4.87 / (67.8 * self.wind_speed_height - 5.42).ln());
        u2.max(0.5)
    }
}

/// Atmospheric CO2 concentration fallback for days without a measured
/// value: an RCP8.5-shaped analytic curve anchored at 1650.
///
/// `decimal_date` is the calendar year expressed as a fraction, e.g.
/// `2020.5` for roughly July 1 2020.
pub fn co2_concentration_fallback(decimal_date: f64) -> f64 {
    222.0
        + (0.01467 * (decimal_date - 1650.0)).exp()
        + 2.5 * (((decimal_date - 0.5) / 0.1592).sin())
}

/// Converts a [`NaiveDate`] into the decimal-year form used by
/// [`co2_concentration_fallback`].
pub fn decimal_date(date: NaiveDate) -> f64 {
    use chrono::Datelike;
    let year = date.year();
    let year_start = NaiveDate::from_ymd_opt(year, 1, 1).expect("valid year start");
    let year_end = NaiveDate::from_ymd_opt(year + 1, 1, 1).expect("valid year end");
    let days_in_year = (year_end - year_start).num_days() as f64;
    let day_of_year = (date - year_start).num_days() as f64;
    year as f64 + day_of_year / days_in_year
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(date: NaiveDate) -> WeatherRecord {
        WeatherRecord {
            date,
            tmin: 5.0,
            tmax: 15.0,
            tavg: 10.0,
            global_radiation: None,
            sunshine_hours: Some(6.0),
            relative_humidity: 70.0,
            wind_speed: 3.0,
            wind_speed_height: 10.0,
            precipitation: 0.0,
            et0: None,
            co2: None,
            o3: None,
        }
    }

    #[test]
    fn relative_humidity_fraction_accepts_percentage() {
        let w = sample(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        assert!((w.relative_humidity_fraction() - 0.70).abs() < 1e-9);
    }

    #[test]
    fn relative_humidity_fraction_accepts_fraction() {
        let mut w = sample(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        w.relative_humidity = 0.7;
        assert!((w.relative_humidity_fraction() - 0.70).abs() < 1e-9);
    }

    #[test]
    fn wind_speed_at_2m_is_reduced_from_higher_measurement_height() {
        let w = sample(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        let u2 = w.wind_speed_at_2m();
        assert!(u2 < w.wind_speed);
        assert!(u2 >= 0.5);
    }

    #[test]
    fn wind_speed_at_2m_floors_at_half_meter_per_second() {
        let mut w = sample(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        w.wind_speed = 0.01;
        w.wind_speed_height = 2.0;
        assert_eq!(w.wind_speed_at_2m(), 0.5);
    }

    #[test]
    fn co2_fallback_increases_over_the_decades() {
        let early = co2_concentration_fallback(1950.5);
        let late = co2_concentration_fallback(2020.5);
        assert!(late > early);
    }

    #[test]
    fn decimal_date_is_near_year_midpoint_on_july_first() {
        let d = decimal_date(NaiveDate::from_ymd_opt(2021, 7, 1).unwrap());
        assert!((d - 2021.495).abs() < 0.01);
    }
}

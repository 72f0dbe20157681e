//! Weather-code interpretation shared by corpus synthesis and live forecasts.
//!
//! Codes follow the WMO scheme used by Open-Meteo. Training rows and forecast
//! rows both go through [`interpret_weather_code`], so the modifier a model was
//! trained on is exactly the one it sees at inference time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Human-facing description and mood modifier of a weather code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherCondition {
    pub label: &'static str,
    pub icon: &'static str,
    /// Additive mood effect, roughly in [-0.6, 0.6]
    pub modifier: f64,
    pub tooltip: &'static str,
}

const CLEAR: WeatherCondition = WeatherCondition {
    label: "Clear sky",
    icon: "☀️",
    modifier: 0.6,
    tooltip: "Sunshine usually lifts the mood",
};

const PARTLY_CLOUDY: WeatherCondition = WeatherCondition {
    label: "Partly cloudy",
    icon: "⛅",
    modifier: 0.3,
    tooltip: "Bright spells between the clouds",
};

const OVERCAST: WeatherCondition = WeatherCondition {
    label: "Overcast",
    icon: "☁️",
    modifier: -0.1,
    tooltip: "Grey skies all day",
};

const FOG: WeatherCondition = WeatherCondition {
    label: "Fog",
    icon: "🌫️",
    modifier: -0.2,
    tooltip: "Low visibility and damp air",
};

const DRIZZLE: WeatherCondition = WeatherCondition {
    label: "Drizzle",
    icon: "🌦️",
    modifier: -0.2,
    tooltip: "Light, persistent drizzle",
};

const MODERATE_RAIN: WeatherCondition = WeatherCondition {
    label: "Moderate rain",
    icon: "🌧️",
    modifier: -0.4,
    tooltip: "Rain showers expected",
};

const FREEZING_RAIN: WeatherCondition = WeatherCondition {
    label: "Freezing rain",
    icon: "🧊",
    modifier: -0.5,
    tooltip: "Icy rain, stay warm",
};

const SNOW: WeatherCondition = WeatherCondition {
    label: "Snow",
    icon: "❄️",
    modifier: -0.3,
    tooltip: "Snowfall expected",
};

const THUNDERSTORM: WeatherCondition = WeatherCondition {
    label: "Thunderstorm",
    icon: "⛈️",
    modifier: -0.6,
    tooltip: "Storms and heavy showers",
};

const UNKNOWN: WeatherCondition = WeatherCondition {
    label: "Unknown",
    icon: "❔",
    modifier: 0.0,
    tooltip: "No weather information",
};

/// Map a WMO weather code to its condition. Unknown codes are neutral.
pub fn interpret_weather_code(code: i32) -> WeatherCondition {
    match code {
        0 => CLEAR,
        1 | 2 => PARTLY_CLOUDY,
        3 => OVERCAST,
        45 | 48 => FOG,
        51 | 53 | 55 | 56 | 57 => DRIZZLE,
        61 | 63 | 65 | 80 | 81 | 82 => MODERATE_RAIN,
        66 | 67 => FREEZING_RAIN,
        71 | 73 | 75 | 77 | 85 | 86 => SNOW,
        95 | 96 | 99 => THUNDERSTORM,
        _ => UNKNOWN,
    }
}

/// One day of the external 7-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecastDay {
    pub date: NaiveDate,
    pub weather_code: i32,
    pub temp_max: f64,
    pub temp_min: f64,
}

impl WeatherForecastDay {
    pub fn condition(&self) -> WeatherCondition {
        interpret_weather_code(self.weather_code)
    }
}

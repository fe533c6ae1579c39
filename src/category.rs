use std::fmt;

use serde::{Deserialize, Serialize};

/// Descriptive AQI level, ordered from best to worst.
#[derive(Debug, Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Good,
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    Hazardous,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Good,
        Category::Moderate,
        Category::UnhealthyForSensitiveGroups,
        Category::Unhealthy,
        Category::VeryUnhealthy,
        Category::Hazardous,
    ];

    /// Maps an overall AQI onto its level. Values above 500 clamp to
    /// `Hazardous`.
    pub fn from_aqi(aqi: u16) -> Self {
        match aqi {
            0..=50 => Category::Good,
            51..=100 => Category::Moderate,
            101..=150 => Category::UnhealthyForSensitiveGroups,
            151..=200 => Category::Unhealthy,
            201..=300 => Category::VeryUnhealthy,
            _ => Category::Hazardous,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Category::Unhealthy => "Unhealthy",
            Category::VeryUnhealthy => "Very Unhealthy",
            Category::Hazardous => "Hazardous",
        }
    }

    /// AirNow display colour.
    pub fn color_hex(self) -> &'static str {
        match self {
            Category::Good => "#00E400",
            Category::Moderate => "#FFFF00",
            Category::UnhealthyForSensitiveGroups => "#FF7E00",
            Category::Unhealthy => "#FF0000",
            Category::VeryUnhealthy => "#8F3F97",
            Category::Hazardous => "#7E0023",
        }
    }

    pub fn health_implications(self) -> &'static str {
        match self {
            Category::Good => {
                "Air quality is considered satisfactory, and air pollution poses little or no risk."
            }
            Category::Moderate => {
                "Air quality is acceptable; however, for some pollutants there may be a moderate \
                 health concern for a very small number of people who are unusually sensitive \
                 to air pollution."
            }
            Category::UnhealthyForSensitiveGroups => {
                "Members of sensitive groups may experience health effects. The general public \
                 is not likely to be affected."
            }
            Category::Unhealthy => {
                "Everyone may begin to experience health effects; members of sensitive groups \
                 may experience more serious health effects."
            }
            Category::VeryUnhealthy => {
                "Health warnings of emergency conditions. The entire population is more likely \
                 to be affected."
            }
            Category::Hazardous => {
                "Health alert: everyone may experience more serious health effects."
            }
        }
    }

    pub fn cautionary_statement(self) -> &'static str {
        match self {
            Category::Good => "None.",
            Category::Moderate => {
                "Unusually sensitive people should consider reducing prolonged or heavy exertion."
            }
            Category::UnhealthyForSensitiveGroups => {
                "Active children and adults, and people with respiratory disease, such as \
                 asthma, should limit prolonged outdoor exertion."
            }
            Category::Unhealthy => {
                "Active children and adults, and people with respiratory disease, such as \
                 asthma, should avoid prolonged outdoor exertion; everyone else, especially \
                 children, should limit prolonged outdoor exertion."
            }
            Category::VeryUnhealthy => {
                "Active children and adults, and people with respiratory disease, such as \
                 asthma, should avoid all outdoor exertion; everyone else, especially children, \
                 should limit outdoor exertion."
            }
            Category::Hazardous => "Everyone should avoid all outdoor exertion.",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(Category::from_aqi(0), Category::Good);
        assert_eq!(Category::from_aqi(50), Category::Good);
        assert_eq!(Category::from_aqi(51), Category::Moderate);
        assert_eq!(Category::from_aqi(100), Category::Moderate);
        assert_eq!(Category::from_aqi(101), Category::UnhealthyForSensitiveGroups);
        assert_eq!(Category::from_aqi(151), Category::Unhealthy);
        assert_eq!(Category::from_aqi(201), Category::VeryUnhealthy);
        assert_eq!(Category::from_aqi(300), Category::VeryUnhealthy);
        assert_eq!(Category::from_aqi(301), Category::Hazardous);
        assert_eq!(Category::from_aqi(500), Category::Hazardous);
        assert_eq!(Category::from_aqi(501), Category::Hazardous);
    }

    #[test]
    fn monotonic_over_scale() {
        let mut prev = Category::Good;
        for aqi in 0..=600 {
            let cat = Category::from_aqi(aqi);
            assert!(cat >= prev, "category dropped at {aqi}");
            prev = cat;
        }
    }

    #[test]
    fn serializes_as_label() {
        for cat in Category::ALL {
            let json = serde_json::to_string(&cat).unwrap();
            assert_eq!(json, format!("\"{}\"", cat.label()));
        }
    }
}

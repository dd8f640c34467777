use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::{FLiESError, FLiESResult};

/// Köppen-Geiger climate classes, numbered as in the Beck et al. (2018) legend
#[allow(clippy::upper_case_acronyms)]
#[derive(
    Debug, PartialEq, Eq, Hash, Copy, Clone, EnumString, EnumIter, Display, Serialize, Deserialize,
)]
pub enum KoppenGeiger {
    /// Tropical, rainforest
    Af = 1,
    /// Tropical, monsoon
    Am = 2,
    /// Tropical, savannah
    Aw = 3,
    /// Arid, desert, hot
    BWh = 4,
    /// Arid, desert, cold
    BWk = 5,
    /// Arid, steppe, hot
    BSh = 6,
    /// Arid, steppe, cold
    BSk = 7,
    /// Temperate, dry summer, hot summer
    Csa = 8,
    /// Temperate, dry summer, warm summer
    Csb = 9,
    /// Temperate, dry summer, cold summer
    Csc = 10,
    /// Temperate, dry winter, hot summer
    Cwa = 11,
    /// Temperate, dry winter, warm summer
    Cwb = 12,
    /// Temperate, dry winter, cold summer
    Cwc = 13,
    /// Temperate, no dry season, hot summer
    Cfa = 14,
    /// Temperate, no dry season, warm summer
    Cfb = 15,
    /// Temperate, no dry season, cold summer
    Cfc = 16,
    /// Cold, dry summer, hot summer
    Dsa = 17,
    /// Cold, dry summer, warm summer
    Dsb = 18,
    /// Cold, dry summer, cold summer
    Dsc = 19,
    /// Cold, dry summer, very cold winter
    Dsd = 20,
    /// Cold, dry winter, hot summer
    Dwa = 21,
    /// Cold, dry winter, warm summer
    Dwb = 22,
    /// Cold, dry winter, cold summer
    Dwc = 23,
    /// Cold, dry winter, very cold winter
    Dwd = 24,
    /// Cold, no dry season, hot summer
    Dfa = 25,
    /// Cold, no dry season, warm summer
    Dfb = 26,
    /// Cold, no dry season, cold summer
    Dfc = 27,
    /// Cold, no dry season, very cold winter
    Dfd = 28,
    /// Polar, tundra
    ET = 29,
    /// Polar, frost
    EF = 30,
}

impl KoppenGeiger {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        KoppenGeiger::iter().find(|class| class.code() == code)
    }

    /// Parse either an integer code ("14", "14.0") or a class name ("Cfa")
    pub fn parse(value: &str) -> FLiESResult<Self> {
        let text = value.trim();
        if let Ok(code) = text.parse::<f64>() {
            if code.fract() == 0.0 {
                if let Some(class) = Self::from_code(code as i32) {
                    return Ok(class);
                }
            }
            return Err(FLiESError::UnknownClimate(value.to_owned()));
        }
        KoppenGeiger::from_str(text).map_err(|_| FLiESError::UnknownClimate(value.to_owned()))
    }

    /// main climate group letter
    pub fn group(&self) -> char {
        self.to_string().chars().next().unwrap_or('?')
    }

    pub fn is_tropical(&self) -> bool {
        self.group() == 'A'
    }

    pub fn is_arid(&self) -> bool {
        self.group() == 'B'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_codes_and_names() {
        assert_eq!(KoppenGeiger::parse("14").expect("should parse"), KoppenGeiger::Cfa);
        assert_eq!(KoppenGeiger::parse("5.0").expect("should parse"), KoppenGeiger::BWk);
        assert_eq!(KoppenGeiger::parse(" Dfb ").expect("should parse"), KoppenGeiger::Dfb);
        assert!(KoppenGeiger::parse("31").is_err());
        assert!(KoppenGeiger::parse("2.5").is_err());
        assert!(KoppenGeiger::parse("Xyz").is_err());
    }

    #[test]
    fn legend_is_complete() {
        assert_eq!(KoppenGeiger::iter().count(), 30);
        for (i, class) in KoppenGeiger::iter().enumerate() {
            assert_eq!(class.code(), i as i32 + 1);
        }
    }

    #[test]
    fn climate_groups() {
        assert!(KoppenGeiger::Am.is_tropical());
        assert!(KoppenGeiger::BSk.is_arid());
        assert!(!KoppenGeiger::ET.is_arid());
        assert_eq!(KoppenGeiger::EF.group(), 'E');
    }
}

//! Coordinate Reference System identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// EPSG code of WGS84 geographic coordinates (lon/lat in degrees).
pub const EPSG_WGS84: u32 = 4326;

/// EPSG code of NAD83 geographic coordinates.
pub const EPSG_NAD83: u32 = 4269;

/// Identifier of a raster's native reference frame.
///
/// Accepts formats like:
/// - "EPSG:32611" / "epsg:32611"
/// - "CRS:84" (equivalent to EPSG:4326 with lon/lat axis order)
/// - "+proj=utm +zone=11 +datum=WGS84" (raw PROJ string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CrsCode {
    /// An EPSG registry code.
    Epsg(u32),
    /// A raw PROJ definition string.
    Proj(String),
}

impl CrsCode {
    /// WGS84 geographic.
    pub fn wgs84() -> Self {
        CrsCode::Epsg(EPSG_WGS84)
    }

    /// Check if this is a geographic (lon/lat degrees) CRS.
    pub fn is_geographic(&self) -> bool {
        match self {
            CrsCode::Epsg(code) => matches!(*code, EPSG_WGS84 | EPSG_NAD83),
            CrsCode::Proj(def) => {
                def.contains("+proj=longlat") || def.contains("+proj=latlong")
            }
        }
    }

    /// EPSG code, if this identifier is one.
    pub fn epsg(&self) -> Option<u32> {
        match self {
            CrsCode::Epsg(code) => Some(*code),
            CrsCode::Proj(_) => None,
        }
    }

    /// UTM zone and hemisphere (`true` = south) for WGS84/NAD83 UTM codes.
    pub fn utm_zone(&self) -> Option<(u8, bool)> {
        let code = self.epsg()?;
        match code {
            32601..=32660 => Some(((code - 32600) as u8, false)),
            32701..=32760 => Some(((code - 32700) as u8, true)),
            26901..=26923 => Some(((code - 26900) as u8, false)),
            _ => None,
        }
    }
}

impl FromStr for CrsCode {
    type Err = CrsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('+') {
            return Ok(CrsCode::Proj(trimmed.to_string()));
        }

        let normalized = trimmed.to_uppercase();
        if normalized == "CRS:84" || normalized == "OGC:CRS84" {
            return Ok(CrsCode::Epsg(EPSG_WGS84));
        }

        let code = normalized
            .strip_prefix("EPSG:")
            .ok_or_else(|| CrsParseError::UnsupportedCrs(s.to_string()))?;

        code.parse::<u32>()
            .map(CrsCode::Epsg)
            .map_err(|_| CrsParseError::InvalidCode(s.to_string()))
    }
}

impl TryFrom<String> for CrsCode {
    type Error = CrsParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CrsCode> for String {
    fn from(code: CrsCode) -> Self {
        code.to_string()
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsCode::Epsg(code) => write!(f, "EPSG:{}", code),
            CrsCode::Proj(def) => write!(f, "{}", def),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    #[error("Invalid EPSG code: {0}")]
    InvalidCode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!("EPSG:4326".parse::<CrsCode>().unwrap(), CrsCode::Epsg(4326));
        assert_eq!("epsg:32611".parse::<CrsCode>().unwrap(), CrsCode::Epsg(32611));
        assert_eq!("CRS:84".parse::<CrsCode>().unwrap(), CrsCode::Epsg(4326));
        assert!(matches!(
            "+proj=longlat +datum=WGS84".parse::<CrsCode>().unwrap(),
            CrsCode::Proj(_)
        ));
        assert!("EPSG:abc".parse::<CrsCode>().is_err());
        assert!("UTM11".parse::<CrsCode>().is_err());
    }

    #[test]
    fn test_geographic() {
        assert!(CrsCode::wgs84().is_geographic());
        assert!(CrsCode::Epsg(4269).is_geographic());
        assert!(!CrsCode::Epsg(32611).is_geographic());
        assert!(CrsCode::Proj("+proj=longlat +ellps=WGS84".into()).is_geographic());
    }

    #[test]
    fn test_utm_zone() {
        assert_eq!(CrsCode::Epsg(32611).utm_zone(), Some((11, false)));
        assert_eq!(CrsCode::Epsg(32733).utm_zone(), Some((33, true)));
        assert_eq!(CrsCode::Epsg(26910).utm_zone(), Some((10, false)));
        assert_eq!(CrsCode::Epsg(3857).utm_zone(), None);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&CrsCode::Epsg(32611)).unwrap();
        assert_eq!(json, "\"EPSG:32611\"");
        let back: CrsCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CrsCode::Epsg(32611));
    }
}

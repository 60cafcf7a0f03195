use serde::Serialize;
use std::str::FromStr;

use crate::error::{InputError, Result};
use crate::geometry::cm_to_dots;
use crate::plan::Entries;

/// Supported paper formats, portrait.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PageSize {
    A4,
    A3,
}

impl PageSize {
    /// Width and height in centimeters.
    pub fn size_cm(self) -> (f64, f64) {
        match self {
            PageSize::A4 => (21.0, 29.7),
            PageSize::A3 => (29.7, 42.0),
        }
    }

    /// Width and height in device units.
    pub fn size_dots(self) -> (f64, f64) {
        let (w, h) = self.size_cm();
        (cm_to_dots(w), cm_to_dots(h))
    }
}

impl FromStr for PageSize {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "A4" => Ok(PageSize::A4),
            "A3" => Ok(PageSize::A3),
            other => Err(InputError::UnsupportedPageSize(other.to_string())),
        }
    }
}

/// Typed view of the `Settings` rows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlanSettings {
    pub scale_divisor: u32,
    pub page_size: PageSize,
    /// Degrees, clockwise on the page.
    pub compass_rotation: f64,
}

impl PlanSettings {
    pub fn from_entries(settings: &Entries) -> Result<Self> {
        let raw = settings
            .get("ScaleDivisor")
            .ok_or(InputError::MissingScaleDivisor)?;
        let scale_divisor = match raw.trim().parse::<u32>() {
            Ok(v) if v > 0 => v,
            _ => return Err(InputError::InvalidScaleDivisor(raw.to_string())),
        };
        let page_size = settings.get("PageSize").unwrap_or("A4").parse()?;
        let compass_rotation = match settings.get("CompassRotation") {
            None => 0.0,
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| InputError::InvalidCompassRotation(raw.to_string()))?,
        };
        Ok(PlanSettings {
            scale_divisor,
            page_size,
            compass_rotation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> Entries {
        let mut e = Entries::default();
        for (k, v) in pairs {
            e.insert(k, v);
        }
        e
    }

    #[test]
    fn test_defaults() {
        let s = PlanSettings::from_entries(&entries(&[("ScaleDivisor", "50")])).unwrap();
        assert_eq!(s.scale_divisor, 50);
        assert_eq!(s.page_size, PageSize::A4);
        assert_eq!(s.compass_rotation, 0.0);
    }

    #[test]
    fn test_page_sizes() {
        let s = PlanSettings::from_entries(&entries(&[
            ("ScaleDivisor", "100"),
            ("PageSize", "A3"),
            ("CompassRotation", "-22.5"),
        ]))
        .unwrap();
        assert_eq!(s.page_size, PageSize::A3);
        assert_eq!(s.compass_rotation, -22.5);
        let (w, h) = PageSize::A4.size_dots();
        assert!((w - 595.2756).abs() < 1e-3);
        assert!((h - 841.8898).abs() < 1e-3);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            PlanSettings::from_entries(&entries(&[("ScaleDivisor", "50"), ("PageSize", "A5")])),
            Err(InputError::UnsupportedPageSize("A5".to_string()))
        );
        assert_eq!(
            PlanSettings::from_entries(&entries(&[])),
            Err(InputError::MissingScaleDivisor)
        );
        assert!(matches!(
            PlanSettings::from_entries(&entries(&[("ScaleDivisor", "0")])),
            Err(InputError::InvalidScaleDivisor(_))
        ));
        assert!(matches!(
            PlanSettings::from_entries(&entries(&[("ScaleDivisor", "1"), ("CompassRotation", "north")])),
            Err(InputError::InvalidCompassRotation(_))
        ));
    }
}

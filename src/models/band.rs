use serde::{Deserialize, Serialize};

/// Accepted area range in km². A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaBand {
    pub low: Option<f64>,
    pub high: Option<f64>,
}

impl AreaBand {
    pub fn new(low: Option<f64>, high: Option<f64>) -> Self {
        Self { low, high }
    }

    /// Whether an area fits the band. Unknown areas always fit.
    pub fn accepts(&self, area_km2: Option<f64>) -> bool {
        let Some(area) = area_km2 else {
            return true;
        };
        self.low.map_or(true, |low| area >= low) && self.high.map_or(true, |high| area <= high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_band_accepts_everything() {
        let band = AreaBand::default();
        assert!(band.accepts(Some(0.0)));
        assert!(band.accepts(Some(1e9)));
        assert!(band.accepts(None));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let band = AreaBand::new(Some(100.0), Some(200.0));
        assert!(band.accepts(Some(100.0)));
        assert!(band.accepts(Some(200.0)));
        assert!(!band.accepts(Some(99.9)));
        assert!(!band.accepts(Some(200.1)));
    }

    #[test]
    fn test_unknown_area_is_never_rejected() {
        let band = AreaBand::new(Some(100.0), Some(200.0));
        assert!(band.accepts(None));
    }
}

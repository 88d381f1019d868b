use crate::errors::DataProcessingError;
use crate::mass::{
    MassScale,
    ScaledMass,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub mz: ScaledMass,
    pub intensity: f32,
    /// Intensity relative to the most intense peak of the spectrum.
    pub normalized_intensity: f32,
}

/// Centroided fragment peaks, always in ascending m/z order.
///
/// Every window lookup below is a binary search, so the ordering is
/// checked (or established) on construction and never broken afterwards.
#[derive(Debug, Clone, Default)]
pub struct PeakList {
    peaks: Vec<Peak>,
}

impl PeakList {
    /// Builds the list from (m/z in Da, intensity) pairs, sorting them.
    pub fn new(raw: &[(f64, f32)], scale: &MassScale) -> Result<Self, DataProcessingError> {
        if raw.is_empty() {
            return Err(DataProcessingError::ExpectedNonEmptyData {
                context: Some("peak list".into()),
            });
        }
        let max_intensity = raw.iter().map(|(_, i)| *i).fold(0.0f32, f32::max);
        if max_intensity <= 0.0 {
            return Err(DataProcessingError::ZeroDenominator {
                quantity: "maximum peak intensity",
                context: "peak list".into(),
            });
        }
        let mut peaks: Vec<Peak> = raw
            .iter()
            .map(|(mz, intensity)| {
                let mz = scale
                    .try_scale(*mz)
                    .ok_or_else(|| DataProcessingError::InvalidParameter {
                        name: "peak m/z",
                        value: mz.to_string(),
                    })?;
                Ok(Peak {
                    mz,
                    intensity: *intensity,
                    normalized_intensity: *intensity / max_intensity,
                })
            })
            .collect::<Result<_, DataProcessingError>>()?;
        peaks.sort_by_key(|p| p.mz);
        Ok(Self { peaks })
    }

    /// Wraps peaks that are already sorted, rejecting anything else.
    pub fn from_sorted(peaks: Vec<Peak>) -> Result<Self, DataProcessingError> {
        if peaks.is_empty() {
            return Err(DataProcessingError::ExpectedNonEmptyData {
                context: Some("peak list".into()),
            });
        }
        if let Some(idx) = peaks.windows(2).position(|w| w[0].mz > w[1].mz) {
            return Err(DataProcessingError::UnsortedPeaks {
                index: idx + 1,
                context: "PeakList::from_sorted".into(),
            });
        }
        Ok(Self { peaks })
    }

    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// Index range of the peaks with `lo <= mz <= hi`.
    pub fn window(&self, lo: ScaledMass, hi: ScaledMass) -> Range<usize> {
        let start = self.peaks.partition_point(|p| p.mz < lo);
        let end = self.peaks.partition_point(|p| p.mz <= hi);
        start..end.max(start)
    }

    pub fn count_in(&self, lo: ScaledMass, hi: ScaledMass) -> usize {
        self.window(lo, hi).len()
    }

    pub fn max_mz(&self) -> ScaledMass {
        self.peaks.last().map(|p| p.mz).unwrap_or(ScaledMass::ZERO)
    }

    /// Overwrites `self` with `other` shifted by `-correction`.
    ///
    /// A constant shift keeps the ordering, so the buffer stays valid.
    /// Reuses the existing allocation.
    pub fn copy_corrected_from(&mut self, other: &PeakList, correction: ScaledMass) {
        self.peaks.clear();
        self.peaks.extend(other.peaks.iter().map(|p| Peak {
            mz: p.mz - correction,
            ..*p
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_on_construction() {
        let scale = MassScale::new(100).unwrap();
        let peaks = PeakList::new(&[(300.0, 5.0), (100.0, 10.0), (200.0, 1.0)], &scale).unwrap();
        let mzs: Vec<_> = peaks.peaks().iter().map(|p| p.mz.raw()).collect();
        assert_eq!(mzs, vec![10_000, 20_000, 30_000]);
        assert_eq!(peaks.peaks()[0].normalized_intensity, 1.0);
        assert_eq!(peaks.peaks()[2].normalized_intensity, 0.5);
    }

    #[test]
    fn test_empty_rejected() {
        let scale = MassScale::new(100).unwrap();
        assert!(PeakList::new(&[], &scale).is_err());
        assert!(PeakList::from_sorted(vec![]).is_err());
    }

    #[test]
    fn test_unsorted_rejected() {
        let p = |mz| Peak {
            mz: ScaledMass(mz),
            intensity: 1.0,
            normalized_intensity: 1.0,
        };
        let out = PeakList::from_sorted(vec![p(10), p(30), p(20)]);
        assert!(matches!(
            out,
            Err(DataProcessingError::UnsortedPeaks { index: 2, .. })
        ));
    }

    #[test]
    fn test_window() {
        let scale = MassScale::new(100).unwrap();
        let peaks = PeakList::new(&[(100.0, 1.0), (101.0, 1.0), (105.0, 1.0)], &scale).unwrap();
        assert_eq!(peaks.window(ScaledMass(10_000), ScaledMass(10_100)), 0..2);
        assert_eq!(peaks.count_in(ScaledMass(10_200), ScaledMass(10_400)), 0);
        assert_eq!(peaks.count_in(ScaledMass(0), ScaledMass(20_000)), 3);
    }

    #[test]
    fn test_out_of_range_mz_rejected() {
        let scale = MassScale::new(100).unwrap();
        let out = PeakList::new(&[(300.0, 5.0), (1e12, 1.0)], &scale);
        assert!(matches!(
            out,
            Err(DataProcessingError::InvalidParameter { name: "peak m/z", .. })
        ));
    }
}

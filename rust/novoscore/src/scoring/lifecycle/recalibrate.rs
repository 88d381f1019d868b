use crate::mass::ScaledMass;
use crate::scoring::context::ScoringContext;

/// Constant m/z correction from (calculated, observed) pairs of confident
/// b/y matches, or `None` when there is not enough evidence.
///
/// Errors more than two standard deviations from the mean are discarded
/// before averaging; at least `recalibration_min_points` must remain. The
/// correction never exceeds the wide fragment band.
pub fn calibration_correction(
    ctx: &ScoringContext,
    pairs: &[(ScaledMass, ScaledMass)],
) -> Option<ScaledMass> {
    let min_points = ctx.params.recalibration_min_points;
    if pairs.len() < min_points {
        return None;
    }
    let errors: Vec<f64> = pairs
        .iter()
        .map(|(calc, obs)| (*obs - *calc).raw() as f64)
        .collect();
    let n = errors.len() as f64;
    let mean = errors.iter().sum::<f64>() / n;
    let sd = (errors.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n).sqrt();

    let kept: Vec<f64> = errors
        .into_iter()
        .filter(|e| (e - mean).abs() <= 2.0 * sd)
        .collect();
    if kept.len() < min_points {
        return None;
    }
    let correction = (kept.iter().sum::<f64>() / kept.len() as f64).round() as i32;
    let wide = ctx.fragment_tolerance.wide.raw();
    let correction = correction.clamp(-wide, wide);
    if correction == 0 {
        None
    } else {
        Some(ScaledMass(correction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::context::ScoringConfig;
    use crate::scoring::testing::context_for;

    fn pairs(errors: &[i32]) -> Vec<(ScaledMass, ScaledMass)> {
        errors
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let calc = ScaledMass(10_000 * (i as i32 + 1));
                (calc, calc + ScaledMass(*e))
            })
            .collect()
    }

    #[test]
    fn test_needs_enough_points() {
        let (ctx, _) = context_for("GASPVTLNK", 2, &ScoringConfig::default());
        assert_eq!(calibration_correction(&ctx, &pairs(&[10, 10])), None);
        assert_eq!(
            calibration_correction(&ctx, &pairs(&[10, 10, 10])),
            Some(ScaledMass(10))
        );
    }

    #[test]
    fn test_outlier_rejected() {
        let (ctx, _) = context_for("GASPVTLNK", 2, &ScoringConfig::default());
        let out = calibration_correction(&ctx, &pairs(&[10, 11, 9, 10, 10, 12, 8, 10, 60]));
        assert_eq!(out, Some(ScaledMass(10)));
    }

    #[test]
    fn test_bounded_by_wide_band() {
        let (ctx, _) = context_for("GASPVTLNK", 2, &ScoringConfig::default());
        let wide = ctx.fragment_tolerance.wide;
        let out = calibration_correction(&ctx, &pairs(&[500, 500, 500]));
        assert_eq!(out, Some(wide));
    }
}

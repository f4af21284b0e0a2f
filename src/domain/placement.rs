use crate::models::student::AssessmentKind;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("max_score must be positive")]
    NonPositiveMax,
    #[error("score must be between 0 and max_score")]
    OutOfRange,
}

/// Integer percent 0..=100, rounded to nearest.
pub fn percent(score: i32, max_score: i32) -> Result<i32, ScoreError> {
    if max_score <= 0 {
        return Err(ScoreError::NonPositiveMax);
    }
    if score < 0 || score > max_score {
        return Err(ScoreError::OutOfRange);
    }
    Ok((100.0 * f64::from(score) / f64::from(max_score)).round() as i32)
}

/// Baseline placement: the 0..=100 percent range is split into
/// `level_count` equal bands and the score's band is the level.
/// Always lands in 1..=level_count.
pub fn baseline_level(percent: i32, level_count: i32) -> i32 {
    let count = level_count.max(1);
    // integer ceil of percent * count / 100
    let band = (percent * count + 99) / 100;
    band.clamp(1, count)
}

/// What one assessment did to the student's level.
#[derive(Debug, PartialEq)]
pub struct PlacementOutcome {
    /// Level recorded on the assessment: placement result for baselines,
    /// tested level for level assessments.
    pub level: i32,
    pub new_level: i32,
    pub promoted: bool,
}

/// Applies a scored assessment to a student's current level. Baselines
/// (re)place the student by band; level assessments advance one level when
/// the percent meets the program's pass threshold, capped at level_count.
pub fn apply_assessment(
    kind: AssessmentKind,
    percent: i32,
    current_level: i32,
    level_count: i32,
    pass_threshold: i32,
) -> PlacementOutcome {
    match kind {
        AssessmentKind::Baseline => {
            let placed = baseline_level(percent, level_count);
            PlacementOutcome {
                level: placed,
                new_level: placed,
                promoted: placed != current_level,
            }
        }
        AssessmentKind::Level => {
            let promoted = percent >= pass_threshold && current_level < level_count;
            PlacementOutcome {
                level: current_level,
                new_level: if promoted {
                    current_level + 1
                } else {
                    current_level
                },
                promoted,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_validates_inputs() {
        assert_eq!(percent(5, 0), Err(ScoreError::NonPositiveMax));
        assert_eq!(percent(5, -10), Err(ScoreError::NonPositiveMax));
        assert_eq!(percent(-1, 10), Err(ScoreError::OutOfRange));
        assert_eq!(percent(11, 10), Err(ScoreError::OutOfRange));
        assert_eq!(percent(7, 10), Ok(70));
        assert_eq!(percent(1, 3), Ok(33));
        assert_eq!(percent(2, 3), Ok(67));
    }

    #[test]
    fn baseline_bands_cover_the_whole_range() {
        // 4 levels: 0-25 -> 1, 26-50 -> 2, 51-75 -> 3, 76-100 -> 4
        assert_eq!(baseline_level(0, 4), 1);
        assert_eq!(baseline_level(25, 4), 1);
        assert_eq!(baseline_level(26, 4), 2);
        assert_eq!(baseline_level(50, 4), 2);
        assert_eq!(baseline_level(51, 4), 3);
        assert_eq!(baseline_level(75, 4), 3);
        assert_eq!(baseline_level(76, 4), 4);
        assert_eq!(baseline_level(100, 4), 4);
    }

    #[test]
    fn baseline_places_and_replaces() {
        let out = apply_assessment(AssessmentKind::Baseline, 60, 0, 4, 60);
        assert_eq!(out, PlacementOutcome { level: 3, new_level: 3, promoted: true });
        // same band again: no change
        let out = apply_assessment(AssessmentKind::Baseline, 55, 3, 4, 60);
        assert_eq!(out.new_level, 3);
        assert!(!out.promoted);
    }

    #[test]
    fn level_assessment_advances_on_pass() {
        let out = apply_assessment(AssessmentKind::Level, 72, 2, 4, 60);
        assert_eq!(out, PlacementOutcome { level: 2, new_level: 3, promoted: true });
    }

    #[test]
    fn level_assessment_keeps_level_on_fail() {
        let out = apply_assessment(AssessmentKind::Level, 59, 2, 4, 60);
        assert_eq!(out, PlacementOutcome { level: 2, new_level: 2, promoted: false });
    }

    #[test]
    fn promotion_caps_at_level_count() {
        let out = apply_assessment(AssessmentKind::Level, 95, 4, 4, 60);
        assert_eq!(out.new_level, 4);
        assert!(!out.promoted);
    }
}

use crate::process::{ProcessStage, ProcessTimeBreakdown};

/// Expected lead time of an order in hours: every stage that has a value,
/// absent stages counting as zero. Negative values are summed as given.
pub fn expected_lead_time(breakdown: &ProcessTimeBreakdown) -> f64 {
    ProcessStage::ALL
        .iter()
        .filter_map(|stage| breakdown.hours(*stage))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn empty_breakdown_is_zero() {
        assert_eq!(expected_lead_time(&ProcessTimeBreakdown::default()), 0.0);
    }

    #[test]
    fn sums_present_stages_only() {
        let breakdown = ProcessTimeBreakdown {
            printing_hr: Some(5.2),
            infiltration_hr: Some(3.0),
            ..Default::default()
        };
        assert!((expected_lead_time(&breakdown) - 8.2).abs() < EPSILON);
    }

    #[test]
    fn negative_hours_are_not_rejected() {
        let breakdown = ProcessTimeBreakdown {
            design_hr: Some(4.0),
            coating_hr: Some(-1.5),
            ..Default::default()
        };
        assert!((expected_lead_time(&breakdown) - 2.5).abs() < EPSILON);
    }
}

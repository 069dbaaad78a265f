use crate::core::{Boundaries, BoundaryKey, InputField, IntervalLabel, Intervals, Question, Record};
use crate::domain::model::NumericBoundary;

/// Lower-side tiers: the range runs from this tier's boundary up to just
/// below the next tier's boundary.
const LOWER_PAIRS: [(BoundaryKey, BoundaryKey, IntervalLabel); 3] = [
    (BoundaryKey::Lower2, BoundaryKey::Lower3, IntervalLabel::Lower2),
    (BoundaryKey::Lower3, BoundaryKey::Lower4, IntervalLabel::Lower3),
    (BoundaryKey::Lower4, BoundaryKey::Lower6, IntervalLabel::Lower4),
];

/// Upper-side tiers: the range starts just above the previous tier's boundary.
const UPPER_PAIRS: [(BoundaryKey, BoundaryKey, IntervalLabel); 3] = [
    (BoundaryKey::Upper6, BoundaryKey::Upper4, IntervalLabel::Upper4),
    (BoundaryKey::Upper4, BoundaryKey::Upper3, IntervalLabel::Upper3),
    (BoundaryKey::Upper3, BoundaryKey::Upper2, IntervalLabel::Upper2),
];

pub struct IntervalEngine;

impl IntervalEngine {
    /// Builds the immutable question for one input row. Never fails: bad
    /// boundaries only degrade the labels that depend on them.
    pub fn question(record: Record) -> Question {
        let boundaries = Boundaries::from_record(&record);
        let intervals = Self::compute(&boundaries);
        let text = |field: InputField| record.get(field).unwrap_or_default().to_string();

        Question {
            category: text(InputField::Category),
            prompt: text(InputField::Prompt),
            correct_answer: text(InputField::CorrectAnswer),
            comment: text(InputField::Comment),
            source: text(InputField::Source),
            boundaries,
            intervals,
            raw: record,
        }
    }

    pub fn compute(boundaries: &Boundaries) -> Intervals {
        let mut entries: [String; 7] = Default::default();

        for (current, next, label) in LOWER_PAIRS {
            let low = boundaries.get(current);
            let high = boundaries.get(next).map(|b| b.adjust(-1));
            entries[label as usize] = format_interval(label, low, high);
        }

        entries[IntervalLabel::Center6 as usize] = format_interval(
            IntervalLabel::Center6,
            boundaries.get(BoundaryKey::Lower6),
            boundaries.get(BoundaryKey::Upper6),
        );

        for (previous, current, label) in UPPER_PAIRS {
            let low = boundaries.get(previous).map(|b| b.adjust(1));
            let high = boundaries.get(current);
            entries[label as usize] = format_interval(label, low, high);
        }

        Intervals::new(entries)
    }
}

pub fn missing_interval(label: IntervalLabel) -> String {
    format!("ERROR: interval {} missing", label)
}

fn format_interval(
    label: IntervalLabel,
    low: Option<NumericBoundary>,
    high: Option<NumericBoundary>,
) -> String {
    match (low, high) {
        (Some(low), Some(high)) => format!("{}-{}", low, high),
        _ => {
            tracing::debug!("Interval {} has a missing endpoint", label);
            missing_interval(label)
        }
    }
}

//! Multi-hand aggregation and UI text

use crate::landmarks::Handedness;

use super::fingers::FingerState;

/// Which hands have at least one finger up
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HandStatus {
    #[default]
    None,
    LeftOnly,
    RightOnly,
    Both,
}

impl HandStatus {
    pub fn message(&self) -> &'static str {
        match self {
            HandStatus::None => "No hands are up.",
            HandStatus::LeftOnly => "Left hand is up.",
            HandStatus::RightOnly => "Right hand is up.",
            HandStatus::Both => "Both hands are up.",
        }
    }
}

/// Result of aggregating every hand in a frame
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandAggregate {
    pub total_extended: usize,
    /// One finger list per hand, in detector order
    pub per_hand_summary: Vec<String>,
    pub combined: HandStatus,
}

/// Aggregate per-hand finger states; `states[i]` belongs to `handedness[i]`
///
/// Extra entries in the longer slice are ignored.
pub fn aggregate(states: &[FingerState], handedness: &[Handedness]) -> HandAggregate {
    let mut result = HandAggregate::default();
    let mut left_up = false;
    let mut right_up = false;

    for (state, hand) in states.iter().zip(handedness) {
        let count = state.count();
        result.total_extended += count;
        result.per_hand_summary.push(state.summary());

        if count > 0 {
            match hand {
                Handedness::Left => left_up = true,
                Handedness::Right => right_up = true,
            }
        }
    }

    result.combined = match (left_up, right_up) {
        (true, true) => HandStatus::Both,
        (true, false) => HandStatus::LeftOnly,
        (false, true) => HandStatus::RightOnly,
        (false, false) => HandStatus::None,
    };
    result
}

/// "Hand 1 has 2 finger(s) up." (index is zero-based, text is one-based)
pub fn count_message(hand_index: usize, state: &FingerState) -> String {
    format!("Hand {} has {} finger(s) up.", hand_index + 1, state.count())
}

/// "Fingers Up: Index, Middle"
pub fn finger_status_message(state: &FingerState) -> String {
    format!("Fingers Up: {}", state.summary()).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::classify;
    use crate::landmarks::{HandObservation, Landmark, INDEX_MCP, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP};

    fn hand_with_two_up(handedness: Handedness) -> FingerState {
        let mut points = [Landmark::new(0.5, 0.5, 0.0); 21];
        points[INDEX_MCP].y = 0.6;
        points[INDEX_TIP].y = 0.2;
        points[MIDDLE_MCP].y = 0.6;
        points[MIDDLE_TIP].y = 0.2;
        classify(&HandObservation::new(&points, handedness).unwrap())
    }

    fn fist() -> FingerState {
        FingerState::default()
    }

    #[test]
    fn test_left_up_right_down() {
        let states = [hand_with_two_up(Handedness::Left), fist()];
        let agg = aggregate(&states, &[Handedness::Left, Handedness::Right]);
        assert_eq!(agg.total_extended, 2);
        assert_eq!(agg.combined, HandStatus::LeftOnly);
        assert_eq!(agg.combined.message(), "Left hand is up.");
        assert_eq!(agg.per_hand_summary, vec!["Index, Middle".to_string(), String::new()]);
    }

    #[test]
    fn test_both_and_none() {
        let up_l = hand_with_two_up(Handedness::Left);
        let up_r = hand_with_two_up(Handedness::Right);
        let both = aggregate(&[up_l, up_r], &[Handedness::Left, Handedness::Right]);
        assert_eq!(both.combined.message(), "Both hands are up.");

        let none = aggregate(&[fist(), fist()], &[Handedness::Left, Handedness::Right]);
        assert_eq!(none.combined.message(), "No hands are up.");

        let empty = aggregate(&[], &[]);
        assert_eq!(empty.combined, HandStatus::None);
        assert_eq!(empty.total_extended, 0);
    }

    #[test]
    fn test_two_right_hands() {
        let up = hand_with_two_up(Handedness::Right);
        let agg = aggregate(&[up, up], &[Handedness::Right, Handedness::Right]);
        assert_eq!(agg.combined, HandStatus::RightOnly);
        assert_eq!(agg.total_extended, 4);
    }

    #[test]
    fn test_messages() {
        let up = hand_with_two_up(Handedness::Left);
        assert_eq!(count_message(0, &up), "Hand 1 has 2 finger(s) up.");
        assert_eq!(finger_status_message(&up), "Fingers Up: Index, Middle");
        assert_eq!(finger_status_message(&fist()), "Fingers Up:");
    }
}

use crate::model::AqiClassification;

const UNKNOWN: AqiClassification = AqiClassification { label: "Unknown", color: "gray" };

/// Map an OpenWeather AQI index to a label and display color.
///
/// Total over its input: anything outside 1..=5, including an absent value,
/// classifies as `Unknown` / `gray`.
pub fn classify(aqi: Option<u8>) -> AqiClassification {
    let (label, color) = match aqi {
        Some(1) => ("Good", "green"),
        Some(2) => ("Fair", "yellow"),
        Some(3) => ("Moderate", "orange"),
        Some(4) => ("Poor", "red"),
        Some(5) => ("Very Poor", "purple"),
        _ => return UNKNOWN,
    };

    AqiClassification { label, color }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_levels_map_to_fixed_pairs() {
        let expected = [
            (1, "Good", "green"),
            (2, "Fair", "yellow"),
            (3, "Moderate", "orange"),
            (4, "Poor", "red"),
            (5, "Very Poor", "purple"),
        ];

        for (aqi, label, color) in expected {
            let c = classify(Some(aqi));
            assert_eq!(c.label, label, "label for {aqi}");
            assert_eq!(c.color, color, "color for {aqi}");
        }
    }

    #[test]
    fn anything_else_is_unknown_gray() {
        for input in [None, Some(0), Some(6), Some(255)] {
            assert_eq!(classify(input), UNKNOWN, "input {input:?}");
        }
    }
}

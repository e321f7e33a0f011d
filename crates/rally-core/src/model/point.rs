use core::fmt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Point score of one side inside the current game.
///
/// Standard games climb the `0 -> 15 -> 30 -> 40 -> Ad` ladder; tie-breaks
/// count plain points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointLabel {
    #[default]
    Love,
    Fifteen,
    Thirty,
    Forty,
    Advantage,
    TieBreak(u32),
}

impl PointLabel {
    /// Next rung on the standard ladder. `40`, `Ad` and tie-break counts do
    /// not advance.
    pub const fn next(self) -> PointLabel {
        match self {
            PointLabel::Love => PointLabel::Fifteen,
            PointLabel::Fifteen => PointLabel::Thirty,
            PointLabel::Thirty => PointLabel::Forty,
            other => other,
        }
    }

    /// Numeric reading used while counting tie-break points. Ladder labels
    /// read as their face value; `Ad` has none and reads as zero.
    pub const fn tie_break_value(self) -> u32 {
        match self {
            PointLabel::Love => 0,
            PointLabel::Fifteen => 15,
            PointLabel::Thirty => 30,
            PointLabel::Forty => 40,
            PointLabel::Advantage => 0,
            PointLabel::TieBreak(points) => points,
        }
    }

    fn from_text(text: &str) -> PointLabel {
        match text.trim() {
            "0" => PointLabel::Love,
            "15" => PointLabel::Fifteen,
            "30" => PointLabel::Thirty,
            "40" => PointLabel::Forty,
            "Ad" | "AD" | "ad" => PointLabel::Advantage,
            other => other
                .parse::<u32>()
                .map(PointLabel::TieBreak)
                .unwrap_or(PointLabel::Love),
        }
    }
}

impl fmt::Display for PointLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointLabel::Love => f.write_str("0"),
            PointLabel::Fifteen => f.write_str("15"),
            PointLabel::Thirty => f.write_str("30"),
            PointLabel::Forty => f.write_str("40"),
            PointLabel::Advantage => f.write_str("Ad"),
            PointLabel::TieBreak(points) => write!(f, "{points}"),
        }
    }
}

impl Serialize for PointLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PointLabel::TieBreak(points) => serializer.serialize_u32(*points),
            ladder => serializer.collect_str(ladder),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Number(u32),
    Text(String),
}

impl<'de> Deserialize<'de> for PointLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawLabel::deserialize(deserializer)? {
            RawLabel::Number(points) => PointLabel::TieBreak(points),
            RawLabel::Text(text) => PointLabel::from_text(&text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::PointLabel;

    #[test]
    fn ladder_advances_to_forty_and_stops() {
        let mut label = PointLabel::Love;
        label = label.next();
        assert_eq!(label, PointLabel::Fifteen);
        label = label.next().next();
        assert_eq!(label, PointLabel::Forty);
        assert_eq!(label.next(), PointLabel::Forty);
        assert_eq!(PointLabel::Advantage.next(), PointLabel::Advantage);
        assert_eq!(PointLabel::TieBreak(3).next(), PointLabel::TieBreak(3));
    }

    #[test]
    fn ladder_labels_serialize_as_strings() {
        let json = serde_json::to_string(&[
            PointLabel::Love,
            PointLabel::Forty,
            PointLabel::Advantage,
            PointLabel::TieBreak(5),
        ])
        .unwrap();
        assert_eq!(json, r#"["0","40","Ad",5]"#);
    }

    #[test]
    fn malformed_text_defaults_to_love() {
        let labels: Vec<PointLabel> = serde_json::from_str(r#"["30", "deuce", "6", 0]"#).unwrap();
        assert_eq!(
            labels,
            vec![
                PointLabel::Thirty,
                PointLabel::Love,
                PointLabel::TieBreak(6),
                PointLabel::TieBreak(0)
            ]
        );
    }

    #[test]
    fn tie_break_value_reads_numbers() {
        assert_eq!(PointLabel::TieBreak(9).tie_break_value(), 9);
        assert_eq!(PointLabel::Love.tie_break_value(), 0);
        assert_eq!(PointLabel::Advantage.tie_break_value(), 0);
    }
}

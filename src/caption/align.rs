use serde::{Deserialize, Deserializer};

/// Horizontal placement of each line inside its box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
}

impl Alignment {
    /// Case-insensitive and untrimmed; anything other than `center` means left.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("center") {
            Alignment::Center
        } else {
            Alignment::Left
        }
    }

    /// Offset from the box's left edge (plus margin) for a line of
    /// `line_width` pixels. Centering truncates toward zero.
    pub fn offset(self, line_width: i32, box_width: i32) -> i32 {
        match self {
            Alignment::Center => (box_width - line_width) / 2,
            Alignment::Left => 0,
        }
    }
}

impl<'de> Deserialize<'de> for Alignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Alignment::parse(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_splits_remaining_space() {
        assert_eq!(Alignment::parse("center").offset(200, 600), 200);
        assert_eq!(Alignment::Center.offset(201, 600), 199);
    }

    #[test]
    fn center_truncates_toward_zero_on_overflow() {
        assert_eq!(Alignment::Center.offset(605, 600), -2);
    }

    #[test]
    fn parse_ignores_case() {
        assert_eq!(Alignment::parse("CENTER"), Alignment::Center);
        assert_eq!(Alignment::parse("Center"), Alignment::Center);
    }

    #[test]
    fn unknown_values_fall_back_to_left() {
        for value in ["left", "justify", "right", "", " center "] {
            let alignment = Alignment::parse(value);
            assert_eq!(alignment, Alignment::Left);
            assert_eq!(alignment.offset(200, 600), 0);
        }
    }
}

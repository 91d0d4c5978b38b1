//! Named age brackets. A fixed, non-overlapping partition of all ages used
//! for the per-bracket shelf snapshots.

/// One named age bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBracket {
    pub label: &'static str,
    pub min: u8,
    pub max: u8,
}

/// The bracket table. Brackets must stay contiguous and cover every age.
pub const AGE_BRACKETS: [AgeBracket; 3] = [
    AgeBracket {
        label: "4-7",
        min: 0,
        max: 7,
    },
    AgeBracket {
        label: "8-10",
        min: 8,
        max: 10,
    },
    AgeBracket {
        label: "11+",
        min: 11,
        max: u8::MAX,
    },
];

/// Looks up the bracket containing `age`.
pub fn bracket_for_age(age: u8) -> &'static AgeBracket {
    AGE_BRACKETS
        .iter()
        .find(|b| b.min <= age && age <= b.max)
        .unwrap_or(&AGE_BRACKETS[AGE_BRACKETS.len() - 1])
}

pub fn is_valid_label(label: &str) -> bool {
    AGE_BRACKETS.iter().any(|b| b.label == label)
}

/// Bracket labels joined for error messages.
pub fn labels_joined() -> String {
    AGE_BRACKETS
        .iter()
        .map(|b| b.label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brackets_partition_all_ages() {
        for age in 0..=u8::MAX {
            let matching = AGE_BRACKETS
                .iter()
                .filter(|b| b.min <= age && age <= b.max)
                .count();
            assert_eq!(matching, 1, "age {age} must land in exactly one bracket");
        }
    }

    #[test]
    fn test_bracket_for_age_boundaries() {
        assert_eq!(bracket_for_age(0).label, "4-7");
        assert_eq!(bracket_for_age(7).label, "4-7");
        assert_eq!(bracket_for_age(8).label, "8-10");
        assert_eq!(bracket_for_age(10).label, "8-10");
        assert_eq!(bracket_for_age(11).label, "11+");
        assert_eq!(bracket_for_age(u8::MAX).label, "11+");
    }

    #[test]
    fn test_label_validation() {
        assert!(is_valid_label("8-10"));
        assert!(!is_valid_label("8 - 10"));
        assert!(!is_valid_label("adult"));
    }
}

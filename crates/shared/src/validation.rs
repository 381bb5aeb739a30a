use crate::{
    domain::{cm_to_mm, is_height_in_range, MAX_HEIGHT_MM, MIN_HEIGHT_MM, SHORTCUT_NAME_MAX_CHARS},
    error::ValidationError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutDraft {
    pub name: String,
    pub height_cm: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidShortcut {
    pub name: String,
    pub height_mm: i32,
}

impl ShortcutDraft {
    pub fn new(name: impl Into<String>, height_cm: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            height_cm: height_cm.into(),
        }
    }

    pub fn validate(&self) -> Result<ValidShortcut, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let name_chars = name.chars().count();
        if name_chars > SHORTCUT_NAME_MAX_CHARS {
            return Err(ValidationError::NameTooLong {
                max: SHORTCUT_NAME_MAX_CHARS,
                actual: name_chars,
            });
        }

        let height_cm = self
            .height_cm
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ValidationError::InvalidHeight(self.height_cm.clone()))?;

        let height_mm = cm_to_mm(height_cm);
        if !is_height_in_range(height_mm) {
            return Err(ValidationError::HeightOutOfRange {
                height_mm,
                min: MIN_HEIGHT_MM,
                max: MAX_HEIGHT_MM,
            });
        }

        Ok(ValidShortcut {
            name: name.to_string(),
            height_mm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_trimmed_name_and_rounds_height() {
        let valid = ShortcutDraft::new("  Reading ", "100.04")
            .validate()
            .expect("valid draft");
        assert_eq!(valid.name, "Reading");
        assert_eq!(valid.height_mm, 1000);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert_eq!(
            ShortcutDraft::new("low", "62").validate().map(|v| v.height_mm),
            Ok(620)
        );
        assert_eq!(
            ShortcutDraft::new("high", "127").validate().map(|v| v.height_mm),
            Ok(1270)
        );
        assert_eq!(
            ShortcutDraft::new("too high", "127.06").validate(),
            Err(ValidationError::HeightOutOfRange {
                height_mm: 1271,
                min: MIN_HEIGHT_MM,
                max: MAX_HEIGHT_MM,
            })
        );
    }

    #[test]
    fn rejects_blank_or_long_names() {
        assert_eq!(
            ShortcutDraft::new("   ", "80").validate(),
            Err(ValidationError::EmptyName)
        );
        let long = "x".repeat(33);
        assert_eq!(
            ShortcutDraft::new(long, "80").validate(),
            Err(ValidationError::NameTooLong {
                max: 32,
                actual: 33
            })
        );
    }

    #[test]
    fn rejects_non_numeric_height() {
        assert!(matches!(
            ShortcutDraft::new("Desk", "tall").validate(),
            Err(ValidationError::InvalidHeight(_))
        ));
        assert!(matches!(
            ShortcutDraft::new("Desk", "NaN").validate(),
            Err(ValidationError::InvalidHeight(_))
        ));
    }
}

use duet_core::{DuetError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A short piece of reference content with its provenance label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    pub id: String,
    pub content: String,
    pub source: String,
}

impl Tip {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), content: content.into(), source: source.into() }
    }
}

impl fmt::Display for Tip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source: {} => {}", self.source, self.content)
    }
}

/// Immutable, never-empty collection of tips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipStore {
    tips: Vec<Tip>,
}

#[derive(Deserialize)]
struct TipFile {
    tips: Vec<Tip>,
}

impl TipStore {
    pub fn new(tips: Vec<Tip>) -> Result<Self> {
        if tips.is_empty() {
            return Err(DuetError::Config("tip store must contain at least one tip".to_string()));
        }
        Ok(Self { tips })
    }

    /// Parse a TOML document of `[[tips]]` tables.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: TipFile = toml::from_str(source)
            .map_err(|e| DuetError::Config(format!("invalid tip file: {e}")))?;
        Self::new(file.tips)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let store = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), tips = store.len(), "loaded tip store");
        Ok(store)
    }

    pub fn tips(&self) -> &[Tip] {
        &self.tips
    }

    pub fn len(&self) -> usize {
        self.tips.len()
    }

    /// Always false for a constructed store.
    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }
}

impl Default for TipStore {
    fn default() -> Self {
        Self {
            tips: vec![
                Tip::new(
                    "tip1",
                    "Try a 20-minute HIIT workout three times a week to boost cardiovascular fitness.",
                    "Fitness Guru",
                ),
                Tip::new(
                    "tip2",
                    "Eat a meal with protein and complex carbohydrates within an hour after training.",
                    "Nutrition Coach",
                ),
                Tip::new(
                    "tip3",
                    "Aim for seven to nine hours of sleep each night to support muscle recovery.",
                    "Sleep Specialist",
                ),
                Tip::new(
                    "tip4",
                    "Stretch the major muscle groups after every session to keep your flexibility.",
                    "Physiotherapist",
                ),
                Tip::new(
                    "tip5",
                    "Drink water before, during and after exercise to stay hydrated.",
                    "Hydration Expert",
                ),
            ],
        }
    }
}

/// Render tips one per line as `Source: X => content`.
pub fn render_tips(tips: &[Tip]) -> String {
    tips.iter().map(Tip::to_string).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_is_rejected() {
        assert!(matches!(TipStore::new(vec![]), Err(DuetError::Config(_))));
    }

    #[test]
    fn test_default_store_has_fitness_guru() {
        let store = TipStore::default();
        assert!(!store.is_empty());
        assert!(store.tips().iter().any(|t| t.source == "Fitness Guru"));
    }

    #[test]
    fn test_tip_display() {
        let tip = Tip::new("t", "Walk daily.", "Coach");
        assert_eq!(tip.to_string(), "Source: Coach => Walk daily.");
    }

    #[test]
    fn test_from_toml_str() {
        let store = TipStore::from_toml_str(
            r#"
            [[tips]]
            id = "a"
            content = "Foam roll sore calves."
            source = "Runner's World"
            "#,
        )
        .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.tips()[0].source, "Runner's World");
    }

    #[test]
    fn test_from_toml_str_without_tips_fails() {
        assert!(matches!(TipStore::from_toml_str("tips = []"), Err(DuetError::Config(_))));
        assert!(matches!(TipStore::from_toml_str("nonsense ="), Err(DuetError::Config(_))));
    }
}

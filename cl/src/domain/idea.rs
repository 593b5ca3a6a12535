//! Idea text values

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::InputError;

/// One idea at one point in the pipeline; never empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdeaText(String);

impl IdeaText {
    /// Trim surrounding whitespace and reject what is left if empty
    pub fn new(text: impl AsRef<str>) -> Result<Self, InputError> {
        let trimmed = text.as_ref().trim();
        debug!(len = trimmed.len(), "IdeaText::new: called");
        if trimmed.is_empty() {
            debug!("IdeaText::new: empty after trim");
            return Err(InputError::EmptyIdea);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IdeaText {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IdeaText> for String {
    fn from(value: IdeaText) -> Self {
        value.0
    }
}

impl Deref for IdeaText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for IdeaText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdeaText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final output of synthesis, owned by the caller
pub type Suggestion = IdeaText;

/// Ordered ideas fed to synthesis
///
/// Order only affects prompt framing. Duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdeaSet(Vec<IdeaText>);

impl IdeaSet {
    pub fn new(ideas: Vec<IdeaText>) -> Result<Self, InputError> {
        debug!(count = ideas.len(), "IdeaSet::new: called");
        if ideas.is_empty() {
            return Err(InputError::EmptyIdeaSet);
        }
        Ok(Self(ideas))
    }

    /// Build from raw strings, dropping blank entries
    ///
    /// Fails when nothing non-empty remains.
    pub fn from_strings<I, S>(raw: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ideas: Vec<IdeaText> = raw.into_iter().filter_map(|s| IdeaText::new(s).ok()).collect();
        Self::new(ideas)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IdeaText> {
        self.0.iter()
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|idea| idea.as_str().to_string()).collect()
    }
}

impl<'a> IntoIterator for &'a IdeaSet {
    type Item = &'a IdeaText;
    type IntoIter = std::slice::Iter<'a, IdeaText>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idea_text_trims() {
        let idea = IdeaText::new("  urban farming kiosk \n").unwrap();
        assert_eq!(idea.as_str(), "urban farming kiosk");
    }

    #[test]
    fn test_idea_text_rejects_blank() {
        assert_eq!(IdeaText::new(""), Err(InputError::EmptyIdea));
        assert_eq!(IdeaText::new(" \t\n "), Err(InputError::EmptyIdea));
    }

    #[test]
    fn test_idea_text_serde_roundtrip_rejects_empty() {
        let idea: IdeaText = serde_json::from_str("\"a kiosk\"").unwrap();
        assert_eq!(idea.as_str(), "a kiosk");
        assert!(serde_json::from_str::<IdeaText>("\"   \"").is_err());
    }

    #[test]
    fn test_idea_set_keeps_order_and_duplicates() {
        let set = IdeaSet::from_strings(["B", "A", "B"]).unwrap();
        assert_eq!(set.to_strings(), vec!["B", "A", "B"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_idea_set_empty_rejected() {
        assert_eq!(IdeaSet::new(vec![]), Err(InputError::EmptyIdeaSet));
        assert_eq!(IdeaSet::from_strings(Vec::<String>::new()), Err(InputError::EmptyIdeaSet));
    }

    #[test]
    fn test_idea_set_drops_blank_entries() {
        let set = IdeaSet::from_strings(["", "A", "  "]).unwrap();
        assert_eq!(set.to_strings(), vec!["A"]);

        assert_eq!(IdeaSet::from_strings(["", "   "]), Err(InputError::EmptyIdeaSet));
    }
}

//! Variant tags and per-entry variant tables
//!
//! A catalog entry can hold several versions of the same element that differ
//! by the number of valence electrons treated explicitly. The data layer
//! names them `q<N>` (`q8`, `q16`, ...). Tags are parsed into `VariantTag`
//! once, when a table is ingested: a malformed tag rejects the whole payload
//! instead of being compared as a string later on.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::elements::Element;
use crate::error::{KindsError, Result};

// ============================================================================
// VariantTag
// ============================================================================

/// `q<N>`, ordered by `N`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VariantTag {
    valence: u32,
}

impl VariantTag {
    pub const fn new(valence: u32) -> Self {
        Self { valence }
    }

    /// Number of valence electrons treated explicitly
    pub const fn valence(self) -> u32 {
        self.valence
    }
}

impl FromStr for VariantTag {
    type Err = KindsError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix('q')
            .filter(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()))
            .ok_or_else(|| KindsError::malformed_tag(s))?;

        digits
            .parse()
            .map(Self::new)
            .map_err(|_| KindsError::malformed_tag(s))
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.valence)
    }
}

impl TryFrom<String> for VariantTag {
    type Error = KindsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<VariantTag> for String {
    fn from(value: VariantTag) -> Self {
        value.to_string()
    }
}

// ============================================================================
// Variants of one element
// ============================================================================

/// One variant of an element: its tag and the name to write in the input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub tag: VariantTag,
    pub name: String,
}

/// Variants of a single element, in the order the data layer listed them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementVariants(Vec<Variant>);

impl ElementVariants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variant; a tag may only appear once
    pub fn push(&mut self, tag: VariantTag, name: impl Into<String>) -> Result<()> {
        if self.contains(tag) {
            return Err(KindsError::general(format!("duplicate variant tag `{tag}`")));
        }
        self.0.push(Variant {
            tag,
            name: name.into(),
        });
        Ok(())
    }

    pub fn contains(&self, tag: VariantTag) -> bool {
        self.0.iter().any(|v| v.tag == tag)
    }

    /// Display name for `tag`
    pub fn name_of(&self, tag: VariantTag) -> Option<&str> {
        self.0
            .iter()
            .find(|v| v.tag == tag)
            .map(|v| v.name.as_str())
    }

    /// Tags in source order
    pub fn tags(&self) -> impl Iterator<Item = VariantTag> + '_ {
        self.0.iter().map(|v| v.tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> TryFrom<Vec<(&str, S)>> for ElementVariants {
    type Error = KindsError;

    fn try_from(pairs: Vec<(&str, S)>) -> Result<Self> {
        let mut variants = Self::new();
        for (tag, name) in pairs {
            variants.push(tag.parse()?, name)?;
        }
        Ok(variants)
    }
}

impl Serialize for ElementVariants {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for variant in &self.0 {
            map.serialize_entry(&variant.tag, &variant.name)?;
        }
        map.end()
    }
}

struct ElementVariantsVisitor;

impl<'de> Visitor<'de> for ElementVariantsVisitor {
    type Value = ElementVariants;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map from variant tag (`q<N>`) to name")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        use serde::de::Error;

        let mut variants = ElementVariants::new();
        while let Some((tag, name)) = access.next_entry::<String, String>()? {
            let tag: VariantTag = tag.parse().map_err(A::Error::custom)?;
            variants.push(tag, name).map_err(A::Error::custom)?;
        }
        Ok(variants)
    }
}

impl<'de> Deserialize<'de> for ElementVariants {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ElementVariantsVisitor)
    }
}

// ============================================================================
// VariantMap
// ============================================================================

/// Per-element variants of one catalog entry
pub type VariantMap = BTreeMap<Element, ElementVariants>;

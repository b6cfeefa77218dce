use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A user-assigned color label from the fixed palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Sunrise,
    Sunset,
    Sky,
    Ocean,
    Forest,
    Violet,
    Rose,
    Amber,
    Mint,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown color tag: '{0}'")]
pub struct UnknownColorTag(pub String);

impl ColorTag {
    /// The palette, in display order.
    pub const PALETTE: [ColorTag; 9] = [
        ColorTag::Sunrise,
        ColorTag::Sunset,
        ColorTag::Sky,
        ColorTag::Ocean,
        ColorTag::Forest,
        ColorTag::Violet,
        ColorTag::Rose,
        ColorTag::Amber,
        ColorTag::Mint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTag::Sunrise => "sunrise",
            ColorTag::Sunset => "sunset",
            ColorTag::Sky => "sky",
            ColorTag::Ocean => "ocean",
            ColorTag::Forest => "forest",
            ColorTag::Violet => "violet",
            ColorTag::Rose => "rose",
            ColorTag::Amber => "amber",
            ColorTag::Mint => "mint",
        }
    }

    /// Picks the least used tag among `in_use`, ties broken by palette order.
    ///
    /// Any tag that does not appear in `in_use` has a count of zero, so an unused
    /// tag is always preferred while one exists.
    pub fn auto_pick<I>(in_use: I) -> ColorTag
    where
        I: IntoIterator<Item = ColorTag>,
    {
        let mut counts = [0usize; 9];
        for tag in in_use {
            counts[tag.palette_index()] += 1;
        }
        let mut best = 0;
        for (i, count) in counts.iter().enumerate() {
            if *count < counts[best] {
                best = i;
            }
        }
        Self::PALETTE[best]
    }

    fn palette_index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorTag {
    type Err = UnknownColorTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::PALETTE
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownColorTag(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_palette_entry() {
        for tag in ColorTag::PALETTE {
            assert_eq!(tag.as_str().parse::<ColorTag>(), Ok(tag));
        }
        assert!("teal".parse::<ColorTag>().is_err());
    }

    #[test]
    fn auto_pick_skips_used_tags() {
        let used = [ColorTag::Sunrise, ColorTag::Sky, ColorTag::Ocean];
        let picked = ColorTag::auto_pick(used);
        assert!(!used.contains(&picked));
        assert_eq!(picked, ColorTag::Sunset);
    }

    #[test]
    fn auto_pick_prefers_least_used_when_all_taken() {
        let mut used: Vec<ColorTag> = ColorTag::PALETTE.to_vec();
        used.extend(ColorTag::PALETTE.iter().copied().filter(|t| *t != ColorTag::Rose));
        assert_eq!(ColorTag::auto_pick(used), ColorTag::Rose);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ColorTag::Forest).unwrap();
        assert_eq!(json, "\"forest\"");
    }
}

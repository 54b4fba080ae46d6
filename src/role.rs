//! Role tags embedded in file names and the rules for splitting a name at them.

use serde::{Deserialize, Serialize};

/// Characters trimmed from the end of a prefix to form the group key.
const KEY_DELIMITERS: &[char] = &['_', '-', '.', ' '];

/// The role a file plays inside one specimen location.
///
/// Declaration order is the priority order used when a name carries more than
/// one secondary tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoleTag {
    Map,
    Square,
    Hole,
    Inner1,
    Inner2,
}

impl RoleTag {
    /// Secondary roles in slot order.
    pub const SECONDARY: [RoleTag; 4] = [
        RoleTag::Square,
        RoleTag::Hole,
        RoleTag::Inner1,
        RoleTag::Inner2,
    ];

    /// The literal text searched for in file names.
    pub fn tag(self) -> &'static str {
        match self {
            RoleTag::Map => "map",
            RoleTag::Square => "square",
            RoleTag::Hole => "hole",
            RoleTag::Inner1 => "i1",
            RoleTag::Inner2 => "i2",
        }
    }

    /// Index into [`ImageSet::secondary`](crate::grouper::ImageSet::secondary),
    /// `None` for the primary role.
    pub fn slot(self) -> Option<usize> {
        RoleTag::SECONDARY.iter().position(|r| *r == self)
    }
}

impl std::fmt::Display for RoleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// How a role tag has to appear in a file name to count as a match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum RoleMatch {
    /// The tag may appear anywhere; the name is split at its first occurrence.
    /// `heatmap_x.png` is therefore a `map` file with prefix `heat`.
    #[default]
    Substring,
    /// The tag must end the file stem, directly before the extension.
    Anchored,
}

/// A file name split around its role tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedName<'a> {
    /// Text before the tag.
    pub prefix: &'a str,
    /// Text after the tag, usually `.<ext>`.
    pub remainder: &'a str,
}

impl<'a> TaggedName<'a> {
    /// Group key: the prefix with one trailing delimiter removed.
    pub fn key(&self) -> &'a str {
        self.prefix
            .strip_suffix(KEY_DELIMITERS)
            .unwrap_or(self.prefix)
    }

    /// Extension following the tag (`png` for `_map.png`), taken from the
    /// first dot-separated segment of the remainder.
    pub fn extension(&self) -> Option<&'a str> {
        self.remainder.split('.').nth(1).filter(|ext| !ext.is_empty())
    }
}

impl RoleMatch {
    /// Splits `name` at `role`'s tag, or returns `None` when the tag is absent.
    pub fn split<'a>(self, name: &'a str, role: RoleTag) -> Option<TaggedName<'a>> {
        let tag = role.tag();
        match self {
            RoleMatch::Substring => {
                let at = name.find(tag)?;
                Some(TaggedName {
                    prefix: &name[..at],
                    remainder: &name[at + tag.len()..],
                })
            }
            RoleMatch::Anchored => {
                let stem_end = name.rfind('.').unwrap_or(name.len());
                let prefix = name[..stem_end].strip_suffix(tag)?;
                Some(TaggedName {
                    prefix,
                    remainder: &name[prefix.len() + tag.len()..],
                })
            }
        }
    }

    /// First secondary role found in `name`, in [`RoleTag::SECONDARY`] order.
    pub fn classify_secondary<'a>(self, name: &'a str) -> Option<(RoleTag, TaggedName<'a>)> {
        RoleTag::SECONDARY
            .into_iter()
            .find_map(|role| self.split(name, role).map(|tagged| (role, tagged)))
    }
}

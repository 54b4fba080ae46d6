//! Recovers per-location image sets from a flat directory listing.
//!
//! Grouping runs in two passes. The first registers one set per `map` file;
//! the second attaches secondary files to sets that already exist. A secondary
//! file whose key has no `map` never creates a set.

use image::DynamicImage;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use crate::config::{MontageConfig, SecondaryExtension};
use crate::imaging::ImageSource;
use crate::role::{RoleMatch, RoleTag};

/// All images of one specimen location.
#[derive(Debug, Clone)]
pub struct ImageSet {
    /// Shared name prefix without its trailing delimiter, used for display
    /// and the `underscore` output name. Not unique: `A_map` and `Amap`
    /// both have key `A`.
    pub key: String,
    /// Raw text before the `map` tag in the primary's file name. Identifies
    /// the set.
    pub prefix: String,
    /// Extension of the primary file.
    pub extension: Option<String>,
    /// File name the primary was read from.
    pub primary_name: String,
    pub primary: DynamicImage,
    /// Slots in [`RoleTag::SECONDARY`] order.
    pub secondary: [Option<DynamicImage>; 4],
}

impl ImageSet {
    pub fn get(&self, role: RoleTag) -> Option<&DynamicImage> {
        match role.slot() {
            None => Some(&self.primary),
            Some(slot) => self.secondary[slot].as_ref(),
        }
    }

    /// Roles with an image assigned, primary first.
    pub fn present_roles(&self) -> Vec<RoleTag> {
        std::iter::once(RoleTag::Map)
            .chain(
                RoleTag::SECONDARY
                    .into_iter()
                    .filter(|role| self.get(*role).is_some()),
            )
            .collect()
    }
}

/// Result of grouping one directory.
#[derive(Debug, Default)]
pub struct Grouping {
    /// Sets by raw prefix.
    pub sets: BTreeMap<String, ImageSet>,
    /// Secondary files with no matching `map` file. Names that were taken as
    /// a `map` file are never listed here.
    pub orphaned: Vec<String>,
    /// Tagged files that failed to decode.
    pub unreadable: Vec<String>,
}

/// Classifies file names by role tag and assembles [`ImageSet`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grouper {
    role_match: RoleMatch,
    extension: SecondaryExtension,
}

impl Grouper {
    pub fn new(role_match: RoleMatch, extension: SecondaryExtension) -> Self {
        Self {
            role_match,
            extension,
        }
    }

    pub fn from_config(config: &MontageConfig) -> Self {
        Self::new(config.role_match, config.extension)
    }

    /// Groups `names`, opening the tagged ones through `source`.
    ///
    /// When two `map` files share a prefix the later one in `names` wins.
    pub fn group<N, S>(&self, names: &[N], source: &S) -> Grouping
    where
        N: AsRef<str>,
        S: ImageSource + ?Sized,
    {
        let mut grouping = Grouping::default();
        let mut primaries = HashSet::new();

        for name in names.iter().map(AsRef::as_ref) {
            let Some(tagged) = self.role_match.split(name, RoleTag::Map) else {
                continue;
            };
            primaries.insert(name);
            let primary = match source.open(name) {
                Ok(image) => image,
                Err(e) => {
                    warn!("{e}");
                    grouping.unreadable.push(name.to_string());
                    continue;
                }
            };
            let prefix = tagged.prefix.to_string();
            if let Some(previous) = grouping.sets.get(&prefix) {
                debug!(
                    "{name} replaces {} as map for `{prefix}`",
                    previous.primary_name
                );
            }
            grouping.sets.insert(
                prefix.clone(),
                ImageSet {
                    key: tagged.key().to_string(),
                    prefix,
                    extension: tagged.extension().map(str::to_string),
                    primary_name: name.to_string(),
                    primary,
                    secondary: [None, None, None, None],
                },
            );
        }

        for name in names.iter().map(AsRef::as_ref) {
            let Some((role, tagged)) = self.role_match.classify_secondary(name) else {
                continue;
            };
            let is_primary = primaries.contains(name);
            let Some(set) = grouping.sets.get_mut(tagged.prefix) else {
                debug!("{name}: no map for `{}`, dropped", tagged.prefix);
                if !is_primary {
                    grouping.orphaned.push(name.to_string());
                }
                continue;
            };
            if self.extension == SecondaryExtension::MatchPrimary
                && tagged.extension() != set.extension.as_deref()
            {
                debug!("{name}: extension differs from {}", set.primary_name);
                if !is_primary {
                    grouping.orphaned.push(name.to_string());
                }
                continue;
            }
            match source.open(name) {
                Ok(image) => {
                    if let Some(slot) = role.slot() {
                        debug!("{name} -> `{}` {role}", set.key);
                        set.secondary[slot] = Some(image);
                    }
                }
                Err(e) => {
                    debug!("{e}");
                    grouping.unreadable.push(name.to_string());
                }
            }
        }

        grouping
    }
}

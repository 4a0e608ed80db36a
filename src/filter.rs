use std::collections::HashSet;

use tracing::debug;

use crate::error::{Error, Result};

/// Sections loaded from a resource pack
pub const RP_SECTIONS: &[&str] = &[
    "geometries",
    "client_entities",
    "render_controllers",
    "textures",
    "particles",
    "rp_animations",
    "rp_animation_controllers",
    "attachables",
    "sound_definitions",
    "sounds",
    "rp_items",
];

/// Sections loaded from a behavior pack
pub const BP_SECTIONS: &[&str] = &[
    "entities",
    "loot_tables",
    "trade_tables",
    "bp_animations",
    "bp_animation_controllers",
    "bp_items",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackKind {
    Resource,
    Behavior,
}

impl PackKind {
    /// Container table holding one row per loaded pack
    pub fn table(&self) -> &'static str {
        match self {
            PackKind::Resource => "ResourcePack",
            PackKind::Behavior => "BehaviorPack",
        }
    }

    pub fn sections(&self) -> &'static [&'static str] {
        match self {
            PackKind::Resource => RP_SECTIONS,
            PackKind::Behavior => BP_SECTIONS,
        }
    }
}

/// Resolves which sections of a pack to load.
///
/// `None` for `include` means every section. A section named in both lists
/// is excluded.
pub fn resolve_sections(
    kind: PackKind,
    include: Option<&[&str]>,
    exclude: &[&str],
) -> Result<Vec<&'static str>> {
    let known = kind.sections();
    for name in include.unwrap_or_default().iter().chain(exclude) {
        if !known.contains(name) {
            return Err(Error::UnknownSection(name.to_string()));
        }
    }

    let excluded: HashSet<&str> = exclude.iter().copied().collect();
    let sections: Vec<&'static str> = known
        .iter()
        .copied()
        .filter(|s| include.map_or(true, |inc| inc.contains(s)))
        .filter(|s| !excluded.contains(s))
        .collect();

    debug!(pack = kind.table(), ?sections, "sections resolved");
    Ok(sections)
}

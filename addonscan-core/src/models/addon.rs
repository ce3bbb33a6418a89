//! The addon record and its parts.
//!
//! Field names serialize to the keys consumers of the published addon list
//! already read, so renames here are breaking changes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Addon
// ============================================================================

/// A fully parsed addon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Addon {
    /// Display name from the manifest.
    pub name: String,
    /// Repository description, else the manifest description.
    pub description: String,
    /// Resolved target Minecraft version, empty if unresolved.
    pub mc_version: String,
    /// Normalized author list.
    pub authors: Vec<String>,
    /// Extracted features.
    pub features: Features,
    /// Verification state, assigned by the driver.
    pub verified: bool,
    /// Repository facts.
    pub repo: RepoInfo,
    /// Outbound links.
    pub links: Links,
    /// Addon-authored overrides.
    pub custom: CustomProperties,

    /// Branch every raw document was read from.
    #[serde(skip)]
    pub default_branch: String,
    /// First manifest entrypoint, as a source path (`com/example/Addon`).
    #[serde(skip)]
    pub entrypoint: String,
}

impl Addon {
    /// Repository identifier (`owner/name`).
    pub fn id(&self) -> &str {
        &self.repo.id
    }
}

/// Repository facts copied into the addon record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    /// `owner/name`.
    pub id: String,
    /// Owner login.
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Whether the repository is archived.
    pub archived: bool,
    /// Whether the repository is a platform-level fork.
    pub fork: bool,
    /// Star count.
    pub stars: u64,
    /// Downloads summed across every eligible release asset.
    pub downloads: u64,
    /// Last push timestamp (RFC 3339).
    pub last_update: String,
    /// Creation timestamp (RFC 3339).
    pub creation_date: String,
}

/// Outbound links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Repository page.
    pub github: String,
    /// Eligible download URLs, stable before prerelease.
    pub downloads: Vec<String>,
    /// The asset picked as latest.
    pub latest_release: String,
    /// A live discord invite.
    pub discord: String,
    /// Repository homepage, unless it was a discord invite.
    pub homepage: String,
    /// Raw URL of the manifest icon.
    pub icon: String,
}

// ============================================================================
// Features
// ============================================================================

/// The four kinds of capability an addon registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureKind {
    /// `Modules.get().add(new X())`
    Module,
    /// `Commands.add(new X())`
    Command,
    /// `Hud.get().register(X.INFO)`
    HudElement,
    /// `Tabs.add(new X())`
    CustomScreen,
}

impl FeatureKind {
    /// Every kind, in record order.
    pub const ALL: [FeatureKind; 4] = [
        FeatureKind::Module,
        FeatureKind::Command,
        FeatureKind::HudElement,
        FeatureKind::CustomScreen,
    ];
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Module => "module",
            Self::Command => "command",
            Self::HudElement => "hud element",
            Self::CustomScreen => "custom screen",
        };
        f.write_str(name)
    }
}

/// Extracted feature names, deduplicated in first-seen order.
///
/// The lists are private so `feature_count` can only move with them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFeatures")]
pub struct Features {
    modules: Vec<String>,
    commands: Vec<String>,
    hud_elements: Vec<String>,
    custom_screens: Vec<String>,
    feature_count: usize,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    descriptions: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct RawFeatures {
    #[serde(default)]
    modules: Vec<String>,
    #[serde(default)]
    commands: Vec<String>,
    #[serde(default)]
    hud_elements: Vec<String>,
    #[serde(default)]
    custom_screens: Vec<String>,
    #[serde(default)]
    descriptions: BTreeMap<String, String>,
}

impl From<RawFeatures> for Features {
    fn from(raw: RawFeatures) -> Self {
        let mut features = Features::default();
        let lists = [
            (FeatureKind::Module, raw.modules),
            (FeatureKind::Command, raw.commands),
            (FeatureKind::HudElement, raw.hud_elements),
            (FeatureKind::CustomScreen, raw.custom_screens),
        ];
        for (kind, names) in lists {
            for name in names {
                features.push(kind, name);
            }
        }
        features.descriptions = raw.descriptions;
        features
    }
}

impl Features {
    /// Creates an empty feature set.
    pub fn new() -> Self {
        Self::default()
    }

    fn list_mut(&mut self, kind: FeatureKind) -> &mut Vec<String> {
        match kind {
            FeatureKind::Module => &mut self.modules,
            FeatureKind::Command => &mut self.commands,
            FeatureKind::HudElement => &mut self.hud_elements,
            FeatureKind::CustomScreen => &mut self.custom_screens,
        }
    }

    /// Adds a name unless it is already listed for that kind.
    ///
    /// Returns true if the name was added.
    pub fn push(&mut self, kind: FeatureKind, name: impl Into<String>) -> bool {
        let name = name.into();
        let list = self.list_mut(kind);
        if list.contains(&name) {
            return false;
        }
        list.push(name);
        self.feature_count += 1;
        true
    }

    /// Names registered for one kind.
    pub fn list(&self, kind: FeatureKind) -> &[String] {
        match kind {
            FeatureKind::Module => &self.modules,
            FeatureKind::Command => &self.commands,
            FeatureKind::HudElement => &self.hud_elements,
            FeatureKind::CustomScreen => &self.custom_screens,
        }
    }

    /// Registered modules.
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Registered commands.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Registered HUD elements.
    pub fn hud_elements(&self) -> &[String] {
        &self.hud_elements
    }

    /// Registered custom screens.
    pub fn custom_screens(&self) -> &[String] {
        &self.custom_screens
    }

    /// Total number of names across all four lists.
    pub fn count(&self) -> usize {
        self.feature_count
    }

    /// Returns true if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.feature_count == 0
    }

    /// Iterates every name of every kind.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        FeatureKind::ALL
            .into_iter()
            .flat_map(move |kind| self.list(kind).iter().map(String::as_str))
    }

    /// Attaches a description to a feature name.
    pub fn set_description(&mut self, name: impl Into<String>, description: impl Into<String>) {
        self.descriptions.insert(name.into(), description.into());
    }

    /// Looks up the description fetched for a feature name.
    pub fn description(&self, name: &str) -> Option<&str> {
        self.descriptions.get(name).map(String::as_str)
    }

    /// All fetched descriptions, keyed by feature name.
    pub fn descriptions(&self) -> &BTreeMap<String, String> {
        &self.descriptions
    }
}

// ============================================================================
// Releases
// ============================================================================

/// What the release list yielded for one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseFacts {
    /// Eligible asset URLs, stable before prerelease.
    pub downloads: Vec<String>,
    /// The asset with the highest embedded version, else the first eligible.
    pub latest: String,
    /// Downloads across every eligible asset of every non-draft release.
    pub download_count: u64,
}

impl ReleaseFacts {
    /// Returns true if no eligible asset was found.
    pub fn is_empty(&self) -> bool {
        self.downloads.is_empty() && self.latest.is_empty()
    }
}

// ============================================================================
// Custom Properties
// ============================================================================

/// Tags an addon may declare for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Player-versus-player combat.
    PvP,
    /// General utility.
    Utility,
    /// Client themes.
    Theme,
    /// Rendering.
    Render,
    /// Movement.
    Movement,
    /// Building.
    Building,
    /// World interaction.
    World,
    /// Miscellaneous.
    Misc,
    /// Quality of life.
    QoL,
    /// Exploits.
    Exploit,
    /// Fun.
    Fun,
    /// Automation.
    Automation,
}

impl Tag {
    /// Every tag in the vocabulary.
    pub const ALL: [Tag; 12] = [
        Tag::PvP,
        Tag::Utility,
        Tag::Theme,
        Tag::Render,
        Tag::Movement,
        Tag::Building,
        Tag::World,
        Tag::Misc,
        Tag::QoL,
        Tag::Exploit,
        Tag::Fun,
        Tag::Automation,
    ];

    /// Canonical spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PvP => "PvP",
            Self::Utility => "Utility",
            Self::Theme => "Theme",
            Self::Render => "Render",
            Self::Movement => "Movement",
            Self::Building => "Building",
            Self::World => "World",
            Self::Misc => "Misc",
            Self::QoL => "QoL",
            Self::Exploit => "Exploit",
            Self::Fun => "Fun",
            Self::Automation => "Automation",
        }
    }

    /// Matches a tag case-insensitively against the vocabulary.
    pub fn parse(value: &str) -> Option<Tag> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Tag::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("unknown tag: {raw}")))
    }
}

/// Directories, relative to the entrypoint package, that hold feature sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDirectories {
    /// Module source directories.
    #[serde(default)]
    pub modules: Vec<String>,
    /// Command source directories.
    #[serde(default)]
    pub commands: Vec<String>,
    /// HUD element source directories.
    #[serde(default)]
    pub hud_elements: Vec<String>,
}

impl FeatureDirectories {
    /// Directories declared for one feature kind.
    pub fn for_kind(&self, kind: FeatureKind) -> &[String] {
        match kind {
            FeatureKind::Module => &self.modules,
            FeatureKind::Command => &self.commands,
            FeatureKind::HudElement => &self.hud_elements,
            FeatureKind::CustomScreen => &[],
        }
    }

    /// Returns true if no directory is declared.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.commands.is_empty() && self.hud_elements.is_empty()
    }
}

/// The normalized addon-authored supplementary document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomProperties {
    /// Free-text description override.
    pub description: String,
    /// Tags from the fixed vocabulary.
    pub tags: Vec<Tag>,
    /// Declared versions, strictly shaped and sorted newest-first.
    pub supported_versions: Vec<String>,
    /// Icon override.
    pub icon: String,
    /// Discord invite override.
    pub discord: String,
    /// Homepage override.
    pub homepage: String,
    /// Where feature sources live, used for description lookup.
    #[serde(default, skip_serializing_if = "FeatureDirectories::is_empty")]
    pub feature_directories: FeatureDirectories,
}

// ============================================================================
// Invalid Addon
// ============================================================================

/// A repository rejected during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidAddon {
    /// `owner/name`.
    pub id: String,
    /// Repository page.
    pub url: String,
    /// Human-readable rejection reason.
    pub reason: String,
}

impl InvalidAddon {
    /// Creates an entry for `id` with its GitHub page URL.
    pub fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            url: format!("https://github.com/{id}"),
            id,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_count_tracks_lists() {
        let mut features = Features::new();
        assert!(features.push(FeatureKind::Module, "Auto Totem"));
        assert!(features.push(FeatureKind::Command, "Auto Totem"));
        assert!(!features.push(FeatureKind::Module, "Auto Totem"));
        assert!(features.push(FeatureKind::HudElement, "Coords"));
        assert!(features.push(FeatureKind::CustomScreen, "Config Tab"));

        let total: usize = FeatureKind::ALL
            .iter()
            .map(|kind| features.list(*kind).len())
            .sum();
        assert_eq!(features.count(), 4);
        assert_eq!(features.count(), total);
    }

    #[test]
    fn test_features_keep_first_seen_order() {
        let mut features = Features::new();
        features.push(FeatureKind::Module, "Zeta");
        features.push(FeatureKind::Module, "Alpha");
        features.push(FeatureKind::Module, "Zeta");
        assert_eq!(features.modules(), ["Zeta", "Alpha"]);
    }

    #[test]
    fn test_features_dedupe_is_case_sensitive() {
        let mut features = Features::new();
        features.push(FeatureKind::Module, "Fly");
        features.push(FeatureKind::Module, "fly");
        assert_eq!(features.count(), 2);
    }

    #[test]
    fn test_features_deserialize_recounts() {
        let json = r#"{
            "modules": ["A", "A", "B"],
            "commands": ["C"],
            "hud_elements": [],
            "custom_screens": ["D"],
            "feature_count": 99
        }"#;
        let features: Features = serde_json::from_str(json).unwrap();
        assert_eq!(features.count(), 4);
        assert_eq!(features.modules(), ["A", "B"]);
    }

    #[test]
    fn test_features_serialize_shape() {
        let mut features = Features::new();
        features.push(FeatureKind::Module, "Fly");
        let value = serde_json::to_value(&features).unwrap();
        assert_eq!(value["modules"][0], "Fly");
        assert_eq!(value["feature_count"], 1);
        assert!(value.get("descriptions").is_none());

        features.set_description("Fly", "Lets you fly.");
        let value = serde_json::to_value(&features).unwrap();
        assert_eq!(value["descriptions"]["Fly"], "Lets you fly.");
    }

    #[test]
    fn test_tag_parse_is_case_insensitive() {
        assert_eq!(Tag::parse("pvp"), Some(Tag::PvP));
        assert_eq!(Tag::parse("QOL"), Some(Tag::QoL));
        assert_eq!(Tag::parse(" Automation "), Some(Tag::Automation));
        assert_eq!(Tag::parse("griefing"), None);
    }

    #[test]
    fn test_tag_serializes_canonical() {
        let tags = vec![Tag::PvP, Tag::QoL];
        assert_eq!(serde_json::to_string(&tags).unwrap(), r#"["PvP","QoL"]"#);
        let back: Vec<Tag> = serde_json::from_str(r#"["pvp","qol"]"#).unwrap();
        assert_eq!(back, tags);
    }

    #[test]
    fn test_addon_skips_internal_fields() {
        let addon = Addon {
            default_branch: "main".to_string(),
            entrypoint: "com/example/Addon".to_string(),
            ..Addon::default()
        };
        let value = serde_json::to_value(&addon).unwrap();
        assert!(value.get("default_branch").is_none());
        assert!(value.get("entrypoint").is_none());
        for key in [
            "name",
            "description",
            "mc_version",
            "authors",
            "features",
            "verified",
            "repo",
            "links",
            "custom",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_invalid_addon_url() {
        let invalid = InvalidAddon::new("owner/name", "Repository is archived");
        assert_eq!(invalid.url, "https://github.com/owner/name");
    }
}

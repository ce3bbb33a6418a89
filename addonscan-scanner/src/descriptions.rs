//! Feature descriptions read from each feature's own source file.
//!
//! Only directories the addon lists in its custom document's
//! `feature_directories` are searched, relative to the entrypoint's package.

use std::sync::LazyLock;

use addonscan_core::{Addon, FeatureKind};
use addonscan_fetch::GitHubApi;
use regex::Regex;
use tracing::debug;

static MODULE_DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"super\s*\(\s*[^,]+,\s*"[^"]*"\s*,\s*"([^"]*)""#).expect("Invalid regex")
});

static COMMAND_DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"super\s*\(\s*"[^"]*"\s*,\s*"([^"]*)""#).expect("Invalid regex")
});

static HUD_DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"new\s+HudElementInfo<[^>]*>\s*\([^,]+,\s*"[^"]*"\s*,\s*"([^"]*)""#)
        .expect("Invalid regex")
});

fn base_type(kind: FeatureKind) -> Option<(&'static str, &'static Regex)> {
    match kind {
        FeatureKind::Module => Some(("extends Module", &*MODULE_DESCRIPTION_RE)),
        FeatureKind::Command => Some(("extends Command", &*COMMAND_DESCRIPTION_RE)),
        FeatureKind::HudElement => Some(("extends HudElement", &*HUD_DESCRIPTION_RE)),
        FeatureKind::CustomScreen => None,
    }
}

/// Package directory of a slash-separated entrypoint path.
pub fn package_dir(entrypoint: &str) -> &str {
    entrypoint
        .rfind('/')
        .map_or(entrypoint, |idx| &entrypoint[..idx])
}

/// Extracts the description from a feature's source.
///
/// Returns `None` unless the file declares `class_name` with the base type
/// `kind` requires. A qualifying file without a description literal yields
/// an empty string.
pub fn extract_description(kind: FeatureKind, class_name: &str, source: &str) -> Option<String> {
    let (extends, re) = base_type(kind)?;
    if !source.contains(extends) || !source.contains(&format!("public {class_name}")) {
        return None;
    }

    Some(
        re.captures(source)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    )
}

/// Fetches descriptions for the addon's modules, commands, and HUD elements.
///
/// The first listed directory holding a qualifying file wins. Missing files
/// and failed fetches leave the feature without a description.
pub async fn fetch_descriptions(api: &GitHubApi, addon: &mut Addon) {
    let base = format!("src/main/java/{}", package_dir(&addon.entrypoint));
    let id = addon.repo.id.clone();
    let mut found: Vec<(String, String)> = Vec::new();

    for kind in [FeatureKind::Module, FeatureKind::Command, FeatureKind::HudElement] {
        let directories = addon.custom.feature_directories.for_kind(kind);
        if directories.is_empty() {
            continue;
        }

        for name in addon.features.list(kind) {
            let class_name = name.replace(' ', "");
            for directory in directories {
                let path = format!("{base}/{directory}/{class_name}.java");
                let source = match api.raw(&id, &addon.default_branch, &path).await {
                    Ok(Some(source)) => source,
                    Ok(None) => continue,
                    Err(e) => {
                        debug!(repo = %id, path = %path, error = %e, "Failed to fetch feature source");
                        continue;
                    }
                };

                if let Some(description) = extract_description(kind, &class_name, &source) {
                    found.push((name.clone(), description));
                    break;
                }
            }
        }
    }

    debug!(repo = %id, count = found.len(), "Feature descriptions fetched");
    for (name, description) in found {
        addon.features.set_description(name, description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addonscan_core::{Features, RepoInfo};
    use crate::test_support::{FakeTransport, raw};

    const MODULE_SOURCE: &str = r#"
        public class AutoTotem extends Module {
            public AutoTotem() {
                super(Categories.Combat, "auto-totem", "Keeps a totem in your offhand.");
            }
        }
    "#;

    #[test]
    fn test_package_dir() {
        assert_eq!(package_dir("com/example/addon/Addon"), "com/example/addon");
        assert_eq!(package_dir("Addon"), "Addon");
    }

    #[test]
    fn test_module_description() {
        assert_eq!(
            extract_description(FeatureKind::Module, "AutoTotem", MODULE_SOURCE).as_deref(),
            Some("Keeps a totem in your offhand.")
        );
    }

    #[test]
    fn test_command_and_hud_descriptions() {
        let command = r#"public class Ping extends Command { public Ping() { super("ping", "Shows latency."); } }"#;
        assert_eq!(
            extract_description(FeatureKind::Command, "Ping", command).as_deref(),
            Some("Shows latency.")
        );

        let hud = r#"public class Radar extends HudElement {
            public static final HudElementInfo<Radar> INFO = new HudElementInfo<>(Addon.HUD_GROUP, "radar", "Nearby players.", Radar::new);

            public Radar() { super(INFO); }
        }"#;
        assert_eq!(
            extract_description(FeatureKind::HudElement, "Radar", hud).as_deref(),
            Some("Nearby players.")
        );
    }

    #[test]
    fn test_wrong_class_rejected() {
        assert_eq!(extract_description(FeatureKind::Module, "Other", MODULE_SOURCE), None);
        assert_eq!(extract_description(FeatureKind::Command, "AutoTotem", MODULE_SOURCE), None);
        assert_eq!(extract_description(FeatureKind::CustomScreen, "AutoTotem", MODULE_SOURCE), None);
    }

    #[tokio::test]
    async fn test_fetch_searches_directories_in_order() {
        let mut features = Features::new();
        features.push(FeatureKind::Module, "Auto Totem");
        features.push(FeatureKind::Module, "Missing");

        let mut addon = Addon {
            features,
            repo: RepoInfo {
                id: "a/b".to_string(),
                ..RepoInfo::default()
            },
            default_branch: "main".to_string(),
            entrypoint: "com/x/Addon".to_string(),
            ..Addon::default()
        };
        addon.custom.feature_directories.modules =
            vec!["modules".to_string(), "modules/combat".to_string()];

        let (fake, api) = FakeTransport::new()
            .with_body(
                raw("a/b", "main", "src/main/java/com/x/modules/combat/AutoTotem.java"),
                MODULE_SOURCE,
            )
            .into_api();

        fetch_descriptions(&api, &mut addon).await;

        assert_eq!(
            addon.features.description("Auto Totem"),
            Some("Keeps a totem in your offhand.")
        );
        assert_eq!(addon.features.description("Missing"), None);
        assert_eq!(fake.fetched().len(), 4);
    }
}

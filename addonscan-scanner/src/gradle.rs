//! Minecraft version resolution from build files.
//!
//! Sources are tried in order until one yields a `1.N[.M]` value:
//! the version catalog in its two usual places, `gradle.properties`, then the
//! Groovy and Kotlin build scripts. Assignments collected from
//! `gradle.properties` stay visible to the build scripts, since that is where
//! their `${...}` placeholders usually point.

use std::collections::HashMap;
use std::sync::LazyLock;

use addonscan_core::version::is_mc_version;
use addonscan_fetch::GitHubApi;
use regex::{Captures, Regex};
use tracing::{debug, warn};

/// Files consulted, in order.
pub const VERSION_SOURCES: [&str; 5] = [
    "gradle/libs.versions.toml",
    "libs.versions.toml",
    "gradle.properties",
    "build.gradle",
    "build.gradle.kts",
];

/// Placeholder chains deeper than this are left unresolved.
const MAX_SUBSTITUTION_ROUNDS: usize = 8;

static TOML_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"minecraft\s*=\s*["']([^"\\]+)["']"#).expect("Invalid regex"));

/// Keys must start at a word boundary: `mod_minecraft_version` is another mod's
/// setting.
static KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(?:minecraft_version|minecraftVersion)\s*=\s*(?:"([^"\n]*)"|'([^'\n]*)'|([^"'\s]+))"#,
    )
    .expect("Invalid regex")
});

static DEPENDENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)minecraft\s*\(?\s*['"]com\.mojang:minecraft:(.*)"#).expect("Invalid regex")
});

static ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(?:val|var|def)\s+)?([A-Za-z_][\w.\-]*)\s*(?::\s*[A-Za-z_][\w<>?]*\s*)?=\s*(.*?)\s*$",
    )
    .expect("Invalid regex")
});

static BRACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*\{([^}]+)\}").expect("Invalid regex"));

static SIMPLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([a-zA-Z_][a-zA-Z0-9_]*)").expect("Invalid regex"));

static PROPERTIES_INDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^properties\[["']([^"'\\]+)["']\]$"#).expect("Invalid regex")
});

static PROJECT_PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^project\.property\s*\(\s*["']([^"']+)["']\s*\)$"#).expect("Invalid regex")
});

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_.]*$").expect("Invalid regex"));

/// Assignments visible to placeholder substitution.
pub type Lookup = HashMap<String, String>;

// ============================================================================
// Single File
// ============================================================================

/// Resolves the version from one file's content.
///
/// `carried` holds assignments from earlier files. Returns the accepted
/// version, if any, and the lookup table later files should see.
pub fn resolve_from(content: &str, carried: &Lookup) -> (Option<String>, Lookup) {
    if content.contains("[versions]") {
        let version = TOML_RE
            .captures(content)
            .map(|caps| caps[1].trim().to_string())
            .filter(|v| is_mc_version(v));
        return (version, carried.clone());
    }

    let mut lookup = carried.clone();
    lookup.extend(collect_assignments(content));

    let raw = KEY_RE
        .captures(content)
        .and_then(|caps| caps.get(1).or(caps.get(2)).or(caps.get(3)))
        .map(|m| m.as_str().to_string())
        .or_else(|| dependency_version(content));

    let version = raw
        .map(|raw| substitute(&raw, &lookup))
        .map(|v| unquote(v.trim()).to_string())
        .filter(|v| is_mc_version(v));

    (version, lookup)
}

/// Collects `key = value` lines, unquoting quoted values and cutting bare
/// ones at the first whitespace.
pub fn collect_assignments(content: &str) -> Lookup {
    content
        .lines()
        .filter_map(|line| ASSIGNMENT_RE.captures(line))
        .filter_map(|caps| {
            let key = caps[1].to_string();
            let value = caps[2].trim();
            let value = if let Some(quoted) = quoted_value(value) {
                quoted.to_string()
            } else {
                value.split_whitespace().next()?.to_string()
            };
            Some((key, value))
        })
        .collect()
}

fn quoted_value(value: &str) -> Option<&str> {
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &value[1..];
    rest.find(quote).map(|end| &rest[..end])
}

fn unquote(value: &str) -> &str {
    value.trim_matches(|c| c == '"' || c == '\'')
}

/// `minecraft "com.mojang:minecraft:<version>"`, cut at the closing quote.
fn dependency_version(content: &str) -> Option<String> {
    let rest = DEPENDENCY_RE.captures(content)?.get(1)?.as_str();
    let end = rest.rfind('"').or_else(|| rest.rfind('\''))?;
    Some(rest[..end].to_string())
}

// ============================================================================
// Substitution
// ============================================================================

/// Replaces `${...}` and `$name` placeholders until nothing changes.
///
/// Unknown names are left in place.
pub fn substitute(value: &str, lookup: &Lookup) -> String {
    let mut current = value.to_string();
    for _ in 0..MAX_SUBSTITUTION_ROUNDS {
        let braced = BRACE_RE.replace_all(&current, |caps: &Captures| {
            resolve_expression(&caps[1], lookup).unwrap_or_else(|| caps[0].to_string())
        });
        let next = SIMPLE_RE
            .replace_all(&braced, |caps: &Captures| {
                lookup
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();

        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Unwraps `properties["x"]`, `project.property("x")`, `project.x`, and
/// `x.toString()` down to a key and looks it up.
fn resolve_expression(expression: &str, lookup: &Lookup) -> Option<String> {
    let expr = expression.trim();
    let expr = expr.strip_suffix(".toString()").unwrap_or(expr);
    let expr = expr.strip_suffix(" as String").unwrap_or(expr).trim();

    let key = if let Some(caps) = PROPERTIES_INDEX_RE.captures(expr) {
        caps.get(1)?.as_str()
    } else if let Some(caps) = PROJECT_PROPERTY_RE.captures(expr) {
        caps.get(1)?.as_str()
    } else if let Some(name) = expr.strip_prefix("project.") {
        name
    } else if IDENTIFIER_RE.is_match(expr) {
        expr
    } else {
        return None;
    };

    lookup.get(key).cloned()
}

// ============================================================================
// Fetching
// ============================================================================

/// Walks [`VERSION_SOURCES`] and returns the first accepted version.
///
/// Missing files are skipped. A failed fetch is logged and treated the same
/// way. Returns an empty string if no file yields a version.
pub async fn resolve_mc_version(api: &GitHubApi, id: &str, branch: &str) -> String {
    let mut lookup = Lookup::new();

    for source in VERSION_SOURCES {
        let content = match api.raw(id, branch, source).await {
            Ok(Some(content)) => content,
            Ok(None) => continue,
            Err(e) => {
                warn!(repo = %id, file = source, error = %e, "Failed to fetch build file");
                continue;
            }
        };

        let (version, carried) = resolve_from(&content, &lookup);
        if let Some(version) = version {
            debug!(repo = %id, file = source, version = %version, "Minecraft version resolved");
            return version;
        }
        lookup = carried;
    }

    debug!(repo = %id, "No Minecraft version found");
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeTransport, Reply, raw};

    fn resolve(content: &str) -> Option<String> {
        resolve_from(content, &Lookup::new()).0
    }

    #[test]
    fn test_property_placeholder() {
        assert_eq!(
            resolve("property.minecraft_version=${mc}\nmc=1.20.4").as_deref(),
            Some("1.20.4")
        );
    }

    #[test]
    fn test_toml_direct_match() {
        let toml = "[versions]\nminecraft = \"1.21.1\"\nyarn = \"1.21.1+build.3\"\n";
        assert_eq!(resolve(toml).as_deref(), Some("1.21.1"));
    }

    #[test]
    fn test_toml_skips_substitution() {
        let toml = "[versions]\nminecraft = \"${mc}\"\n";
        let mut carried = Lookup::new();
        carried.insert("mc".to_string(), "1.20.1".to_string());
        assert_eq!(resolve_from(toml, &carried).0, None);
    }

    #[test]
    fn test_key_spellings_and_quotes() {
        assert_eq!(resolve("minecraft_version=1.20.1").as_deref(), Some("1.20.1"));
        assert_eq!(resolve("minecraftVersion = \"1.19.4\"").as_deref(), Some("1.19.4"));
        assert_eq!(resolve("def minecraft_version = '1.18.2'").as_deref(), Some("1.18.2"));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert_eq!(resolve("minecraft_version=1.21-pre1"), None);
        assert_eq!(resolve("minecraft_version=${unknown}"), None);
        assert_eq!(resolve("yarn_mappings=1.20.1+build.1"), None);
    }

    #[test]
    fn test_dependency_fallback_with_project_property() {
        let gradle = r#"
            dependencies {
                minecraft "com.mojang:minecraft:${project.minecraft_version}"
            }
        "#;
        let mut carried = Lookup::new();
        carried.insert("minecraft_version".to_string(), "1.20.6".to_string());
        assert_eq!(resolve_from(gradle, &carried).0.as_deref(), Some("1.20.6"));
    }

    #[test]
    fn test_kotlin_dependency_forms() {
        let kts = r#"
            val mc: String by project
            dependencies {
                minecraft("com.mojang:minecraft:${properties["minecraft_version"] as String}")
            }
        "#;
        let mut carried = Lookup::new();
        carried.insert("minecraft_version".to_string(), "1.21.4".to_string());
        assert_eq!(resolve_from(kts, &carried).0.as_deref(), Some("1.21.4"));
    }

    #[test]
    fn test_substitution_chains() {
        let mut lookup = Lookup::new();
        lookup.insert("a".to_string(), "$b".to_string());
        lookup.insert("b".to_string(), "${c}".to_string());
        lookup.insert("c".to_string(), "1.20.2".to_string());
        assert_eq!(substitute("${a}", &lookup), "1.20.2");
        assert_eq!(
            substitute("${project.property(\"c\")}", &lookup),
            "1.20.2"
        );
        assert_eq!(substitute("${c.toString()}", &lookup), "1.20.2");
        assert_eq!(substitute("$missing", &lookup), "$missing");
    }

    #[test]
    fn test_self_reference_terminates() {
        let mut lookup = Lookup::new();
        lookup.insert("x".to_string(), "${x}".to_string());
        assert_eq!(substitute("${x}", &lookup), "${x}");
    }

    #[test]
    fn test_assignments() {
        let lookup = collect_assignments(
            "mc=1.20.4\nloader_version = 0.15.0 # comment\nval yarn: String = \"build.1\"\n",
        );
        assert_eq!(lookup["mc"], "1.20.4");
        assert_eq!(lookup["loader_version"], "0.15.0");
        assert_eq!(lookup["yarn"], "build.1");
    }

    #[tokio::test]
    async fn test_properties_carry_into_build_script() {
        let (fake, api) = FakeTransport::new()
            .with_body(raw("a/b", "main", "gradle.properties"), "mc_ver=1.20.4\n")
            .with_body(
                raw("a/b", "main", "build.gradle"),
                "minecraft \"com.mojang:minecraft:${project.mc_ver}\"",
            )
            .into_api();

        assert_eq!(resolve_mc_version(&api, "a/b", "main").await, "1.20.4");
        assert_eq!(fake.fetched().len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_error_advances() {
        let (_, api) = FakeTransport::new()
            .with_replies(raw("a/b", "main", "gradle/libs.versions.toml"), vec![Reply::Timeout])
            .with_body(raw("a/b", "main", "libs.versions.toml"), "[versions]\nminecraft = '1.21'\n")
            .into_api();

        assert_eq!(resolve_mc_version(&api, "a/b", "main").await, "1.21");
    }

    #[tokio::test]
    async fn test_nothing_found_is_empty() {
        let (fake, api) = FakeTransport::new().into_api();
        assert_eq!(resolve_mc_version(&api, "a/b", "main").await, "");
        assert_eq!(fake.fetched().len(), VERSION_SOURCES.len());
    }
}

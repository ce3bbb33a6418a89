//! Feature extraction from an addon's entrypoint source.
//!
//! This is a regex scan over comment-stripped Java, not a parser. It knows
//! the registration idioms Meteor addons use in practice:
//!
//! - `Modules.get().add(new Foo())`, also through `Systems.get(Modules.class)`
//!   or a local alias of either, and `Systems.add(new Foo())`
//! - `Commands.add(new Foo())`
//! - `Hud.get().register(Foo.INFO)`, also through `Systems.get(Hud.class)` or
//!   an alias
//! - `Tabs.add(new Foo())` and `Tabs.get().add(new Foo())` for custom screens
//! - `Foo foo = new Foo(); ... Modules.get().add(foo)`, checked in two phases
//!   because the regex engine has no backreferences
//!
//! Class names are split at camel-case boundaries, so `AutoTotem` is listed
//! as `Auto Totem`.

use std::sync::LazyLock;

use addonscan_core::{FeatureKind, Features};
use addonscan_fetch::GitHubApi;
use regex::Regex;
use tracing::debug;

use crate::error::ScanError;

/// Receiver of a registration call: `Name.get()`, `Systems.get(Name.class)`,
/// or a bare identifier.
const RECEIVER: &str = r"((?:[A-Za-z_]\w*\s*\.\s*get\(\s*(?:[A-Za-z_]\w*\.class)?\s*\)|[A-Za-z_]\w*))";

static ADD_NEW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{RECEIVER}\s*\.\s*add\(\s*new\s+([A-Z][A-Za-z0-9_]*)\s*\(.*?\)\s*\)"
    ))
    .expect("Invalid regex")
});

static REGISTER_INFO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{RECEIVER}\s*\.\s*register\(\s*([A-Z][A-Za-z0-9_]*)\s*\.\s*INFO\s*\)"
    ))
    .expect("Invalid regex")
});

static ADD_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{RECEIVER}\s*\.\s*add\(\s*([A-Za-z_]\w*)\s*\)")).expect("Invalid regex")
});

static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][A-Za-z0-9_]*)\s+([A-Za-z_]\w*)\s*=\s*new\s+([A-Z][A-Za-z0-9_]*)\s*\(.*?\)\s*;")
        .expect("Invalid regex")
});

static MODULES_ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bModules\s+(\w+)\s*=\s*(?:Modules\.get\(\)|Systems\.get\(Modules\.class\))\s*;")
        .expect("Invalid regex")
});

static HUD_ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bHud\s+(\w+)\s*=\s*(?:Hud\.get\(\)|Systems\.get\(Hud\.class\))\s*;")
        .expect("Invalid regex")
});

static SYSTEMS_ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bSystems\s+(\w+)\s*=\s*Systems\.get\(\)\s*;").expect("Invalid regex")
});

static TABS_ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bTabs\s+(\w+)\s*=\s*Tabs\.get\(\)\s*;").expect("Invalid regex")
});

static CAMEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("Invalid regex"));

// ============================================================================
// Aliases
// ============================================================================

/// Local variables bound to the registries.
#[derive(Debug, Default)]
struct Aliases {
    modules: Option<String>,
    hud: Option<String>,
    systems: Option<String>,
    tabs: Option<String>,
}

impl Aliases {
    fn detect(source: &str) -> Self {
        Self {
            modules: first_binding(&MODULES_ALIAS_RE, source),
            hud: first_binding(&HUD_ALIAS_RE, source),
            systems: first_binding(&SYSTEMS_ALIAS_RE, source),
            tabs: first_binding(&TABS_ALIAS_RE, source),
        }
    }

    fn is(alias: Option<&String>, receiver: &str) -> bool {
        alias.is_some_and(|a| a == receiver)
    }

    /// Kind registered by `receiver.add(new X())`.
    fn add_new_kind(&self, receiver: &str) -> Option<FeatureKind> {
        match receiver {
            "Modules.get()" | "Systems.get(Modules.class)" | "Systems" => Some(FeatureKind::Module),
            "Commands" | "Commands.get()" => Some(FeatureKind::Command),
            "Tabs" | "Tabs.get()" => Some(FeatureKind::CustomScreen),
            r if Self::is(self.modules.as_ref(), r) || Self::is(self.systems.as_ref(), r) => {
                Some(FeatureKind::Module)
            }
            r if Self::is(self.tabs.as_ref(), r) => Some(FeatureKind::CustomScreen),
            _ => None,
        }
    }

    /// Kind registered by `receiver.add(variable)`.
    fn add_var_kind(&self, receiver: &str) -> Option<FeatureKind> {
        match receiver {
            "Modules.get()" | "Systems.get(Modules.class)" | "Systems" => Some(FeatureKind::Module),
            "Commands" => Some(FeatureKind::Command),
            r if Self::is(self.modules.as_ref(), r) || Self::is(self.systems.as_ref(), r) => {
                Some(FeatureKind::Module)
            }
            _ => None,
        }
    }

    fn is_hud(&self, receiver: &str) -> bool {
        matches!(receiver, "Hud.get()" | "Systems.get(Hud.class)")
            || Self::is(self.hud.as_ref(), receiver)
    }
}

fn first_binding(re: &Regex, source: &str) -> Option<String> {
    re.captures(source).map(|c| c[1].to_string())
}

fn squash(receiver: &str) -> String {
    receiver.chars().filter(|c| !c.is_whitespace()).collect()
}

// ============================================================================
// Extraction
// ============================================================================

/// Extracts registered features from Java source text.
pub fn extract_features(source: &str) -> Features {
    let code = strip_comments(source);
    let aliases = Aliases::detect(&code);
    let mut found: Vec<(usize, FeatureKind, String)> = Vec::new();

    for caps in ADD_NEW_RE.captures_iter(&code) {
        if let Some(kind) = aliases.add_new_kind(&squash(&caps[1])) {
            found.push((caps.get(0).map_or(0, |m| m.start()), kind, caps[2].to_string()));
        }
    }

    for caps in REGISTER_INFO_RE.captures_iter(&code) {
        if aliases.is_hud(&squash(&caps[1])) {
            let start = caps.get(0).map_or(0, |m| m.start());
            found.push((start, FeatureKind::HudElement, caps[2].to_string()));
        }
    }

    found.extend(two_statement_registrations(&code, &aliases));

    found.sort_by_key(|(pos, _, _)| *pos);

    let mut features = Features::new();
    for (_, kind, class) in found {
        features.push(kind, split_camel_case(&class));
    }
    features
}

/// `Type var = new Type(...);` followed later by `registry.add(var);`.
///
/// Declarations whose declared and constructed types differ are discarded,
/// and a registration only counts if the variable was declared before it.
fn two_statement_registrations(code: &str, aliases: &Aliases) -> Vec<(usize, FeatureKind, String)> {
    let declarations: Vec<(usize, &str, &str)> = DECLARATION_RE
        .captures_iter(code)
        .filter_map(|caps| {
            let (declared, var, constructed) = (caps.get(1)?, caps.get(2)?, caps.get(3)?);
            (declared.as_str() == constructed.as_str())
                .then(|| (caps.get(0).map_or(0, |m| m.end()), var.as_str(), declared.as_str()))
        })
        .collect();

    let mut found = Vec::new();
    for caps in ADD_VAR_RE.captures_iter(code) {
        let Some(kind) = aliases.add_var_kind(&squash(&caps[1])) else {
            continue;
        };
        let start = caps.get(0).map_or(0, |m| m.start());
        let var = &caps[2];
        let declared = declarations
            .iter()
            .rev()
            .find(|(end, name, _)| *end <= start && *name == var);
        if let Some((_, _, class)) = declared {
            found.push((start, kind, (*class).to_string()));
        }
    }
    found
}

/// `MyCoolModule` -> `My Cool Module`.
pub fn split_camel_case(name: &str) -> String {
    CAMEL_RE.replace_all(name, "$1 $2").into_owned()
}

// ============================================================================
// Comment Stripping
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum Lexer {
    Code,
    LineComment,
    BlockComment,
    Str,
    Char,
}

/// Removes `//` and `/* */` comments, keeping newlines and string literals.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut state = Lexer::Code;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            Lexer::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = Lexer::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push(' ');
                    state = Lexer::BlockComment;
                }
                '"' => {
                    out.push(c);
                    state = Lexer::Str;
                }
                '\'' => {
                    out.push(c);
                    state = Lexer::Char;
                }
                _ => out.push(c),
            },
            Lexer::LineComment => {
                if c == '\n' {
                    out.push(c);
                    state = Lexer::Code;
                }
            }
            Lexer::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = Lexer::Code;
                } else if c == '\n' {
                    out.push(c);
                }
            }
            Lexer::Str | Lexer::Char => {
                out.push(c);
                let quote = if state == Lexer::Str { '"' } else { '\'' };
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == quote || c == '\n' {
                    state = Lexer::Code;
                }
            }
        }
    }

    out
}

// ============================================================================
// Fetching
// ============================================================================

/// Fetches the entrypoint source and extracts its features.
///
/// `entrypoint` is a slash-separated class path such as
/// `com/example/Addon`. A missing source file yields no features.
pub async fn fetch_features(
    api: &GitHubApi,
    id: &str,
    branch: &str,
    entrypoint: &str,
) -> Result<Features, ScanError> {
    let path = format!("src/main/java/{entrypoint}.java");
    let Some(source) = api.raw(id, branch, &path).await? else {
        debug!(repo = %id, path = %path, "Entrypoint source not found");
        return Ok(Features::new());
    };

    let features = extract_features(&source);
    debug!(repo = %id, count = features.count(), "Features extracted");
    Ok(features)
}

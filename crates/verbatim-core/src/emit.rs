//! Rendering of one group into a generated source file.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use crate::group::Group;
use crate::prepare::PreparedMember;
use crate::types::{Diagnostic, Label, Severity, Suggestion};

/// Diagnostic code for two members with the same constant name.
pub const DUPLICATE_MEMBER_CODE: &str = "VB001";
/// Diagnostic name for two members with the same constant name.
pub const DUPLICATE_MEMBER: &str = "duplicate-member";

/// Lints silenced on the generated impl block.
const ALLOWED_LINTS: &str = "clippy::all, clippy::pedantic, non_upper_case_globals, dead_code";

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// The group's target string.
    pub key: String,
    /// File name handed to the sink (e.g., `app.resources.Strings.g.rs`).
    pub output_id: String,
    /// File contents.
    pub text: String,
    /// Constant names, in member order.
    pub members: Vec<String>,
}

/// Renders groups as inherent impl blocks of string constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct Emitter;

impl Emitter {
    /// Creates an emitter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders a group and reports constant names used more than once.
    ///
    /// Colliding members are all emitted; the diagnostics say which ones
    /// need a distinct `field_name`.
    #[must_use]
    pub fn emit(&self, group: &Group) -> (Artifact, Vec<Diagnostic>) {
        let mut text = String::new();
        let _ = writeln!(text, "// <auto-generated/>");
        let _ = writeln!(
            text,
            "// Generated by verbatim for `{}`. Do not edit.",
            group.key()
        );
        let _ = writeln!(text);
        let _ = writeln!(text, "#[allow({ALLOWED_LINTS})]");
        let _ = writeln!(text, "impl {} {{", group.target.type_path());
        for member in &group.members {
            let _ = writeln!(
                text,
                "    pub(crate) const {}: &'static str = {};",
                member.field_name,
                fence(&member.text)
            );
        }
        let _ = writeln!(text, "}}");

        let artifact = Artifact {
            key: group.key().to_string(),
            output_id: output_id(group.key()),
            text,
            members: group.members.iter().map(|m| m.field_name.clone()).collect(),
        };
        (artifact, duplicates(group))
    }
}

fn duplicates(group: &Group) -> Vec<Diagnostic> {
    let mut first_seen = HashMap::new();
    let mut diagnostics = Vec::new();
    for member in &group.members {
        let Some(first) = first_seen.get(member.field_name.as_str()) else {
            first_seen.insert(member.field_name.as_str(), member);
            continue;
        };
        diagnostics.push(
            Diagnostic::new(
                DUPLICATE_MEMBER_CODE,
                DUPLICATE_MEMBER,
                Severity::Error,
                member.location.clone(),
                format!(
                    "constant `{}` is generated more than once for `{}`",
                    member.field_name,
                    group.key()
                ),
            )
            .with_label(Label::new(
                first.location.clone(),
                format!("`{}` first generated for `{}`", member.field_name, first.symbol),
            ))
            .with_suggestion(Suggestion::new(
                "set a distinct `field_name` on one of the markers",
            )),
        );
    }
    diagnostics
}

/// Reports constants generated more than once for one type by groups whose
/// keys spell it differently, such as `a::B` and `crate::a::B`.
///
/// Such groups are emitted separately, so [`Emitter::emit`] cannot see the
/// collision; duplicates within a single group are left to it.
#[must_use]
pub fn aliased_duplicates<'a>(groups: impl IntoIterator<Item = &'a Group>) -> Vec<Diagnostic> {
    let mut by_type: BTreeMap<String, Vec<&Group>> = BTreeMap::new();
    for group in groups {
        by_type.entry(group.target.type_path()).or_default().push(group);
    }

    let mut diagnostics = Vec::new();
    for (type_path, aliases) in by_type.into_iter().filter(|(_, g)| g.len() > 1) {
        let mut first_seen: HashMap<&str, (&str, &PreparedMember)> = HashMap::new();
        for group in aliases {
            for member in &group.members {
                let Some((first_key, first)) = first_seen.get(member.field_name.as_str()) else {
                    first_seen.insert(member.field_name.as_str(), (group.key(), member));
                    continue;
                };
                if *first_key == group.key() {
                    continue;
                }
                diagnostics.push(
                    Diagnostic::new(
                        DUPLICATE_MEMBER_CODE,
                        DUPLICATE_MEMBER,
                        Severity::Error,
                        member.location.clone(),
                        format!(
                            "constant `{}` is generated for `{type_path}` under both `{first_key}` and `{}`",
                            member.field_name,
                            group.key()
                        ),
                    )
                    .with_label(Label::new(
                        first.location.clone(),
                        format!("`{}` first generated for `{}`", member.field_name, first.symbol),
                    ))
                    .with_suggestion(Suggestion::new(
                        "spell the target the same way in every marker, or set a distinct `field_name`",
                    )),
                );
            }
        }
    }
    diagnostics
}

/// Number of `#` needed to fence `text` as a raw string literal.
///
/// One more than the longest run of `#` that follows a `"` in the text, so
/// the closing delimiter cannot occur inside it.
#[must_use]
pub fn fence_width(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut longest = 0;
    for (i, _) in bytes.iter().enumerate().filter(|(_, b)| **b == b'"') {
        let run = bytes[i + 1..].iter().take_while(|b| **b == b'#').count();
        longest = longest.max(run);
    }
    longest + 1
}

/// Wraps `text` in a raw string literal that reproduces it exactly.
#[must_use]
pub fn fence(text: &str) -> String {
    let hashes = "#".repeat(fence_width(text));
    format!("r{hashes}\"{text}\"{hashes}")
}

/// Derives a file name from a group key.
///
/// `::` becomes `.`, bytes outside `[A-Za-z0-9_]` become `-xx`, and `.g.rs`
/// is appended, so distinct keys never share a file name.
#[must_use]
pub fn output_id(key: &str) -> String {
    let bytes = key.as_bytes();
    let mut id = String::with_capacity(key.len() + 5);
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"::") {
            id.push('.');
            i += 2;
            continue;
        }
        let b = bytes[i];
        if b.is_ascii_alphanumeric() || b == b'_' {
            id.push(char::from(b));
        } else {
            let _ = write!(id, "-{b:02x}");
        }
        i += 1;
    }
    id.push_str(".g.rs");
    id
}

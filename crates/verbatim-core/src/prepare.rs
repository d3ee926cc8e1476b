//! Per-declaration preparation: marker arguments, stripping, qualification,
//! reconstruction and rendering.
//!
//! [`prepare`] is a pure function of the declaration, the symbol table and
//! the marker configuration, so it can run for every declaration
//! independently.

use serde::{Serialize, Serializer};
use syn::{Ident, Item, Path};

use crate::config::MarkerConfig;
use crate::declaration::Declaration;
use crate::marker::{
    FieldNameSpec, MarkerArgs, MarkerError, MarkerMatcher, QualificationTarget, TargetError,
};
use crate::qualify::{compact, qualify, qualify_item, Fragments};
use crate::scope::{enclose, reconstruct, render, DeclItem, ScopeError};
use crate::strip::{find_marker, strip_marker};
use crate::symbols::{CanonicalPath, ResolveError, SymbolTable};
use crate::types::{Diagnostic, Location, Severity, Suggestion};

/// Diagnostic code for a field name that is not an identifier.
pub const INVALID_FIELD_NAME_CODE: &str = "VB002";
/// Diagnostic name for a field name that is not an identifier.
pub const INVALID_FIELD_NAME: &str = "invalid-field-name";

/// One declaration ready to be emitted as a constant.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedMember {
    /// The target string exactly as written; the grouping key.
    pub key: String,
    /// The parsed target.
    #[serde(skip)]
    pub target: QualificationTarget,
    /// Name of the generated constant.
    pub field_name: String,
    /// Canonical name of the declared item (e.g., `crate::my::ns::Thing`).
    pub symbol: String,
    /// Rendered standalone source of the declaration.
    pub text: String,
    /// Where the declaration was found.
    pub location: Location,
}

/// Why a declaration produced no member.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    /// The item kind cannot carry a marker.
    #[error("item kind cannot carry a marker")]
    UnsupportedItem,

    /// No attribute resolved to the marker.
    #[error("no marker attribute")]
    NoMarker,

    /// The marker arguments are unusable.
    #[error(transparent)]
    Marker(#[from] MarkerError),

    /// The target string is malformed.
    #[error(transparent)]
    Target(#[from] TargetError),

    /// A path in the declaration does not resolve.
    #[error(transparent)]
    Unresolved(#[from] ResolveError),

    /// The declaration cannot be placed into its scopes.
    #[error(transparent)]
    Scope(#[from] ScopeError),

    /// The field name is not a Rust identifier.
    #[error("field name `{0}` is not a valid identifier")]
    InvalidFieldName(String),
}

/// A declaration left out of the pass.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDeclaration {
    /// Where the declaration was found.
    pub location: Location,
    /// Declared name.
    pub name: String,
    /// Why it was skipped.
    #[serde(serialize_with = "serialize_display")]
    pub reason: SkipReason,
}

impl SkippedDeclaration {
    /// Records a skipped declaration.
    #[must_use]
    pub fn new(decl: &Declaration, reason: SkipReason) -> Self {
        Self {
            location: decl.location.clone(),
            name: decl
                .item
                .ident()
                .map(ToString::to_string)
                .unwrap_or_default(),
            reason,
        }
    }

    /// Returns the diagnostic this skip reports, if any. Only invalid field
    /// names are surfaced; every other reason is silent.
    #[must_use]
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        let SkipReason::InvalidFieldName(field) = &self.reason else {
            return None;
        };
        Some(
            Diagnostic::new(
                INVALID_FIELD_NAME_CODE,
                INVALID_FIELD_NAME,
                Severity::Warning,
                self.location.clone(),
                format!("`{}` would be embedded as `{field}`, which is not an identifier", self.name),
            )
            .with_suggestion(Suggestion::new(
                "use a `field_name` that expands to a valid Rust identifier",
            )),
        )
    }
}

fn serialize_display<S: Serializer>(reason: &SkipReason, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(reason)
}

/// Turns one annotated declaration into a member of its target's impl block.
///
/// # Errors
///
/// Returns the reason the declaration has to be skipped.
pub fn prepare(
    decl: &Declaration,
    table: &SymbolTable,
    marker: &MarkerConfig,
) -> Result<PreparedMember, SkipReason> {
    if !decl.item.is_supported() {
        return Err(SkipReason::UnsupportedItem);
    }
    let module = decl.module_path();
    let matcher = MarkerMatcher::from_config(marker);
    let is_marker = |path: &Path| matcher.is_marker(table, &module, path);

    let meta = find_marker(decl.item.attrs(), is_marker).ok_or(SkipReason::NoMarker)?;
    let args = MarkerArgs::from_meta(&meta)?;
    let target = QualificationTarget::parse(&args.target)?;

    let mut item = decl.item.clone();
    if let Some(attrs) = item.attrs_mut() {
        *attrs = strip_marker(attrs, is_marker);
    }
    let ident = item.ident().cloned().ok_or(SkipReason::UnsupportedItem)?;
    let generics = item.generics().cloned().unwrap_or_default();
    let associated = !matches!(item, DeclItem::Item(_));

    let mut unit = enclose(item, &decl.scopes)?;
    qualify_item(&mut unit, table, &module)?;

    let symbol = qualify(&owner(&unit, associated, &module), &ident, &generics);
    let spec = FieldNameSpec::from_option(args.field_name.as_deref(), &marker.default_field_name);
    let field_name = spec.resolve(&Fragments::from_display(&symbol));
    if syn::parse_str::<Ident>(&field_name).is_err() {
        return Err(SkipReason::InvalidFieldName(field_name));
    }

    let text = render(reconstruct(unit, &decl.scopes));
    Ok(PreparedMember {
        key: args.target,
        target,
        field_name,
        symbol,
        text,
        location: decl.location.clone(),
    })
}

/// Canonical path of whatever directly contains the declaration.
fn owner(unit: &Item, associated: bool, module: &[String]) -> String {
    let module_path = CanonicalPath::in_crate(module.iter().cloned()).to_string();
    match unit {
        Item::Impl(header) if associated => compact(&header.self_ty),
        Item::Trait(header) if associated => qualify(&module_path, &header.ident, &header.generics),
        _ => module_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{ModuleSegment, ScopeDescriptor};
    use std::path::PathBuf;
    use syn::{parse_quote, ItemImpl};

    fn table() -> SymbolTable {
        let root: syn::File = parse_quote! {
            pub mod my;
        };
        let my: syn::File = parse_quote! {
            pub mod ns {
                use verbatim::literal;
                use std::fmt::Display;
                pub struct Thing;
                pub struct Wrapper<T>(pub T);
                pub struct Pair<A, B>(pub A, pub B);
            }
        };
        SymbolTable::builder()
            .extern_crate("verbatim")
            .file(&[], &root)
            .file(&["my".to_string()], &my)
            .build()
    }

    fn scopes() -> Vec<ScopeDescriptor> {
        vec![
            ScopeDescriptor::File(vec![ModuleSegment::new("my", "pub")]),
            ScopeDescriptor::Block(ModuleSegment::new("ns", "pub")),
        ]
    }

    fn decl(item: DeclItem, scopes: Vec<ScopeDescriptor>) -> Declaration {
        Declaration {
            file: PathBuf::from("src/my.rs"),
            location: Location::new(PathBuf::from("src/my.rs"), 3, 5),
            item,
            scopes,
        }
    }

    #[test]
    fn prepares_a_struct() {
        let d = decl(
            DeclItem::Item(parse_quote! {
                #[derive(Clone)]
                #[literal("app::resources::Strings")]
                pub struct Thing;
            }),
            scopes(),
        );
        let member = prepare(&d, &table(), &MarkerConfig::default()).unwrap();
        assert_eq!(member.key, "app::resources::Strings");
        assert_eq!(member.target.namespace(), "app::resources");
        assert_eq!(member.target.class(), "Strings");
        assert_eq!(member.field_name, "Text");
        assert_eq!(member.symbol, "crate::my::ns::Thing");
        assert_eq!(
            member.text,
            "pub mod my {\n    pub mod ns {\n        #[derive(::core::clone::Clone)]\n        pub struct Thing;\n    }\n}"
        );
    }

    #[test]
    fn resolves_field_name_templates() {
        let d = decl(
            DeclItem::Item(parse_quote! {
                #[literal("a::B", field_name = "[Namespace]_[Class]")]
                pub struct Thing;
            }),
            scopes(),
        );
        let member = prepare(&d, &table(), &MarkerConfig::default()).unwrap();
        assert_eq!(member.field_name, "my_ns_Thing");
    }

    #[test]
    fn associated_items_are_named_after_their_type() {
        let mut header: ItemImpl = parse_quote! {
            impl<T: Display> Wrapper<T> {}
        };
        header.items.clear();
        let mut scopes = scopes();
        scopes.push(ScopeDescriptor::Impl(Box::new(header)));
        let d = decl(
            DeclItem::Impl(parse_quote! {
                #[literal("a::B", field_name = "[FullName]")]
                pub fn show(&self) -> String { self.0.to_string() }
            }),
            scopes,
        );
        let member = prepare(&d, &table(), &MarkerConfig::default()).unwrap();
        assert_eq!(member.symbol, "crate::my::ns::Wrapper<T>::show");
        assert_eq!(member.field_name, "my_ns_Wrapper_T__show");
        assert!(member
            .text
            .contains("impl<T: ::std::fmt::Display> crate::my::ns::Wrapper<T> {"));
        assert!(member.text.contains("-> ::std::string::String"));
    }

    #[test]
    fn owners_render_like_their_type() {
        let mut header: ItemImpl = parse_quote! {
            impl<A,B> Pair<A,B> {}
        };
        header.items.clear();
        let mut scopes = scopes();
        scopes.push(ScopeDescriptor::Impl(Box::new(header)));
        let d = decl(
            DeclItem::Impl(parse_quote! {
                #[literal("a::B", field_name = "[FullName]")]
                pub fn first(&self) -> &A { &self.0 }
            }),
            scopes,
        );
        let member = prepare(&d, &table(), &MarkerConfig::default()).unwrap();

        let ident: Ident = parse_quote!(Pair);
        let generics: syn::Generics = parse_quote!(<A, B>);
        let pair = qualify("crate::my::ns", &ident, &generics);
        assert_eq!(member.symbol, format!("{pair}::first"));
        assert_eq!(member.symbol, "crate::my::ns::Pair<A, B>::first");
        assert_eq!(member.field_name, "my_ns_Pair_A__B__first");
    }

    #[test]
    fn malformed_targets_are_skipped() {
        let d = decl(
            DeclItem::Item(parse_quote! {
                #[literal("Foo")]
                pub struct Thing;
            }),
            scopes(),
        );
        let err = prepare(&d, &table(), &MarkerConfig::default()).unwrap_err();
        assert!(matches!(err, SkipReason::Target(TargetError::MissingSeparator(_))));
        assert!(SkippedDeclaration::new(&d, err).diagnostic().is_none());
    }

    #[test]
    fn unresolved_paths_are_skipped() {
        let d = decl(
            DeclItem::Item(parse_quote! {
                #[literal("a::B")]
                pub struct Thing { inner: Missing }
            }),
            scopes(),
        );
        let err = prepare(&d, &table(), &MarkerConfig::default()).unwrap_err();
        assert!(matches!(err, SkipReason::Unresolved(_)));
    }

    #[test]
    fn invalid_field_names_are_reported() {
        let d = decl(
            DeclItem::Item(parse_quote! {
                #[literal("a::B", field_name = "not valid")]
                pub struct Thing;
            }),
            scopes(),
        );
        let err = prepare(&d, &table(), &MarkerConfig::default()).unwrap_err();
        assert_eq!(err, SkipReason::InvalidFieldName("not valid".to_string()));
        let diagnostic = SkippedDeclaration::new(&d, err).diagnostic().unwrap();
        assert_eq!(diagnostic.code, "VB002");
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.location.line, 3);
    }

    #[test]
    fn unmarked_items_have_no_marker() {
        let d = decl(DeclItem::Item(parse_quote!(pub struct Thing;)), scopes());
        assert_eq!(
            prepare(&d, &table(), &MarkerConfig::default()).unwrap_err(),
            SkipReason::NoMarker
        );
    }
}

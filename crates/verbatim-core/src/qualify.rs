//! Path qualification.
//!
//! [`qualify_item`] rewrites every path of a declaration to the canonical,
//! globally rooted form recorded in the [`SymbolTable`], so the rendered text
//! means the same thing wherever it is pasted. Generic parameters, `Self`,
//! local bindings and primitive types are left as written. Macro and
//! attribute-macro paths are rewritten when they name an item of another
//! crate; their token bodies are never touched.
//!
//! The module also renders canonical display names ([`qualify`]) and turns
//! them into identifier fragments for field-name templates ([`Fragments`]).

use proc_macro2::Span;
use quote::ToTokens;
use std::collections::BTreeSet;
use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};
use syn::visit_mut::{self, VisitMut};
use syn::{
    Attribute, ExprPath, ExprStruct, GenericParam, Generics, Ident, ImplItemFn, ImplItemType,
    Item, ItemEnum, ItemFn, ItemImpl, ItemStruct, ItemTrait, ItemType, ItemUnion, Macro, Meta,
    Pat, PatIdent, PatStruct, PatTupleStruct, Path, PathSegment, QSelf, Token, TraitBound,
    TraitItemFn, TraitItemType, TypePath, UseTree,
};

use crate::strip::cfg_attr_parts;
use crate::symbols::{
    is_primitive, Namespace, Resolution, ResolveError, Root, SymbolKind, SymbolTable,
};

/// Rewrites all paths in `item` as seen from `module`.
///
/// # Errors
///
/// Returns the first path that does not resolve. Single-segment value paths
/// are exempt since they may name bindings the table does not track.
pub fn qualify_item(
    item: &mut Item,
    table: &SymbolTable,
    module: &[String],
) -> Result<(), ResolveError> {
    let mut qualifier = Qualifier::new(table, module);
    qualifier.visit_item_mut(item);
    match qualifier.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Renders the canonical name of an item declared under `owner`.
///
/// `owner` is the canonical path of the enclosing module or type, e.g.
/// `crate::my::ns` or `crate::m::Wrapper<T>`. Type and const parameters of
/// the item are appended in angle brackets.
#[must_use]
pub fn qualify(owner: &str, ident: &Ident, generics: &Generics) -> String {
    let params: Vec<&Ident> = generics
        .params
        .iter()
        .filter_map(|param| match param {
            GenericParam::Type(t) => Some(&t.ident),
            GenericParam::Const(c) => Some(&c.ident),
            GenericParam::Lifetime(_) => None,
        })
        .collect();
    let name = if params.is_empty() {
        compact(ident)
    } else {
        compact(&quote::quote!(#ident<#(#params),*>))
    };
    format!("{owner}::{name}")
}

/// Renders tokens as a display name: no spaces around punctuation except
/// one after each comma, e.g. `crate::m::Wrapper<T, U>`.
///
/// Every display name of a type goes through here, so the impl header of
/// `Wrapper<T, U>` and the struct itself render identically.
#[must_use]
pub fn compact(tokens: &impl ToTokens) -> String {
    let text = tokens.to_token_stream().to_string();
    let chars: Vec<char> = text.chars().collect();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = out.chars().last();
            let next = chars[i + 1..].iter().copied().find(|c| *c != ' ');
            if prev == Some(',') || (prev.is_some_and(is_word) && next.is_some_and(is_word)) {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Identifier-safe pieces of a canonical name, substituted into templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragments {
    /// Enclosing segments joined with `_` (e.g., `my_ns`).
    pub namespace: String,
    /// Last segment (e.g., `Thing`).
    pub class: String,
}

impl Fragments {
    /// Splits a canonical display name into fragments.
    ///
    /// The root marker is dropped, the name is split on top-level `::`
    /// and every character outside `[A-Za-z0-9_]` becomes `_`.
    #[must_use]
    pub fn from_display(name: &str) -> Self {
        let trimmed = name
            .strip_prefix("crate::")
            .or_else(|| name.strip_prefix("::"))
            .unwrap_or(name);
        let mut parts: Vec<String> = split_top_level(trimmed)
            .into_iter()
            .map(|p| sanitize(&p))
            .collect();
        let class = parts.pop().unwrap_or_default();
        Self {
            namespace: parts.join("_"),
            class,
        }
    }

    /// Namespace and class joined with `_`, or the class alone at the root.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.class.clone()
        } else {
            format!("{}_{}", self.namespace, self.class)
        }
    }
}

/// Splits on `::` outside of angle brackets.
#[must_use]
pub fn split_top_level(name: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ':' if depth == 0 && chars.peek() == Some(&':') => {
                chars.next();
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current);
    parts
}

/// Replaces every character outside `[A-Za-z0-9_]` with `_`.
#[must_use]
pub fn sanitize(fragment: &str) -> String {
    fragment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Builds an identifier, keeping the `r#` prefix of raw identifiers.
pub(crate) fn make_ident(name: &str, span: Span) -> Ident {
    match name.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, span),
        None => Ident::new(name, span),
    }
}

/// Names a function body introduces.
#[derive(Debug, Default)]
struct Locals {
    /// Parameters and pattern bindings; they shadow single-segment values.
    bindings: BTreeSet<String>,
    /// Items and `use` names declared inside the body; they shadow paths in
    /// every namespace.
    items: BTreeSet<String>,
}

struct Qualifier<'a> {
    table: &'a SymbolTable,
    module: &'a [String],
    generics: Vec<BTreeSet<String>>,
    locals: Vec<Locals>,
    derive_helpers: usize,
    error: Option<ResolveError>,
}

impl<'a> Qualifier<'a> {
    fn new(table: &'a SymbolTable, module: &'a [String]) -> Self {
        Self {
            table,
            module,
            generics: Vec::new(),
            locals: Vec::new(),
            derive_helpers: 0,
            error: None,
        }
    }

    fn is_generic(&self, name: &str) -> bool {
        self.generics.iter().any(|scope| scope.contains(name))
    }

    fn is_binding(&self, name: &str) -> bool {
        self.locals.iter().any(|scope| scope.bindings.contains(name))
    }

    fn is_local_item(&self, name: &str) -> bool {
        self.locals.iter().any(|scope| scope.items.contains(name))
    }

    fn push_generics(&mut self, generics: &Generics) {
        let names = generics
            .params
            .iter()
            .filter_map(|param| match param {
                GenericParam::Type(t) => Some(t.ident.to_string()),
                GenericParam::Const(c) => Some(c.ident.to_string()),
                GenericParam::Lifetime(_) => None,
            })
            .collect();
        self.generics.push(names);
    }

    /// Runs `f` with the generics of an item and the bindings found by
    /// `collect` in scope.
    fn scoped(&mut self, generics: &Generics, locals: Locals, f: impl FnOnce(&mut Self)) {
        self.push_generics(generics);
        self.locals.push(locals);
        f(self);
        self.locals.pop();
        self.generics.pop();
    }

    fn collect_locals(&self, visit: impl FnOnce(&mut LocalCollector<'_>)) -> Locals {
        let mut collector = LocalCollector {
            table: self.table,
            module: self.module,
            locals: Locals::default(),
        };
        visit(&mut collector);
        collector.locals
    }

    fn keeps_verbatim(&self, path: &Path, namespace: Namespace) -> bool {
        let Some(first) = path.segments.first() else {
            return true;
        };
        let name = first.ident.to_string();
        let single = path.segments.len() == 1;
        path.leading_colon.is_some()
            || name == "Self"
            || (name == "self" && single)
            || is_primitive(&name)
            || self.is_generic(&name)
            || self.is_local_item(&name)
            || (single && namespace == Namespace::Value && self.is_binding(&name))
    }

    fn rewrite_path(&mut self, path: &mut Path, namespace: Namespace, strict: bool) {
        if self.error.is_some() || self.keeps_verbatim(path, namespace) {
            return;
        }
        let names: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        match self.table.resolve(self.module, &names, namespace) {
            Ok(resolution) => apply(path, &resolution),
            Err(err) if strict => self.error = Some(err),
            Err(_) => {}
        }
    }

    /// Rewrites a path that may carry a `<T as Trait>` qualifier. Only the
    /// trait part before `qself.position` is resolved.
    fn rewrite_qualified(
        &mut self,
        qself: Option<&mut QSelf>,
        path: &mut Path,
        namespace: Namespace,
        strict: bool,
    ) {
        let Some(qself) = qself else {
            self.rewrite_path(path, namespace, strict);
            return;
        };
        if qself.position == 0 {
            return;
        }

        let mut rest: Vec<PathSegment> =
            std::mem::take(&mut path.segments).into_iter().collect();
        let tail = rest.split_off(qself.position.min(rest.len()));
        let mut prefix = Path {
            leading_colon: path.leading_colon,
            segments: rest.into_iter().collect(),
        };
        self.rewrite_path(&mut prefix, Namespace::Type, true);

        qself.position = prefix.segments.len();
        path.leading_colon = prefix.leading_colon;
        path.segments = prefix.segments;
        path.segments.extend(tail);
    }

    /// Returns the rewritten path if `pat` names a constant, unit struct or
    /// unit variant rather than introducing a binding.
    fn path_pattern(&self, pat: &PatIdent) -> Option<Path> {
        let name = pat.ident.to_string();
        if !is_bare_ident(pat) || self.is_binding(&name) || self.is_local_item(&name) {
            return None;
        }
        let resolution = resolve_pattern(self.table, self.module, &pat.ident)?;
        let mut path = Path::from(pat.ident.clone());
        apply(&mut path, &resolution);
        Some(path)
    }

    /// Rewrites derive lists, the contents of `cfg_attr` and the path of an
    /// attribute macro.
    fn rewrite_meta(&mut self, meta: &mut Meta) {
        match meta {
            Meta::List(list) if list.path.is_ident("derive") => {
                let Ok(mut paths) =
                    list.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)
                else {
                    return;
                };
                for path in &mut paths {
                    self.rewrite_path(path, Namespace::Derive, true);
                }
                list.tokens = paths.to_token_stream();
            }
            Meta::List(list) if list.path.is_ident("cfg_attr") => {
                let Some((predicate, mut metas)) = cfg_attr_parts(list) else {
                    return;
                };
                for nested in &mut metas {
                    self.rewrite_meta(nested);
                }
                list.tokens = quote::quote!(#predicate, #metas);
            }
            Meta::List(list) => self.rewrite_macro_path(&mut list.path, true),
            Meta::Path(path) => self.rewrite_macro_path(path, true),
            Meta::NameValue(nv) => self.rewrite_macro_path(&mut nv.path, true),
        }
    }

    /// Qualifies the path of a macro invocation or attribute macro if it
    /// names an item of another crate.
    ///
    /// Builtin macros and attributes do not resolve and stay as written.
    /// Macros of this crate are scoped textually, so they stay too. Inside
    /// an item with derives, single-segment attributes may be derive
    /// helpers and are left alone.
    fn rewrite_macro_path(&mut self, path: &mut Path, attribute: bool) {
        if self.error.is_some() || path.leading_colon.is_some() {
            return;
        }
        if attribute && self.derive_helpers > 0 && path.segments.len() == 1 {
            return;
        }
        let names: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        if names.first().is_some_and(|name| self.is_local_item(name)) {
            return;
        }
        let Ok(resolution) = self.table.resolve(self.module, &names, Namespace::Macro) else {
            return;
        };
        let canonical = &resolution.symbol.path;
        let rendered_len = canonical.segments().len() + names.len() - resolution.consumed;
        if canonical.root() == Root::Extern && rendered_len > 1 {
            apply(path, &resolution);
        }
    }

    /// Runs `f` with single-segment attributes protected if `derives` is set.
    fn with_derive_helpers(&mut self, derives: bool, f: impl FnOnce(&mut Self)) {
        self.derive_helpers += usize::from(derives);
        f(self);
        self.derive_helpers -= usize::from(derives);
    }
}

fn derives(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| has_derive(&attr.meta))
}

fn has_derive(meta: &Meta) -> bool {
    let Meta::List(list) = meta else {
        return false;
    };
    if list.path.is_ident("derive") {
        return true;
    }
    list.path.is_ident("cfg_attr")
        && cfg_attr_parts(list).is_some_and(|(_, metas)| metas.iter().any(has_derive))
}

/// Replaces the first `consumed` segments with the canonical path. Generic
/// arguments of the last replaced segment move to the new last segment.
fn apply(path: &mut Path, resolution: &Resolution) {
    let span = path
        .segments
        .first()
        .map_or_else(Span::call_site, |s| s.ident.span());
    let old: Vec<PathSegment> = std::mem::take(&mut path.segments).into_iter().collect();
    let consumed = resolution.consumed.clamp(1, old.len().max(1));
    let canonical = &resolution.symbol.path;

    let mut segments: Punctuated<PathSegment, Token![::]> = Punctuated::new();
    match canonical.root() {
        Root::Crate => {
            path.leading_colon = None;
            segments.push(PathSegment::from(Ident::new("crate", span)));
        }
        Root::Extern => path.leading_colon = Some(<Token![::]>::default()),
    }
    for segment in canonical.segments() {
        segments.push(PathSegment::from(make_ident(segment, span)));
    }

    let mut old = old.into_iter();
    let carried = old.by_ref().take(consumed).last().map(|s| s.arguments);
    if let (Some(last), Some(arguments)) = (segments.last_mut(), carried) {
        last.arguments = arguments;
    }
    segments.extend(old);
    path.segments = segments;
}

fn is_bare_ident(pat: &PatIdent) -> bool {
    pat.by_ref.is_none() && pat.mutability.is_none() && pat.subpat.is_none()
}

fn resolve_pattern(table: &SymbolTable, module: &[String], ident: &Ident) -> Option<Resolution> {
    let resolution = table
        .resolve(module, &[ident.to_string()], Namespace::Value)
        .ok()?;
    matches!(
        resolution.symbol.kind,
        SymbolKind::Variant | SymbolKind::Const | SymbolKind::Struct | SymbolKind::Prelude
    )
    .then_some(resolution)
}

impl VisitMut for Qualifier<'_> {
    fn visit_type_path_mut(&mut self, node: &mut TypePath) {
        self.rewrite_qualified(node.qself.as_mut(), &mut node.path, Namespace::Type, true);
        visit_mut::visit_type_path_mut(self, node);
    }

    fn visit_trait_bound_mut(&mut self, node: &mut TraitBound) {
        self.rewrite_path(&mut node.path, Namespace::Type, true);
        visit_mut::visit_trait_bound_mut(self, node);
    }

    fn visit_expr_path_mut(&mut self, node: &mut ExprPath) {
        let strict = node.qself.is_some() || node.path.segments.len() > 1;
        self.rewrite_qualified(node.qself.as_mut(), &mut node.path, Namespace::Value, strict);
        visit_mut::visit_expr_path_mut(self, node);
    }

    fn visit_expr_struct_mut(&mut self, node: &mut ExprStruct) {
        self.rewrite_qualified(node.qself.as_mut(), &mut node.path, Namespace::Type, true);
        visit_mut::visit_expr_struct_mut(self, node);
    }

    fn visit_pat_struct_mut(&mut self, node: &mut PatStruct) {
        self.rewrite_qualified(node.qself.as_mut(), &mut node.path, Namespace::Type, true);
        visit_mut::visit_pat_struct_mut(self, node);
    }

    fn visit_pat_tuple_struct_mut(&mut self, node: &mut PatTupleStruct) {
        self.rewrite_qualified(node.qself.as_mut(), &mut node.path, Namespace::Value, true);
        visit_mut::visit_pat_tuple_struct_mut(self, node);
    }

    fn visit_pat_mut(&mut self, node: &mut Pat) {
        if let Pat::Ident(pat) = node {
            if let Some(path) = self.path_pattern(pat) {
                *node = Pat::Path(ExprPath {
                    attrs: pat.attrs.clone(),
                    qself: None,
                    path,
                });
                return;
            }
        }
        visit_mut::visit_pat_mut(self, node);
    }

    fn visit_attribute_mut(&mut self, node: &mut Attribute) {
        self.rewrite_meta(&mut node.meta);
    }

    fn visit_macro_mut(&mut self, node: &mut Macro) {
        self.rewrite_macro_path(&mut node.path, false);
    }

    fn visit_item_impl_mut(&mut self, node: &mut ItemImpl) {
        self.push_generics(&node.generics);
        if let Some((_, trait_path, _)) = &mut node.trait_ {
            self.rewrite_path(trait_path, Namespace::Type, true);
        }
        visit_mut::visit_item_impl_mut(self, node);
        self.generics.pop();
    }

    fn visit_item_struct_mut(&mut self, node: &mut ItemStruct) {
        self.push_generics(&node.generics);
        let helpers = derives(&node.attrs);
        self.with_derive_helpers(helpers, |q| visit_mut::visit_item_struct_mut(q, node));
        self.generics.pop();
    }

    fn visit_item_enum_mut(&mut self, node: &mut ItemEnum) {
        self.push_generics(&node.generics);
        let helpers = derives(&node.attrs);
        self.with_derive_helpers(helpers, |q| visit_mut::visit_item_enum_mut(q, node));
        self.generics.pop();
    }

    fn visit_item_union_mut(&mut self, node: &mut ItemUnion) {
        self.push_generics(&node.generics);
        let helpers = derives(&node.attrs);
        self.with_derive_helpers(helpers, |q| visit_mut::visit_item_union_mut(q, node));
        self.generics.pop();
    }

    fn visit_item_trait_mut(&mut self, node: &mut ItemTrait) {
        self.push_generics(&node.generics);
        visit_mut::visit_item_trait_mut(self, node);
        self.generics.pop();
    }

    fn visit_item_type_mut(&mut self, node: &mut ItemType) {
        self.push_generics(&node.generics);
        visit_mut::visit_item_type_mut(self, node);
        self.generics.pop();
    }

    fn visit_impl_item_type_mut(&mut self, node: &mut ImplItemType) {
        self.push_generics(&node.generics);
        visit_mut::visit_impl_item_type_mut(self, node);
        self.generics.pop();
    }

    fn visit_trait_item_type_mut(&mut self, node: &mut TraitItemType) {
        self.push_generics(&node.generics);
        visit_mut::visit_trait_item_type_mut(self, node);
        self.generics.pop();
    }

    fn visit_item_fn_mut(&mut self, node: &mut ItemFn) {
        let generics = node.sig.generics.clone();
        let locals = self.collect_locals(|c| c.visit_item_fn(node));
        self.scoped(&generics, locals, |q| visit_mut::visit_item_fn_mut(q, node));
    }

    fn visit_impl_item_fn_mut(&mut self, node: &mut ImplItemFn) {
        let generics = node.sig.generics.clone();
        let locals = self.collect_locals(|c| c.visit_impl_item_fn(node));
        self.scoped(&generics, locals, |q| visit_mut::visit_impl_item_fn_mut(q, node));
    }

    fn visit_trait_item_fn_mut(&mut self, node: &mut TraitItemFn) {
        let generics = node.sig.generics.clone();
        let locals = self.collect_locals(|c| c.visit_trait_item_fn(node));
        self.scoped(&generics, locals, |q| visit_mut::visit_trait_item_fn_mut(q, node));
    }
}

/// Gathers the names a function body binds: patterns, nested items and
/// `use` declarations inside the body.
struct LocalCollector<'a> {
    table: &'a SymbolTable,
    module: &'a [String],
    locals: Locals,
}

impl LocalCollector<'_> {
    fn collect_use(&mut self, tree: &UseTree) {
        match tree {
            UseTree::Path(p) => self.collect_use(&p.tree),
            UseTree::Name(n) => {
                self.locals.items.insert(n.ident.to_string());
            }
            UseTree::Rename(r) => {
                self.locals.items.insert(r.rename.to_string());
            }
            UseTree::Glob(_) => {}
            UseTree::Group(g) => g.items.iter().for_each(|t| self.collect_use(t)),
        }
    }
}

impl<'ast> Visit<'ast> for LocalCollector<'_> {
    fn visit_pat_ident(&mut self, node: &'ast PatIdent) {
        let names_path = is_bare_ident(node)
            && resolve_pattern(self.table, self.module, &node.ident).is_some();
        if !names_path {
            self.locals.bindings.insert(node.ident.to_string());
        }
        visit::visit_pat_ident(self, node);
    }

    fn visit_item(&mut self, node: &'ast Item) {
        let ident = match node {
            Item::Const(i) => Some(&i.ident),
            Item::Enum(i) => Some(&i.ident),
            Item::Fn(i) => Some(&i.sig.ident),
            Item::Mod(i) => Some(&i.ident),
            Item::Static(i) => Some(&i.ident),
            Item::Struct(i) => Some(&i.ident),
            Item::Trait(i) => Some(&i.ident),
            Item::Type(i) => Some(&i.ident),
            Item::Union(i) => Some(&i.ident),
            Item::Macro(i) => i.ident.as_ref(),
            Item::Use(i) => {
                self.collect_use(&i.tree);
                None
            }
            _ => None,
        };
        if let Some(ident) = ident {
            self.locals.items.insert(ident.to_string());
        }
        visit::visit_item(self, node);
    }

    fn visit_macro(&mut self, _node: &'ast Macro) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn table() -> SymbolTable {
        let root: syn::File = parse_quote! {
            pub mod model;
            pub mod util;
        };
        let model: syn::File = parse_quote! {
            use std::collections::HashMap;
            use crate::util::Helper as H;
            use serde::Serialize;
            use tracing::{error, info};
            use async_trait::async_trait;
            pub struct Wrapper<T>(pub T);
            pub mod store { pub struct Shelf; }
            pub mod parse { pub fn parse() -> u8 { 1 } }
            pub use self::parse::parse;
            macro_rules! local_log { () => {}; }
            pub enum Color { Red, Green }
            pub use self::Color::*;
            pub const LIMIT: usize = 4;
            pub trait Render { type Out; fn render(&self) -> Self::Out; }
            pub fn helper() -> usize { 1 }
        };
        let util: syn::File = parse_quote! {
            pub struct Helper;
            impl Helper { pub fn new() -> Self { Helper } }
        };
        SymbolTable::builder()
            .extern_crates(["serde", "tracing", "async-trait"])
            .file(&[], &root)
            .file(&["model".to_string()], &model)
            .file(&["util".to_string()], &util)
            .build()
    }

    fn qualified(item: Item) -> Result<String, ResolveError> {
        let mut item = item;
        qualify_item(&mut item, &table(), &["model".to_string()])?;
        Ok(item.to_token_stream().to_string())
    }

    #[test]
    fn rewrites_imported_and_local_types() {
        let text = qualified(parse_quote! {
            pub struct Cache {
                map: HashMap<String, H>,
                color: Color,
                items: Vec<Wrapper<u8>>,
            }
        })
        .unwrap();
        assert!(text.contains(":: std :: collections :: HashMap < :: std :: string :: String , crate :: util :: Helper >"));
        assert!(text.contains("color : crate :: model :: Color"));
        assert!(text.contains(":: std :: vec :: Vec < crate :: model :: Wrapper < u8 > >"));
    }

    #[test]
    fn keeps_generics_self_and_primitives() {
        let text = qualified(parse_quote! {
            impl<T: Clone> Render for Wrapper<T> {
                type Out = T;
                fn render(&self) -> Self::Out { self.0.clone() }
            }
        })
        .unwrap();
        assert!(text.contains("impl < T : :: core :: clone :: Clone > crate :: model :: Render for crate :: model :: Wrapper < T >"));
        assert!(text.contains("type Out = T ;"));
        assert!(text.contains("-> Self :: Out"));
    }

    #[test]
    fn rewrites_expressions_and_patterns() {
        let text = qualified(parse_quote! {
            fn pick(flag: bool) -> Color {
                let limit = LIMIT;
                let made = H::new();
                match helper() {
                    0 => Red,
                    n if n > limit => Color::Green,
                    _ => Red,
                }
            }
        })
        .unwrap();
        assert!(text.contains("let limit = crate :: model :: LIMIT"));
        assert!(text.contains("crate :: util :: Helper :: new ()"));
        assert!(text.contains("match crate :: model :: helper ()"));
        assert!(text.contains("0 => crate :: model :: Color :: Red"));
        assert!(text.contains("n if n > limit => crate :: model :: Color :: Green"));
    }

    #[test]
    fn unit_variant_patterns_become_paths() {
        let text = qualified(parse_quote! {
            fn is_red(c: Color) -> bool {
                match c { Red => true, other => { let _ = other; false } }
            }
        })
        .unwrap();
        assert!(text.contains("crate :: model :: Color :: Red => true"));
        assert!(text.contains("other =>"));
    }

    #[test]
    fn rewrites_derives_but_not_other_attributes() {
        let text = qualified(parse_quote! {
            #[derive(Debug, Clone, Serialize)]
            #[serde(rename = "HashMap")]
            #[cfg_attr(test, derive(PartialEq))]
            pub struct Point { x: i32 }
        })
        .unwrap();
        assert!(text.contains("derive (:: core :: fmt :: Debug , :: core :: clone :: Clone , :: serde :: Serialize)"));
        assert!(text.contains("serde (rename = \"HashMap\")"));
        assert!(text.contains("cfg_attr (test , derive (:: core :: cmp :: PartialEq))"));
    }

    #[test]
    fn qualified_self_keeps_associated_names() {
        let text = qualified(parse_quote! {
            fn out<R: Render>(r: R) -> <R as Render>::Out { r.render() }
        })
        .unwrap();
        assert!(text.contains("< R as crate :: model :: Render > :: Out"));
    }

    #[test]
    fn macro_bodies_are_untouched() {
        let text = qualified(parse_quote! {
            fn log() { println!("{}", Color::Red as u8); }
        })
        .unwrap();
        assert!(text.contains("println ! (\"{}\" , Color :: Red as u8)"));
    }

    #[test]
    fn parameters_do_not_shadow_module_paths() {
        let text = qualified(parse_quote! {
            pub fn load(store: &store::Shelf) -> usize {
                let shelf: &store::Shelf = store;
                let _ = shelf;
                0
            }
        })
        .unwrap();
        assert!(text.contains("store : & crate :: model :: store :: Shelf"));
        assert!(text.contains("let shelf : & crate :: model :: store :: Shelf = store ;"));
    }

    #[test]
    fn items_declared_in_bodies_shadow_every_path() {
        let text = qualified(parse_quote! {
            fn paint() {
                struct Color;
                let _c: Color = Color;
            }
        })
        .unwrap();
        assert!(text.contains("let _c : Color = Color ;"));
    }

    #[test]
    fn modules_and_functions_sharing_a_name() {
        let text = qualified(parse_quote! {
            fn go() -> u8 { parse() + parse::parse() }
        })
        .unwrap();
        assert!(text.contains(
            "crate :: model :: parse :: parse () + crate :: model :: parse :: parse ()"
        ));
    }

    #[test]
    fn imported_macros_are_qualified() {
        let text = qualified(parse_quote! {
            fn hello() {
                info!("hi");
                tracing::warn!("careful");
                println!("plain");
                local_log!();
            }
        })
        .unwrap();
        assert!(text.contains(":: tracing :: info ! (\"hi\")"));
        assert!(text.contains(":: tracing :: warn ! (\"careful\")"));
        assert!(text.contains("println ! (\"plain\")"));
        assert!(text.contains("local_log ! ()"));
    }

    #[test]
    fn imported_attribute_macros_are_qualified() {
        let text = qualified(parse_quote! {
            #[async_trait]
            #[allow(unused)]
            pub trait Store {
                async fn get(&self) -> u8;
            }
        })
        .unwrap();
        assert!(text.contains("# [:: async_trait :: async_trait]"));
        assert!(text.contains("# [allow (unused)]"));
    }

    #[test]
    fn derive_helpers_are_not_mistaken_for_imports() {
        let text = qualified(parse_quote! {
            #[derive(Debug)]
            pub enum Failure {
                #[error("boom")]
                Boom,
            }
        })
        .unwrap();
        assert!(text.contains("# [error (\"boom\")]"));
        assert!(!text.contains("tracing"));
    }

    #[test]
    fn unresolved_types_are_errors() {
        let err = qualified(parse_quote! {
            pub struct Broken { field: Missing }
        })
        .unwrap_err();
        assert!(matches!(err, ResolveError::Unresolved { .. }));
    }

    #[test]
    fn unknown_single_segment_values_are_kept() {
        let text = qualified(parse_quote! {
            const N: usize = UNKNOWN_BUT_MAYBE_LOCAL;
        })
        .unwrap();
        assert!(text.contains("= UNKNOWN_BUT_MAYBE_LOCAL"));
    }

    #[test]
    fn fragments_from_display_names() {
        let f = Fragments::from_display("crate::my::ns::Thing");
        assert_eq!(f.namespace, "my_ns");
        assert_eq!(f.class, "Thing");
        assert_eq!(f.full_name(), "my_ns_Thing");

        let f = Fragments::from_display("crate::m::Wrapper<T, U>::show");
        assert_eq!(f.namespace, "m_Wrapper_T__U_");
        assert_eq!(f.class, "show");

        let f = Fragments::from_display("crate::Root");
        assert_eq!(f.namespace, "");
        assert_eq!(f.full_name(), "Root");
    }

    #[test]
    fn split_respects_generic_brackets() {
        assert_eq!(
            split_top_level("a::B<c::D>::e"),
            vec!["a", "B<c::D>", "e"]
        );
    }

    #[test]
    fn display_names() {
        let generics: Generics = parse_quote!(<'a, T, const N: usize>);
        let ident: Ident = parse_quote!(Wrapper);
        assert_eq!(qualify("crate::m", &ident, &generics), "crate::m::Wrapper<T, N>");
        let ty: syn::Type = parse_quote!(crate::m::Wrapper<T>);
        assert_eq!(compact(&ty), "crate::m::Wrapper<T>");
        let ty: syn::Type = parse_quote!(dyn crate::Draw);
        assert_eq!(compact(&ty), "dyn crate::Draw");
    }

    #[test]
    fn impl_headers_and_types_share_one_display_name() {
        let generics: Generics = parse_quote!(<T, U>);
        let ident: Ident = parse_quote!(Wrapper);
        let ty: syn::Type = parse_quote!(crate::m::Wrapper<T,U>);
        assert_eq!(compact(&ty), qualify("crate::m", &ident, &generics));
        assert_eq!(compact(&ty), "crate::m::Wrapper<T, U>");
    }
}

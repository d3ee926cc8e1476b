//! Enclosing scopes and standalone tree reconstruction.
//!
//! A declaration is rebuilt with only the scopes on its path from the crate
//! root: the `impl` or `trait` block it belongs to, then one `mod` per
//! module level. Siblings and `use` declarations are dropped, since every
//! path has already been qualified.

use proc_macro2::Span;
use syn::{
    parse_quote, Attribute, Generics, Ident, ImplItem, Item, ItemImpl, ItemTrait, TraitItem,
    Visibility,
};

use crate::qualify::{compact, make_ident};

/// The abstract kind of an enclosing scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Module levels implied by the file path.
    File,
    /// An inline `mod name { ... }`.
    Block,
    /// An `impl` or `trait` block.
    Type,
}

/// One module level with the visibility of its `mod` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSegment {
    /// Module name.
    pub name: String,
    /// Visibility tokens (empty for private).
    pub vis: String,
}

impl ModuleSegment {
    /// Creates a segment.
    #[must_use]
    pub fn new(name: impl Into<String>, vis: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vis: vis.into(),
        }
    }
}

/// One enclosing scope of a declaration, outermost first.
#[derive(Debug, Clone)]
pub enum ScopeDescriptor {
    /// Modules implied by the file path.
    File(Vec<ModuleSegment>),
    /// An inline module.
    Block(ModuleSegment),
    /// An impl block header; its item list is empty.
    Impl(Box<ItemImpl>),
    /// A trait header; its item list is empty.
    Trait(Box<ItemTrait>),
}

impl ScopeDescriptor {
    /// Returns the scope kind.
    #[must_use]
    pub fn kind(&self) -> ScopeKind {
        match self {
            Self::File(_) => ScopeKind::File,
            Self::Block(_) => ScopeKind::Block,
            Self::Impl(_) | Self::Trait(_) => ScopeKind::Type,
        }
    }

    /// Returns the name segments this scope contributes.
    #[must_use]
    pub fn segments(&self) -> Vec<String> {
        match self {
            Self::File(modules) => modules.iter().map(|m| m.name.clone()).collect(),
            Self::Block(module) => vec![module.name.clone()],
            Self::Impl(header) => vec![compact(&header.self_ty)],
            Self::Trait(header) => vec![header.ident.to_string()],
        }
    }

    fn modules(&self) -> &[ModuleSegment] {
        match self {
            Self::File(modules) => modules,
            Self::Block(module) => std::slice::from_ref(module),
            Self::Impl(_) | Self::Trait(_) => &[],
        }
    }
}

/// Module path below `crate` described by a scope chain.
#[must_use]
pub fn module_path(scopes: &[ScopeDescriptor]) -> Vec<String> {
    scopes
        .iter()
        .flat_map(ScopeDescriptor::modules)
        .map(|m| m.name.clone())
        .collect()
}

/// An annotated declaration: a module item or an associated item.
#[derive(Debug, Clone)]
pub enum DeclItem {
    /// A module-level item.
    Item(Item),
    /// An item of an `impl` block.
    Impl(ImplItem),
    /// An item of a `trait` block.
    Trait(TraitItem),
}

impl DeclItem {
    /// Returns the item's attributes; unsupported kinds have none.
    #[must_use]
    pub fn attrs(&self) -> &[Attribute] {
        match self {
            Self::Item(item) => item_attrs(item),
            Self::Impl(item) => impl_item_attrs(item),
            Self::Trait(item) => trait_item_attrs(item),
        }
    }

    /// Returns the attribute list for rewriting, if the kind is supported.
    pub fn attrs_mut(&mut self) -> Option<&mut Vec<Attribute>> {
        match self {
            Self::Item(item) => match item {
                Item::Struct(i) => Some(&mut i.attrs),
                Item::Enum(i) => Some(&mut i.attrs),
                Item::Union(i) => Some(&mut i.attrs),
                Item::Trait(i) => Some(&mut i.attrs),
                Item::Type(i) => Some(&mut i.attrs),
                Item::Fn(i) => Some(&mut i.attrs),
                Item::Const(i) => Some(&mut i.attrs),
                Item::Static(i) => Some(&mut i.attrs),
                _ => None,
            },
            Self::Impl(item) => match item {
                ImplItem::Fn(i) => Some(&mut i.attrs),
                ImplItem::Const(i) => Some(&mut i.attrs),
                ImplItem::Type(i) => Some(&mut i.attrs),
                _ => None,
            },
            Self::Trait(item) => match item {
                TraitItem::Fn(i) => Some(&mut i.attrs),
                TraitItem::Const(i) => Some(&mut i.attrs),
                TraitItem::Type(i) => Some(&mut i.attrs),
                _ => None,
            },
        }
    }

    /// Returns the declared name, if the kind is supported.
    #[must_use]
    pub fn ident(&self) -> Option<&Ident> {
        match self {
            Self::Item(item) => match item {
                Item::Struct(i) => Some(&i.ident),
                Item::Enum(i) => Some(&i.ident),
                Item::Union(i) => Some(&i.ident),
                Item::Trait(i) => Some(&i.ident),
                Item::Type(i) => Some(&i.ident),
                Item::Fn(i) => Some(&i.sig.ident),
                Item::Const(i) => Some(&i.ident),
                Item::Static(i) => Some(&i.ident),
                _ => None,
            },
            Self::Impl(item) => match item {
                ImplItem::Fn(i) => Some(&i.sig.ident),
                ImplItem::Const(i) => Some(&i.ident),
                ImplItem::Type(i) => Some(&i.ident),
                _ => None,
            },
            Self::Trait(item) => match item {
                TraitItem::Fn(i) => Some(&i.sig.ident),
                TraitItem::Const(i) => Some(&i.ident),
                TraitItem::Type(i) => Some(&i.ident),
                _ => None,
            },
        }
    }

    /// Returns the item's own generic parameters.
    #[must_use]
    pub fn generics(&self) -> Option<&Generics> {
        match self {
            Self::Item(item) => match item {
                Item::Struct(i) => Some(&i.generics),
                Item::Enum(i) => Some(&i.generics),
                Item::Union(i) => Some(&i.generics),
                Item::Trait(i) => Some(&i.generics),
                Item::Type(i) => Some(&i.generics),
                Item::Fn(i) => Some(&i.sig.generics),
                Item::Const(i) => Some(&i.generics),
                _ => None,
            },
            Self::Impl(item) => match item {
                ImplItem::Fn(i) => Some(&i.sig.generics),
                ImplItem::Const(i) => Some(&i.generics),
                ImplItem::Type(i) => Some(&i.generics),
                _ => None,
            },
            Self::Trait(item) => match item {
                TraitItem::Fn(i) => Some(&i.sig.generics),
                TraitItem::Const(i) => Some(&i.generics),
                TraitItem::Type(i) => Some(&i.generics),
                _ => None,
            },
        }
    }

    /// Returns true for kinds that can carry a marker.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.ident().is_some()
    }
}

pub(crate) fn item_attrs(item: &Item) -> &[Attribute] {
    match item {
        Item::Struct(i) => &i.attrs,
        Item::Enum(i) => &i.attrs,
        Item::Union(i) => &i.attrs,
        Item::Trait(i) => &i.attrs,
        Item::Type(i) => &i.attrs,
        Item::Fn(i) => &i.attrs,
        Item::Const(i) => &i.attrs,
        Item::Static(i) => &i.attrs,
        _ => &[],
    }
}

pub(crate) fn impl_item_attrs(item: &ImplItem) -> &[Attribute] {
    match item {
        ImplItem::Fn(i) => &i.attrs,
        ImplItem::Const(i) => &i.attrs,
        ImplItem::Type(i) => &i.attrs,
        _ => &[],
    }
}

pub(crate) fn trait_item_attrs(item: &TraitItem) -> &[Attribute] {
    match item {
        TraitItem::Fn(i) => &i.attrs,
        TraitItem::Const(i) => &i.attrs,
        TraitItem::Type(i) => &i.attrs,
        _ => &[],
    }
}

/// Errors raised while placing a declaration into its scopes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// An associated item without its `impl` or `trait` block.
    #[error("associated item `{0}` has no enclosing impl or trait block")]
    MissingTypeScope(String),
}

/// Places a declaration into its innermost type scope.
///
/// Module items are returned as they are. Associated items become the only
/// item of a copy of their `impl` or `trait` header.
///
/// # Errors
///
/// Returns an error if an associated item has no type scope in the chain.
pub fn enclose(item: DeclItem, scopes: &[ScopeDescriptor]) -> Result<Item, ScopeError> {
    let missing = |name: Option<&Ident>| {
        ScopeError::MissingTypeScope(name.map(ToString::to_string).unwrap_or_default())
    };
    match item {
        DeclItem::Item(item) => Ok(item),
        DeclItem::Impl(inner) => {
            let Some(ScopeDescriptor::Impl(header)) =
                scopes.iter().rev().find(|s| s.kind() == ScopeKind::Type)
            else {
                return Err(missing(DeclItem::Impl(inner).ident()));
            };
            let mut header = (**header).clone();
            header.items = vec![inner];
            Ok(Item::Impl(header))
        }
        DeclItem::Trait(inner) => {
            let Some(ScopeDescriptor::Trait(header)) =
                scopes.iter().rev().find(|s| s.kind() == ScopeKind::Type)
            else {
                return Err(missing(DeclItem::Trait(inner).ident()));
            };
            let mut header = (**header).clone();
            header.items = vec![inner];
            Ok(Item::Trait(header))
        }
    }
}

/// Wraps a unit in one `mod` per module level of the scope chain.
#[must_use]
pub fn reconstruct(unit: Item, scopes: &[ScopeDescriptor]) -> Item {
    let modules: Vec<&ModuleSegment> = scopes.iter().flat_map(ScopeDescriptor::modules).collect();
    modules.into_iter().rev().fold(unit, |inner, module| {
        let vis: Visibility = syn::parse_str(&module.vis).unwrap_or(Visibility::Inherited);
        let ident = make_ident(&module.name, Span::call_site());
        parse_quote! {
            #vis mod #ident {
                #inner
            }
        }
    })
}

/// Renders a reconstructed tree as formatted source text.
///
/// The output is what `prettyplease` prints for a file holding only `tree`,
/// without the trailing newline. Doc attributes come out as `///` comments.
#[must_use]
pub fn render(tree: Item) -> String {
    let file = syn::File {
        shebang: None,
        attrs: Vec::new(),
        items: vec![tree],
    };
    let mut text = prettyplease::unparse(&file);
    text.truncate(text.trim_end().len());
    text
}

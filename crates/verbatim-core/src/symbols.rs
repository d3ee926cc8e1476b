//! Crate-wide symbol table.
//!
//! The table records, for every module of the analysed crate, the items it
//! declares and the names it brings into scope with `use` and
//! `extern crate`. [`SymbolTable::resolve`] maps a path as written inside
//! some module to the canonical path of the item it names, following
//! re-exports until the defining module is reached.
//!
//! The table is built once per pass and only read afterwards. It holds no
//! `syn` values, so it can be shared freely between threads.

use quote::ToTokens;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use syn::{Fields, Ident, Item, UseTree, Visibility};

/// Upper bound on import hops followed while resolving one path.
const MAX_IMPORT_DEPTH: usize = 32;

/// Crates that are always reachable through the extern prelude.
const BUILTIN_CRATES: &[&str] = &["std", "core", "alloc"];

/// Names of the standard prelude with their defining paths.
const PRELUDE: &[(&str, &str)] = &[
    ("Option", "::core::option::Option"),
    ("Some", "::core::option::Option::Some"),
    ("None", "::core::option::Option::None"),
    ("Result", "::core::result::Result"),
    ("Ok", "::core::result::Result::Ok"),
    ("Err", "::core::result::Result::Err"),
    ("Vec", "::std::vec::Vec"),
    ("String", "::std::string::String"),
    ("Box", "::std::boxed::Box"),
    ("ToString", "::std::string::ToString"),
    ("ToOwned", "::std::borrow::ToOwned"),
    ("Clone", "::core::clone::Clone"),
    ("Copy", "::core::marker::Copy"),
    ("Send", "::core::marker::Send"),
    ("Sync", "::core::marker::Sync"),
    ("Sized", "::core::marker::Sized"),
    ("Unpin", "::core::marker::Unpin"),
    ("Drop", "::core::ops::Drop"),
    ("Fn", "::core::ops::Fn"),
    ("FnMut", "::core::ops::FnMut"),
    ("FnOnce", "::core::ops::FnOnce"),
    ("Default", "::core::default::Default"),
    ("Iterator", "::core::iter::Iterator"),
    ("IntoIterator", "::core::iter::IntoIterator"),
    ("Extend", "::core::iter::Extend"),
    ("DoubleEndedIterator", "::core::iter::DoubleEndedIterator"),
    ("ExactSizeIterator", "::core::iter::ExactSizeIterator"),
    ("FromIterator", "::core::iter::FromIterator"),
    ("PartialEq", "::core::cmp::PartialEq"),
    ("Eq", "::core::cmp::Eq"),
    ("PartialOrd", "::core::cmp::PartialOrd"),
    ("Ord", "::core::cmp::Ord"),
    ("AsRef", "::core::convert::AsRef"),
    ("AsMut", "::core::convert::AsMut"),
    ("Into", "::core::convert::Into"),
    ("From", "::core::convert::From"),
    ("TryFrom", "::core::convert::TryFrom"),
    ("TryInto", "::core::convert::TryInto"),
];

/// Derive macros of the prelude that have no trait of the same name in it.
const DERIVE_PRELUDE: &[(&str, &str)] = &[
    ("Debug", "::core::fmt::Debug"),
    ("Hash", "::core::hash::Hash"),
];

const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64",
    "i128", "isize", "f32", "f64",
];

/// Returns true for the names of primitive types.
#[must_use]
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

/// Where a canonical path is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Root {
    /// The analysed crate (`crate::...`).
    Crate,
    /// Another crate (`::name::...`).
    Extern,
}

/// A globally rooted path that means the same thing in every module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPath {
    root: Root,
    segments: Vec<String>,
}

impl CanonicalPath {
    /// The root module of the analysed crate.
    #[must_use]
    pub fn crate_root() -> Self {
        Self {
            root: Root::Crate,
            segments: Vec::new(),
        }
    }

    /// A path inside the analysed crate.
    #[must_use]
    pub fn in_crate<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root: Root::Crate,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// A path into another crate; the first segment is the crate name.
    #[must_use]
    pub fn external<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root: Root::Extern,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses `crate::a::B` as a crate path and `::a::B` or `a::B` as an
    /// external one.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix("crate") {
            if rest.is_empty() || rest.starts_with("::") {
                return Self::in_crate(split_segments(rest));
            }
        }
        Self::external(split_segments(text))
    }

    /// Returns the root of this path.
    #[must_use]
    pub fn root(&self) -> Root {
        self.root
    }

    /// Returns the segments after the root.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns true for the root module of the analysed crate.
    #[must_use]
    pub fn is_crate_root(&self) -> bool {
        self.root == Root::Crate && self.segments.is_empty()
    }

    /// Appends one segment.
    #[must_use]
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut joined = self.clone();
        joined.segments.push(segment.into());
        joined
    }
}

fn split_segments(text: &str) -> Vec<String> {
    text.split("::")
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.root == Root::Crate {
            f.write_str("crate")?;
        }
        for segment in &self.segments {
            write!(f, "::{segment}")?;
        }
        Ok(())
    }
}

/// What a resolved name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A module of the analysed crate.
    Module,
    /// A struct.
    Struct,
    /// An enum.
    Enum,
    /// A union.
    Union,
    /// A trait or trait alias.
    Trait,
    /// A type alias.
    TypeAlias,
    /// A free function.
    Fn,
    /// A constant.
    Const,
    /// A static.
    Static,
    /// A `macro_rules!` macro.
    Macro,
    /// An enum variant.
    Variant,
    /// An associated item or other member reached through a type.
    Associated,
    /// Anything inside another crate.
    Extern,
    /// A name from the standard prelude.
    Prelude,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Module => "module",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Union => "union",
            Self::Trait => "trait",
            Self::TypeAlias => "type alias",
            Self::Fn => "function",
            Self::Const => "constant",
            Self::Static => "static",
            Self::Macro => "macro",
            Self::Variant => "variant",
            Self::Associated => "associated item",
            Self::Extern => "external item",
            Self::Prelude => "prelude item",
        };
        f.write_str(name)
    }
}

/// A resolved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// What the name refers to.
    pub kind: SymbolKind,
    /// Canonical path of the referenced item.
    pub path: CanonicalPath,
}

impl Symbol {
    fn new(kind: SymbolKind, path: CanonicalPath) -> Self {
        Self { kind, path }
    }
}

/// Result of resolving a written path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The item named by the first `consumed` segments.
    pub symbol: Symbol,
    /// Number of written segments covered by `symbol`; the remaining ones
    /// name members of it and are kept as written.
    pub consumed: usize,
}

/// The namespace a path is looked up in.
///
/// Only the last segment of a path is looked up in the requested
/// namespace; the segments before it name modules or types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Types and traits.
    Type,
    /// Functions, constants, constructors.
    Value,
    /// Attribute and function-like macros.
    Macro,
    /// Derive macros.
    Derive,
}

/// Errors raised while resolving a path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No item with this name is visible.
    #[error("cannot resolve `{path}` in `{module}`")]
    Unresolved {
        /// The path as written.
        path: String,
        /// The module it was written in.
        module: String,
    },

    /// `super` used in the crate root.
    #[error("`super` goes past the crate root in `{path}`")]
    SuperAtRoot {
        /// The path as written.
        path: String,
    },

    /// Import chain too long or cyclic.
    #[error("import chain for `{name}` exceeds {limit} steps")]
    ImportDepth {
        /// The name being resolved.
        name: String,
        /// The depth limit.
        limit: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UsePath {
    leading_colon: bool,
    segments: Vec<String>,
}

#[derive(Debug, Clone)]
struct ItemEntry {
    kind: SymbolKind,
    vis: String,
    variants: Vec<String>,
}

/// Which namespaces a declared item occupies.
#[derive(Debug, Clone, Copy)]
enum Slots {
    Type,
    Value,
    Both,
    Macro,
}

#[derive(Debug, Clone, Default)]
struct ModuleData {
    types: BTreeMap<String, ItemEntry>,
    values: BTreeMap<String, ItemEntry>,
    macros: BTreeMap<String, ItemEntry>,
    imports: BTreeMap<String, UsePath>,
    globs: Vec<UsePath>,
}

impl ModuleData {
    fn declare(&mut self, ident: &Ident, kind: SymbolKind, vis: &Visibility, slots: Slots) {
        self.declare_with_variants(ident, kind, vis, slots, Vec::new());
    }

    fn declare_with_variants(
        &mut self,
        ident: &Ident,
        kind: SymbolKind,
        vis: &Visibility,
        slots: Slots,
        variants: Vec<String>,
    ) {
        let entry = ItemEntry {
            kind,
            vis: vis.to_token_stream().to_string(),
            variants,
        };
        let name = ident.to_string();
        if matches!(slots, Slots::Type | Slots::Both) {
            self.types.entry(name.clone()).or_insert_with(|| entry.clone());
        }
        if matches!(slots, Slots::Value | Slots::Both) {
            self.values.entry(name.clone()).or_insert_with(|| entry.clone());
        }
        if matches!(slots, Slots::Macro) {
            self.macros.entry(name).or_insert(entry);
        }
    }

    /// Returns the item declared under `name` in `namespace`.
    fn item(&self, name: &str, namespace: Namespace) -> Option<&ItemEntry> {
        match namespace {
            Namespace::Type => self.types.get(name),
            Namespace::Value => self.values.get(name),
            Namespace::Macro | Namespace::Derive => self.macros.get(name),
        }
    }

    fn flatten_use(&mut self, prefix: &mut Vec<String>, leading_colon: bool, tree: &UseTree) {
        match tree {
            UseTree::Path(p) => {
                prefix.push(p.ident.to_string());
                self.flatten_use(prefix, leading_colon, &p.tree);
                prefix.pop();
            }
            UseTree::Name(n) => {
                let name = n.ident.to_string();
                if name == "self" {
                    if let Some(last) = prefix.last() {
                        self.imports.insert(
                            last.clone(),
                            UsePath {
                                leading_colon,
                                segments: prefix.clone(),
                            },
                        );
                    }
                } else {
                    let mut segments = prefix.clone();
                    segments.push(name.clone());
                    self.imports.insert(
                        name,
                        UsePath {
                            leading_colon,
                            segments,
                        },
                    );
                }
            }
            UseTree::Rename(r) => {
                let alias = r.rename.to_string();
                if alias == "_" {
                    return;
                }
                let mut segments = prefix.clone();
                if r.ident != "self" {
                    segments.push(r.ident.to_string());
                }
                self.imports.insert(
                    alias,
                    UsePath {
                        leading_colon,
                        segments,
                    },
                );
            }
            UseTree::Glob(_) => self.globs.push(UsePath {
                leading_colon,
                segments: prefix.clone(),
            }),
            UseTree::Group(g) => {
                for item in &g.items {
                    self.flatten_use(prefix, leading_colon, item);
                }
            }
        }
    }
}

/// State of one resolution: import hops taken and lookups in progress.
#[derive(Default)]
struct Walk {
    depth: usize,
    visited: BTreeSet<(Vec<String>, String, Namespace)>,
}

/// Crate-wide table of declared and imported names.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    modules: BTreeMap<Vec<String>, ModuleData>,
    extern_crates: BTreeSet<String>,
}

impl SymbolTable {
    /// Creates a builder; the builtin crates are already registered.
    #[must_use]
    pub fn builder() -> SymbolTableBuilder {
        SymbolTableBuilder::new()
    }

    /// Returns true if the module was seen while building the table.
    #[must_use]
    pub fn has_module(&self, module: &[String]) -> bool {
        self.modules.contains_key(module)
    }

    /// Returns true if `name` is reachable through the extern prelude.
    #[must_use]
    pub fn is_extern_crate(&self, name: &str) -> bool {
        self.extern_crates.contains(name)
    }

    /// Returns the visibility tokens of the `mod` item declaring `module`.
    ///
    /// The crate root and undeclared modules yield `None`.
    #[must_use]
    pub fn module_visibility(&self, module: &[String]) -> Option<&str> {
        let (name, parent) = module.split_last()?;
        let entry = self.modules.get(parent)?.types.get(name)?;
        (entry.kind == SymbolKind::Module).then_some(entry.vis.as_str())
    }

    /// Resolves a path written inside `module`.
    ///
    /// Leading `crate`, `self` and `super` segments are interpreted relative
    /// to `module`. Otherwise the first segment is looked up in the module's
    /// items, then its named imports, then its glob imports, then the extern
    /// prelude, then the standard prelude. Every further segment that lands
    /// in a module of this crate is looked up there as well, so re-exports
    /// resolve to the defining path.
    ///
    /// The last segment is looked up in `namespace`, every earlier one in
    /// the type namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if a segment that should name a local item does not.
    pub fn resolve(
        &self,
        module: &[String],
        segments: &[String],
        namespace: Namespace,
    ) -> Result<Resolution, ResolveError> {
        let Some(first) = segments.first() else {
            return Err(unresolved(segments, module));
        };
        let mut walk = Walk::default();

        let (symbol, consumed) = if is_path_keyword(first) {
            self.leading_keywords(module, segments, namespace, &mut walk)?
        } else {
            let symbol = self
                .lookup_scoped(module, first, segment_namespace(segments, 0, namespace), &mut walk)?
                .ok_or_else(|| unresolved(segments, module))?;
            (symbol, 1)
        };

        let (symbol, consumed) =
            self.descend(symbol, segments, consumed, namespace, module, &mut walk)?;
        Ok(Resolution { symbol, consumed })
    }

    /// Handles `crate::`, `self::` and `super::` prefixes plus the segment
    /// after them.
    fn leading_keywords(
        &self,
        module: &[String],
        segments: &[String],
        namespace: Namespace,
        walk: &mut Walk,
    ) -> Result<(Symbol, usize), ResolveError> {
        let mut current: Vec<String> = if segments[0] == "crate" {
            Vec::new()
        } else {
            module.to_vec()
        };
        let mut index = usize::from(segments[0] != "super");

        while index < segments.len() && segments[index] == "super" {
            if current.pop().is_none() {
                return Err(ResolveError::SuperAtRoot {
                    path: segments.join("::"),
                });
            }
            index += 1;
        }

        let Some(name) = segments.get(index) else {
            return Ok((
                Symbol::new(SymbolKind::Module, CanonicalPath::in_crate(current)),
                index,
            ));
        };
        let symbol = self
            .lookup_in_module(&current, name, segment_namespace(segments, index, namespace), walk)?
            .ok_or_else(|| unresolved(segments, module))?;
        Ok((symbol, index + 1))
    }

    /// Looks up the first segment of an ordinary path.
    fn lookup_scoped(
        &self,
        module: &[String],
        name: &str,
        namespace: Namespace,
        walk: &mut Walk,
    ) -> Result<Option<Symbol>, ResolveError> {
        if let Some(symbol) = self.lookup_in_module(module, name, namespace, walk)? {
            return Ok(Some(symbol));
        }
        if namespace == Namespace::Type && self.extern_crates.contains(name) {
            return Ok(Some(Symbol::new(
                SymbolKind::Extern,
                CanonicalPath::external([name]),
            )));
        }
        Ok(prelude_path(name, namespace)
            .map(|path| Symbol::new(SymbolKind::Prelude, CanonicalPath::parse(path))))
    }

    /// Follows segments through local modules.
    fn descend(
        &self,
        mut symbol: Symbol,
        segments: &[String],
        mut consumed: usize,
        namespace: Namespace,
        module: &[String],
        walk: &mut Walk,
    ) -> Result<(Symbol, usize), ResolveError> {
        while consumed < segments.len()
            && symbol.kind == SymbolKind::Module
            && symbol.path.root() == Root::Crate
        {
            let ns = segment_namespace(segments, consumed, namespace);
            symbol = self
                .lookup_in_module(symbol.path.segments(), &segments[consumed], ns, walk)?
                .ok_or_else(|| unresolved(segments, module))?;
            consumed += 1;
        }
        Ok((symbol, consumed))
    }

    /// Looks up a name declared in or imported into `module`.
    ///
    /// A named import binds `name` in every namespace its target occupies,
    /// so an import whose target is missing from `namespace` is skipped.
    fn lookup_in_module(
        &self,
        module: &[String],
        name: &str,
        namespace: Namespace,
        walk: &mut Walk,
    ) -> Result<Option<Symbol>, ResolveError> {
        let Some(data) = self.modules.get(module) else {
            return Ok(None);
        };
        if let Some(entry) = data.item(name, namespace) {
            let path = CanonicalPath::in_crate(module.iter().cloned()).join(name);
            return Ok(Some(Symbol::new(entry.kind, path)));
        }
        if !walk.visited.insert((module.to_vec(), name.to_string(), namespace)) {
            return Ok(None);
        }

        if let Some(import) = data.imports.get(name) {
            // An import never resolves through itself, whatever the namespace.
            for ns in [Namespace::Type, Namespace::Value, Namespace::Macro, Namespace::Derive] {
                walk.visited.insert((module.to_vec(), name.to_string(), ns));
            }
            match self.resolve_use(module, import, namespace, walk) {
                Ok(symbol) => return Ok(Some(symbol)),
                Err(ResolveError::Unresolved { .. }) => {}
                Err(err) => return Err(err),
            }
        }

        for glob in &data.globs {
            let Ok(target) = self.resolve_use(module, glob, Namespace::Type, walk) else {
                continue;
            };
            if target.path.root() != Root::Crate {
                continue;
            }
            match target.kind {
                SymbolKind::Module => {
                    if let Some(symbol) =
                        self.lookup_in_module(target.path.segments(), name, namespace, walk)?
                    {
                        return Ok(Some(symbol));
                    }
                }
                SymbolKind::Enum
                    if matches!(namespace, Namespace::Type | Namespace::Value)
                        && self.enum_has_variant(&target.path, name) =>
                {
                    return Ok(Some(Symbol::new(
                        SymbolKind::Variant,
                        target.path.join(name),
                    )));
                }
                _ => {}
            }
        }

        Ok(None)
    }

    /// Resolves the target of a `use` declaration in `module`, looking its
    /// last segment up in `namespace`.
    fn resolve_use(
        &self,
        module: &[String],
        import: &UsePath,
        namespace: Namespace,
        walk: &mut Walk,
    ) -> Result<Symbol, ResolveError> {
        walk.depth += 1;
        if walk.depth > MAX_IMPORT_DEPTH {
            return Err(ResolveError::ImportDepth {
                name: import.segments.join("::"),
                limit: MAX_IMPORT_DEPTH,
            });
        }

        let segments = &import.segments;
        if import.leading_colon {
            return Ok(Symbol::new(
                SymbolKind::Extern,
                CanonicalPath::external(segments.iter().cloned()),
            ));
        }
        let Some(first) = segments.first() else {
            return Err(unresolved(segments, module));
        };

        let first_namespace = segment_namespace(segments, 0, namespace);
        let (symbol, consumed) = if is_path_keyword(first) {
            self.leading_keywords(module, segments, namespace, walk)?
        } else if let Some(symbol) = self.lookup_in_module(module, first, first_namespace, walk)? {
            (symbol, 1)
        } else if self.extern_crates.contains(first.as_str()) {
            (
                Symbol::new(SymbolKind::Extern, CanonicalPath::external([first])),
                1,
            )
        } else {
            return Err(unresolved(segments, module));
        };

        let (symbol, consumed) =
            self.descend(symbol, segments, consumed, namespace, module, walk)?;
        Ok(self.append_members(symbol, &segments[consumed..]))
    }

    /// Extends a symbol with member segments that are not looked up.
    fn append_members(&self, symbol: Symbol, rest: &[String]) -> Symbol {
        if rest.is_empty() {
            return symbol;
        }
        let kind = match symbol.kind {
            SymbolKind::Extern | SymbolKind::Prelude => SymbolKind::Extern,
            SymbolKind::Enum if rest.len() == 1 && self.enum_has_variant(&symbol.path, &rest[0]) => {
                SymbolKind::Variant
            }
            _ => SymbolKind::Associated,
        };
        let path = rest
            .iter()
            .fold(symbol.path, |path, segment| path.join(segment.clone()));
        Symbol::new(kind, path)
    }

    fn enum_has_variant(&self, path: &CanonicalPath, variant: &str) -> bool {
        let Some((name, module)) = path.segments().split_last() else {
            return false;
        };
        self.modules
            .get(module)
            .and_then(|data| data.types.get(name))
            .is_some_and(|entry| entry.variants.iter().any(|v| v == variant))
    }
}

/// Namespace of the segment at `index`: the requested one for the last
/// segment, the type namespace before it.
fn segment_namespace(segments: &[String], index: usize, namespace: Namespace) -> Namespace {
    if index + 1 >= segments.len() {
        namespace
    } else {
        Namespace::Type
    }
}

fn is_path_keyword(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

fn unresolved(segments: &[String], module: &[String]) -> ResolveError {
    ResolveError::Unresolved {
        path: segments.join("::"),
        module: CanonicalPath::in_crate(module.iter().cloned()).to_string(),
    }
}

fn prelude_path(name: &str, namespace: Namespace) -> Option<&'static str> {
    fn find(table: &[(&'static str, &'static str)], name: &str) -> Option<&'static str> {
        table.iter().find(|(n, _)| *n == name).map(|(_, path)| *path)
    }
    match namespace {
        Namespace::Macro => None,
        Namespace::Derive => find(DERIVE_PRELUDE, name).or_else(|| find(PRELUDE, name)),
        Namespace::Type | Namespace::Value => find(PRELUDE, name),
    }
}

/// Builder for a [`SymbolTable`].
#[derive(Debug)]
pub struct SymbolTableBuilder {
    table: SymbolTable,
}

impl Default for SymbolTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTableBuilder {
    /// Creates a builder with the builtin crates registered.
    #[must_use]
    pub fn new() -> Self {
        let mut table = SymbolTable::default();
        table
            .extern_crates
            .extend(BUILTIN_CRATES.iter().map(|c| (*c).to_string()));
        table.modules.entry(Vec::new()).or_default();
        Self { table }
    }

    /// Registers a crate reachable through the extern prelude.
    ///
    /// Dashes are normalized to underscores, as Cargo does.
    #[must_use]
    pub fn extern_crate(mut self, name: impl AsRef<str>) -> Self {
        self.table
            .extern_crates
            .insert(name.as_ref().replace('-', "_"));
        self
    }

    /// Registers several extern crates.
    #[must_use]
    pub fn extern_crates<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .fold(self, |builder, name| builder.extern_crate(name))
    }

    /// Adds the items of a parsed file that defines `module`.
    #[must_use]
    pub fn file(mut self, module: &[String], file: &syn::File) -> Self {
        self.collect_items(module.to_vec(), &file.items);
        self
    }

    /// Finishes the table.
    #[must_use]
    pub fn build(self) -> SymbolTable {
        self.table
    }

    fn collect_items(&mut self, module: Vec<String>, items: &[Item]) {
        let mut nested = Vec::new();
        let data = self.table.modules.entry(module.clone()).or_default();

        for item in items {
            match item {
                Item::Struct(s) => {
                    let slots = match s.fields {
                        Fields::Named(_) => Slots::Type,
                        Fields::Unnamed(_) | Fields::Unit => Slots::Both,
                    };
                    data.declare(&s.ident, SymbolKind::Struct, &s.vis, slots);
                }
                Item::Enum(e) => {
                    let variants = e.variants.iter().map(|v| v.ident.to_string()).collect();
                    data.declare_with_variants(
                        &e.ident,
                        SymbolKind::Enum,
                        &e.vis,
                        Slots::Type,
                        variants,
                    );
                }
                Item::Union(u) => data.declare(&u.ident, SymbolKind::Union, &u.vis, Slots::Type),
                Item::Trait(t) => data.declare(&t.ident, SymbolKind::Trait, &t.vis, Slots::Type),
                Item::TraitAlias(t) => {
                    data.declare(&t.ident, SymbolKind::Trait, &t.vis, Slots::Type);
                }
                Item::Type(t) => {
                    data.declare(&t.ident, SymbolKind::TypeAlias, &t.vis, Slots::Type);
                }
                Item::Fn(f) => data.declare(&f.sig.ident, SymbolKind::Fn, &f.vis, Slots::Value),
                Item::Const(c) if c.ident != "_" => {
                    data.declare(&c.ident, SymbolKind::Const, &c.vis, Slots::Value);
                }
                Item::Static(s) => {
                    data.declare(&s.ident, SymbolKind::Static, &s.vis, Slots::Value);
                }
                Item::Macro(m) => {
                    if let Some(ident) = &m.ident {
                        data.declare(ident, SymbolKind::Macro, &Visibility::Inherited, Slots::Macro);
                    }
                }
                Item::Mod(m) => {
                    data.declare(&m.ident, SymbolKind::Module, &m.vis, Slots::Type);
                    if let Some((_, content)) = &m.content {
                        let mut child = module.clone();
                        child.push(m.ident.to_string());
                        nested.push((child, content));
                    }
                }
                Item::Use(u) => {
                    data.flatten_use(&mut Vec::new(), u.leading_colon.is_some(), &u.tree);
                }
                Item::ExternCrate(e) if e.ident != "self" => {
                    let name = e.ident.to_string();
                    let alias = e
                        .rename
                        .as_ref()
                        .map_or_else(|| name.clone(), |(_, rename)| rename.to_string());
                    data.imports.insert(
                        alias,
                        UsePath {
                            leading_colon: true,
                            segments: vec![name.clone()],
                        },
                    );
                    self.table.extern_crates.insert(name);
                }
                _ => {}
            }
        }

        for (child, content) in nested {
            self.collect_items(child, content);
        }
    }
}

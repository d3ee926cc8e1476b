//! Discovery of annotated declarations in a parsed file.

use std::path::PathBuf;
use syn::visit::{self, Visit};
use syn::{Attribute, Block, ImplItem, Item, ItemImpl, ItemMod, ItemTrait, TraitItem};

use crate::context::FileContext;
use crate::marker::MarkerMatcher;
use crate::scope::{
    impl_item_attrs, item_attrs, trait_item_attrs, DeclItem, ModuleSegment, ScopeDescriptor,
};
use crate::strip::find_marker;
use crate::symbols::SymbolTable;
use crate::types::Location;

/// One annotated item together with everything needed to rebuild it.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Source file, relative to the crate root.
    pub file: PathBuf,
    /// Location of the declared name.
    pub location: Location,
    /// The item as parsed.
    pub item: DeclItem,
    /// Enclosing scopes, outermost first.
    pub scopes: Vec<ScopeDescriptor>,
}

impl Declaration {
    /// Module path below `crate` the item is declared in.
    #[must_use]
    pub fn module_path(&self) -> Vec<String> {
        crate::scope::module_path(&self.scopes)
    }
}

/// Finds the annotated declarations of one file, in source order.
///
/// Items inside function bodies are not visited.
#[must_use]
pub fn collect(
    ctx: &FileContext<'_>,
    file: &syn::File,
    table: &SymbolTable,
    matcher: &MarkerMatcher,
) -> Vec<Declaration> {
    let mut collector = DeclarationCollector::new(ctx, table, matcher);
    collector.visit_file(file);
    collector.found
}

struct DeclarationCollector<'a> {
    table: &'a SymbolTable,
    matcher: &'a MarkerMatcher,
    file: PathBuf,
    module: Vec<String>,
    scopes: Vec<ScopeDescriptor>,
    found: Vec<Declaration>,
}

impl<'a> DeclarationCollector<'a> {
    fn new(ctx: &FileContext<'_>, table: &'a SymbolTable, matcher: &'a MarkerMatcher) -> Self {
        let module = ctx.module_path.clone();
        let segments = (1..=module.len())
            .map(|depth| {
                let vis = table.module_visibility(&module[..depth]).unwrap_or_default();
                ModuleSegment::new(module[depth - 1].clone(), vis)
            })
            .collect();
        Self {
            table,
            matcher,
            file: ctx.relative_path.clone(),
            module,
            scopes: vec![ScopeDescriptor::File(segments)],
            found: Vec::new(),
        }
    }

    fn is_marked(&self, attrs: &[Attribute]) -> bool {
        find_marker(attrs, |path| {
            self.matcher.is_marker(self.table, &self.module, path)
        })
        .is_some()
    }

    fn record(&mut self, item: DeclItem) {
        let Some(ident) = item.ident() else {
            return;
        };
        let location = Location::from_span(self.file.clone(), ident.span());
        self.found.push(Declaration {
            file: self.file.clone(),
            location,
            item,
            scopes: self.scopes.clone(),
        });
    }
}

impl<'ast> Visit<'ast> for DeclarationCollector<'_> {
    fn visit_item(&mut self, node: &'ast Item) {
        if self.is_marked(item_attrs(node)) {
            self.record(DeclItem::Item(node.clone()));
        }
        visit::visit_item(self, node);
    }

    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        let Some((_, items)) = &node.content else {
            return;
        };
        let vis = quote::ToTokens::to_token_stream(&node.vis).to_string();
        self.scopes
            .push(ScopeDescriptor::Block(ModuleSegment::new(node.ident.to_string(), vis)));
        self.module.push(node.ident.to_string());
        for item in items {
            self.visit_item(item);
        }
        self.module.pop();
        self.scopes.pop();
    }

    fn visit_item_impl(&mut self, node: &'ast ItemImpl) {
        let mut header = node.clone();
        header.items.clear();
        self.scopes.push(ScopeDescriptor::Impl(Box::new(header)));
        for item in &node.items {
            self.visit_impl_item(item);
        }
        self.scopes.pop();
    }

    fn visit_impl_item(&mut self, node: &'ast ImplItem) {
        if self.is_marked(impl_item_attrs(node)) {
            self.record(DeclItem::Impl(node.clone()));
        }
    }

    fn visit_item_trait(&mut self, node: &'ast ItemTrait) {
        let mut header = node.clone();
        header.items.clear();
        self.scopes.push(ScopeDescriptor::Trait(Box::new(header)));
        for item in &node.items {
            self.visit_trait_item(item);
        }
        self.scopes.pop();
    }

    fn visit_trait_item(&mut self, node: &'ast TraitItem) {
        if self.is_marked(trait_item_attrs(node)) {
            self.record(DeclItem::Trait(node.clone()));
        }
    }

    fn visit_block(&mut self, _node: &'ast Block) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeKind;
    use std::path::Path;
    use syn::parse_quote;

    fn run(path: &str, file: &syn::File, root: &syn::File) -> Vec<Declaration> {
        let ctx = FileContext::new(Path::new(path), "");
        let matcher = MarkerMatcher::new(["verbatim::literal"]);
        let table = SymbolTable::builder()
            .extern_crate("verbatim")
            .file(&[], root)
            .file(&ctx.module_path, file)
            .build();
        collect(&ctx, file, &table, &matcher)
    }

    #[test]
    fn finds_items_in_source_order_with_scopes() {
        let root: syn::File = parse_quote!(pub mod shapes;);
        let file: syn::File = parse_quote! {
            use verbatim::literal;

            #[literal("a::B")]
            pub struct First;

            pub(crate) mod inner {
                #[verbatim::literal("a::B")]
                pub enum Second { X }
            }

            pub struct Wrapper;

            impl Wrapper {
                #[literal("a::B")]
                pub fn third(&self) {}
                pub fn unmarked(&self) {}
            }

            fn body() {
                #[literal("a::B")]
                struct Hidden;
            }
        };
        let found = run("src/shapes.rs", &file, &root);
        let names: Vec<String> = found
            .iter()
            .map(|d| d.item.ident().map(ToString::to_string).unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["First", "Second", "third"]);

        assert_eq!(found[0].module_path(), vec!["shapes"]);
        match &found[0].scopes[0] {
            ScopeDescriptor::File(segments) => {
                assert_eq!(segments, &vec![ModuleSegment::new("shapes", "pub")]);
            }
            other => panic!("unexpected scope {other:?}"),
        }

        assert_eq!(found[1].module_path(), vec!["shapes", "inner"]);
        assert_eq!(found[1].scopes[1].kind(), ScopeKind::Block);

        assert_eq!(found[2].scopes.len(), 2);
        assert_eq!(found[2].scopes[1].kind(), ScopeKind::Type);
        assert_eq!(found[2].location.file, PathBuf::from("src/shapes.rs"));
    }

    #[test]
    fn local_macros_with_the_same_name_are_not_markers() {
        let root: syn::File = parse_quote! {
            macro_rules! literal { ($($t:tt)*) => {} }
            #[literal("a::B")]
            struct NotMarked;
        };
        assert!(run("src/lib.rs", &root, &root).is_empty());
    }

    #[test]
    fn trait_items_get_trait_scope() {
        let root: syn::File = parse_quote! {
            pub trait Shape {
                #[verbatim::literal("a::B")]
                fn area(&self) -> f64;
            }
        };
        let found = run("src/lib.rs", &root, &root);
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0].scopes[1], ScopeDescriptor::Trait(_)));
        assert!(matches!(found[0].item, DeclItem::Trait(_)));
    }
}

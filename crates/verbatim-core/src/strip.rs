//! Marker attribute removal.

use quote::quote;
use syn::parse::ParseStream;
use syn::punctuated::Punctuated;
use syn::{Attribute, Meta, MetaList, Path, Token};

/// Splits `cfg_attr(predicate, a, b, ...)` into its predicate and attributes.
#[must_use]
pub fn cfg_attr_parts(list: &MetaList) -> Option<(Meta, Punctuated<Meta, Token![,]>)> {
    list.parse_args_with(|input: ParseStream<'_>| {
        let predicate: Meta = input.parse()?;
        input.parse::<Token![,]>()?;
        let metas = Punctuated::<Meta, Token![,]>::parse_terminated(input)?;
        Ok((predicate, metas))
    })
    .ok()
}

fn is_cfg_attr(list: &MetaList) -> bool {
    list.path.is_ident("cfg_attr")
}

/// Returns the attributes without any marker application.
///
/// Markers nested in `cfg_attr` groups are removed from the group, and a
/// group left without attributes is dropped. Everything else keeps its
/// position and its original tokens.
#[must_use]
pub fn strip_marker(attrs: &[Attribute], is_marker: impl Fn(&Path) -> bool) -> Vec<Attribute> {
    attrs
        .iter()
        .filter_map(|attr| {
            let meta = strip_meta(&attr.meta, &is_marker)?;
            let mut kept = attr.clone();
            kept.meta = meta;
            Some(kept)
        })
        .collect()
}

fn strip_meta(meta: &Meta, is_marker: &impl Fn(&Path) -> bool) -> Option<Meta> {
    if is_marker(meta.path()) {
        return None;
    }
    let Meta::List(list) = meta else {
        return Some(meta.clone());
    };
    if !is_cfg_attr(list) {
        return Some(meta.clone());
    }
    let Some((predicate, metas)) = cfg_attr_parts(list) else {
        return Some(meta.clone());
    };

    let kept: Punctuated<Meta, Token![,]> = metas
        .iter()
        .filter_map(|m| strip_meta(m, is_marker))
        .collect();
    if kept.is_empty() {
        return None;
    }
    if kept.len() == metas.len() && kept == metas {
        return Some(meta.clone());
    }

    let mut list = list.clone();
    list.tokens = quote!(#predicate, #kept);
    Some(Meta::List(list))
}

/// Returns the first marker application, looking inside `cfg_attr` groups.
#[must_use]
pub fn find_marker(attrs: &[Attribute], is_marker: impl Fn(&Path) -> bool) -> Option<Meta> {
    attrs
        .iter()
        .find_map(|attr| find_in_meta(&attr.meta, &is_marker))
}

fn find_in_meta(meta: &Meta, is_marker: &impl Fn(&Path) -> bool) -> Option<Meta> {
    if is_marker(meta.path()) {
        return Some(meta.clone());
    }
    match meta {
        Meta::List(list) if is_cfg_attr(list) => {
            let (_, metas) = cfg_attr_parts(list)?;
            metas.iter().find_map(|m| find_in_meta(m, is_marker))
        }
        _ => None,
    }
}

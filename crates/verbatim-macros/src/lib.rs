//! # verbatim-macros
//!
//! The `#[literal]` marker attribute.
//!
//! The attribute does nothing at compile time beyond checking its own
//! arguments. The build-time generator finds it by path and embeds the
//! source of the annotated item as a string constant on the target type.

#![forbid(unsafe_code)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Expr, Token};

/// Named arguments accepted after the target.
const FIELD_NAME_KEYS: &[&str] = &["field_name", "FieldName"];

/// Marks an item whose source is embedded on a target type.
///
/// ```rust,ignore
/// use verbatim::literal;
///
/// #[literal("app::resources::Strings")]
/// pub struct Greeting { pub text: String }
///
/// #[literal("app::resources::Strings", field_name = "[Namespace]_[Class]")]
/// pub fn greet() -> String { "hello".to_string() }
/// ```
///
/// The target names a type of the current crate, relative to the crate
/// root. `field_name` names the generated constant and may use the
/// `[Namespace]`, `[Class]` and `[FullName]` placeholders; it defaults to
/// `Text`.
///
/// The item is passed through unchanged.
#[proc_macro_attribute]
pub fn literal(attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = TokenStream2::from(item);
    match check_args(attr.into()) {
        Ok(()) => item.into(),
        Err(e) => {
            let error = e.to_compile_error();
            quote! {
                #error
                #item
            }
            .into()
        }
    }
}

fn check_args(attr: TokenStream2) -> syn::Result<()> {
    let args = Punctuated::<Expr, Token![,]>::parse_terminated.parse2(attr)?;
    for arg in args.iter().skip(1) {
        let Expr::Assign(assign) = arg else {
            return Err(syn::Error::new_spanned(
                arg,
                "expected `field_name = \"...\"`",
            ));
        };
        let known = matches!(
            &*assign.left,
            Expr::Path(p) if p.path.get_ident().is_some_and(|i| FIELD_NAME_KEYS.iter().any(|k| i == k))
        );
        if !known {
            return Err(syn::Error::new_spanned(
                &assign.left,
                "unknown argument; expected `field_name`",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_target_and_field_name() {
        assert!(check_args(quote!("a::B")).is_ok());
        assert!(check_args(quote!("a::B", field_name = "X")).is_ok());
        assert!(check_args(quote!("a::B", FieldName = "[Class]")).is_ok());
    }

    #[test]
    fn rejects_unknown_arguments() {
        let err = check_args(quote!("a::B", name = "X")).unwrap_err();
        assert!(err.to_string().contains("unknown argument"));
        assert!(check_args(quote!("a::B", "X")).is_err());
    }
}

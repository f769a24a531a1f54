//! Derive and attribute macros used to wire up interceptor chain links.
//!
//! An interceptor chain is a stack of `Protocol`-shaped types, each wrapping
//! an inner layer in a field conventionally named `inner`. Most links only
//! care about a handful of the chain's hooks (say, `handle_read` and
//! `poll_timeout`) and want every other hook to fall through to `inner`
//! unchanged. These two macros generate that boilerplate:
//!
//! - `#[derive(Interceptor)]` goes on the struct and registers `#[next]` as
//!   a recognized (but otherwise inert) field attribute, so the field that
//!   holds the next link in the chain can be marked for documentation.
//! - `#[interceptor]` goes on the struct's `impl` block. Methods marked
//!   `#[overrides]` are kept as written; every other required hook is
//!   synthesized as a passthrough to `self.inner`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Fields, ImplItem, ImplItemFn, ItemImpl, parse_macro_input, spanned::Spanned,
};

/// Marks the field that holds the next interceptor in the chain.
///
/// Purely documentary: `#[interceptor]` always calls through `self.inner`,
/// but declaring the field with `#[next]` makes the chain's shape visible
/// at the struct definition instead of only inside the impl block.
#[proc_macro_derive(Interceptor, attributes(next))]
pub fn derive_interceptor(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return syn::Error::new(input.span(), "Interceptor can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let has_next = match fields {
        Fields::Named(named) => named
            .named
            .iter()
            .any(|f| f.attrs.iter().any(|a| a.path().is_ident("next"))),
        _ => false,
    };

    if !has_next {
        return syn::Error::new(
            input.span(),
            "Interceptor derive requires exactly one field marked #[next]",
        )
        .to_compile_error()
        .into();
    }

    // The `#[interceptor]` attribute macro does the real codegen; this
    // derive only needs to exist so `#[next]` is a legal helper attribute.
    TokenStream::new()
}

const PROTOCOL_HOOKS: &[&str] = &[
    "handle_read",
    "poll_read",
    "handle_write",
    "poll_write",
    "handle_timeout",
    "poll_timeout",
];

const INTERCEPTOR_HOOKS: &[&str] = &[
    "bind_local_stream",
    "unbind_local_stream",
    "bind_remote_stream",
    "unbind_remote_stream",
];

fn default_hook(name: &str) -> ImplItemFn {
    let ident = syn::Ident::new(name, proc_macro2::Span::call_site());
    let body: syn::Block = match name {
        "handle_read" | "handle_write" => {
            syn::parse_quote!({ self.inner.#ident(msg) })
        }
        "poll_read" | "poll_write" => {
            syn::parse_quote!({ self.inner.#ident() })
        }
        "handle_timeout" => syn::parse_quote!({ self.inner.handle_timeout(now) }),
        "poll_timeout" => syn::parse_quote!({ self.inner.poll_timeout() }),
        "bind_local_stream" | "bind_remote_stream" | "unbind_local_stream"
        | "unbind_remote_stream" => {
            syn::parse_quote!({ self.inner.#ident(info) })
        }
        _ => unreachable!("unknown interceptor hook {name}"),
    };

    let sig: syn::Signature = match name {
        "handle_read" => syn::parse_quote!(fn handle_read(&mut self, msg: crate::TaggedPacket) -> Result<(), Self::Error>),
        "handle_write" => syn::parse_quote!(fn handle_write(&mut self, msg: crate::TaggedPacket) -> Result<(), Self::Error>),
        "poll_read" => syn::parse_quote!(fn poll_read(&mut self) -> Option<Self::Rout>),
        "poll_write" => syn::parse_quote!(fn poll_write(&mut self) -> Option<Self::Wout>),
        "handle_timeout" => syn::parse_quote!(fn handle_timeout(&mut self, now: Self::Time) -> Result<(), Self::Error>),
        "poll_timeout" => syn::parse_quote!(fn poll_timeout(&mut self) -> Option<Self::Time>),
        "bind_local_stream" => syn::parse_quote!(fn bind_local_stream(&mut self, info: &crate::stream_info::StreamInfo)),
        "unbind_local_stream" => syn::parse_quote!(fn unbind_local_stream(&mut self, info: &crate::stream_info::StreamInfo)),
        "bind_remote_stream" => syn::parse_quote!(fn bind_remote_stream(&mut self, info: &crate::stream_info::StreamInfo)),
        "unbind_remote_stream" => syn::parse_quote!(fn unbind_remote_stream(&mut self, info: &crate::stream_info::StreamInfo)),
        _ => unreachable!("unknown interceptor hook {name}"),
    };

    syn::parse_quote!(#sig #body)
}

/// Splits the impl block's methods (minus their `#[overrides]` marker) into
/// the Protocol-hook subset and the Interceptor-hook subset, each filled out
/// with passthrough defaults for hooks the author didn't override.
#[proc_macro_attribute]
pub fn interceptor(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(item as ItemImpl);

    let mut overridden: Vec<ImplItemFn> = Vec::new();
    let mut other_items: Vec<ImplItem> = Vec::new();

    for item in input.items.drain(..) {
        match item {
            ImplItem::Fn(mut f) => {
                let was_override = f
                    .attrs
                    .iter()
                    .any(|a| a.path().is_ident("overrides"));
                f.attrs.retain(|a| !a.path().is_ident("overrides"));
                if was_override {
                    overridden.push(f);
                } else {
                    other_items.push(ImplItem::Fn(f));
                }
            }
            other => other_items.push(other),
        }
    }

    let mut protocol_fns: Vec<ImplItemFn> = Vec::new();
    let mut interceptor_fns: Vec<ImplItemFn> = Vec::new();

    for name in PROTOCOL_HOOKS {
        if let Some(pos) = overridden.iter().position(|f| f.sig.ident == name) {
            protocol_fns.push(overridden.remove(pos));
        } else {
            protocol_fns.push(default_hook(name));
        }
    }
    for name in INTERCEPTOR_HOOKS {
        if let Some(pos) = overridden.iter().position(|f| f.sig.ident == name) {
            interceptor_fns.push(overridden.remove(pos));
        } else {
            interceptor_fns.push(default_hook(name));
        }
    }

    for leftover in &overridden {
        return syn::Error::new(
            leftover.sig.ident.span(),
            format!(
                "`{}` is not a recognized interceptor hook",
                leftover.sig.ident
            ),
        )
        .to_compile_error()
        .into();
    }

    let self_ty = &input.self_ty;
    let generics = &input.generics;
    let (impl_generics, _ty_generics, where_clause) = generics.split_for_impl();

    let inherent_impl = if other_items.is_empty() {
        quote! {}
    } else {
        quote! {
            impl #impl_generics #self_ty #where_clause {
                #(#other_items)*
            }
        }
    };

    let expanded = quote! {
        impl #impl_generics ::sansio::Protocol<crate::TaggedPacket, crate::TaggedPacket, ()> for #self_ty #where_clause {
            type Rout = crate::TaggedPacket;
            type Wout = crate::TaggedPacket;
            type Eout = ();
            type Error = shared::error::Error;
            type Time = std::time::Instant;

            #(#protocol_fns)*
        }

        impl #impl_generics crate::Interceptor for #self_ty #where_clause {
            #(#interceptor_fns)*
        }

        #inherent_impl
    };

    expanded.into()
}

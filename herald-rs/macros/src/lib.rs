//! Derive macros for herald-rs. Use `#[derive(Command)]`, `#[derive(Query)]` and `#[derive(Injectable)]`
//! instead of writing the trait impls by hand.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Field, Fields, Generics, Type};

/// Implements `herald_rs::Command`.
///
/// `#[command(handler = MyHandler<T>)]` names the open-generic handler definition that services this
/// command (and every instantiation of it) once registered.
#[proc_macro_derive(Command, attributes(command))]
pub fn derive_command(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_command(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Implements `herald_rs::Query`. Requires `#[query(result = Type)]`; accepts `handler = Type` like `Command`.
#[proc_macro_derive(Query, attributes(query))]
pub fn derive_query(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_query(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Implements `herald_rs::Injectable` and `herald_rs::Service` for a struct.
/// Every field is resolved as a `herald_rs::Dependency`; `#[inject(default)]` uses `Default` instead.
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_injectable(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct MessageArgs {
    result: Option<Type>,
    handler: Option<Type>,
}

fn message_args(attrs: &[Attribute], attr_name: &str, allow_result: bool) -> syn::Result<MessageArgs> {
    let mut args = MessageArgs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident(attr_name)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("handler") {
                args.handler = Some(meta.value()?.parse()?);
                Ok(())
            } else if allow_result && meta.path.is_ident("result") {
                args.result = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported attribute argument"))
            }
        })?;
    }
    Ok(args)
}

/// Messages and injectables are shared across tasks: every type parameter must be `Send + Sync + 'static`.
fn add_bounds(generics: &mut Generics) {
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::core::marker::Send));
        param.bounds.push(parse_quote!(::core::marker::Sync));
        param.bounds.push(parse_quote!('static));
    }
}

fn expand_command(input: DeriveInput) -> syn::Result<TokenStream2> {
    let args = message_args(&input.attrs, "command", false)?;
    let name = &input.ident;
    let mut generics = input.generics.clone();
    add_bounds(&mut generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let open_handler = args.handler.map(|handler| {
        quote! {
            fn open_handler() -> ::core::option::Option<
                ::herald_rs::Specialization<dyn ::herald_rs::CommandHandler<Self>>,
            > {
                ::core::option::Option::Some(::herald_rs::open_command_handler::<Self, #handler>())
            }
        }
    });
    Ok(quote! {
        impl #impl_generics ::herald_rs::Command for #name #ty_generics #where_clause {
            #open_handler
        }
    })
}

fn expand_query(input: DeriveInput) -> syn::Result<TokenStream2> {
    let args = message_args(&input.attrs, "query", true)?;
    let name = &input.ident;
    let result = args.result.ok_or_else(|| {
        syn::Error::new_spanned(name, "#[derive(Query)] requires #[query(result = Type)]")
    })?;
    let mut generics = input.generics.clone();
    add_bounds(&mut generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let open_handler = args.handler.map(|handler| {
        quote! {
            fn open_handler() -> ::core::option::Option<
                ::herald_rs::Specialization<dyn ::herald_rs::QueryHandler<Self>>,
            > {
                ::core::option::Option::Some(::herald_rs::open_query_handler::<Self, #handler>())
            }
        }
    });
    Ok(quote! {
        impl #impl_generics ::herald_rs::Query for #name #ty_generics #where_clause {
            type Result = #result;
            #open_handler
        }
    })
}

fn field_value(field: &Field) -> syn::Result<TokenStream2> {
    let mut use_default = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("inject")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                use_default = true;
                Ok(())
            } else {
                Err(meta.error("expected `default`"))
            }
        })?;
    }
    let ty = &field.ty;
    Ok(if use_default {
        quote! { <#ty as ::core::default::Default>::default() }
    } else {
        quote! { <#ty as ::herald_rs::Dependency>::resolve(scope)? }
    })
}

fn expand_injectable(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(name, "#[derive(Injectable)] supports structs only"));
    };
    let construct = match &data.fields {
        Fields::Named(fields) => {
            let inits = fields
                .named
                .iter()
                .map(|field| {
                    let ident = &field.ident;
                    let value = field_value(field)?;
                    Ok(quote! { #ident: #value })
                })
                .collect::<syn::Result<Vec<_>>>()?;
            quote! { Self { #(#inits),* } }
        }
        Fields::Unnamed(fields) => {
            let values = fields
                .unnamed
                .iter()
                .map(field_value)
                .collect::<syn::Result<Vec<_>>>()?;
            quote! { Self(#(#values),*) }
        }
        Fields::Unit => quote! { Self },
    };
    let mut generics = input.generics.clone();
    add_bounds(&mut generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::herald_rs::Injectable for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn inject(
                scope: &::herald_rs::Scope,
            ) -> ::core::result::Result<Self, ::herald_rs::ContainerError> {
                ::core::result::Result::Ok(#construct)
            }
        }

        impl #impl_generics ::herald_rs::Service for #name #ty_generics #where_clause {
            fn register_default(container: &mut ::herald_rs::Container) {
                container.register_injectable::<Self>(::herald_rs::Lifetime::Transient);
            }
        }
    })
}

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Attribute, FnArg, ImplItem, ImplItemFn, ItemImpl, LitStr, Path, Token, Type, bracketed,
    parse::{Parse, ParseStream, Result},
    punctuated::Punctuated,
};

// ─── Input AST types ─────────────────────────────────────────────────────────

/// Arguments of `#[command_handlers(...)]`.
pub struct ProviderOptions {
    krate: Option<Path>,
}

/// Arguments of one `#[command(...)]` method attribute.
#[derive(Default)]
struct CommandAttr {
    name: Option<LitStr>,
    description: Option<LitStr>,
    aliases: Vec<LitStr>,
    args: Vec<LitStr>,
}

/// How a command method receives its instance.
enum Receiver {
    None,
    Ref,
    Arc,
}

// ─── Parsing ──────────────────────────────────────────────────────────────────

impl Parse for ProviderOptions {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut options = ProviderOptions { krate: None };
        while !input.is_empty() {
            if input.peek(Token![crate]) {
                input.parse::<Token![crate]>()?;
                input.parse::<Token![=]>()?;
                let path: LitStr = input.parse()?;
                options.krate = Some(path.parse()?);
            } else {
                return Err(input.error("unknown option; expected `crate = \"...\"`"));
            }
            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(options)
    }
}

/// Parse `[ "…", … ]`.
fn parse_str_list(input: ParseStream) -> Result<Vec<LitStr>> {
    let content;
    bracketed!(content in input);
    let items: Punctuated<LitStr, Token![,]> =
        content.parse_terminated(<LitStr as Parse>::parse, Token![,])?;
    Ok(items.into_iter().collect())
}

fn parse_command_attr(attr: &Attribute) -> Result<CommandAttr> {
    let mut out = CommandAttr::default();
    // A bare `#[command]` uses every default.
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(out);
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            out.name = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("description") {
            out.description = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("aliases") {
            out.aliases.extend(parse_str_list(meta.value()?)?);
        } else if meta.path.is_ident("alias") {
            out.aliases.push(meta.value()?.parse()?);
        } else if meta.path.is_ident("args") {
            out.args = parse_str_list(meta.value()?)?;
        } else {
            return Err(meta.error(
                "unknown command attribute; expected name, description, aliases, alias, or args",
            ));
        }
        Ok(())
    })?;
    Ok(out)
}

fn is_command_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("command")
}

fn receiver_kind(method: &ImplItemFn) -> Result<Receiver> {
    let Some(FnArg::Receiver(receiver)) = method.sig.inputs.first() else {
        return Ok(Receiver::None);
    };

    let error = || {
        syn::Error::new_spanned(
            receiver,
            "command methods take `&self`, `self: Arc<Self>` or no receiver",
        )
    };

    if receiver.colon_token.is_some() {
        match &*receiver.ty {
            Type::Path(path)
                if path
                    .path
                    .segments
                    .last()
                    .is_some_and(|segment| segment.ident == "Arc") =>
            {
                Ok(Receiver::Arc)
            }
            _ => Err(error()),
        }
    } else if receiver.reference.is_some() && receiver.mutability.is_none() {
        Ok(Receiver::Ref)
    } else {
        Err(error())
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Extract the text of `#[doc = "…"]` attributes and join with newlines.
/// Returns `None` when there are no doc attrs.
fn doc_attrs_to_string(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(nv) => match &nv.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) => Some(s.value().trim().to_owned()),
                _ => None,
            },
            _ => None,
        })
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n").trim().to_owned())
    }
}

// ─── Code generation ──────────────────────────────────────────────────────────

fn command_tokens(fw: &TokenStream, method: &ImplItemFn, attr: CommandAttr) -> Result<TokenStream> {
    if !method.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &method.sig.generics,
            "command methods cannot be generic",
        ));
    }

    let receiver = receiver_kind(method)?;
    let ident = &method.sig.ident;
    let method_name = ident.to_string();

    let name = attr
        .name
        .unwrap_or_else(|| LitStr::new(&method_name, ident.span()));
    let description = match (attr.description, doc_attrs_to_string(&method.attrs)) {
        (Some(description), _) => quote! { #description },
        (None, Some(doc)) => quote! { #doc },
        (None, None) => quote! { "" },
    };

    let params: Vec<&Type> = method
        .sig
        .inputs
        .iter()
        .filter_map(|input| match input {
            FnArg::Typed(pat_type) => Some(&*pat_type.ty),
            FnArg::Receiver(_) => None,
        })
        .collect();
    let idents: Vec<_> = (0..params.len()).map(|i| format_ident!("__arg{i}")).collect();

    let call = match receiver {
        Receiver::None => quote! { Self::#ident(#(#idents),*) },
        Receiver::Ref => quote! { Self::#ident(&__this, #(#idents),*) },
        Receiver::Arc => quote! { Self::#ident(__this, #(#idents),*) },
    };
    let call = if method.sig.asyncness.is_some() {
        quote! { #call.await }
    } else {
        call
    };

    let handler = match receiver {
        Receiver::None => quote! {
            #fw::HandlerRef::named(
                ::std::format!("{}::{}", ::std::any::type_name::<Self>(), #method_name),
                move |#(#idents: #params),*| async move { #call },
            )
        },
        Receiver::Ref | Receiver::Arc => quote! {
            #fw::HandlerRef::method(
                ::std::sync::Arc::clone(&self),
                #method_name,
                move |__this: ::std::sync::Arc<Self>, #(#idents: #params),*| async move { #call },
            )
        },
    };

    let aliases = &attr.aliases;
    let with_aliases = (!aliases.is_empty()).then(|| quote! { .with_aliases([#(#aliases),*]) });
    let args = &attr.args;
    let try_args = (!args.is_empty()).then(|| quote! { .try_args([#(#args),*])? });

    Ok(quote! {
        #fw::Command::new(#name, #handler)
            .describe(#description)
            #with_aliases
            #try_args
    })
}

pub fn expand(options: ProviderOptions, mut item: ItemImpl) -> Result<TokenStream> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[command_handlers] must be applied to an inherent impl block",
        ));
    }

    let fw = match &options.krate {
        Some(path) => quote! { #path },
        None => quote! { ::herald::framework },
    };

    let mut commands = Vec::new();
    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };

        let (command_attrs, other_attrs): (Vec<_>, Vec<_>) =
            method.attrs.drain(..).partition(is_command_attr);
        method.attrs = other_attrs;

        match command_attrs.as_slice() {
            [] => {}
            [attr] => {
                let parsed = parse_command_attr(attr)?;
                commands.push(command_tokens(&fw, method, parsed)?);
            }
            [_, extra, ..] => {
                return Err(syn::Error::new_spanned(
                    extra,
                    "a method can carry only one #[command] attribute",
                ));
            }
        }
    }

    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();

    Ok(quote! {
        #item

        impl #impl_generics #fw::CommandProvider for #self_ty #where_clause {
            fn commands(
                self: ::std::sync::Arc<Self>,
            ) -> ::std::result::Result<::std::vec::Vec<#fw::Command>, #fw::RegistryError> {
                ::std::result::Result::Ok(::std::vec![#(#commands),*])
            }
        }
    })
}

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{
    parse_macro_input, parse_quote, spanned::Spanned, Data, DeriveInput, Fields, Lit, Meta,
    NestedMeta,
};

/// Implements `handoff::Job` for a non-generic type.
///
/// The job type name is `module_path!()::Ident`. `#[job(name = "..")]`
/// replaces it and `#[job(queue = "..")]` replaces the derived queue name.
#[proc_macro_derive(Job, attributes(job))]
pub fn derive_job(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(JobImpl::parse(input))
}

/// Implements `handoff::JobArgs` for a struct with named fields.
///
/// Every field is written under its own name unless marked
/// `#[arg(rename = "..")]` or `#[arg(skip)]`. On generic structs every
/// written field type gets a `ToArgText` bound.
#[proc_macro_derive(JobArgs, attributes(arg))]
pub fn derive_job_args(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(JobArgsImpl::parse(input))
}

/// Implements `handoff::ToArgText` for a fieldless enum, using the variant
/// name as text.
#[proc_macro_derive(ArgText)]
pub fn derive_arg_text(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(ArgTextImpl::parse(input))
}

fn expand<T: ToTokens>(parsed: syn::Result<T>) -> proc_macro::TokenStream {
    match parsed {
        Ok(def) => def.into_token_stream().into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// `key = "value"` pairs and bare flags of every `#[ident(..)]` attribute.
fn attr_items(
    attrs: &[syn::Attribute],
    ident: &str,
) -> syn::Result<Vec<(syn::Ident, Option<syn::LitStr>)>> {
    let mut items = Vec::new();

    for attr in attrs.iter().filter(|a| a.path.is_ident(ident)) {
        let list = match attr.parse_meta()? {
            Meta::List(list) => list,
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    format!("expected #[{}(...)]", ident),
                ))
            }
        };

        for nested in list.nested {
            match nested {
                NestedMeta::Meta(Meta::Path(path)) => {
                    items.push((path_ident(&path)?, None));
                }
                NestedMeta::Meta(Meta::NameValue(nv)) => match nv.lit {
                    Lit::Str(value) => items.push((path_ident(&nv.path)?, Some(value))),
                    other => {
                        return Err(syn::Error::new(other.span(), "expected a string literal"))
                    }
                },
                other => return Err(syn::Error::new(other.span(), "unsupported attribute")),
            }
        }
    }

    Ok(items)
}

fn path_ident(path: &syn::Path) -> syn::Result<syn::Ident> {
    path.get_ident()
        .cloned()
        .ok_or_else(|| syn::Error::new(path.span(), "expected an identifier"))
}

struct JobImpl {
    iden: syn::Ident,
    name: Option<syn::LitStr>,
    queue: Option<syn::LitStr>,
}

impl JobImpl {
    fn parse(input: DeriveInput) -> syn::Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new(
                input.generics.span(),
                "Job can not be derived for generic types",
            ));
        }

        let mut name = None;
        let mut queue = None;

        for (key, value) in attr_items(&input.attrs, "job")? {
            let value = value
                .ok_or_else(|| syn::Error::new(key.span(), "expected `key = \"value\"`"))?;
            if key == "name" {
                name = Some(value);
            } else if key == "queue" {
                queue = Some(value);
            } else {
                return Err(syn::Error::new(key.span(), "expected `name` or `queue`"));
            }
        }

        Ok(Self {
            iden: input.ident,
            name,
            queue,
        })
    }
}

impl ToTokens for JobImpl {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let iden = &self.iden;

        let job_type = match &self.name {
            Some(name) => quote! { ::handoff::JobType::new(#name) },
            None => quote! {
                ::handoff::JobType::new(::core::concat!(
                    module_path!(),
                    "::",
                    stringify!(#iden)
                ))
            },
        };
        let job_type = match &self.queue {
            Some(queue) => quote! { #job_type.with_queue(#queue) },
            None => job_type,
        };

        tokens.extend(quote! {
            impl ::handoff::Job for #iden {
                fn job_type() -> ::handoff::JobType {
                    #job_type
                }
            }
        })
    }
}

struct ArgField {
    member: syn::Ident,
    key: String,
}

struct JobArgsImpl {
    iden: syn::Ident,
    generics: syn::Generics,
    fields: Vec<ArgField>,
}

impl JobArgsImpl {
    fn parse(mut input: DeriveInput) -> syn::Result<Self> {
        let named = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
                Fields::Unit => Vec::new(),
                Fields::Unnamed(_) => {
                    return Err(syn::Error::new(
                        input.ident.span(),
                        "JobArgs needs named fields",
                    ))
                }
            },
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "JobArgs can only be derived for structs",
                ))
            }
        };

        let mut fields = Vec::new();
        let mut bounds: Vec<syn::WherePredicate> = Vec::new();
        for field in named {
            let member = field
                .ident
                .clone()
                .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?;
            let mut key = member.to_string().trim_start_matches("r#").to_string();
            let mut skip = false;

            for (attr, value) in attr_items(&field.attrs, "arg")? {
                match (attr.to_string().as_str(), value) {
                    ("skip", None) => skip = true,
                    ("rename", Some(value)) => key = value.value(),
                    _ => {
                        return Err(syn::Error::new(
                            attr.span(),
                            "expected `skip` or `rename = \"..\"`",
                        ))
                    }
                }
            }

            if !skip {
                let ty = &field.ty;
                bounds.push(parse_quote! { #ty: ::handoff::ToArgText });
                fields.push(ArgField { member, key });
            }
        }

        if input.generics.type_params().next().is_some() {
            input.generics.make_where_clause().predicates.extend(bounds);
        }

        Ok(Self {
            iden: input.ident,
            generics: input.generics,
            fields,
        })
    }
}

impl ToTokens for JobArgsImpl {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let iden = &self.iden;
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();
        let writes = self.fields.iter().map(|f| {
            let member = &f.member;
            let key = &f.key;
            quote! { args.field(#key, &self.#member); }
        });

        tokens.extend(quote! {
            impl #impl_generics ::handoff::JobArgs for #iden #ty_generics #where_clause {
                #[allow(unused_variables)]
                fn write_args(&self, args: &mut ::handoff::ArgsBuilder) {
                    #(#writes)*
                }
            }
        })
    }
}

struct ArgTextImpl {
    iden: syn::Ident,
    variants: Vec<syn::Ident>,
}

impl ArgTextImpl {
    fn parse(input: DeriveInput) -> syn::Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new(
                input.generics.span(),
                "ArgText can not be derived for generic enums",
            ));
        }

        let data = match input.data {
            Data::Enum(data) => data,
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "ArgText can only be derived for enums",
                ))
            }
        };

        let mut variants = Vec::new();
        for variant in data.variants {
            if !matches!(variant.fields, Fields::Unit) {
                return Err(syn::Error::new(
                    variant.span(),
                    "ArgText needs variants without fields",
                ));
            }
            variants.push(variant.ident);
        }

        if variants.is_empty() {
            return Err(syn::Error::new(
                input.ident.span(),
                "ArgText needs at least one variant",
            ));
        }

        Ok(Self {
            iden: input.ident,
            variants,
        })
    }
}

impl ToTokens for ArgTextImpl {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let iden = &self.iden;
        let arms = self.variants.iter().map(|v| {
            let text = v.to_string();
            quote! { #iden::#v => #text, }
        });

        tokens.extend(quote! {
            impl ::handoff::ToArgText for #iden {
                fn to_arg_text(
                    &self,
                ) -> ::core::result::Result<
                    ::core::option::Option<::std::string::String>,
                    ::handoff::args::ArgTextError,
                > {
                    let text = match self {
                        #(#arms)*
                    };
                    ::core::result::Result::Ok(::core::option::Option::Some(text.to_string()))
                }
            }
        })
    }
}

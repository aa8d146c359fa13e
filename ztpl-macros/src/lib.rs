//! Build time template compilation
//!
//! The macros turn a template into a plain Rust function returning `String`.
//! Code markers and expressions are Rust, output helpers come from
//! `::ztpl::helpers`, so these macros are used through the `ztpl` crate:
//!
//! ```rust,ignore
//! pub struct Page { title: String, items: Vec<String> }
//!
//! ztpl::str!("page", "<h1>[[= z.title ]]</h1>[[ for item in &z.items { ]]<p>[[- item ]]</p>[[ } ]]", z: Page);
//!
//! let html: String = page(&Page { title: "Hi".into(), items: vec![] });
//! ```

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use std::fs;
use std::path::{Path, PathBuf};
use syn::{
    Ident, LitStr, Token, Type,
    parse::{Parse, ParseStream},
    parse_macro_input,
};
use walkdir::WalkDir;
use ztpl_parser::{Delimiters, Program};

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            for lc in c.to_lowercase() {
                result.push(lc);
            }
        } else if c == '-' || c == '.' || c == ' ' {
            result.push('_');
        } else {
            result.push(c);
        }
    }
    result
}

/// Trailing macro arguments: `param: Type`, `start = ".."` and `end = ".."`
struct Options {
    param: Ident,
    ty: Type,
    start: Option<LitStr>,
    end: Option<LitStr>,
}

impl Options {
    fn delimiters(&self) -> Delimiters {
        Delimiters::new(
            &self.start.as_ref().map(LitStr::value).unwrap_or_default(),
            &self.end.as_ref().map(LitStr::value).unwrap_or_default(),
        )
    }
}

impl Parse for Options {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut options = Options {
            param: format_ident!("z"),
            ty: syn::parse_quote!(()),
            start: None,
            end: None,
        };
        while input.parse::<Option<Token![,]>>()?.is_some() && !input.is_empty() {
            let key: Ident = input.parse()?;
            if input.peek(Token![:]) {
                input.parse::<Token![:]>()?;
                options.param = key;
                options.ty = input.parse()?;
                continue;
            }
            input.parse::<Token![=]>()?;
            let value: LitStr = input.parse()?;
            match key.to_string().as_str() {
                "start" => options.start = Some(value),
                "end" => options.end = Some(value),
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("unknown option `{}`, expected `start` or `end`", other),
                    ));
                }
            }
        }
        if !input.is_empty() {
            return Err(input.error("expected `,`"));
        }
        Ok(options)
    }
}

fn generate_code_for_content(
    name: &str,
    content: &str,
    options: &Options,
    path_for_include: Option<&str>,
) -> syn::Result<proc_macro2::TokenStream> {
    let fn_name = syn::parse_str::<Ident>(&to_snake_case(name)).map_err(|_| {
        syn::Error::new(
            proc_macro2::Span::call_site(),
            format!("`{}` is not a valid function name", name),
        )
    })?;

    let delimiters = options.delimiters();
    let body = match Program::build(content, &delimiters) {
        Some(program) => program
            .to_rust()
            .parse::<proc_macro2::TokenStream>()
            .map_err(|err| {
                syn::Error::new(
                    proc_macro2::Span::call_site(),
                    format!("template `{}` does not generate valid Rust: {}", name, err),
                )
            })?,
        None => quote! { ::std::string::String::from(#content) },
    };

    let include_bytes_stmt = if let Some(path_str) = path_for_include {
        quote! {
            // ensure the compiler is aware the output is linked to the source so that any changes
            // to the template file will trigger a recompilation
            const _: &[u8] = include_bytes!(#path_str);
        }
    } else {
        quote! {}
    };

    let Options { param, ty, .. } = options;
    Ok(quote! {
        #include_bytes_stmt

        #[allow(unused_mut, unused_variables)]
        pub fn #fn_name(#param: &#ty) -> ::std::string::String {
            #body
        }
    })
}

fn generate_code_for_file(path: &Path, options: &Options) -> syn::Result<proc_macro2::TokenStream> {
    let file_stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let path_str = path.to_string_lossy();
    let content = fs::read_to_string(path).map_err(|err| {
        syn::Error::new(
            proc_macro2::Span::call_site(),
            format!("unable to read {:?}: {}", path, err),
        )
    })?;
    generate_code_for_content(&file_stem, &content, options, Some(&path_str))
}

/// Resolves `lit` against the manifest directory of the crate being built
fn manifest_path(lit: &LitStr) -> syn::Result<PathBuf> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map_err(|_| syn::Error::new(lit.span(), "CARGO_MANIFEST_DIR not set"))?;
    Ok(Path::new(&manifest_dir).join(lit.value()))
}

struct StrInput {
    name: LitStr,
    content: LitStr,
    options: Options,
}

impl Parse for StrInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: LitStr = input.parse()?;
        input.parse::<Token![,]>()?;
        let content: LitStr = input.parse()?;
        let options: Options = input.parse()?;
        Ok(StrInput {
            name,
            content,
            options,
        })
    }
}

struct PathInput {
    path: LitStr,
    options: Options,
}

impl Parse for PathInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let path: LitStr = input.parse()?;
        let options: Options = input.parse()?;
        Ok(PathInput { path, options })
    }
}

fn expand_directory(input: PathInput) -> syn::Result<proc_macro2::TokenStream> {
    let root_path = manifest_path(&input.path)?;
    if !root_path.is_dir() {
        return Err(syn::Error::new(
            input.path.span(),
            format!("Directory not found: {:?}", root_path),
        ));
    }

    let mut functions = Vec::new();
    for entry in WalkDir::new(&root_path).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "ztpl") {
            functions.push(generate_code_for_file(path, &input.options)?);
        }
    }

    Ok(quote! {
        #(#functions)*
    })
}

fn expand_file(input: PathInput) -> syn::Result<proc_macro2::TokenStream> {
    let path = manifest_path(&input.path)?;
    if !path.is_file() {
        return Err(syn::Error::new(
            input.path.span(),
            format!("File not found: {:?}", path),
        ));
    }
    generate_code_for_file(&path, &input.options)
}

#[proc_macro]
pub fn ztpl_directory(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as PathInput);
    expand_directory(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro]
pub fn ztpl_file(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as PathInput);
    expand_file(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro]
pub fn ztpl_str(input: TokenStream) -> TokenStream {
    let StrInput {
        name,
        content,
        options,
    } = parse_macro_input!(input as StrInput);
    generate_code_for_content(&name.value(), &content.value(), &options, None)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_names() {
        assert_eq!(to_snake_case("BlogPost"), "blog_post");
        assert_eq!(to_snake_case("site-header"), "site_header");
        assert_eq!(to_snake_case("index"), "index");
    }

    #[test]
    fn default_options() {
        let input: StrInput = syn::parse_str(r#""hello", "Hi [[- z ]]""#).unwrap();
        assert_eq!(input.name.value(), "hello");
        assert_eq!(input.options.param, "z");
        assert_eq!(input.options.delimiters(), Delimiters::default());
    }

    #[test]
    fn all_options() {
        let input: StrInput = syn::parse_str(
            r#""hello", "<%- data.name %>", data: crate::Person, start = "<%", end = "%>","#,
        )
        .unwrap();
        assert_eq!(input.options.param, "data");
        let ty = &input.options.ty;
        assert_eq!(quote!(#ty).to_string(), "crate :: Person");
        assert_eq!(input.options.delimiters(), Delimiters::new("<%", "%>"));
    }

    #[test]
    fn unknown_option() {
        let err = syn::parse_str::<PathInput>(r#""templates", begin = "<%""#)
            .err()
            .unwrap();
        assert!(err.to_string().contains("unknown option `begin`"));
    }

    #[test]
    fn generated_function() {
        let options: Options = syn::parse_str(", person: Person").unwrap();
        let code = generate_code_for_content("Card", "<b>[[= person.name ]]</b>", &options, None)
            .unwrap()
            .to_string();
        assert!(code.contains("fn card"));
        assert!(code.contains("escape_html"));
    }

    #[test]
    fn static_template() {
        let options: Options = syn::parse_str("").unwrap();
        let code = generate_code_for_content("plain", "no markers", &options, None)
            .unwrap()
            .to_string();
        assert!(code.contains("\"no markers\""));
    }

    #[test]
    fn invalid_rust_is_an_error() {
        let options: Options = syn::parse_str("").unwrap();
        assert!(generate_code_for_content("broken", "[[ { ]]", &options, None).is_err());
        assert!(generate_code_for_content("1bad", "text", &options, None).is_err());
    }
}

//! Proc-macro for generating strongly-typed error catalogs from JSON.
//!
//! The macro reads a JSON file at compile time, validates the definitions,
//! and generates a closed `ErrorCode` enum with status, catalog entry and
//! reverse lookup.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use serde::Deserialize;
use syn::parse::{Parse, ParseStream};
use syn::{parse_macro_input, LitStr, Token};

const DEFAULT_TYPE_BASE: &str = "https://errors.slotkeeper.dev";

/// JSON schema for a single error definition
#[derive(Debug, Clone, Deserialize)]
struct ErrorEntry {
    status: u16,
    title: String,
    code: String,
    #[serde(rename = "type")]
    type_url: Option<String>,
}

/// Parsed macro input
struct DeclareErrorsInput {
    path: String,
    vis: syn::Visibility,
}

impl Parse for DeclareErrorsInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut path = None;
        let mut vis = syn::Visibility::Inherited;

        while !input.is_empty() {
            let key: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match key.to_string().as_str() {
                "path" => {
                    let lit: LitStr = input.parse()?;
                    path = Some(lit.value());
                }
                "vis" => {
                    let lit: LitStr = input.parse()?;
                    vis = match lit.value().as_str() {
                        "pub" => syn::Visibility::Public(syn::token::Pub::default()),
                        _ => syn::Visibility::Inherited,
                    };
                }
                _ => return Err(syn::Error::new(key.span(), "Unknown parameter")),
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(DeclareErrorsInput {
            path: path.ok_or_else(|| input.error("Missing 'path' parameter"))?,
            vis,
        })
    }
}

/// Main proc-macro entry point
#[proc_macro]
pub fn declare_errors(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeclareErrorsInput);

    match generate_errors(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn load_entries(path: &str) -> syn::Result<Vec<ErrorEntry>> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map_err(|_| syn::Error::new(Span::call_site(), "CARGO_MANIFEST_DIR not set"))?;
    let json_path = std::path::Path::new(&manifest_dir).join(path);

    let json_content = std::fs::read_to_string(&json_path).map_err(|e| {
        syn::Error::new(
            Span::call_site(),
            format!(
                "Failed to read error catalog at {}: {}",
                json_path.display(),
                e
            ),
        )
    })?;

    serde_json::from_str(&json_content).map_err(|e| {
        syn::Error::new(
            Span::call_site(),
            format!(
                "Failed to parse error catalog JSON at {}: {}",
                json_path.display(),
                e
            ),
        )
    })
}

fn generate_errors(input: &DeclareErrorsInput) -> syn::Result<TokenStream2> {
    let entries = load_entries(&input.path)?;
    validate_entries(&entries)?;

    let vis = &input.vis;
    let json_file_path = &input.path;

    let variants: Vec<syn::Ident> = entries.iter().map(|e| code_to_ident(&e.code)).collect();
    let enum_variants = generate_enum_variants(&entries);
    let status_arms = generate_status_arms(&entries);
    let def_arms = generate_def_arms(&entries);
    let lookup_arms = generate_lookup_arms(&entries);

    Ok(quote! {
        // Rebuild when the catalog changes
        const _: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/", #json_file_path));

        /// Strongly-typed error codes from the catalog
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #vis enum ErrorCode {
            #(#enum_variants),*
        }

        impl ErrorCode {
            /// Every code in catalog order.
            pub const ALL: &'static [ErrorCode] = &[#(ErrorCode::#variants),*];

            /// Transport status code for this error
            pub const fn status(&self) -> u16 {
                match self {
                    #(#status_arms),*
                }
            }

            /// Static catalog entry for this error code
            pub const fn def(&self) -> ::slotkeeper_errors::ErrDef {
                match self {
                    #(#def_arms),*
                }
            }

            /// Dotted catalog code, e.g. `scheduling.slot.taken.v1`
            pub const fn as_str(&self) -> &'static str {
                self.def().code
            }

            /// Reverse lookup by dotted code
            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    #(#lookup_arms,)*
                    _ => None,
                }
            }

            /// Convert to Problem with detail (without instance/trace)
            pub fn to_problem(&self, detail: impl Into<String>) -> ::slotkeeper_errors::Problem {
                self.def().to_problem(detail)
            }

            /// Problem with request context attached
            pub fn to_problem_at(
                &self,
                detail: impl Into<String>,
                instance: &str,
                trace_id: Option<String>,
            ) -> ::slotkeeper_errors::Problem {
                let p = self.to_problem(detail).with_instance(instance);
                match trace_id {
                    Some(tid) => p.with_trace_id(tid),
                    None => p,
                }
            }
        }
    })
}

fn validate_entries(entries: &[ErrorEntry]) -> syn::Result<()> {
    let mut codes = std::collections::HashSet::new();

    for entry in entries {
        if !(100..=599).contains(&entry.status) {
            return Err(syn::Error::new(
                Span::call_site(),
                format!(
                    "Invalid HTTP status code {} for error '{}'",
                    entry.status, entry.code
                ),
            ));
        }

        if entry.title.trim().is_empty() {
            return Err(syn::Error::new(
                Span::call_site(),
                format!("Empty title for error '{}'", entry.code),
            ));
        }

        if !is_versioned_code(&entry.code) {
            return Err(syn::Error::new(
                Span::call_site(),
                format!(
                    "Error code '{}' must look like '<module>.<kind>.v<N>'",
                    entry.code
                ),
            ));
        }

        if !codes.insert(&entry.code) {
            return Err(syn::Error::new(
                Span::call_site(),
                format!("Duplicate error code: '{}'", entry.code),
            ));
        }
    }

    Ok(())
}

fn generate_enum_variants(entries: &[ErrorEntry]) -> Vec<TokenStream2> {
    entries
        .iter()
        .map(|e| {
            let variant = code_to_ident(&e.code);
            let code = &e.code;
            quote! {
                #[doc = #code]
                #variant
            }
        })
        .collect()
}

fn generate_status_arms(entries: &[ErrorEntry]) -> Vec<TokenStream2> {
    entries
        .iter()
        .map(|e| {
            let variant = code_to_ident(&e.code);
            let status = e.status;
            quote! {
                ErrorCode::#variant => #status
            }
        })
        .collect()
}

fn generate_def_arms(entries: &[ErrorEntry]) -> Vec<TokenStream2> {
    entries
        .iter()
        .map(|e| {
            let variant = code_to_ident(&e.code);
            let status = e.status;
            let title = &e.title;
            let code = &e.code;
            let type_url = match &e.type_url {
                Some(s) => s.clone(),
                None => format!("{}/{}", DEFAULT_TYPE_BASE, e.code),
            };

            quote! {
                ErrorCode::#variant => ::slotkeeper_errors::ErrDef {
                    status: #status,
                    title: #title,
                    code: #code,
                    type_url: #type_url,
                }
            }
        })
        .collect()
}

fn generate_lookup_arms(entries: &[ErrorEntry]) -> Vec<TokenStream2> {
    entries
        .iter()
        .map(|e| {
            let variant = code_to_ident(&e.code);
            let code = &e.code;
            quote! {
                #code => Some(ErrorCode::#variant)
            }
        })
        .collect()
}

/// `<module>.<segment>...v<N>`: at least three dotted segments, lowercase
/// snake case, ending in a numeric version.
fn is_versioned_code(code: &str) -> bool {
    let segments: Vec<&str> = code.split('.').collect();
    let Some((version, names)) = segments.split_last() else {
        return false;
    };
    let version_ok = version
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
    let names_ok = names.iter().all(|s| {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    });
    segments.len() >= 3 && version_ok && names_ok
}

/// Convert a dotted error code to a valid Rust identifier
fn code_to_ident(code: &str) -> syn::Ident {
    let mut sanitized = code.replace(['.', '-', '/'], "_");

    if sanitized
        .chars()
        .next()
        .map(|c| c.is_ascii_digit())
        .unwrap_or(false)
    {
        sanitized = format!("_{}", sanitized);
    }

    syn::Ident::new(&sanitized, Span::call_site())
}

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat, PatType, Type};

/// How a parameter of the annotated function is fed from the call's arguments.
enum Param {
    /// `&Evaluator`: the evaluator running the call; takes no argument slot.
    Evaluator,
    /// `Decimal`: the argument, evaluated before the body runs.
    Eager,
    /// `&ASTNode`: the argument subtree, left for the body to evaluate.
    Lazy,
    /// `Vec<Decimal>`: every argument, evaluated in order.
    Variadic,
}

fn last_segment(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    }
}

fn classify(ty: &Type) -> Option<Param> {
    match ty {
        Type::Reference(reference) => match last_segment(&reference.elem)?.as_str() {
            "Evaluator" => Some(Param::Evaluator),
            "ASTNode" => Some(Param::Lazy),
            _ => None,
        },
        Type::Path(_) => match last_segment(ty)?.as_str() {
            "Decimal" => Some(Param::Eager),
            "Vec" => Some(Param::Variadic),
            _ => None,
        },
        _ => None,
    }
}

/// Turns a plain function into a registry callback
/// `fn(&Evaluator<'_>, &[ASTNode]) -> Result<Decimal, EvalError>`.
///
/// Parameters may be `Decimal` (evaluated eagerly), `&ASTNode` (passed
/// unevaluated), a single `Vec<Decimal>` (variadic, all evaluated) and an
/// optional leading `&Evaluator`. Fixed-arity functions reject any other
/// argument count with `EvalError::arity_mismatch`.
///
/// The expansion names `Evaluator`, `ASTNode`, `Decimal` and `EvalError`
/// unqualified, so they must be in scope where the macro is used.
#[proc_macro_attribute]
pub fn decimath_fn(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let attrs = &input.attrs;
    let vis = &input.vis;
    let fn_name = &input.sig.ident;
    let fn_name_str = fn_name.to_string();
    let fn_output = &input.sig.output;
    let fn_body = &input.block;

    let mut extractions: Vec<TokenStream2> = Vec::new();
    let mut slots = 0usize;
    let mut variadic = false;

    for (position, arg) in input.sig.inputs.iter().enumerate() {
        let FnArg::Typed(PatType { pat, ty, .. }) = arg else {
            return syn::Error::new_spanned(arg, "methods cannot be registered as functions")
                .to_compile_error()
                .into();
        };
        let Pat::Ident(pat_ident) = &**pat else {
            return syn::Error::new_spanned(pat, "unsupported parameter pattern")
                .to_compile_error()
                .into();
        };
        let arg_name = &pat_ident.ident;

        let extraction = match classify(ty) {
            Some(Param::Evaluator) if position == 0 => quote! {
                let #arg_name: #ty = __evaluator;
            },
            Some(Param::Evaluator) => {
                return syn::Error::new_spanned(ty, "`&Evaluator` must be the first parameter")
                    .to_compile_error()
                    .into();
            }
            Some(Param::Variadic) if slots == 0 && !variadic => {
                variadic = true;
                quote! {
                    let #arg_name: #ty = __evaluator.evaluate_all(__args)?;
                }
            }
            Some(_) if variadic => {
                return syn::Error::new_spanned(ty, "a `Vec<Decimal>` parameter must be the only argument")
                    .to_compile_error()
                    .into();
            }
            Some(Param::Variadic) => {
                return syn::Error::new_spanned(ty, "a `Vec<Decimal>` parameter must be the only argument")
                    .to_compile_error()
                    .into();
            }
            Some(Param::Eager) => {
                let index = slots;
                slots += 1;
                quote! {
                    let #arg_name: #ty = __evaluator.evaluate(&__args[#index])?;
                }
            }
            Some(Param::Lazy) => {
                let index = slots;
                slots += 1;
                quote! {
                    let #arg_name: #ty = &__args[#index];
                }
            }
            None => {
                return syn::Error::new_spanned(
                    ty,
                    "expected `Decimal`, `&ASTNode`, `Vec<Decimal>` or a leading `&Evaluator`",
                )
                .to_compile_error()
                .into();
            }
        };
        extractions.push(extraction);
    }

    let arity_check: TokenStream2 = if variadic {
        quote! {}
    } else {
        quote! {
            if __args.len() != #slots {
                return Err(EvalError::arity_mismatch(#fn_name_str, #slots, __args.len()));
            }
        }
    };

    let expanded: TokenStream2 = quote! {
        #(#attrs)*
        #[allow(unused_variables)]
        #vis fn #fn_name(__evaluator: &Evaluator<'_>, __args: &[ASTNode]) #fn_output {
            #arity_check

            #(#extractions)*

            #fn_body
        }
    };

    TokenStream::from(expanded)
}

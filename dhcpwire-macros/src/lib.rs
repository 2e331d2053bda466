use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Ident, LitInt, LitStr, Token,
    parse::{Parse, ParseStream, Result},
    parse_macro_input,
};

// parses a single entry in the format:
// {code, "Attribute-Name", Type} or {code, "Attribute-Name", Type, array}
struct Entry {
    code: u8,
    name: String,
    ty: Ident,
    array: bool,
}

impl Parse for Entry {
    fn parse(input: ParseStream) -> Result<Self> {
        let content;
        syn::braced!(content in input);

        let code: LitInt = content.parse()?;
        content.parse::<Token![,]>()?;

        let name: LitStr = content.parse()?;
        content.parse::<Token![,]>()?;

        let ty: Ident = content.parse()?;

        let array = if content.peek(Token![,]) {
            content.parse::<Token![,]>()?;
            let flag: Ident = content.parse()?;
            if flag != "array" {
                return Err(syn::Error::new(flag.span(), "expected `array`"));
            }
            true
        } else {
            false
        };

        Ok(Entry {
            code: code.base10_parse()?,
            name: name.value(),
            ty,
            array,
        })
    }
}

// TABLE_NAME, {entry}, {entry}, ...
struct DeclareDictionaryInput {
    table: Ident,
    entries: Vec<Entry>,
}

impl Parse for DeclareDictionaryInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let table: Ident = input.parse()?;
        input.parse::<Token![,]>()?;

        let mut entries = Vec::new();
        while !input.is_empty() {
            entries.push(input.parse()?);

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(DeclareDictionaryInput { table, entries })
    }
}

fn generate_table(table: &Ident, entries: &[Entry]) -> proc_macro2::TokenStream {
    let rows = entries.iter().map(|e| {
        let code = e.code;
        let name = &e.name;
        let ty = &e.ty;
        let array = e.array;

        quote! {
            (#code, AttrDescriptor { name: #name, ty: AttrType::#ty, array: #array })
        }
    });

    quote! {
        static #table: &[(u8, AttrDescriptor)] = &[
            #(#rows),*
        ];
    }
}

/// Declares a static dictionary table. Each entry maps a wire code to an
/// `AttrDescriptor` (both resolved in the calling scope):
///
/// ```ignore
/// declare_dictionary!(BUILTIN_OPTIONS,
///     {1, "Subnet-Mask", IpAddr},
///     {6, "Domain-Name-Server", IpAddr, array},
/// );
/// ```
#[proc_macro]
pub fn declare_dictionary(input: TokenStream) -> TokenStream {
    let DeclareDictionaryInput { table, entries } =
        parse_macro_input!(input as DeclareDictionaryInput);

    TokenStream::from(generate_table(&table, &entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;
    use syn::parse_quote;

    #[test]
    fn test_macro_expansion() {
        let input: DeclareDictionaryInput = parse_quote! {
            ENTRIES,
            {1, "Subnet-Mask", IpAddr},
            {55, "Parameter-Request-List", Byte, array},
        };

        let table = generate_table(&input.table, &input.entries);

        let expected = quote! {
            static ENTRIES: &[(u8, AttrDescriptor)] = &[
                (1u8, AttrDescriptor { name: "Subnet-Mask", ty: AttrType::IpAddr, array: false }),
                (55u8, AttrDescriptor { name: "Parameter-Request-List", ty: AttrType::Byte, array: true })
            ];
        };

        assert_eq!(table.to_string(), expected.to_string());
    }

    #[test]
    fn test_rejects_unknown_flag() {
        let res: Result<Entry> = syn::parse2(quote! {
            {1, "Subnet-Mask", IpAddr, scalar}
        });
        assert!(res.is_err());
    }
}

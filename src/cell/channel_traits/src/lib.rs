use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Error, Ident};


fn find_conductance_field(input: &DeriveInput) -> Option<Ident> {
    match &input.data {
        Data::Struct(data) => data.fields.iter()
            .find(|field| field.attrs.iter().any(|attr| attr.path.is_ident("conductance")))
            .and_then(|field| field.ident.clone()),
        _ => None,
    }
}

/// Derive macro to automatically implement `ChannelConductance` for an ion channel,
/// the field marked with `#[conductance]` is used as the maximal conductance
/// (mS/cm^2) and the `current` field is used as the last computed current density
#[proc_macro_derive(ChannelBase, attributes(conductance))]
pub fn derive_channel_base(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let input = parse_macro_input!(input as DeriveInput);

    let conductance_field = match find_conductance_field(&input) {
        Some(field) => field,
        None => {
            return Error::new_spanned(
                &input.ident,
                "ChannelBase requires a struct with one field marked #[conductance]",
            )
            .to_compile_error()
            .into();
        }
    };

    // Get the name of the struct we are deriving the trait for
    let name = input.ident;

    // Generate the implementation of the trait
    let expanded = quote! {
        impl ChannelConductance for #name {
            fn get_max_conductance(&self) -> f64 {
                self.#conductance_field
            }

            fn set_max_conductance(&mut self, conductance: f64) {
                self.#conductance_field = conductance;
            }

            fn get_current(&self) -> f64 {
                self.current
            }
        }
    };

    TokenStream::from(expanded)
}

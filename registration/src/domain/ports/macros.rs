//! `define_port_error!`: error enums for port adapters.
//!
//! Each variant carries named, optionally documented fields and a `thiserror`
//! message. A snake_case constructor is generated per variant, taking
//! `impl Into<_>` for every field so adapters can pass `&str` where a
//! `String` is stored.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident {
                    $( $(#[$field_meta:meta])* $field:ident : $ty:ty ),+ $(,)?
                } => $message:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $( $(#[$field_meta])* $field: $ty ),+ },
            )+
        }

        ::paste::paste! {
            impl $name {
                $(
                    #[doc = "Build a `" $variant "` error."]
                    #[must_use]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                )+
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        /// Error used only by these tests.
        pub enum LookupError {
            Offline {
                /// Why the lookup could not run.
                message: String,
            } => "offline: {message}",
            Retries { attempts: u32 } => "gave up after {attempts} attempts",
            Rejected { key: String, attempts: u32 } => "{key} rejected after {attempts} attempts",
        }
    }

    #[test]
    fn string_fields_accept_str() {
        let err = LookupError::offline("store down");
        assert_eq!(err, LookupError::Offline { message: "store down".to_owned() });
        assert_eq!(err.to_string(), "offline: store down");
    }

    #[test]
    fn non_string_fields_keep_their_type() {
        assert_eq!(
            LookupError::retries(3_u32).to_string(),
            "gave up after 3 attempts"
        );
    }

    #[test]
    fn multi_field_variants_take_arguments_in_order() {
        assert_eq!(
            LookupError::rejected("alice", 2_u32).to_string(),
            "alice rejected after 2 attempts"
        );
    }
}

//! Macros for declaring port error enums.
//!
//! `define_port_error!` has two forms. The plain form declares exactly the
//! listed variants. The `repository "<subject>"` form also adds the
//! `Connection` and `Query` variants shared by every storage port, together
//! with `to_api_error`, which maps them onto `service_unavailable` and
//! `internal_error`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build the `", stringify!($variant), "` variant.")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Build the `", stringify!($variant), "` variant.")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident repository $subject:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            /// Repository connection could not be established.
            #[error("{} repository connection failed: {message}", $subject)]
            Connection { message: String },
            /// Query or mutation failed during execution.
            #[error("{} repository query failed: {message}", $subject)]
            Query { message: String },
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            define_port_error!(@ctor Connection { message: String });
            define_port_error!(@ctor Query { message: String });
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*

            /// Map storage failures onto the API error taxonomy.
            ///
            /// Port-specific variants fall back to `internal_error`; callers
            /// match those first when they carry domain meaning.
            pub(crate) fn to_api_error(&self) -> $crate::domain::Error {
                match self {
                    Self::Connection { message } => $crate::domain::Error::service_unavailable(
                        format!("{} repository unavailable: {message}", $subject),
                    ),
                    Self::Query { message } => $crate::domain::Error::internal(
                        format!("{} repository error: {message}", $subject),
                    ),
                    $(
                        Self::$variant { .. } => $crate::domain::Error::internal(
                            format!("{} repository error: {}", $subject, self),
                        ),
                    )*
                }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

//! Model description and the `sorm_model!` macro.

use crate::sorm::{FieldKind, SqlValue};

/// One field of a model instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelField {
    /// Rust field name.
    pub name: &'static str,
    /// `"column[,option]"`; untagged fields are not persisted.
    pub tag: Option<&'static str>,
    pub kind: FieldKind,
    pub value: SqlValue,
}

impl ModelField {
    /// Column name and option from the tag.
    pub fn column(&self) -> Option<(&'static str, &'static str)> {
        self.tag.map(|tag| tag.split_once(',').unwrap_or((tag, "")))
    }
}

/// A struct that can be mapped to a table.
pub trait Model {
    /// Rust type name; the table name is its lower-cased form.
    fn type_name() -> &'static str;

    fn fields(&self) -> Vec<ModelField>;
}

/// Declare a struct and implement [`Model`] for it.
///
/// A field is persisted when its type is followed by `=> "column[,pk]"`.
/// Other attributes (derives, `#[serde(...)]`) pass through unchanged.
///
/// ```ignore
/// sorm_model! {
///     #[derive(Debug, Clone, Default)]
///     pub struct Order {
///         pub id: u64 => "id,pk",
///         pub total: f64 => "total",
///         pub note: String,
///     }
/// }
/// ```
#[macro_export]
macro_rules! sorm_model {
    (@tag $tag:literal) => {
        ::std::option::Option::Some($tag)
    };
    (@tag) => {
        ::std::option::Option::None
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(=> $tag:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::sorm::Model for $name {
            fn type_name() -> &'static str {
                stringify!($name)
            }

            fn fields(&self) -> ::std::vec::Vec<$crate::sorm::ModelField> {
                ::std::vec![
                    $(
                        $crate::sorm::ModelField {
                            name: stringify!($field),
                            tag: $crate::sorm_model!(@tag $($tag)?),
                            kind: <$ty as $crate::sorm::SqlKind>::KIND,
                            value: $crate::sorm::SqlValue::from(::std::clone::Clone::clone(&self.$field)),
                        }
                    ),*
                ]
            }
        }
    };
}

/// Define a record struct and its [`FromDbRow`](crate::mapper::FromDbRow) field table in one go.
///
/// Every field type must implement [`FromDbValue`](crate::mapper::FromDbValue) and the struct
/// must implement `Default` (derive it through the attributes).
///
/// ```rust
/// use db_client_provider::db_record;
///
/// db_record! {
///     #[derive(Debug, Default)]
///     pub struct Order {
///         pub id: i64,
///         pub note: Option<String>,
///     }
/// }
/// # let _ = Order::default();
/// ```
#[macro_export]
macro_rules! db_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::mapper::FromDbRow for $name {
            const FIELDS: &'static [&'static str] = &[$(stringify!($field)),*];

            fn set_field(
                &mut self,
                field: &str,
                value: $crate::types::DbValue,
            ) -> ::core::result::Result<(), $crate::error::DbClientError> {
                match field {
                    $(
                        stringify!($field) => {
                            self.$field = $crate::mapper::assign_field::<$ty>(field, value)?;
                        }
                    )*
                    _ => {
                        let _ = value;
                    }
                }
                Ok(())
            }
        }
    };
}

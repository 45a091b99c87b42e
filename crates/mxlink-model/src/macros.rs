// SPDX-License-Identifier: Apache-2.0
//! Impl-generation macro for the record capability trait.
//!
//! A single declarative macro supplies the per-type field dispatch;
//! everything else is data-driven through the link table.

/// Implements [`mxlink_core::RecordObject`] for a concrete record struct.
///
/// The struct must carry a `uuid: RecordId` field, `Option<RecordId>` fields
/// for each listed single link and `Vec<RecordId>` fields for each listed
/// multiple link. Field names double as the link-table field names.
macro_rules! record_object {
    (
        $ty:ident,
        kind: $kind:ident,
        singles: [ $( $sfield:ident ),* $(,)? ],
        multiples: [ $( $mfield:ident ),* $(,)? ]
    ) => {
        impl ::mxlink_core::RecordObject for $ty {
            fn identifier(&self) -> &::mxlink_core::RecordId {
                &self.uuid
            }

            fn base_kind(&self) -> ::mxlink_core::BaseKind {
                ::mxlink_core::BaseKind::$kind
            }

            fn concrete_type(&self) -> &'static str {
                stringify!($ty)
            }

            #[allow(unused_variables)]
            fn forward_field(&self, field: &str) -> ::mxlink_core::ForwardField<'_> {
                $(
                    if field == stringify!($sfield) {
                        return ::mxlink_core::ForwardField::Single(self.$sfield.as_ref());
                    }
                )*
                $(
                    if field == stringify!($mfield) {
                        return ::mxlink_core::ForwardField::Multiple(&self.$mfield);
                    }
                )*
                ::mxlink_core::ForwardField::Unknown
            }

            #[allow(unused_variables)]
            fn set_single_id(
                &mut self,
                field: &str,
                value: Option<::mxlink_core::RecordId>,
            ) -> Result<(), ::mxlink_core::FieldError> {
                $(
                    if field == stringify!($sfield) {
                        self.$sfield = value;
                        return Ok(());
                    }
                )*
                $(
                    if field == stringify!($mfield) {
                        return Err(::mxlink_core::FieldError::WrongShape {
                            field: field.to_owned(),
                        });
                    }
                )*
                Err(::mxlink_core::FieldError::UnknownField {
                    field: field.to_owned(),
                })
            }

            #[allow(unused_variables)]
            fn set_multiple_ids(
                &mut self,
                field: &str,
                values: Vec<::mxlink_core::RecordId>,
            ) -> Result<(), ::mxlink_core::FieldError> {
                $(
                    if field == stringify!($mfield) {
                        self.$mfield = values;
                        return Ok(());
                    }
                )*
                $(
                    if field == stringify!($sfield) {
                        return Err(::mxlink_core::FieldError::WrongShape {
                            field: field.to_owned(),
                        });
                    }
                )*
                Err(::mxlink_core::FieldError::UnknownField {
                    field: field.to_owned(),
                })
            }

            fn to_value(&self) -> Result<::serde_json::Value, ::mxlink_core::FieldError> {
                Ok(::serde_json::to_value(self)?)
            }

            fn replace_attributes(
                &mut self,
                value: &::serde_json::Value,
            ) -> Result<(), ::mxlink_core::FieldError> {
                let mut next: $ty = ::serde_json::from_value(value.clone())?;
                next.uuid = self.uuid.clone();
                *self = next;
                Ok(())
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }
    };
}

pub(crate) use record_object;

/// Generates `find_<name>`, `get_<name>` and `delete_<name>` for the resource
/// client stored in `$field`.
///
/// `find_` answers `None` for a missing record while `get_` turns it into the
/// domain's `NotFound` error.
#[macro_export]
macro_rules! impl_client_methods {
    ($client_name:ident, $field:ident => $entity:ty, $error:ty, $entity_name_snake:ident) => {
        paste::paste! {
            #[allow(dead_code)]
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<find_ $entity_name_snake>](&self, id: String) -> Result<Option<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.$field.get(id).await
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](&self, id: String) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    self.$field.get(id.clone()).await?.ok_or_else(|| {
                        $crate::actor_framework::FrameworkError::NotFound {
                            kind: <$entity as $crate::actor_framework::Entity>::KIND,
                            id,
                        }
                        .into()
                    })
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<delete_ $entity_name_snake>](&self, id: String) -> Result<(), $error> {
                    tracing::debug!("Sending request");
                    self.$field.delete(id).await
                }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_client_new {
    ($client_name:ident, $entity:ty) => {
        impl $client_name {
            pub fn new(inner: $crate::actor_framework::ResourceClient<$entity>) -> Self {
                Self { inner }
            }
        }
    };
}

/// For clients that wrap a single resource client named `inner` and nothing else.
#[macro_export]
macro_rules! impl_basic_client {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident) => {
        $crate::impl_client_new!($client_name, $entity);
        $crate::impl_client_methods!($client_name, inner => $entity, $error, $entity_name_snake);
    };
}

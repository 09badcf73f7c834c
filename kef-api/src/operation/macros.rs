//! Declarative macros for settings operations
//!
//! Most speaker settings are a single typed leaf behind one node path. Instead
//! of writing a struct and a trait impl per direction, a setting is declared
//! once and the macro generates `Get<Name>Operation` and, for writable nodes,
//! `Set<Name>Operation`.

/// Define the read (and optionally write) operations for a leaf setting
///
/// # Example
/// ```rust,ignore
/// define_setting! {
///     /// Speaker volume, 0..=100
///     setting: volume,
///     path: "player:volume",
///     leaf: I32 => i32,
///     access: read_write,
/// }
///
/// // Generates GetVolumeOperation (Request = (), Response = Option<i32>)
/// // and SetVolumeOperation (Request = i32, Response = ()).
/// ```
///
/// `access: write_only` generates only the setter, for nodes whose reader
/// needs custom parsing.
#[macro_export]
macro_rules! define_setting {
    (@get [$($doc:literal)*] $name:ident, $path:literal, $leaf:ident, $value:ty) => {
        $crate::paste::paste! {
            $(#[doc = $doc])*
            #[doc = ""]
            #[doc = concat!("Reads `", $path, "`.")]
            #[derive(Debug, Clone, Copy, Default)]
            pub struct [<Get $name:camel Operation>];

            impl $crate::operation::KefOperation for [<Get $name:camel Operation>] {
                type Request = ();
                type Response = Option<$value>;

                const PATH: &'static str = $path;
                const ACCESS: $crate::operation::Access = $crate::operation::Access::Read;

                fn build_value(
                    _request: &Self::Request,
                ) -> $crate::error::Result<Option<::serde_json::Value>> {
                    Ok(None)
                }

                fn parse_response(
                    nodes: &[::serde_json::Value],
                ) -> $crate::error::Result<Self::Response> {
                    $crate::leaf::extract::<$value>(nodes, $crate::leaf::LeafType::$leaf)
                }
            }
        }
    };

    (@set [$($doc:literal)*] $name:ident, $path:literal, $leaf:ident, $value:ty) => {
        $crate::paste::paste! {
            $(#[doc = $doc])*
            #[doc = ""]
            #[doc = concat!("Writes `", $path, "`.")]
            #[derive(Debug, Clone, Copy, Default)]
            pub struct [<Set $name:camel Operation>];

            impl $crate::operation::KefOperation for [<Set $name:camel Operation>] {
                type Request = $value;
                type Response = ();

                const PATH: &'static str = $path;
                const ACCESS: $crate::operation::Access = $crate::operation::Access::Write;

                fn build_value(
                    request: &Self::Request,
                ) -> $crate::error::Result<Option<::serde_json::Value>> {
                    $crate::leaf::encode($crate::leaf::LeafType::$leaf, request).map(Some)
                }

                fn parse_response(
                    _nodes: &[::serde_json::Value],
                ) -> $crate::error::Result<Self::Response> {
                    Ok(())
                }
            }
        }
    };

    (
        $(#[doc = $doc:literal])*
        setting: $name:ident,
        path: $path:literal,
        leaf: $leaf:ident => $value:ty,
        access: read_only $(,)?
    ) => {
        $crate::define_setting!(@get [$($doc)*] $name, $path, $leaf, $value);
    };

    (
        $(#[doc = $doc:literal])*
        setting: $name:ident,
        path: $path:literal,
        leaf: $leaf:ident => $value:ty,
        access: write_only $(,)?
    ) => {
        $crate::define_setting!(@set [$($doc)*] $name, $path, $leaf, $value);
    };

    (
        $(#[doc = $doc:literal])*
        setting: $name:ident,
        path: $path:literal,
        leaf: $leaf:ident => $value:ty,
        access: read_write $(,)?
    ) => {
        $crate::define_setting!(@get [$($doc)*] $name, $path, $leaf, $value);
        $crate::define_setting!(@set [$($doc)*] $name, $path, $leaf, $value);
    };
}

//! Deserialization through the validating constructors.
//!
//! Catalog fields are private and only constructors check them. A plain
//! `#[derive(Deserialize)]` would fill the fields directly, so a JSON body
//! could produce a value the wire encoder can't frame. Each type instead
//! deserializes into a mirror struct with the same field names and is
//! converted with `#[serde(try_from = "...")]`.

/// Declares `$raw` with the given fields and a `TryFrom<$raw>` for `$ty`
/// that runs `$build`.
///
/// ```ignore
/// deserialize_checked!(SetTurn via SetTurnFields {
///     game: String,
///     player_number: i32,
/// } => |raw| SetTurn::new(raw.game, raw.player_number));
/// ```
macro_rules! deserialize_checked {
    ($ty:ident via $raw:ident { $($field:ident: $fty:ty),* $(,)? } => |$r:ident| $build:expr) => {
        #[doc(hidden)]
        #[derive(serde::Deserialize)]
        pub struct $raw {
            $($field: $fty,)*
        }

        impl TryFrom<$raw> for $ty {
            type Error = hexline_protocol::ProtocolError;

            fn try_from($r: $raw) -> Result<Self, Self::Error> {
                $build
            }
        }
    };
}

pub(crate) use deserialize_checked;

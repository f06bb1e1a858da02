use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::borrow::Borrow;
use std::fmt;

new_key_type! {
    /// Identifies a placed machine in the driver world.
    pub struct MachineId;
}

/// Defines a namespaced string identifier (`namespace:path`).
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }

            /// The part after the namespace separator, or the whole id.
            pub fn path(&self) -> &str {
                self.0.split_once(':').map_or(&self.0, |(_, path)| path)
            }

            /// Title-cased display name derived from the path.
            pub fn display_name(&self) -> String {
                display_name(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id! {
    /// Identifies an item type, e.g. `minecraft:iron_ingot`.
    ItemId
}

string_id! {
    /// Identifies a fluid type, e.g. `liquified_aetherium`.
    FluidType
}

string_id! {
    /// Identifies a recipe inside one recipe book. Unique per book.
    RecipeId
}

/// Turns `minecraft:iron_ingot` into `Iron Ingot`.
pub fn display_name(id: &str) -> String {
    let path = id.split_once(':').map_or(id, |(_, path)| path);
    path.split(['_', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

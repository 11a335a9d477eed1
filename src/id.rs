//! Code for handling IDs
use anyhow::{Context, Result};
use indexmap::IndexSet;
use std::borrow::Borrow;
use std::fmt::Display;
use std::hash::Hash;

/// Define a new ID type, wrapping a reference-counted string
macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Clone,
            std::hash::Hash,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Debug,
            serde::Deserialize,
            serde::Serialize,
        )]
        /// An ID type (e.g. `RegionID`, `ComponentID`, etc.)
        pub struct $name(pub std::rc::Rc<str>);

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(std::rc::Rc::from(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(std::rc::Rc::from(s))
            }
        }

        impl $name {
            /// Create a new ID from a string slice
            pub fn new(id: &str) -> Self {
                $name(std::rc::Rc::from(id))
            }

            /// The ID as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}
pub(crate) use define_id_type;

/// A collection of IDs which can be used to validate raw ID strings
pub trait IDCollection<ID: Eq + Hash + Borrow<str> + Display> {
    /// Get the ID from the collection matching the supplied string.
    ///
    /// # Returns
    ///
    /// A copy of the ID in `self`, or an error if not found.
    fn get_id(&self, id: &str) -> Result<&ID>;
}

impl<ID: Eq + Hash + Borrow<str> + Display> IDCollection<ID> for IndexSet<ID> {
    fn get_id(&self, id: &str) -> Result<&ID> {
        self.get(id).with_context(|| format!("Unknown ID {id} found"))
    }
}

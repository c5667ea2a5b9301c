//! Typed declarations for the Azure resources a Function App needs.
//!
//! Each declaration serializes its arguments with the provider's property
//! names and type tokens, and exposes the provider-generated properties it is
//! referenced by as deferred [`Output`]s.

#![deny(missing_docs)]

/// Accessors shared by every declared resource.
macro_rules! declared_resource {
    ($ty:ident) => {
        impl $ty {
            /// The declaration's URN.
            pub fn urn(&self) -> &flexfn_resource::Urn {
                self.handle.urn()
            }

            /// The provider-assigned resource ID.
            pub fn id(&self) -> flexfn_resource::Output<String> {
                self.handle.id()
            }

            /// The physical name the provider gave the resource.
            pub fn name(&self) -> flexfn_resource::Output<String> {
                self.handle.name()
            }
        }
    };
}

pub mod authorization;
pub mod roles;
pub mod storage;
pub mod web;

pub use flexfn_resource::{Output, Urn};

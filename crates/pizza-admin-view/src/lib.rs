//! View layer for pizza-admin
//!
//! [`EntityController`] keeps one entity or collection in sync with the
//! backend (fetch, render, mutate, revalidate). Pages in [`pages`] bind a
//! controller to a render model filtered by the viewer's capabilities.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod controller;
pub mod error;
pub mod form;
pub mod navigation;
pub mod pages;
pub mod render;
pub mod state;

pub use controller::EntityController;
pub use error::{ViewError, ViewResult};
pub use form::FormState;
pub use navigation::{Navigator, RecordingNavigator, Route};
pub use pages::{
    Cell, CreatePage, DetailPage, EditPage, FieldView, ListPage, OptionSource, PageContext,
    SelectOption,
};
pub use render::RenderPass;
pub use state::{FetchError, MutationError, MutationKind, Phase, Snapshot, ViewKey, ViewState};

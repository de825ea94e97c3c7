//! Client-side behavior for the Portal Solidário site.
//!
//! The platform-independent pieces live in plain modules and run anywhere:
//!
//! - [`mask`]: CPF, phone and CEP input masks.
//! - [`validation`] and [`form`]: constraint checks, pt-BR messages and the
//!   registration form controller.
//! - [`theme`] and [`nav`]: light/dark switcher and hamburger menu state.
//! - [`fragment`] and [`router`]: the SPA loader that swaps `<main>` on
//!   navigation and remounts view behavior afterwards.
//! - [`headless`]: an in-memory page implementing the router's host traits.
//!
//! The `hydrate` feature adds [`browser`], which binds all of the above to the
//! live DOM when compiled to WebAssembly. The `web` feature adds the page
//! templates and the development server that serves them.

pub mod config;
pub mod form;
pub mod fragment;
pub mod headless;
pub mod mask;
pub mod nav;
pub mod router;
pub mod theme;
pub mod validation;

#[cfg(feature = "web")]
pub mod pages;
#[cfg(feature = "web")]
pub mod web;

#[cfg(feature = "hydrate")]
pub mod browser;

pub use config::{ConfigError, SiteConfig};
pub use form::{FieldStatus, FormController, SubmitOutcome};
pub use fragment::{FetchError, LoadError, PageFragment};
pub use mask::MaskKind;
pub use nav::NavMenu;
pub use router::{NavOutcome, NavigationRequest, RouteTable, Router, View};
pub use theme::{Theme, ThemeSwitcher};
pub use validation::FieldId;

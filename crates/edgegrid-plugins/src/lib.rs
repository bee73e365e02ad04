//! edgegrid-plugins — locate plugins and read their declared metadata.
//!
//! A plugin is found by name under a kind-specific directory of one of
//! several [`PluginSource`]s, tried in priority order:
//!
//! - **`NativeSource`** — `<root>/<kind>/<plugin>/plugin.toml`
//! - **`ShimSource`** — `<root>/<kind>/<plugin>/lib<plugin>.so`, whose
//!   metadata is obtained through a [`ShimIntrospector`]
//!
//! The [`PluginResolver`] picks the first source that locates the plugin,
//! reads its metadata and checks it against the requested service kind.
//! Resolution has no side effects.

pub mod error;
pub mod resolver;
pub mod source;

pub use error::{PluginError, PluginResult};
pub use resolver::{PluginDescriptor, PluginResolver};
pub use source::{
    CommandIntrospector, NativeSource, PluginInfo, PluginSource, ShimIntrospector, ShimSource,
};

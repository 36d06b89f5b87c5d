//! choropleth
//!
//! A Rust library for drawing choropleth maps from query results: rows keyed by a region
//! code are joined to GeoJSON regions, values are classified into color buckets, and each
//! region gets a style, tooltip and popup text. Pairs with the `choropleth` CLI.
//!
//! ### Features
//! - Join rows to regions by ISO codes, names or numeric ids (case-insensitive)
//! - Quantile, equidistant and 1-D k-means classification
//! - Linear color ramps, "no value" color and hover darkening
//! - Automatic detection of which region property the codes refer to
//! - Viewport synchronization that never fights the user's pan/zoom gesture
//!
//! ### Example
//! ```no_run
//! use choropleth::{DirectorySource, RenderOptions, rows};
//! use choropleth::assets::AssetSource;
//!
//! let countries = DirectorySource::new("assets").fetch("countries.geo.json")?;
//! let data = rows::load_rows("gdp.csv")?;
//! let options = RenderOptions {
//!     code_column: "country".into(),
//!     value_column: "gdp".into(),
//!     ..RenderOptions::default()
//! };
//! let out = choropleth::render_layer(&countries, &data, &options)?;
//! for item in &out.legend.items {
//!     println!("{} {}", item.color, item.label);
//! }
//! # Ok::<(), choropleth::ChoroplethError>(())
//! ```

pub mod assets;
pub mod color;
pub mod error;
pub mod format;
pub mod infer;
pub mod join;
pub mod legend;
pub mod map_types;
pub mod models;
pub mod options;
pub mod palette;
pub mod present;
pub mod render;
pub mod rows;
pub mod scale;
pub mod template;
pub mod viewport;

pub use assets::{AssetCache, DirectorySource, HttpSource};
pub use error::{ChoroplethError, Result};
pub use models::{Feature, FeatureCollection, LatLng, Row, ViewportBounds};
pub use options::{ClusteringMode, RenderOptions};
pub use render::{Choropleth, MapView, RenderOutput, render_layer};
pub use scale::Scale;

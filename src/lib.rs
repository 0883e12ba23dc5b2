//! Region-level choropleth binding.
//!
//! Loads a table of per-district measurements and a GeoJSON boundary file,
//! sums the measurements for a selected year/month and attaches each sum to
//! the boundary feature whose administrative name matches, ready for a
//! choropleth layer.
//!
//! ```no_run
//! use region_choropleth::{aggregate, bind, detect_name_field, loader};
//!
//! let (records, _) = loader::load_records("trash.csv")?;
//! let boundaries = loader::load_boundaries("municipalities.geojson")?;
//! let field = detect_name_field(&boundaries)?;
//! let entries = aggregate(&records, 2023, Some(5));
//! let (annotated, stats) = bind(&entries, &boundaries, &field);
//! println!("{} of {} regions matched", stats.matched_features, annotated.len());
//! # Ok::<(), region_choropleth::RegionMapError>(())
//! ```
pub mod aggregate;
pub mod binder;
pub mod boundary;
pub mod detect;
pub mod error;
pub mod loader;
pub mod output;
pub mod session;
pub mod types;
pub mod util;

pub use crate::aggregate::aggregate;
pub use crate::binder::{bind, bind_in_place, NameIndex};
pub use crate::boundary::{BoundaryCollection, BoundaryFeature};
pub use crate::detect::detect_name_field;
pub use crate::error::{RegionMapError, Result};
pub use crate::session::{ChoroplethPass, Session};
pub use crate::types::{AggregateEntry, MatchRule, MatchStats, Record};

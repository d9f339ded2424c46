//! Iconify icon engine.
//!
//! [`Iconify`] ties the pieces together: an icon registry keyed by provider
//! and prefix, the API loader, the persistent cache and the SVG builder.
//! Pure helpers are re-exported for direct use.
//!
//! ## Example
//!
//! ```
//! use iconify::{Customisations, Iconify, IconSet, PartialIcon};
//!
//! let engine = Iconify::default();
//! let set = IconSet::new("mdi")
//!     .with_icon("home", PartialIcon::new("<path d=\"M10 20v-6h4v6\"/>").with_size(24.0, 24.0));
//! assert!(engine.add_collection(&set, None));
//!
//! let svg = engine.render_svg("mdi:home", &Customisations::new().with_height("48")).unwrap();
//! assert!(svg.contains("width=\"48\""));
//! ```

mod engine;

pub use engine::Iconify;

pub use iconify_api::{
    AbortHandle, ApiConfig, ApiModule, ApiQuery, LoadCallback, LoadUpdate, ManualScheduler, QueryResponse,
    Responder, Scheduler,
};
pub use iconify_cache::{BrowserCache, CacheConfig, CacheScope, KeyValueStore, MemoryStore};
pub use iconify_core::{
    AliasDefinition, Customisations, HAlign, IconData, IconName, IconProps, IconSet, IconSize, IconifyError,
    PartialIcon, PropValue, Transform, VAlign,
};
pub use iconify_export::{
    calculate_size, get_icons_css, get_icons_css_data, icon_to_html, replace_ids, CssOptions, IdGenerator,
    SizeOptions, SvgBuildResult,
};
pub use iconify_parser::parse_document;

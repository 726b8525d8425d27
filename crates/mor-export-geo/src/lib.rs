pub mod fallback;
pub mod model;
mod names;
pub mod normalize;
mod resolver;

pub use fallback::fallback_country;
pub use model::{Classification, Geography, UNKNOWN};
pub use names::country_name;
pub use normalize::{normalize_number, normalize_prefix, remove_zero};
pub use resolver::{classify, classify_number, classify_prefix};

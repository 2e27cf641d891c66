pub mod fallible;
pub mod memoized;
pub mod once;
pub mod table;

pub use fallible::{try_memoize, try_memoize_with, TryMemo};
pub use memoized::{memoize, memoize_with, Memo};
pub use once::{once, once_with, Once};
pub use table::CacheStats;

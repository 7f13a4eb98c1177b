//! Partial resolution.
//!
//! A partial is a named sub-template called from another template:
//!
//! ```jinja
//! {{ partial("header") }}
//! {{ partial("post/summary", post) }}
//! {{ partial_cached("sidebar", site, lang) }}
//! ```
//!
//! ## Name Resolution
//!
//! A leading `partials/` is stripped, then candidates are tried in a fixed
//! order and the first hit wins:
//!
//! | Order | Candidate |
//! |-------|-----------|
//! | 1 | `partials/<name>` |
//! | 2 | `partials/<name>.html` |
//! | 3 | `theme/partials/<name>` |
//! | 4 | `theme/partials/<name>.html` |
//!
//! The `.html` form is a fallback for older template trees and never beats the
//! bare name within the same root. Roots and suffixes come from
//! [`DispatchConfig`](crate::DispatchConfig).
//!
//! ## Output Typing
//!
//! A partial compiled by the escaping engine returns safe markup; one compiled
//! by the plain engine returns a plain string. See [`crate::template`].
//!
//! ## Caching
//!
//! `partial` never caches. `partial_cached` memoizes on the normalized name,
//! the context value, and any extra variant arguments, so two calls share a
//! result only when all three are equal. Context equality is strict: a safe
//! string never matches a plain one, and `1` never matches `1.0` or `true`.
//! Errors are never cached.
//!
//! ## Nesting
//!
//! Partials may call partials. At most `max_partial_depth` may be executing at
//! once on one thread; a deeper call fails with
//! [`DispatchError::PartialDepthExceeded`](crate::DispatchError::PartialDepthExceeded),
//! so a partial that includes itself ends in an error rather than a stack
//! overflow.

mod cache;
mod depth;
mod paths;
mod resolver;

pub use cache::{CacheKey, PartialCache};
pub use paths::PartialPaths;
pub use resolver::PartialResolver;

/// Conversion core: table rows in, VW lines out.
///
/// ```text
///   first row ──► layout      names, roles, quadratic pairs (fixed)
///                   │
///   pass 1 ────► frequency    (min_shows > 1 only) allow set
///                   │
///   pass 2 ────► encoder      clean, expand, filter, format
///                   │
///                pipeline     drives both passes into the sink
/// ```

pub mod clean;
pub mod encoder;
pub mod frequency;
pub mod layout;
pub mod pipeline;
pub mod quadratic;

//! Member profile reports for docuvault.
//!
//! Renders one member's identity attributes and document listing into a
//! paginated PDF. The layout is fixed: title block, personal information
//! (absent fields print as `N/A`), a documents section, and a disclaimer
//! footer. Rendering happens off the request path; the finished bytes are
//! handed out as a bounded-chunk stream.

pub mod generator;

pub use generator::ReportGenerator;

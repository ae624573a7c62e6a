//! # Rusty Marks
//!
//! Transfers student marks from a marks list into a grading template.
//!
//! The source marks list (CSV with `,` or `;`, or a workbook) and the
//! destination template (usually an `.xlsx` workbook, possibly with a
//! metadata row above its header) are parsed into [`Table`]s. Rows are joined
//! on a normalized student identifier, the chosen mark column is written into
//! a copy of the template, and the result is exported as CSV or `.xlsx` with
//! every other row and column preserved.
//!
//! ## Features
//!
//! - **Delimiter detection**: comma or semicolon, chosen from the leading lines
//! - **Configurable header row**: templates with the header on row 1 or row 2
//! - **Identifier normalization**: surrounding whitespace and a leading `#` are ignored
//! - **Two policies**: copy marks verbatim, or award full credit for any attempt
//! - **Per-row report**: matched, not found, or missing identifier for every row
//! - **Round-trip export**: the exported CSV parses back to the same table
//!
//! ## Example
//!
//! ```
//! use rusty_marks::{ColumnSelection, Session, SessionConfig, TransferPolicy};
//!
//! let mut session = Session::new(SessionConfig::default());
//! session.load_source(b"id;mark\n#001;80\n".to_vec())?;
//! session.load_destination(b"id,final\n001,\n003,\n".to_vec(), Some("roll.csv"))?;
//! let selection = ColumnSelection::new("id", "mark", "id", "final");
//! let (table, report) = session.run_transfer(&selection, TransferPolicy::Direct)?;
//! assert_eq!(table.cell(1, 1), "80");
//! assert_eq!(report.transferred(), 1);
//! # Ok::<(), rusty_marks::RustyMarksError>(())
//! ```
pub mod config;
pub mod error;
pub mod filename;
pub(crate) mod helpers;
pub mod logging;
pub mod session;
pub mod spreadsheet;
pub mod table;
pub mod transfer;

pub use config::ExportFormat;
pub use config::SessionConfig;
pub use error::ErrorKind;
pub use error::RustyMarksError;
pub use helpers::xml::XmlError;
pub use session::Export;
pub use session::Session;
pub use table::LineTerminator;
pub use table::ParseError;
pub use table::Table;
pub use table::TableParser;
pub use transfer::ColumnSelection;
pub use transfer::Markers;
pub use transfer::TransferPolicy;
pub use transfer::TransferReason;
pub use transfer::TransferRecord;
pub use transfer::TransferReport;

//! Text encoders for composite patterns and ERP tables.
//!
//! Every encoder writes to a caller-supplied [`std::io::Write`]; the
//! `encode_*` helpers return the same bytes as a `String`.
pub mod legacy;
pub mod pat;
pub mod prn;

pub use legacy::{write_erp_csv, write_erp_tab};
pub use pat::{encode_pat, write_pat, PatHeader};
pub use prn::{encode_prn, prn_vertical_elevation_deg, write_prn, PrnHeader};

use crate::error::Result;

/// Run a writer-based encoder into an in-memory string.
pub(crate) fn to_string<F>(encode: F) -> Result<String>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let mut buf = Vec::new();
    encode(&mut buf)?;
    // Encoders only ever write ASCII/UTF-8 text.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

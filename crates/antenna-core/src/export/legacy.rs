//! Flat per-azimuth ERP tables: a tab-separated dBW listing and a CSV of
//! watts. Angles are folded onto 0..359.
use std::io::Write;

use crate::erp::ErpTable;
use crate::error::Result;

fn folded(angle_deg: f64) -> i64 {
    (angle_deg as i64).rem_euclid(360)
}

/// `AAA<TAB>dBW` rows with zero-padded angles.
pub fn write_erp_tab<W: Write>(out: &mut W, table: &ErpTable) -> Result<()> {
    writeln!(out, "# ERP pattern export")?;
    for (&a, &dbw) in table.angles_deg.iter().zip(&table.erp_dbw) {
        writeln!(out, "{:03}\t{dbw:.3}", folded(a))?;
    }
    Ok(())
}

/// `Angle,ERP_W` CSV.
pub fn write_erp_csv<W: Write>(out: &mut W, table: &ErpTable) -> Result<()> {
    writeln!(out, "Angle,ERP_W")?;
    for (&a, &w) in table.angles_deg.iter().zip(&table.erp_w) {
        writeln!(out, "{},{w:.6}", folded(a))?;
    }
    Ok(())
}

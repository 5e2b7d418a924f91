//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the model code stays free of presentation concerns
//! - output changes are localized (important for future snapshot tests)

use crate::app::pipeline::{EvalRow, QuickstartRun};

/// Format the quickstart console summary.
pub fn format_quickstart_summary(run: &QuickstartRun) -> String {
    let mut out = String::new();

    out.push_str("=== px1 quickstart: PX1 + guardrail metadata ===\n");
    out.push_str(&format!(
        "H0: {:.2} km/s/Mpc | rd: {:.2} Mpc | mapping: {} | z_switch: {} | z*: {}\n",
        run.params.h0, run.params.rd, run.params.mapping, run.guardrail.z_switch, run.params.z_star
    ));
    out.push('\n');

    out.push_str(&format!(
        "Small-z slope D_L({z})/{z} = {slope:.2} Mpc  (c/H0≈{target:.2})\n",
        z = run.small_z.z,
        slope = run.small_z.dl_over_z_mpc,
        target = run.small_z.target_c_over_h0_mpc,
    ));

    for row in &run.bao {
        out.push_str(&format!(
            "BAO z={:.2}:  D_M/rd={:6.2}   D_H/rd={:6.2}\n",
            row.z, row.dm_over_rd, row.dh_over_rd
        ));
    }

    out.push_str(&format!(
        "ell_A (DA-based) = {:.2}  |  D_A(z*) = {:.2} Mpc  |  D_M(z*) = {:.2} Mpc",
        run.cmb.ell_a, run.cmb.da_mpc, run.cmb.dm_mpc
    ));

    out
}

/// Format an observables table, one row per redshift.
pub fn format_eval_table(rows: &[EvalRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>8} {:>10} {:>9} {:>10} {:>12} {:>12} {:>11} {:>10} {:>8} {:>8}\n",
        "z", "w", "E", "H", "D_M", "D_L", "D_A", "D_H", "D_M/rd", "D_H/rd"
    ));
    for r in rows {
        out.push_str(&format!(
            "{:>8.4} {:>10.6} {:>9.5} {:>10.3} {:>12.3} {:>12.3} {:>11.3} {:>10.3} {:>8.3} {:>8.3}\n",
            r.z, r.w, r.e, r.hubble, r.dm, r.dl, r.da, r.dh, r.dm_over_rd, r.dh_over_rd
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Guardrail, Parameters};
    use crate::io::{BaoRow, CmbSummary, SmallZCheck};
    use crate::models::CacheStats;

    #[test]
    fn summary_lists_every_check() {
        let run = QuickstartRun {
            guardrail: Guardrail::default(),
            params: Parameters::default(),
            small_z: SmallZCheck {
                z: 0.01,
                dl_over_z_mpc: 4304.51,
                target_c_over_h0_mpc: 4282.75,
            },
            bao: vec![
                BaoRow {
                    z: 0.35,
                    dm_over_rd: 9.31,
                    dh_over_rd: 25.46,
                },
                BaoRow {
                    z: 1.5,
                    dm_over_rd: 39.71,
                    dh_over_rd: 28.29,
                },
            ],
            cmb: CmbSummary {
                z_star: 1090.0,
                da_mpc: 104211.16,
                dm_mpc: 113694380.31,
                ell_a: 2227.14,
            },
            cache: CacheStats::default(),
        };

        let text = format_quickstart_summary(&run);
        assert!(text.contains("D_L(0.01)/0.01 = 4304.51 Mpc"));
        assert!(text.contains("c/H0≈4282.75"));
        assert!(text.contains("BAO z=0.35:  D_M/rd=  9.31   D_H/rd= 25.46"));
        assert!(text.contains("BAO z=1.50"));
        assert!(text.contains("ell_A (DA-based) = 2227.14"));
    }

    #[test]
    fn eval_table_has_header_and_one_line_per_row() {
        let row = EvalRow {
            z: 0.5,
            w: 0.3,
            e: 1.1,
            hubble: 77.0,
            dm: 1800.0,
            dl: 2700.0,
            da: 1200.0,
            dh: 3893.4,
            dm_over_rd: 12.2,
            dh_over_rd: 26.5,
        };
        let text = format_eval_table(&[row, row]);
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().next().unwrap().contains("D_M/rd"));
    }
}

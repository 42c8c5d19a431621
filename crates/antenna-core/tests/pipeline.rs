//! End-to-end: raw pattern text → composition → ERP → metrics → exports.

use antenna_core::cable::{feeder_loss_db, CableCurve, FeederSpec};
use antenna_core::export::{encode_pat, encode_prn, write_erp_csv, PatHeader, PrnHeader};
use antenna_core::metrics::ProjectMetrics;
use antenna_core::pattern::parse_pattern_text;
use antenna_core::units::FrequencyUnit;
use antenna_core::{compose_project, ElementPattern, PatternKind, ProjectConfig};
use approx::assert_relative_eq;

const PANEL_HRP: &str = "\
# angle  E/Emax
-180 0.10
-120 0.20
-60  0.75
0    1.00
60   0.75
120  0.20
180  0.10
";

const DIPOLE_VRP: &str = "\
-90; 0.0
-45; 0.707
0;   1.0
45;  0.707
90;  0.0
";

fn project() -> ProjectConfig {
    serde_json::from_str(
        r#"{
            "frequency_mhz": 98.1,
            "tx_power_w": 2000,
            "nominal_element_gain_dbd": 4.5,
            "horizontal": {"count": 2, "spacing_m": 1.5},
            "vertical": {"count": 4, "spacing_m": 2.7, "tilt_deg": 1.0}
        }"#,
    )
    .unwrap()
}

#[test]
fn composed_project_exports_consistently() {
    let mut config = project();
    let feeder = FeederSpec {
        length_m: 60.0,
        cable: Some(
            CableCurve::from_points([(100.0, 1.3), (200.0, 1.9)], FrequencyUnit::MHz).unwrap(),
        ),
        connector_loss_db: 0.2,
        ..Default::default()
    };
    config.feeder_loss_db = feeder_loss_db(&feeder, config.frequency_mhz).unwrap();
    assert!(config.feeder_loss_db > 0.9 && config.feeder_loss_db < 1.1);

    let h_samples = parse_pattern_text(PANEL_HRP).unwrap();
    let v_samples = parse_pattern_text(DIPOLE_VRP).unwrap();
    let h = ElementPattern::new(PatternKind::Horizontal, h_samples).unwrap();
    let v = ElementPattern::new(PatternKind::Vertical, v_samples).unwrap();
    let out = compose_project(&config, &h, &v).unwrap();

    assert_eq!(out.horizontal.pattern.len(), 361);
    assert_eq!(out.vertical.pattern.len(), 1801);
    assert!(out.vertical.effective_progressive_phase_deg < 0.0);

    let boresight = out.erp.angles_deg.iter().position(|&a| a == 0.0).unwrap();
    let linear = out.horizontal.pattern.amplitude_linear[boresight] * out.erp.vertical_scalar;
    let expected = 10.0 * 2000f64.log10() - config.feeder_loss_db + 4.5 - 20.0 * linear.log10();
    assert_relative_eq!(out.erp.erp_dbw[boresight], expected, max_relative = 1e-9);
    // Normalized patterns never exceed unity, so no azimuth drops below nominal gain.
    assert!(out.erp.gain_dbd.iter().all(|&g| g >= 4.5 - 1e-9));

    let metrics = ProjectMetrics::compute(&out);
    assert!(metrics.horizontal.hpbw_deg > 0.0 && metrics.horizontal.hpbw_deg < 180.0);
    assert!(metrics.vertical.hpbw_deg > 0.0 && metrics.vertical.hpbw_deg < 90.0);
    assert!(metrics.estimated_gain_dbi.is_finite());
    assert!(metrics.horizontal.front_to_back_db > 0.0);

    let pat = encode_pat(
        &PatHeader { description: "2x4 panel".into(), gain_dbd: 4.5, element_count: 8 },
        &out.horizontal.pattern,
        &out.vertical.pattern,
    )
    .unwrap();
    let pat_lines: Vec<&str> = pat.lines().collect();
    assert_eq!(pat_lines.len(), 459);
    assert_eq!(pat_lines[0], "'2x4 panel', 4.50, 8");
    assert_eq!(pat_lines[1], "0, 1.0000");

    let header = PrnHeader::for_project("2x4 panel", "ACME", &config, &metrics);
    assert_relative_eq!(header.gain_dbi, metrics.estimated_gain_dbi);
    let prn = encode_prn(&header, &out.horizontal.pattern, &out.vertical.pattern).unwrap();
    assert!(prn.starts_with("NAME 2x4 panel\nMAKE ACME\nFREQUENCY 98.10 MHz\n"));
    assert_eq!(prn.lines().count(), 9 + 360 + 1 + 360);
    assert!(prn.contains("\nHORIZONTAL 360\n0\t0.00\n"));

    let mut csv = Vec::new();
    write_erp_csv(&mut csv, &out.erp).unwrap();
    assert_eq!(String::from_utf8(csv).unwrap().lines().count(), 362);
}

#[test]
fn missing_patterns_fall_back_to_uniform() {
    let config = project();
    let out = compose_project(
        &config,
        &ElementPattern::uniform(PatternKind::Horizontal),
        &ElementPattern::uniform(PatternKind::Vertical),
    )
    .unwrap();
    assert!(out.erp.erp_w.iter().all(|w| w.is_finite() && *w >= 0.0));
    assert_eq!(config.fingerprint().unwrap(), project().fingerprint().unwrap());
}

#[test]
fn down_tilt_is_exported_below_the_horizon() {
    let mut config = ProjectConfig::default();
    config.vertical.array.count = 8;
    config.vertical.array.spacing_m = antenna_core::units::C / config.frequency_hz() / 2.0;
    config.vertical.tilt_deg = 6.0;
    let out = compose_project(
        &config,
        &ElementPattern::uniform(PatternKind::Horizontal),
        &ElementPattern::uniform(PatternKind::Vertical),
    )
    .unwrap();
    let metrics = ProjectMetrics::compute(&out);
    assert_relative_eq!(metrics.vertical.peak_angle_deg, 6.0, epsilon = 0.05);

    let header = PrnHeader::for_project("tilted", "ACME", &config, &metrics);
    let prn = encode_prn(&header, &out.horizontal.pattern, &out.vertical.pattern).unwrap();
    let vertical: Vec<&str> = prn.lines().skip_while(|l| *l != "VERTICAL 360").skip(1).collect();
    assert_eq!(vertical.len(), 360);
    // Row 6 looks 6° down at the front, row 354 looks 6° up.
    assert_eq!(vertical[6], "6\t0.00");
    let above: f64 = vertical[354].split('\t').nth(1).unwrap().parse().unwrap();
    assert!(above > 10.0, "upward lobe at {above} dB");

    let pat = encode_pat(
        &PatHeader { description: "tilted".into(), gain_dbd: 0.0, element_count: 8 },
        &out.horizontal.pattern,
        &out.vertical.pattern,
    )
    .unwrap();
    let pat_lines: Vec<&str> = pat.lines().collect();
    assert_eq!(pat_lines[368 + 6], "-6, 1.0000");
}

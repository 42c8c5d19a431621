//! `antenna` — array composition and RF calculator front end.
//!
//! `compose` runs the full pattern pipeline for a project file and writes the
//! `.PAT`, `.PRN` and ERP exports; the remaining subcommands expose the
//! stand-alone calculators.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use antenna_core::{
    cable::{cable_total_loss, feeder_loss_db, CableCurve, FeederSpec},
    compose_project,
    export::{write_erp_csv, write_erp_tab, write_pat, write_prn, PatHeader, PrnHeader},
    metrics::ProjectMetrics,
    pattern::parse_pattern_text,
    rf::{
        compute_knife_edge, cutoff_summary, electrical_length, length_from_phase,
        propagation_parameters, reflection_summary, sparams, width_for_impedance, ReflectionInput,
        WaveguideMode,
    },
    units::{from_meters, to_hz, to_meters, FrequencyUnit, LengthUnit},
    ElementPattern, PatternKind, ProjectConfig,
};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "antenna", about = "Antenna array composition and RF calculators")]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbosity: u8,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a project and write .PAT, .PRN and ERP tables.
    Compose {
        /// Project JSON file.
        project: PathBuf,

        /// Horizontal element pattern (angle/amplitude text). Uniform if absent.
        #[arg(long)]
        h_pattern: Option<PathBuf>,

        /// Vertical element pattern (angle/amplitude text). Uniform if absent.
        #[arg(long)]
        v_pattern: Option<PathBuf>,

        #[arg(short, long, default_value = "out")]
        out_dir: PathBuf,
    },

    /// Describe a reflection coefficient given as magnitude and phase.
    Sparams {
        magnitude: f64,

        /// Phase in degrees.
        #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
        phase: f64,

        /// Magnitude is in dB rather than linear.
        #[arg(long)]
        db: bool,
    },

    /// Convert between VSWR, return loss and |Γ|.
    Vswr {
        #[arg(value_enum)]
        kind: ReflectionKind,
        value: f64,
    },

    /// Microstrip width for a target impedance.
    Microstrip {
        #[arg(short = 'z', long, default_value_t = 50.0)]
        impedance: f64,
        #[arg(short, long)]
        eps_r: f64,
        /// Substrate height.
        #[arg(long)]
        height: f64,
        /// Conductor thickness.
        #[arg(short, long, default_value_t = 0.0)]
        thickness: f64,
        #[arg(short, long, default_value = "mm")]
        unit: LengthUnit,
    },

    /// Rectangular waveguide cutoff and propagation.
    Waveguide {
        #[arg(long, default_value = "TE")]
        mode: WaveguideMode,
        #[arg(short, default_value_t = 1)]
        m: u32,
        #[arg(short, default_value_t = 0)]
        n: u32,
        /// Broad wall.
        #[arg(short)]
        a: f64,
        /// Narrow wall.
        #[arg(short)]
        b: f64,
        #[arg(short, long, default_value = "mm")]
        unit: LengthUnit,
        /// Operating frequency.
        #[arg(short, long)]
        frequency: Option<f64>,
        #[arg(long, default_value = "ghz")]
        freq_unit: FrequencyUnit,
    },

    /// Electrical length of a line, or the length for a given phase.
    Line {
        #[arg(short, long)]
        frequency: f64,
        #[arg(long, default_value = "mhz")]
        freq_unit: FrequencyUnit,
        /// Physical length in metres.
        #[arg(short, long, conflicts_with = "phase", required_unless_present = "phase")]
        length: Option<f64>,
        /// Desired phase in degrees.
        #[arg(short, long, allow_hyphen_values = true)]
        phase: Option<f64>,
        #[arg(long)]
        vf: Option<f64>,
        #[arg(long)]
        eps_eff: Option<f64>,
    },

    /// Knife-edge diffraction loss over a single obstacle.
    KnifeEdge {
        #[arg(short, long)]
        frequency: f64,
        #[arg(long, default_value = "mhz")]
        freq_unit: FrequencyUnit,
        /// Distance tx → obstacle, metres.
        #[arg(long)]
        d1: f64,
        /// Distance obstacle → rx, metres.
        #[arg(long)]
        d2: f64,
        #[arg(long, allow_hyphen_values = true)]
        tx_height: f64,
        #[arg(long, allow_hyphen_values = true)]
        rx_height: f64,
        #[arg(long, allow_hyphen_values = true)]
        obstacle_height: f64,
    },

    /// Cable loss from an attenuation curve file.
    Cable {
        /// Curve JSON: `{"unit": "mhz", "points": [[f, dB/100m], ...]}`.
        curve: PathBuf,
        #[arg(short, long)]
        frequency: f64,
        #[arg(long, default_value = "mhz")]
        freq_unit: FrequencyUnit,
        /// Length in metres.
        #[arg(short, long)]
        length: f64,
        /// Connector loss in dB; repeat per connector.
        #[arg(short, long)]
        connector: Vec<f64>,
        #[arg(long)]
        vf: Option<f64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ReflectionKind {
    Vswr,
    #[value(name = "rl")]
    ReturnLoss,
    Gamma,
}

// ── Project file ──────────────────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct ProjectFile {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    make: String,
    #[serde(default)]
    config: ProjectConfig,
    /// When present, replaces `config.feeder_loss_db`.
    feeder: Option<FeederSpec>,
}

fn default_name() -> String {
    "antenna".to_string()
}

#[derive(Serialize)]
struct ComposeReport<'a> {
    name: &'a str,
    feeder_loss_db: f64,
    peak_erp_dbw: Option<f64>,
    peak_erp_azimuth_deg: Option<f64>,
    metrics: &'a ProjectMetrics,
    outputs: Vec<PathBuf>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn setup_logging(verbosity: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stderr);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        _ => builder.filter_level(log::LevelFilter::Trace),
    };
    builder.init();
}

fn read_element(path: Option<&Path>, kind: PatternKind) -> Result<ElementPattern> {
    let Some(path) = path else {
        debug!("no {kind:?} pattern given; using a uniform element");
        return Ok(ElementPattern::uniform(kind));
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let samples =
        parse_pattern_text(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(ElementPattern::new(kind, samples)?)
}

fn create(path: &Path) -> Result<std::io::BufWriter<fs::File>> {
    let file =
        fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(std::io::BufWriter::new(file))
}

fn emit<T: Serialize>(json: bool, value: &T, lines: Vec<String>) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        for line in lines {
            println!("{line}");
        }
    }
    Ok(())
}

fn opt(value: Option<f64>, precision: usize, suffix: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.precision$}{suffix}"),
        _ => "n/a".to_string(),
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn run_compose(
    json: bool,
    project: &Path,
    h_pattern: Option<&Path>,
    v_pattern: Option<&Path>,
    out_dir: &Path,
) -> Result<()> {
    let raw =
        fs::read_to_string(project).with_context(|| format!("reading {}", project.display()))?;
    let file: ProjectFile =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", project.display()))?;
    let mut config = file.config;
    if let Some(feeder) = &file.feeder {
        config.feeder_loss_db = feeder_loss_db(feeder, config.frequency_mhz)?;
        info!("feeder loss {:.3} dB", config.feeder_loss_db);
    }

    let h = read_element(h_pattern, PatternKind::Horizontal)?;
    let v = read_element(v_pattern, PatternKind::Vertical)?;
    let composition = compose_project(&config, &h, &v)?;
    let metrics = ProjectMetrics::compute(&composition);

    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let hp = &composition.horizontal.pattern;
    let vp = &composition.vertical.pattern;
    let element_count =
        config.horizontal.array.count.max(1) * config.vertical.array.count.max(1);
    let pat_header = PatHeader {
        description: file.name.clone(),
        gain_dbd: config.nominal_element_gain_dbd,
        element_count,
    };
    let prn_header = PrnHeader::for_project(&file.name, &file.make, &config, &metrics);

    let outputs = vec![
        out_dir.join("pattern.pat"),
        out_dir.join("pattern.prn"),
        out_dir.join("erp.csv"),
        out_dir.join("erp.tab"),
    ];
    let mut out = create(&outputs[0])?;
    write_pat(&mut out, &pat_header, hp, vp)?;
    out.flush()?;
    let mut out = create(&outputs[1])?;
    write_prn(&mut out, &prn_header, hp, vp)?;
    out.flush()?;
    let mut out = create(&outputs[2])?;
    write_erp_csv(&mut out, &composition.erp)?;
    out.flush()?;
    let mut out = create(&outputs[3])?;
    write_erp_tab(&mut out, &composition.erp)?;
    out.flush()?;
    for p in &outputs {
        info!("wrote {}", p.display());
    }

    let peak = composition.erp.peak_dbw();
    let mut lines = vec![format!("Project: {}", file.name)];
    lines.push(format!("Feeder loss: {:.2} dB", config.feeder_loss_db));
    if let Some((dbw, az)) = peak {
        lines.push(format!(
            "Peak ERP: {dbw:.2} dBW ({:.1} W) @ {az:.0} deg",
            10f64.powf(dbw / 10.0)
        ));
    }
    lines.push("Horizontal:".to_string());
    lines.extend(
        metrics
            .horizontal
            .summary_lines(None)
            .into_iter()
            .map(|l| format!("  {l}")),
    );
    lines.push("Vertical:".to_string());
    lines.extend(
        metrics
            .vertical
            .summary_lines(Some(metrics.estimated_gain_dbi))
            .into_iter()
            .map(|l| format!("  {l}")),
    );

    let report = ComposeReport {
        name: &file.name,
        feeder_loss_db: config.feeder_loss_db,
        peak_erp_dbw: peak.map(|p| p.0),
        peak_erp_azimuth_deg: peak.map(|p| p.1),
        metrics: &metrics,
        outputs,
    };
    emit(json, &report, lines)
}

fn run_sparams(json: bool, magnitude: f64, phase: f64, db: bool) -> Result<()> {
    let r = if db {
        sparams::sparameter_from_db_phase(magnitude, phase)?
    } else {
        sparams::sparameter_from_linear_phase(magnitude, phase)?
    };
    let vswr = if r.vswr.is_finite() {
        format!("{:.4}", r.vswr)
    } else {
        "∞".to_string()
    };
    let lines = vec![
        format!("|S|: {:.6} ({:.4} dB)", r.magnitude_linear, r.magnitude_db),
        format!(
            "Phase: {:.2} deg (normalized {:.2})",
            r.phase_deg,
            sparams::normalized_phase(r.phase_deg)
        ),
        format!("Γ: {:.6} {:+.6}j", r.gamma.re, r.gamma.im),
        format!("VSWR: {vswr}"),
        format!("Return loss: {:.4} dB", r.return_loss_db),
        format!("Mismatch loss: {}", opt(Some(r.reflection_loss_db), 3, " dB")),
    ];
    emit(json, &r, lines)
}

fn run_vswr(json: bool, kind: ReflectionKind, value: f64) -> Result<()> {
    let input = match kind {
        ReflectionKind::Vswr => ReflectionInput::Vswr(value),
        ReflectionKind::ReturnLoss => ReflectionInput::ReturnLoss(value),
        ReflectionKind::Gamma => ReflectionInput::Gamma(value),
    };
    let s = reflection_summary(input)?;
    let lines = vec![
        format!("VSWR: {:.4}", s.vswr),
        format!("|Γ|: {:.6}", s.gamma),
        format!("Return loss: {}", opt(Some(s.return_loss_db), 4, " dB")),
        format!("Mismatch loss: {:.4} dB", s.mismatch_loss_db),
    ];
    emit(json, &s, lines)
}

fn run_microstrip(
    json: bool,
    impedance: f64,
    eps_r: f64,
    height: f64,
    thickness: f64,
    unit: LengthUnit,
) -> Result<()> {
    let h = to_meters(height, unit);
    let t = to_meters(thickness, unit);
    let r = width_for_impedance(impedance, eps_r, h, t)?;
    let mut lines = vec![
        format!("Width: {:.4} {unit}", from_meters(r.width_m, unit)),
        format!("W/h: {:.4}", r.width_over_height),
        format!("ε_eff: {:.4}", r.effective_eps),
    ];
    for w in &r.warnings {
        warn!("{w}");
        lines.push(format!("Warning: {w}"));
    }
    emit(json, &r, lines)
}

#[allow(clippy::too_many_arguments)]
fn run_waveguide(
    json: bool,
    mode: WaveguideMode,
    m: u32,
    n: u32,
    a: f64,
    b: f64,
    unit: LengthUnit,
    frequency: Option<f64>,
    freq_unit: FrequencyUnit,
) -> Result<()> {
    let f_hz = frequency.map(|f| to_hz(f, freq_unit));
    let summary = cutoff_summary(mode, m, n, to_meters(a, unit), to_meters(b, unit), f_hz)?;
    let mut lines = vec![format!("{}: cutoff {:.4} GHz", summary.mode, summary.cutoff_ghz)];
    if !summary.guidance.is_empty() {
        lines.push(summary.guidance.clone());
    }
    let propagation = match f_hz {
        Some(f) => Some(propagation_parameters(f, summary.cutoff_hz)?),
        None => None,
    };
    if let Some(p) = &propagation {
        lines.push(format!("λ0: {:.3} mm", p.wavelength_free_space_m * 1e3));
        lines.push(format!("λg: {}", opt(p.guide_wavelength_m.map(|l| l * 1e3), 3, " mm")));
        lines.push(format!("β: {}", opt(p.phase_constant_rad_m, 3, " rad/m")));
    }
    emit(json, &(summary, propagation), lines)
}

#[allow(clippy::too_many_arguments)]
fn run_line(
    json: bool,
    frequency: f64,
    freq_unit: FrequencyUnit,
    length: Option<f64>,
    phase: Option<f64>,
    vf: Option<f64>,
    eps_eff: Option<f64>,
) -> Result<()> {
    let f_hz = to_hz(frequency, freq_unit);
    let r = match (length, phase) {
        (Some(l), _) => electrical_length(f_hz, l, vf, eps_eff)?,
        (None, Some(p)) => length_from_phase(f_hz, p, vf, eps_eff)?,
        (None, None) => bail!("either --length or --phase is required"),
    };
    let lines = vec![
        format!("Length: {:.5} m", r.physical_length_m),
        format!("Phase: {:.4} deg", r.phase_deg),
        format!("λg: {:.5} m", r.guided_wavelength_m),
        format!("β: {:.5} rad/m", r.beta_rad_m),
        format!("v: {:.0} m/s", r.propagation_velocity_m_s),
    ];
    emit(json, &r, lines)
}

fn run_knife_edge(
    json: bool,
    f_hz: f64,
    d1: f64,
    d2: f64,
    tx: f64,
    rx: f64,
    obstacle: f64,
) -> Result<()> {
    let r = compute_knife_edge(f_hz, d1, d2, tx, rx, obstacle)?;
    let lines = vec![
        format!("v: {:.4}", r.v),
        format!("Loss: {:.3} dB", r.loss_db),
        format!("Clearance: {:.2} m ({:.2} of r1)", r.clearance_m, r.clearance_ratio),
        format!("First Fresnel radius: {:.3} m", r.fresnel_radius_m),
        r.guidance.to_string(),
    ];
    emit(json, &r, lines)
}

fn run_cable(
    json: bool,
    curve: &Path,
    f_hz: f64,
    length: f64,
    connectors: &[f64],
    vf: Option<f64>,
) -> Result<()> {
    let raw = fs::read_to_string(curve).with_context(|| format!("reading {}", curve.display()))?;
    let curve: CableCurve =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", curve.display()))?;
    let r = cable_total_loss(&curve, f_hz, length, connectors, vf)?;
    if r.interpolation.extrapolated {
        warn!("frequency outside the curve; attenuation is extrapolated");
    }
    let mut lines = vec![
        format!(
            "Attenuation: {:.4} dB/100 m ({:?})",
            r.interpolation.attenuation_db_per_100m, r.interpolation.origin
        ),
        format!("Cable loss: {:.4} dB", r.cable_loss_db),
        format!("Connector loss: {:.4} dB", r.connector_loss_db),
        format!("Total: {:.4} dB", r.total_loss_db),
    ];
    if let Some(v) = r.propagation_velocity_m_s {
        lines.push(format!("Propagation velocity: {v:.0} m/s"));
    }
    emit(json, &r, lines)
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbosity);
    let json = args.json;

    match args.command {
        Command::Compose { project, h_pattern, v_pattern, out_dir } => {
            run_compose(json, &project, h_pattern.as_deref(), v_pattern.as_deref(), &out_dir)
        }
        Command::Sparams { magnitude, phase, db } => run_sparams(json, magnitude, phase, db),
        Command::Vswr { kind, value } => run_vswr(json, kind, value),
        Command::Microstrip { impedance, eps_r, height, thickness, unit } => {
            run_microstrip(json, impedance, eps_r, height, thickness, unit)
        }
        Command::Waveguide { mode, m, n, a, b, unit, frequency, freq_unit } => {
            run_waveguide(json, mode, m, n, a, b, unit, frequency, freq_unit)
        }
        Command::Line { frequency, freq_unit, length, phase, vf, eps_eff } => {
            run_line(json, frequency, freq_unit, length, phase, vf, eps_eff)
        }
        Command::KnifeEdge {
            frequency,
            freq_unit,
            d1,
            d2,
            tx_height,
            rx_height,
            obstacle_height,
        } => run_knife_edge(
            json,
            to_hz(frequency, freq_unit),
            d1,
            d2,
            tx_height,
            rx_height,
            obstacle_height,
        ),
        Command::Cable { curve, frequency, freq_unit, length, connector, vf } => {
            run_cable(json, &curve, to_hz(frequency, freq_unit), length, &connector, vf)
        }
    }
}

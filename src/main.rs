use clap::Parser;
use rebar_cut_planner::compute_cutting_plan;
use rebar_cut_planner::metrics::PlanMetrics;
use rebar_cut_planner::render;
use rebar_cut_planner::types::{DemandPiece, Diameter, Length, OriginKind, PlanConfig, RemnantStock};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "rebar_cut_planner",
    about = "Rebar cutting plan optimizer with remnant reuse"
)]
struct Cli {
    /// Standard bar length in cm (default: 1200)
    #[arg(long)]
    bar_length: Option<f64>,

    /// Saw kerf per cut in cm (default: 0)
    #[arg(long)]
    kerf: Option<f64>,

    /// Demand as DIAMETER:LENGTH:QTY (e.g. 10.0:300:2 12.5:415.5:4)
    #[arg(long = "cuts", num_args = 1..)]
    cuts: Vec<String>,

    /// Remnants in stock as DIAMETER:LENGTH:QTY
    #[arg(long = "remnants", num_args = 1..)]
    remnants: Vec<String>,

    /// JSON file with `demand`, `remnants` and `config`
    #[arg(long)]
    input: Option<PathBuf>,

    /// Show ASCII layout of each bar pattern
    #[arg(long)]
    layout: bool,

    /// Print the plan and metrics as JSON
    #[arg(long)]
    json: bool,

    /// Log packing decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Deserialize, Default)]
struct PlanRequest {
    #[serde(default)]
    demand: Vec<DemandPiece>,
    #[serde(default)]
    remnants: Vec<RemnantStock>,
    #[serde(default)]
    config: PlanConfig,
}

fn parse_line(s: &str) -> Result<(Diameter, Length, u32), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("invalid entry '{}', expected DIAMETER:LENGTH:QTY", s));
    }
    let diameter = parts[0]
        .parse::<f64>()
        .map_err(|_| format!("invalid diameter in '{}'", s))
        .and_then(|mm| Diameter::try_from(mm).map_err(|e| format!("{} in '{}'", e, s)))?;
    let length = parts[1]
        .parse::<f64>()
        .map_err(|_| format!("invalid length in '{}'", s))?;
    if length <= 0.0 {
        return Err(format!("length must be positive in '{}'", s));
    }
    let length = Length::try_from(length).map_err(|e| format!("{} in '{}'", e, s))?;
    let qty = parts[2]
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    if qty == 0 {
        return Err(format!("quantity must be non-zero in '{}'", s));
    }
    Ok((diameter, length, qty))
}

fn parse_cut(s: &str) -> Result<DemandPiece, String> {
    let (diameter, length, qty) = parse_line(s)?;
    Ok(DemandPiece::new(diameter, length, qty))
}

fn parse_remnant(index: usize, s: &str) -> Result<RemnantStock, String> {
    let (diameter, length, qty) = parse_line(s)?;
    Ok(RemnantStock::new(format!("stock-{}", index + 1), diameter, length, qty))
}

fn load_request(cli: &Cli) -> Result<PlanRequest, String> {
    let mut req = match &cli.input {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            serde_json::from_str::<PlanRequest>(&text)
                .map_err(|e| format!("invalid request in {}: {}", path.display(), e))?
        }
        None => PlanRequest::default(),
    };

    for c in &cli.cuts {
        req.demand.push(parse_cut(c)?);
    }
    let offset = req.remnants.len();
    for (i, r) in cli.remnants.iter().enumerate() {
        req.remnants.push(parse_remnant(offset + i, r)?);
    }

    if let Some(bar_length) = cli.bar_length {
        if bar_length <= 0.0 {
            return Err("bar length must be positive".to_string());
        }
        req.config.standard_bar_length = Length::try_from(bar_length).map_err(|e| e.to_string())?;
    }
    if let Some(kerf) = cli.kerf {
        if kerf < 0.0 {
            return Err("kerf must not be negative".to_string());
        }
        req.config.kerf_loss = Length::try_from(kerf).map_err(|e| e.to_string())?;
    }
    if req.demand.is_empty() {
        return Err("no cuts given, use --cuts or --input".to_string());
    }
    Ok(req)
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let req = load_request(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let plan = compute_cutting_plan(&req.demand, &req.remnants, &req.config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let metrics = PlanMetrics::from_plan(&plan);

    if cli.json {
        let out = serde_json::json!({ "plan": plan, "metrics": metrics });
        match serde_json::to_string_pretty(&out) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Output results
    for dp in &plan.diameters {
        println!("Diameter {} mm:", dp.diameter);
        for g in &dp.bar_groups {
            let origin = match g.origin() {
                OriginKind::New => "new bar",
                OriginKind::Remnant => "remnant",
            };
            let cuts: Vec<String> = g.cuts().iter().map(|c| c.to_string()).collect();
            println!(
                "  {}x {} {} cm: {} | left {}",
                g.count,
                origin,
                g.original_length(),
                cuts.join(" + "),
                g.remaining
            );
            if cli.layout {
                print!("{}", render::render_bar(g, render::DEFAULT_WIDTH));
            }
        }
        println!();
    }

    println!(
        "Summary: {} new bar{}, {} remnant{} used, {:.1}% utilization",
        metrics.new_bars,
        if metrics.new_bars == 1 { "" } else { "s" },
        metrics.remnant_bars,
        if metrics.remnant_bars == 1 { "" } else { "s" },
        metrics.utilization,
    );
}

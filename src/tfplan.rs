//! # PowerScale resource planner
//!
//! '''bash
//! cargo run --bin tfplan -- --help
//! '''

use powerscale_tftypes::plan::read_document;
use powerscale_tftypes::schema::{export_schema_to_registry, read_tf_schema_from_file};
use powerscale_tftypes::{plan_resource, BlockKind, Diagnostics, PlanConfig, Result};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "tfplan",
    about = "Plan a PowerScale resource configuration against its state"
)]
struct Options {
    /// Path to the JSON-encoded provider schema (`terraform providers schema -json`).
    #[structopt(long, parse(from_os_str))]
    schema: PathBuf,

    /// Resource or data source type, e.g. powerscale_smb_share.
    #[structopt(long)]
    resource: String,

    /// Look the type up among data sources instead of resources.
    #[structopt(long)]
    data_source: bool,

    /// Path to the JSON object holding the configured attribute values.
    #[structopt(long, parse(from_os_str))]
    config: PathBuf,

    /// Path to the JSON object holding the prior state. Planned as a create when omitted.
    #[structopt(long, parse(from_os_str))]
    state: Option<PathBuf>,

    /// Attribute compared without regard to letter case (repeatable).
    #[structopt(long = "case-insensitive", number_of_values = 1)]
    case_insensitive: Vec<String>,

    /// Configured attribute whose value is only known after apply (repeatable).
    #[structopt(long, number_of_values = 1)]
    unknown: Vec<String>,

    /// Print the planned state as JSON instead of a summary.
    #[structopt(long)]
    json: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(Options::from_args()) {
        Ok(diags) if !diags.has_errors() => (),
        Ok(_) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(2);
        }
    }
}

fn run(options: Options) -> Result<Diagnostics> {
    let kind = if options.data_source {
        BlockKind::DataSource
    } else {
        BlockKind::Resource
    };

    let plan_config = options
        .case_insensitive
        .iter()
        .fold(PlanConfig::new(), |c, attr| {
            c.with_case_insensitive(kind, options.resource.as_str(), attr.as_str())
        });
    let plan_config = options
        .unknown
        .iter()
        .fold(plan_config, |c, attr| c.with_unknown(attr.as_str()));

    let schema = read_tf_schema_from_file(&options.schema)?;
    let mut registry = export_schema_to_registry(&schema)?;
    registry.apply(&plan_config)?;

    let config = read_document(&options.config)?;
    let state = match &options.state {
        Some(path) => read_document(path)?,
        None => Default::default(),
    };

    let mut diags = Diagnostics::new();
    let plan = plan_resource(
        &registry,
        kind,
        &options.resource,
        &config,
        &state,
        &plan_config,
        &mut diags,
    )?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&plan.planned_state())?);
    } else {
        print!("{}", plan);
    }

    for d in &diags {
        eprintln!("\n{}", d);
        if !d.detail.is_empty() {
            let detail = textwrap::fill(&d.detail, 76);
            eprintln!("{}", textwrap::indent(&detail, "    "));
        }
    }
    Ok(diags)
}

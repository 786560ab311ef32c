use azure_infra_topology::config::{PolicySettings, LOG_CONFIG_FILE};
use azure_infra_topology::output::print_status;
use azure_infra_topology::terraform::{render_values_json, OutputFile, TerraformCli, Terraformer};
use azure_infra_topology::{read_cluster, read_document, reconcile};
use std::error::Error;
use std::path::{Path, PathBuf};

const USAGE: &str =
    "usage: azure-infra-topology <config.json> <cluster.json> [outputs.json|terraform-dir|-] [prior-status.json]";

/// Outputs are read from a JSON file, or by running terraform in a directory.
fn tool_for(arg: Option<&String>, settings: &PolicySettings) -> Option<Box<dyn Terraformer>> {
    let arg = arg.filter(|arg| arg.as_str() != "-")?;
    let path = PathBuf::from(arg);
    if path.is_dir() {
        Some(Box::new(TerraformCli::from_settings(settings, path)))
    } else {
        Some(Box::new(OutputFile::new(path)))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file(LOG_CONFIG_FILE, Default::default()).expect("Error initializing log4rs");
    dotenv::dotenv().ok();
    log::info!("#Start main()");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("{USAGE}");
        return Err(USAGE.into());
    }

    let settings = PolicySettings::from_env()?;
    let config_json = read_document(Path::new(&args[0]))?;
    let cluster = read_cluster(&read_document(Path::new(&args[1]))?)?;
    let prior_status_json = args
        .get(3)
        .map(|path| read_document(Path::new(path)))
        .transpose()?;
    let tool = tool_for(args.get(2), &settings);

    // reading the outputs may shell out to terraform
    let reconciled = tokio::task::spawn_blocking(move || {
        reconcile(
            &config_json,
            &cluster,
            prior_status_json.as_deref(),
            tool.as_deref(),
            &settings,
        )
    })
    .await??;

    println!("{}", render_values_json(&reconciled.values)?);
    if let (Some(status), Some(status_json)) = (&reconciled.status, &reconciled.status_json) {
        print_status(status);
        println!("{status_json}");
    }

    log::info!("#End main()");
    Ok(())
}

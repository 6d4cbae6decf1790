use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgGroup, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;

use labeler::commands::{PredictCommand, PredictRequest, TrainModelCommand};
use labeler::config::{load_config, LabelerConfig};
use labeler::metrics::Scoring;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("LABELER_LOG", "warn,labeler=info"))
        .init();

    let config_arg = Arg::new("config")
        .help("Path to a JSON configuration file or a conf/ directory")
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::AnyPath);

    let model_path_arg = Arg::new("model_path")
        .short('m')
        .long("model_path")
        .help("Model artifact path. Overrides model_path in the configuration.")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath);

    let matches = Command::new("labeler")
        .version(clap::crate_version!())
        .about("Select, train and serve a tabular classifier")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Search the candidate grids, then persist the best pipeline")
                .arg(config_arg.clone())
                .arg(model_path_arg.clone())
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .help("Training table. Overrides data.path in the configuration.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("scoring")
                        .short('s')
                        .long("scoring")
                        .help("Scoring metric used to rank candidates")
                        .value_parser([
                            "accuracy",
                            "balanced_accuracy",
                            "f1_macro",
                            "precision_macro",
                            "recall_macro",
                        ]),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Label one observation with the persisted model")
                .arg(config_arg)
                .arg(model_path_arg)
                .arg(
                    Arg::new("values")
                        .long("values")
                        .help("Comma separated feature values, e.g. 5.1,3.5,1.4,0.2")
                        .value_delimiter(',')
                        .value_parser(clap::value_parser!(f64))
                        .allow_negative_numbers(true),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Request body, e.g. '{\"Values\": [5.1, 3.5, 1.4, 0.2]}'")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .group(
                    ArgGroup::new("input")
                        .args(["values", "json"])
                        .required(true),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", train_matches)) => handle_train(train_matches),
        Some(("predict", predict_matches)) => handle_predict(predict_matches),
        _ => unreachable!(),
    }
}

fn read_config(matches: &ArgMatches) -> Result<LabelerConfig> {
    let config_path = matches
        .get_one::<PathBuf>("config")
        .ok_or_else(|| anyhow!("missing configuration path"))?;
    log::info!("[labeler] Using config: {:?}", config_path);

    let mut config = load_config(config_path)?;
    if let Some(model_path) = matches.get_one::<PathBuf>("model_path") {
        config.model_path = model_path.clone();
    }
    Ok(config)
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let mut config = read_config(matches)?;
    if let Some(data) = matches.get_one::<PathBuf>("data") {
        config.data.path = data.clone();
    }
    if let Some(scoring) = matches.get_one::<String>("scoring") {
        config.design.scoring = Scoring::from_str(scoring).map_err(anyhow::Error::msg)?;
    }

    match TrainModelCommand::new(&config).execute() {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => {
            log::error!("Training failed: {:#}", anyhow::Error::from(e));
            std::process::exit(1)
        }
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let config = read_config(matches)?;

    let request = match matches.get_one::<String>("json") {
        Some(body) => serde_json::from_str::<PredictRequest>(body)
            .with_context(|| format!("Invalid request body: {}", body))?,
        None => PredictRequest {
            values: matches
                .get_many::<f64>("values")
                .map(|values| values.copied().collect())
                .unwrap_or_default(),
        },
    };

    match PredictCommand::new(&config).execute(&request) {
        Ok(response) => {
            println!("{}", serde_json::to_string(&response)?);
            Ok(())
        }
        Err(e) => {
            log::error!("Prediction failed: {:#}", anyhow::Error::from(e));
            std::process::exit(1)
        }
    }
}

use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;

use service_catalogue::cli::{Cli, Command};
use service_catalogue::logging::init_logging;
use service_catalogue::services::catalogue::{CatalogueClient, Job};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = match cli.client_config(|key| std::env::var(key).ok()) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Service Catalogue client starting with config: {:?}", config);

    let client = match CatalogueClient::connect(config).await {
        Ok(client) => client,
        Err(err) => {
            tracing::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    if !client.connection_ok() {
        tracing::error!("Service Catalogue is not reachable");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::Probe => ExitCode::SUCCESS,

        Command::Teams => {
            let mut teams: Vec<String> = client.find_all_teams_ref_in_sc().await.into_iter().collect();
            teams.sort();
            for team in teams {
                println!("{}", team);
            }
            ExitCode::SUCCESS
        }

        Command::Get { table, field, value } => match client.get_record(&table, &field, &value).await {
            Some(record) => match serde_json::to_string_pretty(&record) {
                Ok(rendered) => {
                    println!("{}", rendered);
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    tracing::error!("Could not render record: {}", err);
                    ExitCode::FAILURE
                }
            },
            None => {
                tracing::warn!("No record in {} with {}={}", table, field, value);
                ExitCode::FAILURE
            }
        },

        Command::Id { table, field, value } => match client.get_id(&table, &field, &value).await {
            Some(id) => {
                println!("{}", id);
                ExitCode::SUCCESS
            }
            None => ExitCode::FAILURE,
        },

        Command::JobStatus {
            status,
            job_name,
            errors,
        } => {
            // The default job context is resolved here, not inside the client.
            let mut job = match job_name {
                Some(name) => Job::new(name),
                None => Job::from_env(),
            };
            for error in errors {
                job.record_error(error);
            }

            if client.update_scheduled_job(&status, &job).await {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

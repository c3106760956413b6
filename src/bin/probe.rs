//! Walks the live platform end to end with whatever ids the environment
//! provides. APIKEY is required; PROJECT_ID, DATASET_ID, SPACE_ID,
//! DEPLOYMENT_ID and JOB_ID each unlock a further step. Job triggering only
//! happens with TRIGGER_JOB=1 since it starts real work on the platform.

use anyhow::{Context, Result};

use cpdash::config::Config;
use cpdash::error::PlatformError;
use cpdash::platform::PlatformClient;
use cpdash::session::Session;

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Platform errors keep the raw response body off their Display line; a
/// probe wants both.
fn verbose(e: PlatformError) -> anyhow::Error {
    anyhow::anyhow!("{}: {}", e, e.detail())
}

#[tokio::main]
async fn main() -> Result<()> {
    let apikey = env_opt("APIKEY").context("APIKEY must be set")?;
    let cfg = Config::from_env();
    let client = PlatformClient::new(cfg);
    let mut session = Session::new();

    let token = client.authenticate(&apikey).await.map_err(verbose)?;
    session.set_token(token.clone());

    let projects = client.list_projects(&token).await.map_err(verbose)?;
    println!("projects ({}):", projects.len());
    for p in &projects {
        println!("  {}", p.label());
    }

    if let Some(project_id) = env_opt("PROJECT_ID") {
        let datasets = client.list_datasets(&token, &project_id).await.map_err(verbose)?;
        println!("datasets in {} ({}):", project_id, datasets.len());
        for d in &datasets {
            println!("  {}", d.label());
        }

        let jobs = client.list_jobs(&token, &project_id).await.map_err(verbose)?;
        println!("jobs ({}):", jobs.len());
        for j in &jobs {
            println!("  {}", j.label());
        }

        if let Some(dataset_id) = env_opt("DATASET_ID") {
            let table = client
                .load_dataset(&token, &project_id, &dataset_id)
                .await
                .map_err(verbose)?;
            println!(
                "loaded {}: {} rows x {} cols, fingerprint {}",
                dataset_id,
                table.n_rows(),
                table.n_cols(),
                &table.fingerprint()[..16]
            );
            for row in table.head(5) {
                println!("  {}", row.join(", "));
            }
            session.install_table(dataset_id, table);
        }

        if let (Some(job_id), Some("1")) = (env_opt("JOB_ID"), env_opt("TRIGGER_JOB").as_deref()) {
            let env = [("TRIGGERED_BY".to_string(), "probe".to_string())];
            let run = client
                .trigger_job(&token, &project_id, &job_id, &env)
                .await
                .map_err(verbose)?;
            println!("job run started: {:?}", run.run_id);
        }
    }

    let spaces = client.list_spaces(&token).await.map_err(verbose)?;
    println!("spaces ({}):", spaces.len());
    for s in &spaces {
        println!("  {}", s.label());
    }

    if let Some(space_id) = env_opt("SPACE_ID") {
        let deployments = client.list_deployments(&token, &space_id).await.map_err(verbose)?;
        println!("deployments in {} ({}):", space_id, deployments.len());
        for d in &deployments {
            println!("  {}", d.label());
        }

        if let Some(deployment_id) = env_opt("DEPLOYMENT_ID") {
            let resolution = client
                .resolve_deployment(&token, &space_id, &deployment_id)
                .await
                .map_err(verbose)?;
            let dep = &resolution.deployment;
            println!(
                "deployment {} -> {} asset {} (serving: {})",
                dep.id,
                dep.asset_kind.as_str(),
                dep.asset_id,
                dep.serving_url.as_deref().unwrap_or("none")
            );
            match (&resolution.descriptor, &resolution.descriptor_error) {
                (Some(desc), _) => {
                    println!(
                        "descriptor: fields={:?} shap={} metrics={}",
                        desc.input_fields,
                        desc.shap.is_some(),
                        desc.metrics.as_ref().map(|m| m.len()).unwrap_or(0)
                    );
                }
                (None, Some(err)) => {
                    println!("descriptor unavailable: {} ({})", err, err.detail());
                }
                (None, None) => {}
            }
        }
    }

    Ok(())
}

//! Career Architect CLI
//!
//! Usage:
//!   career-architect run --input profile.json --site
//!   career-architect run --request-type portfolio_only --site-dir ./my-site
//!   career-architect models --task text-generation

use career_architect::{
    agent::{Agent, OrchestratorAgent},
    config::Settings,
    llm::{ModelSelector, ModelTask},
    site::{PortfolioBundle, ReactSiteGenerator},
};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SAMPLE_INPUT: &str = r#"{
  "request_type": "full_optimization",
  "profile_data": {
    "headline": "Data Analyst at Northwind",
    "about": "I turn messy data into decisions. Built reporting that cut close time by 30%.",
    "experience": [
      {
        "title": "Data Analyst",
        "company": "Northwind",
        "description": "Own finance reporting",
        "bullets": ["Automated monthly close reports, saving 20 hours", "Built churn dashboard"]
      }
    ],
    "skills": [{ "name": "SQL", "endorsements": 12 }, "Python", "Tableau"]
  },
  "user_data": {
    "name": "Jordan Lee",
    "current_role": "Data Analyst",
    "target_role": "Data Scientist",
    "industry": "Finance",
    "top_skills": ["Python", "SQL"],
    "skills": ["Python", "SQL", "Statistics"],
    "achievements": ["Cut month-end close from 8 to 5 days"],
    "projects": [
      { "name": "Churn Model", "description": "Gradient boosted churn predictor", "technologies": ["Python", "scikit-learn"] }
    ]
  }
}"#;

#[derive(Parser)]
#[command(name = "career-architect", about = "Career profile analysis and portfolio generation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an orchestrator workflow and print the outcome as JSON.
    Run {
        /// JSON request file; a built-in sample profile is used when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Override the request's workflow (full_optimization, profile_only, portfolio_only, optimize).
        #[arg(long)]
        request_type: Option<String>,
        /// Render the generated portfolio as a React site under OUTPUT_DIR/site.
        #[arg(long)]
        site: bool,
        /// Render the site into this directory instead (implies --site).
        #[arg(long)]
        site_dir: Option<PathBuf>,
    },
    /// List the model catalogue.
    Models {
        /// Only models for this task.
        #[arg(long, value_enum)]
        task: Option<TaskArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TaskArg {
    TextGeneration,
    Summarization,
    ZeroShotClassification,
    FeatureExtraction,
    TokenClassification,
    QuestionAnswering,
}

impl From<TaskArg> for ModelTask {
    fn from(arg: TaskArg) -> Self {
        match arg {
            TaskArg::TextGeneration => ModelTask::TextGeneration,
            TaskArg::Summarization => ModelTask::Summarization,
            TaskArg::ZeroShotClassification => ModelTask::Classification,
            TaskArg::FeatureExtraction => ModelTask::Embedding,
            TaskArg::TokenClassification => ModelTask::Ner,
            TaskArg::QuestionAnswering => ModelTask::QuestionAnswering,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Run {
            input,
            request_type,
            site,
            site_dir,
        } => {
            let site_dir = site_dir.or_else(|| site.then(|| settings.site_dir()));
            run(&settings, input, request_type, site_dir).await
        }
        Command::Models { task } => list_models(task),
    }
}

async fn run(
    settings: &Settings,
    input: Option<PathBuf>,
    request_type: Option<String>,
    site_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = match &input {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => SAMPLE_INPUT.to_string(),
    };
    let mut request: Value = serde_json::from_str(&raw)?;
    if let (Some(kind), Some(obj)) = (request_type, request.as_object_mut()) {
        obj.insert("request_type".to_string(), Value::String(kind));
    }

    info!(input = ?input, "Running career workflow");
    let mut orchestrator = OrchestratorAgent::new(settings.text_generator()?);
    let outcome = orchestrator.run(&request).await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let Some(dir) = site_dir {
        let bundle = PortfolioBundle::from_workflow_outcome(&outcome)?;
        let site = ReactSiteGenerator::new().render(&bundle);
        let written = site.write_to(&dir).await?;
        info!(dir = %dir.display(), files = written.len(), "Portfolio site written");
        eprintln!("{}", site.build_instructions);
    }

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn list_models(task: Option<TaskArg>) -> Result<(), Box<dyn std::error::Error>> {
    let models = ModelSelector::new().list(task.map(ModelTask::from));
    println!("{}", serde_json::to_string_pretty(&models)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_names_match_catalogue() {
        let cli = Cli::try_parse_from(["career-architect", "models", "--task", "feature-extraction"]).unwrap();
        match cli.command {
            Command::Models { task } => assert_eq!(task.map(ModelTask::from), Some(ModelTask::Embedding)),
            Command::Run { .. } => panic!("expected models subcommand"),
        }

        for arg in TaskArg::value_variants() {
            let name = arg.to_possible_value().unwrap().get_name().to_string();
            let task: ModelTask = serde_json::from_value(Value::String(name)).unwrap();
            assert_eq!(task, ModelTask::from(*arg));
        }

        assert!(Cli::try_parse_from(["career-architect", "models", "--task", "poetry"]).is_err());
    }

    #[test]
    fn test_site_flag_parses() {
        let cli = Cli::try_parse_from(["career-architect", "run", "--site"]).unwrap();
        match cli.command {
            Command::Run { site, site_dir, .. } => {
                assert!(site);
                assert!(site_dir.is_none());
            }
            Command::Models { .. } => panic!("expected run subcommand"),
        }
    }
}

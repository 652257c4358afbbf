//! CLI interface for sprout

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::coach::Coach;
use crate::config::{Config, ModelsConfig};

#[derive(Parser)]
#[command(name = "sprout")]
#[command(about = "A gentle, gamified companion for small daily steps", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive session (default when no command given)
    Interactive,
    /// Print one grounding tip and exit
    Tip,
    /// Configure sprout
    Config {
        /// Store the LLM API key in the system keyring
        #[arg(long)]
        set_api_key: Option<String>,
        /// Remove the stored API key
        #[arg(long)]
        delete_api_key: bool,
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set model for a role (usage: --set-model role model_id)
        #[arg(long, value_names = &["role", "model"], num_args = 2)]
        set_model: Option<Vec<String>>,
        /// Get model for a role
        #[arg(long)]
        get_model: Option<String>,
        /// List all model assignments
        #[arg(long)]
        list_models: bool,
        /// Language generated content is written in
        #[arg(long)]
        set_language: Option<String>,
        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Interactive) => {
            let config = Config::load()?;
            crate::interactive::run(config).await?;
        }
        Some(Commands::Tip) => {
            let config = Config::load()?;
            let tip = Coach::from_config(&config).grounding_tip().await;
            println!("🌿 {}", tip);
        }
        Some(Commands::Config {
            set_api_key,
            delete_api_key,
            show,
            set_model,
            get_model,
            list_models,
            set_language,
            reset,
        }) => {
            if let Some(key) = set_api_key {
                crate::security::set_api_key(&key)?;
                println!("API key stored securely in keyring.");
            } else if delete_api_key {
                crate::security::delete_api_key()?;
                println!("API key removed.");
            } else if let Some(args) = set_model {
                if args.len() >= 2 {
                    crate::config::set_model(&args[0], &args[1])?;
                } else {
                    eprintln!("Usage: --set-model <role> <model_id>");
                    println!("Available roles: {}", ModelsConfig::roles().join(", "));
                }
            } else if let Some(role) = get_model {
                crate::config::get_model(&role)?;
            } else if list_models {
                crate::config::list_models()?;
            } else if let Some(language) = set_language {
                crate::config::set_language(&language)?;
            } else if reset {
                crate::config::reset_config()?;
            } else if show {
                crate::config::show_config()?;
            } else {
                println!("Configuration options:");
                println!("  --set-api-key <key>      Store your OpenRouter (or compatible) API key");
                println!("  --delete-api-key         Remove the stored API key");
                println!("  --show                   Display current configuration");
                println!("  --set-model <role> <id>  Set model for a role");
                println!("  --get-model <role>       Get model for a role");
                println!("  --list-models            List all model assignments");
                println!("  --set-language <lang>    Language for generated content");
                println!("  --reset                  Restore defaults");
                println!();
                println!("Model roles: {}", ModelsConfig::roles().join(", "));
                println!();
                println!("Without an API key sprout runs offline with built-in content.");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["sprout"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_set_model_takes_role_and_model() {
        let cli = Cli::try_parse_from(["sprout", "config", "--set-model", "social", "openai/gpt-4o"]).unwrap();
        match cli.command {
            Some(Commands::Config { set_model: Some(args), .. }) => {
                assert_eq!(args, vec!["social".to_string(), "openai/gpt-4o".to_string()]);
            }
            _ => panic!("expected config command"),
        }
    }
}

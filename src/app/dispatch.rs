use crate::cli::{AuthCommands, Cli, Commands};
use crate::config::Config;
use crate::error::ExtractError;
use crate::extract::{self, DomBackend};
use crate::generate::types::{ExtractedPost, GenerationResult, ResultStatus};
use crate::generate::GenerationClient;
use crate::platform::{self, PlatformId};
use crate::security::CredentialStore;
use crate::service::{self, CommentService, ServiceHandle};
use anyhow::{Context, Result, bail};
use console::style;
use strum::IntoEnumIterator;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Suggest {
            url,
            html,
            tone,
            max_chars,
            avoid,
            instruction,
            selection,
        } => {
            let service = spawn_service(&config)?;

            let platform = PlatformId::from_url(&url)
                .ok_or(ExtractError::UnsupportedPage { url: url.clone() })?;

            let mut post = if let Some(selection) = selection {
                ExtractedPost::from_selection(platform, &selection)
            } else {
                let page = std::fs::read_to_string(&html)
                    .with_context(|| format!("failed to read {}", html.display()))?;
                let backend = DomBackend::parse(page);
                extract::extract_post(&backend, platform)
            };
            if post.post_text.is_empty() {
                bail!(ExtractError::NoPostText);
            }

            if let Some(tone) = tone {
                post.desired_tone = tone;
            }
            if let Some(max_chars) = max_chars {
                post.max_length_chars = max_chars;
            }
            post.avoid_keywords = avoid;
            if let Some(instruction) = instruction {
                post.user_instruction = instruction;
            }

            let result = service
                .generate(post)
                .await
                .map_err(|message| anyhow::anyhow!(message))?;
            render_result(&result);
            Ok(())
        }

        Commands::Auth { auth_command } => {
            let service = spawn_service(&config)?;
            handle_auth(&config, &service, auth_command).await
        }

        Commands::Platforms => {
            for platform in PlatformId::iter() {
                let defaults = platform::defaults(platform);
                println!(
                    "{:<10} tone: {:<13} length budget: {}",
                    platform.to_string(),
                    defaults.default_tone,
                    defaults.max_length_chars
                );
            }
            Ok(())
        }
    }
}

fn spawn_service(config: &Config) -> Result<ServiceHandle> {
    let credentials = CredentialStore::new(&config.config_dir, config.secrets.encrypt);
    let client = GenerationClient::from_config(config);
    let service = CommentService::new(credentials, client, service::fallback_api_key())?;
    Ok(service.spawn())
}

async fn handle_auth(
    config: &Config,
    service: &ServiceHandle,
    command: AuthCommands,
) -> Result<()> {
    match command {
        AuthCommands::SetKey { api_key } => {
            let api_key = match api_key {
                Some(key) => key,
                None => dialoguer::Password::new()
                    .with_prompt("Gemini API key")
                    .interact()?,
            };
            if api_key.trim().is_empty() {
                bail!("API key must not be empty");
            }

            service
                .set_api_key(api_key.clone())
                .await
                .map_err(|message| anyhow::anyhow!(message))?;
            println!("API key stored ({})", CredentialStore::masked(api_key.trim()));
            Ok(())
        }

        AuthCommands::Show => {
            let api_key = service.get_api_key().await;
            if api_key.is_empty() {
                println!("No API key configured.");
            } else {
                println!("{}", CredentialStore::masked(&api_key));
            }
            Ok(())
        }

        AuthCommands::Clear => {
            let credentials =
                CredentialStore::new(&config.config_dir, config.secrets.encrypt);
            credentials.clear()?;
            println!("API key removed.");
            Ok(())
        }
    }
}

fn render_result(result: &GenerationResult) {
    if result.status == ResultStatus::Rejected {
        let reason = result
            .rejection_reason
            .as_deref()
            .unwrap_or("no reason given");
        println!("{} {reason}", style("Rejected:").red().bold());
        return;
    }

    let recommended_id = result.recommendation.map(|r| r.comment_id);
    for comment in &result.comments {
        let marker = if Some(comment.id) == recommended_id {
            style("*").green().bold().to_string()
        } else {
            " ".to_string()
        };
        let tone = comment.tone.as_deref().unwrap_or("-");
        println!(
            "{marker} [{}] ({} chars) {}",
            style(tone).cyan(),
            comment.length_chars,
            comment.text
        );
        println!("    {}", style(&comment.rationale).dim());
    }

    if let Some(notes) = &result.safety_notes {
        println!("{} {notes}", style("Safety:").yellow());
    }
}

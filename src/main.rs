use crossterm::style::Stylize;
use reedline::{
    Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline, Signal,
};
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use style_search::api_client::HttpRecommendationService;
use style_search::config::config::BASE_URL_ENV;
use style_search::config::{Config, DisplayConfig};
use style_search::session::{SearchSession, SessionState};
use style_search::table_display::{export_to_csv, results_table};
use tokio::runtime::Runtime;

struct StylePrompt;

impl Prompt for StylePrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed("style")
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        match edit_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => "> ".into(),
            PromptEditMode::Vi(vi_mode) => match vi_mode {
                reedline::PromptViMode::Normal => " N> ".into(),
                reedline::PromptViMode::Insert => " I> ".into(),
            },
            PromptEditMode::Custom(str) => format!(" {str}> ").into(),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse search: {})",
            prefix, history_search.term
        ))
    }
}

fn print_help() {
    println!("{}", "style-search - find outfits by describing them".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  style-search [OPTIONS]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}       - Use the line-based interface", "--classic".green());
    println!("  {}   - Recommendation service address", "--url <base>".green());
    println!("  {}   - Write the default config file", "--init-config".green());
    println!(
        "  {} - Write a commented config file",
        "--generate-config".green()
    );
    println!("  {}          - Show this help", "--help".green());
    println!();
    println!(
        "The service address can also be set with {} or in the config file.",
        BASE_URL_ENV.green()
    );
    println!();
}

fn print_classic_help() {
    println!("{}", "Commands:".yellow());
    println!("  {}              - Search for the typed description", "<text>".green());
    println!("  {} - Write the last results to CSV", "\\export <file>".green());
    println!("  {}             - Clear the screen", "\\clear".green());
    println!("  {}              - Show this help", "\\help".green());
    println!("  {}      - Exit", "Ctrl+D/Ctrl+C".green());
    println!();
    println!("Try: {}", "black minimal streetwear blazer".italic());
    println!();
}

fn print_state(state: &SessionState, display: &DisplayConfig) {
    if let Some(error) = state.error() {
        eprintln!("{}", format!("{} {}", display.icons.error, error).red());
        return;
    }

    let results = state.results();
    if results.is_empty() {
        println!("{}", "No matching outfits.".yellow());
        return;
    }

    println!("{}", results_table(results, display));
    println!(
        "\n{}",
        format!("{} {} results", display.icons.success, results.len()).green()
    );
}

fn run_classic(
    config: &Config,
    service: &HttpRecommendationService,
    runtime: &Runtime,
) -> anyhow::Result<()> {
    print_classic_help();
    println!("{}", format!("Connected to: {}", service.endpoint()).cyan());

    let mut line_editor = Reedline::create();
    let prompt = StylePrompt;
    let mut session = SearchSession::new();

    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                if trimmed == "\\help" {
                    print_classic_help();
                    continue;
                }

                if trimmed == "\\clear" {
                    print!("{esc}[2J{esc}[1;1H", esc = 27 as char);
                    continue;
                }

                if let Some(rest) = trimmed.strip_prefix("\\export") {
                    let target = rest.trim();
                    if target.is_empty() {
                        eprintln!("{}", "Usage: \\export <filename>".red());
                        continue;
                    }

                    let results = session.state().results();
                    if results.is_empty() {
                        eprintln!("{}", "No results to export. Run a search first.".red());
                        continue;
                    }

                    match export_to_csv(results, Path::new(target)) {
                        Ok(count) => {
                            println!("{}", format!("Exported {} results to {}", count, target).green())
                        }
                        Err(e) => eprintln!("{}", format!("Export error: {}", e).red()),
                    }
                    continue;
                }

                session.update_query(&buffer);
                println!("{}", format!("{} Searching...", config.display.icons.busy).cyan());
                if runtime.block_on(session.submit_and_wait(service)).is_none() {
                    continue;
                }
                print_state(session.state(), &config.display);
            }
            Signal::CtrlD | Signal::CtrlC => {
                println!("\nGoodbye!");
                break;
            }
        }
    }

    Ok(())
}

/// Value following `--url`, unless it is missing or another flag
fn url_arg(args: &[String]) -> Option<&str> {
    args.iter()
        .position(|arg| arg == "--url")
        .and_then(|pos| args.get(pos + 1))
        .map(String::as_str)
        .filter(|value| !value.starts_with("--"))
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.contains(&"--generate-config".to_string()) {
        let path = Config::get_config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, Config::create_default_with_comments())?;
        println!("Configuration file created at: {:?}", path);
        return Ok(());
    }

    if args.contains(&"--init-config".to_string()) {
        let path = Config::default().save()?;
        println!("Configuration saved to: {:?}", path);
        println!("You can edit this file directly to customize further.");
        return Ok(());
    }

    style_search::utils::logging::init_tracing();
    if let Some(path) = style_search::utils::logging::log_path() {
        eprintln!("📝 Debug logs will be written to:");
        eprintln!("   {}", path.display());
        eprintln!();
    }

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Could not read config, using defaults: {}", e);
        Config::default()
    });

    let cli_url = url_arg(&args);
    if cli_url.is_none() && args.iter().any(|a| a == "--url") {
        eprintln!("{}", "--url needs an address, ignoring it".yellow());
    }
    let env_url = std::env::var(BASE_URL_ENV).ok();
    let base_url = config.resolve_base_url(cli_url, env_url.as_deref());

    let service =
        HttpRecommendationService::with_timeout(&base_url, config.service.request_timeout())?;
    let runtime = Runtime::new()?;

    if args.contains(&"--classic".to_string()) {
        return run_classic(&config, &service, &runtime);
    }

    style_search::ui::tui_app::run_tui(
        config,
        base_url,
        Arc::new(service),
        runtime.handle().clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_url_arg_takes_following_value() {
        let argv = args(&["style-search", "--url", "http://recommender:9000", "--classic"]);
        assert_eq!(url_arg(&argv), Some("http://recommender:9000"));
    }

    #[test]
    fn test_url_arg_rejects_flag_or_missing_value() {
        assert_eq!(url_arg(&args(&["style-search", "--url", "--classic"])), None);
        assert_eq!(url_arg(&args(&["style-search", "--url"])), None);
        assert_eq!(url_arg(&args(&["style-search", "--classic"])), None);
    }
}

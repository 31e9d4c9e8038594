use clap::Parser;
use interview_notes::{app, cli, clipboard, config, error, export, interactive};
use cli::{Cli, Commands, HistoryAction};
use config::Config;
use error::{InterviewError, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let mut config = Config::load()?;

    match cli.command {
        Commands::Convert { input, template, copy, export: export_to } => {
            println!("📝 interview-notes - 面談メモ整理\n");

            let text = app::read_input(input.as_deref())?;
            let controller = app::build_controller(&config)?;
            app::attach_spinner(&controller);

            controller.set_input_text(text);
            if let Some(template) = template {
                controller.set_template(template);
            }
            println!("スタイル: {}", controller.session().template.label());

            let outcome =
                app::convert_with_retry(&controller, || app::prompt_api_key(&mut config, &controller))
                    .await?;
            app::report_outcome(&outcome)?;

            if copy {
                let mut clipboard = clipboard::SystemClipboard::new();
                match controller.copy_result(&mut clipboard) {
                    Ok(true) => println!("\n✔ クリップボードにコピーしました"),
                    Ok(false) => {}
                    Err(e) => return Err(InterviewError::Clipboard(e.to_string())),
                }
            }

            if let Some(output) = export_to {
                if let Some(file) = controller.export_result() {
                    let path = export::write_export(&file, &output)?;
                    println!("✔ 保存しました: {}", path.display());
                }
            }
        }

        Commands::History { action } => {
            let controller = app::build_controller(&config)?;

            match action {
                HistoryAction::List => {
                    let history = controller.history();
                    if history.is_empty() {
                        println!("履歴はありません");
                    } else {
                        println!("履歴: {}件（新しい順）", history.len());
                        for log in &history {
                            println!("  {}", app::history_line(log));
                        }
                    }
                }
                HistoryAction::Show { id } => {
                    let log = controller
                        .find_history_entry(&id)
                        .ok_or(InterviewError::HistoryNotFound(id))?;
                    controller.select_history_entry(&log);
                    app::print_log(&log);
                }
                HistoryAction::Delete { id, yes } => {
                    if controller.find_history_entry(&id).is_none() {
                        return Err(InterviewError::HistoryNotFound(id));
                    }
                    let deleted = if yes {
                        controller.delete_history_entry(&id, &app::AssumeYes)
                    } else {
                        controller.delete_history_entry(&id, &app::DialogConfirm)
                    };
                    if deleted {
                        println!("✔ 履歴を削除しました: {}", id);
                    } else {
                        println!("削除を中止しました");
                    }
                }
                HistoryAction::Export { id, output } => {
                    let log = controller
                        .find_history_entry(&id)
                        .ok_or(InterviewError::HistoryNotFound(id))?;
                    controller.select_history_entry(&log);
                    if let Some(file) = controller.export_result() {
                        let output = output.unwrap_or_else(|| PathBuf::from("."));
                        let path = export::write_export(&file, &output)?;
                        println!("✔ 保存しました: {}", path.display());
                    }
                }
            }
        }

        Commands::Session => {
            interactive::run_session(config).await?;
        }

        Commands::Config { set_api_key, set_model, set_template, show } => {
            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if let Some(model) = set_model {
                config.model = model;
                config.save()?;
                println!("✔ モデルを設定しました: {}", config.model);
            }

            if let Some(template) = set_template {
                config.default_template = template;
                config.save()?;
                println!("✔ 既定のスタイルを設定しました: {}", template.label());
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  既定のスタイル: {} ({})", config.default_template.label(), config.default_template);
                println!("  履歴の保存先: {}", config.history_dir()?.display());
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

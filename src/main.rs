use clap::Parser;
use color_eyre::Result;
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use tunedash::{logging, App, AppConfig, AppEvent, Args, ConfigManager, OpenOptions, Theme, APP_NAME};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig) -> Result<()> {
    let poll_interval = std::time::Duration::from_millis(config.performance.event_poll_interval_ms);
    let opts = OpenOptions::from_args_and_config(args, &config);
    let theme = Theme::from_config(&config.theme)?;

    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new_with_config(tx.clone(), theme, config).with_open_options(opts.clone());
    if args.debug {
        app.enable_debug();
    }
    render(&mut terminal, &mut app)?;
    if let Some(path) = &args.path {
        // Preload the file; the session still opens on the landing screen.
        tx.send(AppEvent::Open(path.clone(), opts))?;
    }

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(std::time::Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let manager = ConfigManager::new(APP_NAME)?;
        match manager.write_default_config(args.force) {
            Ok(path) => {
                println!("Wrote default configuration to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error generating config: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load(APP_NAME)?,
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    let config = load_config(&args)?;
    if args.debug || config.debug.enabled {
        let log_path = logging::init()?;
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "tunedash starting");
        eprintln!("Debug logging to {}", log_path.display());
    }

    color_eyre::install()?;
    let terminal = ratatui::init();
    let result = run(terminal, &args, config);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_open_options_from_args_and_config() {
        let args = Args::parse_from([
            "tunedash",
            "catalog.csv",
            "--delimiter",
            ";",
            "--no-header",
            "--skip-rows",
            "2",
        ]);
        let opts = OpenOptions::from_args_and_config(&args, &AppConfig::default());
        assert_eq!(opts.delimiter, Some(b';'));
        assert_eq!(opts.has_header, Some(false));
        assert_eq!(opts.skip_rows, Some(2));
        assert!(opts.parse_dates);
        assert_eq!(args.path.as_deref(), Some(Path::new("catalog.csv")));
    }

    #[test]
    fn test_config_layers_fill_loader_defaults() {
        let args = Args::parse_from(["tunedash"]);
        let mut config = AppConfig::default();
        config.file_loading.delimiter = Some("tab".to_string());
        config.file_loading.skip_rows = Some(1);

        let opts = OpenOptions::from_args_and_config(&args, &config);
        assert_eq!(opts.delimiter, Some(b'\t'));
        assert_eq!(opts.skip_rows, Some(1));
    }
}

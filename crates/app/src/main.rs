use std::process;

use eframe::egui;

mod app;
mod cli;
mod headless;

fn main() -> eframe::Result<()> {
    let (console, log_level_state) = app::setup_tracing();
    tracing::info!("forkview starting");

    let args: Vec<String> = std::env::args().collect();
    let cli = match cli::parse_args(&args) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("argument error: {err}");
            process::exit(1);
        }
    };

    if cli.help {
        cli::print_help();
        return Ok(());
    }

    if cli.headless {
        if let Err(err) = headless::run(&cli) {
            eprintln!("headless error: {err}");
            process::exit(1);
        }
        return Ok(());
    }

    let settings = cli.settings();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("forkview"),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };
    eframe::run_native(
        "forkview",
        native_options,
        Box::new(move |_cc| {
            Ok(Box::new(app::ForkviewApp::new(
                settings,
                console,
                log_level_state,
            )))
        }),
    )
}

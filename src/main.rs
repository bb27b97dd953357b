use color_eyre::Result;
use eframe::egui;
use padbind::controller::device::DeviceService;
use padbind::controller::event_collector::GilrsDevices;
use padbind::dialog::InputDialog;
use padbind::persistence::settings::AppSettings;
use padbind::persistence::toml_store::TomlConfigStore;
use padbind::ui::BindingWindow;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    setup()?;

    let settings = AppSettings::load();
    info!(
        "Editing bindings of {} in {}",
        settings.plugin_name,
        settings.bindings_file.display()
    );

    let store = TomlConfigStore::open(&settings.bindings_file)?;
    let devices = GilrsDevices::init().map(|devices| Box::new(devices) as Box<dyn DeviceService>);
    let dialog = InputDialog::new(&settings.plugin_name, Box::new(store), devices);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Controller bindings")
            .with_inner_size([420.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "padbind",
        native_options,
        Box::new(move |cc| Ok(Box::new(BindingWindow::new(cc, dialog)))),
    )
    .map_err(|e| color_eyre::eyre::eyre!("UI terminated with error: {}", e))?;

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

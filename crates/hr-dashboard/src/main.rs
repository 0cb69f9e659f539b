mod bootstrap;

use anyhow::{Context, Result};
use hr_core::error::HrError;
use hr_core::settings::Settings;
use hr_data::analysis::{analyze_workbooks, AnalysisOptions};
use hr_data::export::write_summary_workbook;
use hr_ui::app::App;
use hr_ui::report::render_report;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    let app_dir = bootstrap::ensure_directories()?;
    let target = bootstrap::log_target(&settings.view, settings.log_file.as_deref(), &app_dir);
    bootstrap::setup_logging(&settings.log_level, &target)?;

    tracing::info!("HR Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Demo: {}, Start: {}",
        settings.view,
        settings.theme,
        settings.demo,
        settings.start_month
    );

    let options = AnalysisOptions::new(settings.start_date()?)
        .demo(settings.demo)
        .seed(settings.seed);

    let data = analyze_workbooks(
        &settings.workbook,
        &settings.active_sheet,
        settings.departed_workbook_path(),
        &settings.departed_sheet,
        &options,
    )
    .with_context(|| format!("Failed to analyse {}", settings.workbook.display()))?;

    if let Some(path) = &settings.export {
        write_summary_workbook(path, &data.summaries)?;
        tracing::info!("Summary written to {}", path.display());
    }

    match settings.view.as_str() {
        "report" => {
            print!("{}", render_report(&data));
            if let Some(path) = &settings.export {
                println!("\nSummary written to {}", path.display());
            }
        }

        "dashboard" => {
            let app = App::new(&settings.theme, data, settings.export_path());
            app.run()?;
        }

        unknown => {
            return Err(HrError::Config(format!("Unknown view mode: {}", unknown)).into());
        }
    }

    Ok(())
}

pub mod types;
pub mod config;
pub mod data;
pub mod processing;
pub mod projection;
pub mod language;
pub mod render;

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

/// Produce the hackaviz 2021 choropleth of land transactions per commune.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Folder holding qp.csv, foncier_qp.csv and communes.geojson
    #[arg(long = "data_folderpath", value_name = "DIR")]
    data_folderpath: PathBuf,

    /// Language of the figure: French or English
    #[arg(long, default_value = "French")]
    language: String,

    /// Filename of the output figure, without the .html extension
    #[arg(long = "fn_figure", default_value = "commune_transactions_heatmap")]
    fn_figure: String,

    /// Optional TOML file overriding the figure layout
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Runs the whole pipeline and returns the path of the written page.
/// Nothing is written unless every step succeeds.
pub fn make_figure(
    data_folder: &Path,
    language: &str,
    fn_figure: &str,
    figure_config: &config::FigureConfig,
) -> anyhow::Result<PathBuf> {
    let language: language::Language = language.parse()?;

    // 1. Load Data
    let data::InputData { mut communes, transactions, qp_rows } = data::load_data(data_folder)?;
    info!("{} transactions listed in {}, {} detailed", qp_rows, data::QP_FILE, transactions.len());

    // 2. Aggregate
    let max_transaction = processing::aggregate(&mut communes, &transactions);

    // 3. Reproject
    projection::project_communes(&mut communes);

    // 4. Render
    let html = render::render_html(&communes, max_transaction, language, figure_config)?;

    let path = render::figure_path(fn_figure);
    render::write_figure(&path, &html)?;

    Ok(path)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let figure_config = config::FigureConfig::load(cli.config.as_deref())?;
    let path = make_figure(&cli.data_folderpath, &cli.language, &cli.fn_figure, &figure_config)?;

    info!("Generation complete: {:?}", path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::Value;
    use std::fs;
    use tempfile::tempdir;

    /// Pulls the embedded GeoJSON back out of a rendered page.
    fn embedded_features(html: &str) -> Vec<Value> {
        let line = html.lines()
            .find_map(|l| l.trim().strip_prefix("const data = "))
            .unwrap();
        let data: Value = serde_json::from_str(line.trim_end_matches(';')).unwrap();
        data["features"].as_array().unwrap().clone()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["commune-transactions-map", "--data_folderpath", "data"]).unwrap();
        assert_eq!(cli.data_folderpath, PathBuf::from("data"));
        assert_eq!(cli.language, "French");
        assert_eq!(cli.fn_figure, "commune_transactions_heatmap");
        assert!(cli.config.is_none());

        assert!(Cli::try_parse_from(["commune-transactions-map"]).is_err());
    }

    #[test]
    fn test_end_to_end() {
        let dir = tempdir().unwrap();
        data::tests::write_fixture(dir.path());
        let fn_figure = dir.path().join("heatmap");

        let path = make_figure(
            dir.path(),
            "English",
            fn_figure.to_str().unwrap(),
            &config::FigureConfig::default(),
        ).unwrap();

        assert_eq!(path, dir.path().join("heatmap.html"));
        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("Land transactions in Occitania"));

        let features = embedded_features(&html);
        assert_eq!(features.len(), 2);

        let a = &features[0]["properties"];
        assert_eq!(a["commune_name"], "A");
        assert_eq!(a["transaction_number"], 3);
        assert_eq!(a["house_number"], 2);
        assert_eq!(a["app_number"], 1);
        assert_eq!(a["indus_number"], 0);
        assert_eq!(a["mean_value"], "150000€");
        assert_eq!(a["fill_color"], render::PALETTE[8]);

        let b = &features[1]["properties"];
        assert_eq!(b["commune_name"], "B");
        assert_eq!(b["transaction_number"], 0);
        assert_eq!(b["house_number"], 0);
        assert_eq!(b["app_number"], 0);
        assert_eq!(b["indus_number"], 0);
        assert_eq!(b["mean_value"], "0€");
        assert_eq!(b["fill_color"], render::PALETTE[0]);

        // First vertex of A, (1.0, 43.0), in Web Mercator.
        let first = &features[0]["geometry"]["coordinates"][0][0];
        let expected = projection::lon_lat_to_web_mercator(geo::Coord { x: 1.0, y: 43.0 });
        assert!((first[0].as_f64().unwrap() - expected.x).abs() < 1e-6);
        assert!((first[1].as_f64().unwrap() - expected.y).abs() < 1e-6);
    }

    #[test]
    fn test_unsupported_language_writes_nothing() {
        let dir = tempdir().unwrap();
        data::tests::write_fixture(dir.path());
        let fn_figure = dir.path().join("heatmap");

        let err = make_figure(
            dir.path(),
            "German",
            fn_figure.to_str().unwrap(),
            &config::FigureConfig::default(),
        ).unwrap_err();

        assert_eq!(err.to_string(), "German language not supported.");
        assert!(!dir.path().join("heatmap.html").exists());
    }

    #[test]
    fn test_missing_input_writes_nothing() {
        let dir = tempdir().unwrap();
        let fn_figure = dir.path().join("heatmap");

        assert!(make_figure(
            dir.path(),
            "French",
            fn_figure.to_str().unwrap(),
            &config::FigureConfig::default(),
        ).is_err());
        assert!(!dir.path().join("heatmap.html").exists());
    }
}

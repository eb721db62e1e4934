//! pardep - Main Entry Point
//!
//! Fits a gradient-boosted ensemble and an MLP on the housing table, then
//! renders partial dependence curves, a 2D interaction heatmap, and a 3D
//! surface into the output directory.

use clap::Parser;
use ndarray::{s, Array1, Array2};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

use pardep::data::{train_test_split, HousingData, SyntheticConfig};
use pardep::explainability::PartialDependence;
use pardep::plot::{colors, save_png, CurvePlot, HeatmapPlot, SurfacePlot};
use pardep::preprocessing::{Scaler, ScalerType};
use pardep::training::{
    GradientBoostingConfig, GradientBoostingRegressor, MlpConfig, MlpRegressor, RegressionMetrics,
};

/// Partial dependence analysis on the California-housing table
#[derive(Parser, Debug)]
#[command(name = "pardep", version, about)]
struct Cli {
    /// Path to the housing CSV; defaults to the cache location, then to
    /// synthetic data
    #[arg(long)]
    data: Option<PathBuf>,

    /// Output directory for images and results
    #[arg(long, default_value = "pdp-out")]
    out: PathBuf,

    /// Grid points per feature
    #[arg(long, default_value_t = 50)]
    grid: usize,

    /// Rows of the training set used as the partial dependence background
    #[arg(long, default_value_t = 500)]
    sample: usize,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Features whose marginal effect the run reports
const PDP_FEATURES: [&str; 4] = ["MedInc", "AveOccup", "HouseAge", "AveRooms"];
/// Feature pair for the interaction surface
const PDP_PAIR: (&str, &str) = ("AveOccup", "HouseAge");

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pardep=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let data = load_data(&cli)?;
    info!(
        n_samples = data.n_samples(),
        n_features = data.n_features(),
        "dataset loaded"
    );

    let split = train_test_split(&data.features, &data.target, 0.2, Some(cli.seed))?;
    info!(
        train = split.x_train.nrows(),
        test = split.x_test.nrows(),
        "split"
    );

    // Gradient boosting on raw features
    let mut gbdt = GradientBoostingRegressor::new(GradientBoostingConfig {
        n_estimators: 200,
        learning_rate: 0.1,
        max_depth: 6,
        min_samples_leaf: 20,
        random_state: Some(cli.seed),
        ..Default::default()
    });
    gbdt.fit(&split.x_train, &split.y_train)?;
    let gbdt_metrics =
        RegressionMetrics::compute(&split.y_test, &gbdt.predict(&split.x_test)?);
    info!(r2 = gbdt_metrics.r2, mae = gbdt_metrics.mae, "gradient boosting fitted");

    // MLP behind standard scaling
    let mut scaler = Scaler::new(ScalerType::Standard);
    let x_train_scaled = scaler.fit_transform(&split.x_train)?;
    let mut mlp = MlpRegressor::new(MlpConfig {
        hidden_layers: vec![64, 32],
        max_epochs: 300,
        random_state: Some(cli.seed),
        ..Default::default()
    });
    mlp.fit(&x_train_scaled, &split.y_train)?;
    let mlp_metrics = RegressionMetrics::compute(
        &split.y_test,
        &mlp.predict(&scaler.transform(&split.x_test)?)?,
    );
    info!(r2 = mlp_metrics.r2, mae = mlp_metrics.mae, "mlp fitted");

    // Background sample for partial dependence; split already shuffled the rows
    let n_background = cli.sample.min(split.x_train.nrows());
    let background: Array2<f64> = split.x_train.slice(s![..n_background, ..]).to_owned();

    let feature_indices: Vec<usize> = PDP_FEATURES
        .iter()
        .map(|name| HousingData::feature_index(name))
        .collect::<pardep::Result<_>>()?;

    let gbdt_predict = |x: &Array2<f64>| -> pardep::Result<Array1<f64>> { gbdt.predict(x) };
    let gbdt_pdp = PartialDependence::new(gbdt_predict)
        .with_grid_points(cli.grid)
        .with_feature_names(HousingData::feature_names());

    // The MLP sees scaled inputs; the grid stays in original units
    let mlp_predict = |x: &Array2<f64>| -> pardep::Result<Array1<f64>> {
        mlp.predict(&scaler.transform(x)?)
    };
    let mlp_pdp = PartialDependence::new(mlp_predict)
        .with_grid_points(cli.grid)
        .with_feature_names(HousingData::feature_names());

    let mut results_1d = Vec::new();
    for (&name, &idx) in PDP_FEATURES.iter().zip(feature_indices.iter()) {
        info!(feature = name, "computing partial dependence");

        let gbdt_ice = gbdt_pdp.compute_ice(&background, idx)?;
        let gbdt_curve = gbdt_ice.to_pdp();
        let img = CurvePlot::new().render(&gbdt_curve, Some(&gbdt_ice))?;
        save_png(&img, &cli.out.join(format!("pdp_gbdt_{}.png", name)))?;

        let mlp_ice = mlp_pdp.compute_ice(&background, idx)?;
        let mlp_curve = mlp_ice.to_pdp();
        let img = CurvePlot::new()
            .with_curve_color(colors::CURVE_ORANGE)
            .render(&mlp_curve, Some(&mlp_ice))?;
        save_png(&img, &cli.out.join(format!("pdp_mlp_{}.png", name)))?;

        results_1d.push(json!({
            "feature": name,
            "gradient_boosting": gbdt_curve,
            "mlp": mlp_curve,
        }));
    }

    // 2D interaction for the boosted model
    let (name_1, name_2) = PDP_PAIR;
    let idx_1 = HousingData::feature_index(name_1)?;
    let idx_2 = HousingData::feature_index(name_2)?;
    info!(pair = %format!("{}/{}", name_1, name_2), "computing 2D partial dependence");

    let surface = gbdt_pdp.compute_2d(&background, idx_1, idx_2)?;
    let interaction = surface.interaction_strength(
        &gbdt_pdp.compute(&background, idx_1)?,
        &gbdt_pdp.compute(&background, idx_2)?,
    );
    info!(interaction_strength = interaction, "interaction");

    let img = HeatmapPlot::new().render(&surface)?;
    save_png(&img, &cli.out.join(format!("pdp2d_gbdt_{}_{}.png", name_1, name_2)))?;
    let img = SurfacePlot::new().render(&surface)?;
    save_png(&img, &cli.out.join(format!("surface_gbdt_{}_{}.png", name_1, name_2)))?;

    let results = json!({
        "metrics": {
            "gradient_boosting": gbdt_metrics,
            "mlp": mlp_metrics,
        },
        "partial_dependence": results_1d,
        "interaction": {
            "features": [name_1, name_2],
            "strength": interaction,
            "surface": surface,
        },
    });
    let results_path = cli.out.join("results.json");
    std::fs::write(&results_path, serde_json::to_string_pretty(&results)?)?;

    info!(out = %cli.out.display(), "done");
    Ok(())
}

fn load_data(cli: &Cli) -> anyhow::Result<HousingData> {
    if let Some(path) = &cli.data {
        return Ok(HousingData::load_csv(path)?);
    }

    if let Some(cache) = HousingData::default_cache_path() {
        if cache.exists() {
            info!(path = %cache.display(), "loading cached table");
            return Ok(HousingData::load_csv(&cache)?);
        }
        warn!(
            path = %cache.display(),
            "cached table not found, generating synthetic data"
        );
    }

    Ok(SyntheticConfig::default()
        .with_random_state(cli.seed)
        .generate()?)
}

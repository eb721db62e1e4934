//! Integration test: dataset through models to partial dependence

use ndarray::{Array1, Array2};
use pardep::data::{train_test_split, HousingData, SyntheticConfig};
use pardep::explainability::PartialDependence;
use pardep::preprocessing::{Scaler, ScalerType};
use pardep::training::{
    GradientBoostingConfig, GradientBoostingRegressor, MlpConfig, MlpRegressor, RegressionMetrics,
    Regressor,
};

fn housing_sample(n: usize) -> HousingData {
    SyntheticConfig::new(n)
        .with_noise(0.1)
        .with_random_state(42)
        .generate()
        .unwrap()
}

fn fitted_gbdt(x: &Array2<f64>, y: &Array1<f64>) -> GradientBoostingRegressor {
    let mut model = GradientBoostingRegressor::new(GradientBoostingConfig {
        n_estimators: 50,
        max_depth: 4,
        min_samples_leaf: 5,
        random_state: Some(0),
        ..Default::default()
    });
    model.fit(x, y).unwrap();
    model
}

#[test]
fn test_gradient_boosting_on_housing() {
    let data = housing_sample(600);
    let split = train_test_split(&data.features, &data.target, 0.25, Some(0)).unwrap();

    let model = fitted_gbdt(&split.x_train, &split.y_train);
    let metrics = RegressionMetrics::compute(&split.y_test, &model.predict(&split.x_test).unwrap());

    assert!(
        metrics.r2 > 0.3,
        "boosted model should explain the synthetic signal, r2 = {}",
        metrics.r2
    );
}

#[test]
fn test_mlp_on_scaled_housing() {
    let data = housing_sample(600);
    let split = train_test_split(&data.features, &data.target, 0.25, Some(1)).unwrap();

    let mut scaler = Scaler::new(ScalerType::Standard);
    let x_train = scaler.fit_transform(&split.x_train).unwrap();
    let x_test = scaler.transform(&split.x_test).unwrap();

    let mut mlp = MlpRegressor::new(MlpConfig {
        hidden_layers: vec![32],
        max_epochs: 300,
        random_state: Some(1),
        ..Default::default()
    });
    mlp.fit(&x_train, &split.y_train).unwrap();

    let metrics = RegressionMetrics::compute(&split.y_test, &mlp.predict(&x_test).unwrap());

    // Must at least beat predicting the mean
    assert!(
        metrics.r2 > 0.0,
        "scaled MLP should beat the mean predictor, r2 = {}",
        metrics.r2
    );
}

#[test]
fn test_pdp_recovers_income_effect() {
    // The synthetic target grows with median income; the marginal curve
    // of the fitted model should, too.
    let data = housing_sample(500);
    let model = fitted_gbdt(&data.features, &data.target);

    let idx = HousingData::feature_index("MedInc").unwrap();
    let pdp = PartialDependence::new(|x: &Array2<f64>| model.predict(x))
        .with_grid_points(20)
        .with_feature_names(HousingData::feature_names())
        .compute(&data.features, idx)
        .unwrap();

    assert_eq!(pdp.feature_name.as_deref(), Some("MedInc"));
    let first = pdp.average_predictions.first().unwrap();
    let last = pdp.average_predictions.last().unwrap();
    assert!(
        last > first,
        "income effect should be increasing: {} -> {}",
        first,
        last
    );
}

#[test]
fn test_pdp_through_scaled_pipeline() {
    // Grid stays in original units while the model sees scaled input
    let data = housing_sample(300);

    let mut scaler = Scaler::new(ScalerType::Standard);
    let x_scaled = scaler.fit_transform(&data.features).unwrap();

    let mut mlp = MlpRegressor::new(MlpConfig {
        hidden_layers: vec![16],
        max_epochs: 50,
        random_state: Some(2),
        ..Default::default()
    });
    mlp.fit(&x_scaled, &data.target).unwrap();

    let predict = |x: &Array2<f64>| mlp.predict(&scaler.transform(x)?);
    let pdp = PartialDependence::new(predict)
        .with_grid_points(10)
        .compute(&data.features, 0)
        .unwrap();

    assert_eq!(pdp.grid_values.len(), 10);
    assert!(pdp.average_predictions.iter().all(|v| v.is_finite()));
    // Grid spans original-unit income values, not z-scores
    assert!(pdp.grid_values.last().unwrap() > &1.0);
}

#[test]
fn test_2d_pdp_on_fitted_model() {
    let data = housing_sample(300);
    let model = fitted_gbdt(&data.features, &data.target);

    let idx_1 = HousingData::feature_index("AveOccup").unwrap();
    let idx_2 = HousingData::feature_index("HouseAge").unwrap();

    let calc = PartialDependence::new(|x: &Array2<f64>| model.predict(x)).with_grid_points(8);
    let surface = calc.compute_2d(&data.features, idx_1, idx_2).unwrap();

    assert_eq!(surface.predictions.len(), 8);
    assert_eq!(surface.predictions[0].len(), 8);

    let h = surface.interaction_strength(
        &calc.compute(&data.features, idx_1).unwrap(),
        &calc.compute(&data.features, idx_2).unwrap(),
    );
    assert!((0.0..=1.0).contains(&h), "interaction strength out of range: {}", h);
}

#[test]
fn test_regressor_trait_uniform_interface() {
    let data = housing_sample(300);
    let split = train_test_split(&data.features, &data.target, 0.2, Some(5)).unwrap();

    let mut models: Vec<(&str, Box<dyn Regressor>)> = vec![
        (
            "gradient_boosting",
            Box::new(GradientBoostingRegressor::new(GradientBoostingConfig {
                n_estimators: 10,
                max_depth: 3,
                random_state: Some(5),
                ..Default::default()
            })),
        ),
        (
            "mlp",
            Box::new(MlpRegressor::new(MlpConfig {
                hidden_layers: vec![8],
                max_epochs: 20,
                random_state: Some(5),
                ..Default::default()
            })),
        ),
    ];

    for (name, model) in models.iter_mut() {
        model.fit(&split.x_train, &split.y_train).unwrap();
        let preds = model.predict(&split.x_test).unwrap();
        assert_eq!(preds.len(), split.y_test.len(), "{} prediction count", name);
        assert!(preds.iter().all(|v| v.is_finite()), "{} predictions finite", name);
    }

    // Tree ensembles report importances through the same interface
    let importances = models[0].1.feature_importances().unwrap();
    assert_eq!(importances.len(), data.n_features());
}

#[test]
fn test_invalid_feature_propagates() {
    let data = housing_sample(100);
    let model = fitted_gbdt(&data.features, &data.target);

    let calc = PartialDependence::new(|x: &Array2<f64>| model.predict(x));
    assert!(calc.compute(&data.features, 99).is_err());
}

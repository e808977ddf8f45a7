//! Deterministic synthetic datasets shaped like the classic sample sets.
//!
//! Each generator draws from fixed class centroids (or a fixed linear target)
//! plus normal noise, so every run produces the same trees.

use trueno_treeviz::config::HistType;
use trueno_treeviz::data::FeatureMatrix;
use trueno_treeviz::random::SeededRng;
use trueno_treeviz::Result;

/// Classification or regression, with what the renderer needs for each.
#[derive(Debug, Clone)]
pub(crate) enum Task {
    /// Integral labels `0..class_names.len()`.
    Classification {
        class_names: Vec<String>,
        histtype: HistType,
    },
    /// Continuous target.
    Regression,
}

/// One sample dataset.
#[derive(Debug, Clone)]
pub(crate) struct Dataset {
    pub(crate) name: &'static str,
    pub(crate) feature_names: Vec<String>,
    pub(crate) target_name: &'static str,
    pub(crate) x: FeatureMatrix,
    pub(crate) y: Vec<f32>,
    pub(crate) task: Task,
}

impl Dataset {
    pub(crate) fn n_classes(&self) -> Option<usize> {
        match &self.task {
            Task::Classification { class_names, .. } => Some(class_names.len()),
            Task::Regression => None,
        }
    }
}

/// Names accepted by [`by_name`].
pub(crate) const NAMES: [&str; 6] = ["iris", "wine", "knowledge", "digits", "boston", "diabetes"];

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

/// `per_class` rows around each centroid, labels in centroid order.
fn clusters(
    rng: &mut SeededRng,
    centroids: &[&[f32]],
    sigma: &[f32],
    per_class: usize,
) -> Result<(FeatureMatrix, Vec<f32>)> {
    let cols = sigma.len();
    let mut data = Vec::with_capacity(centroids.len() * per_class * cols);
    let mut y = Vec::with_capacity(centroids.len() * per_class);
    for (label, centroid) in centroids.iter().enumerate() {
        for _ in 0..per_class {
            data.extend(centroid.iter().zip(sigma).map(|(&mu, &s)| rng.normal(mu, s)));
            y.push(label as f32);
        }
    }
    let rows = y.len();
    Ok((FeatureMatrix::new(data, rows, cols)?, y))
}

fn iris() -> Result<Dataset> {
    let mut rng = SeededRng::new(150);
    let (x, y) = clusters(
        &mut rng,
        &[&[5.0, 3.4, 1.5, 0.25], &[5.9, 2.8, 4.3, 1.3], &[6.6, 3.0, 5.6, 2.0]],
        &[0.4, 0.35, 0.4, 0.2],
        50,
    )?;
    Ok(Dataset {
        name: "iris",
        feature_names: strings(&["sepal length (cm)", "sepal width (cm)", "petal length (cm)", "petal width (cm)"]),
        target_name: "variety",
        x,
        y,
        task: Task::Classification {
            class_names: strings(&["setosa", "versicolor", "virginica"]),
            histtype: HistType::BarStacked,
        },
    })
}

fn wine() -> Result<Dataset> {
    let mut rng = SeededRng::new(178);
    let (x, y) = clusters(
        &mut rng,
        &[
            &[13.7, 2.0, 2.45, 2.98, 5.5, 1115.0],
            &[12.3, 1.9, 2.24, 2.08, 3.1, 520.0],
            &[13.1, 3.3, 2.44, 0.78, 7.4, 630.0],
        ],
        &[0.5, 1.0, 0.25, 0.6, 1.5, 200.0],
        60,
    )?;
    Ok(Dataset {
        name: "wine",
        feature_names: strings(&["alcohol", "malic_acid", "ash", "flavanoids", "color_intensity", "proline"]),
        target_name: "wine",
        x,
        y,
        task: Task::Classification {
            class_names: strings(&["class_0", "class_1", "class_2"]),
            histtype: HistType::BarStacked,
        },
    })
}

fn knowledge() -> Result<Dataset> {
    let mut rng = SeededRng::new(258);
    let (x, y) = clusters(
        &mut rng,
        &[
            &[0.30, 0.30, 0.35, 0.35, 0.09],
            &[0.33, 0.34, 0.40, 0.50, 0.24],
            &[0.40, 0.38, 0.45, 0.34, 0.54],
            &[0.45, 0.45, 0.50, 0.50, 0.77],
        ],
        &[0.18, 0.2, 0.22, 0.22, 0.08],
        65,
    )?;
    Ok(Dataset {
        name: "knowledge",
        feature_names: strings(&["STG", "SCG", "STR", "LPR", "PEG"]),
        target_name: "UNS",
        x,
        y,
        task: Task::Classification {
            class_names: strings(&["very_low", "Low", "Middle", "High"]),
            histtype: HistType::BarStacked,
        },
    })
}

fn digits() -> Result<Dataset> {
    let mut rng = SeededRng::new(1797);
    let prototypes: Vec<Vec<f32>> = (0..10)
        .map(|_| (0..64).map(|_| if rng.uniform() < 0.4 { 13.0 } else { 1.0 }).collect())
        .collect();
    let centroids: Vec<&[f32]> = prototypes.iter().map(Vec::as_slice).collect();
    let (x, y) = clusters(&mut rng, &centroids, &[3.0; 64], 50)?;
    let clamped: Vec<f32> = (0..x.n_rows())
        .flat_map(|r| x.row(r).iter().map(|v| v.round().clamp(0.0, 16.0)).collect::<Vec<_>>())
        .collect();
    Ok(Dataset {
        name: "digits",
        feature_names: (0..8).flat_map(|i| (0..8).map(move |j| format!("pixel[{i},{j}]"))).collect(),
        target_name: "number",
        x: FeatureMatrix::new(clamped, y.len(), 64)?,
        y,
        task: Task::Classification {
            class_names: (0..10).map(|d: u32| d.to_string()).collect(),
            histtype: HistType::Bar,
        },
    })
}

fn boston() -> Result<Dataset> {
    let mut rng = SeededRng::new(506);
    let rows = 300;
    let mut data = Vec::with_capacity(rows * 6);
    let mut y = Vec::with_capacity(rows);
    for _ in 0..rows {
        let crim = rng.normal(0.0, 1.5).exp().min(80.0);
        let rm = rng.normal(6.3, 0.7);
        let age = (rng.uniform() * 100.0).max(3.0);
        let dis = rng.normal(3.8, 2.0).max(1.1);
        let tax = rng.normal(408.0, 160.0).clamp(187.0, 711.0);
        let lstat = rng.normal(12.6, 7.0).clamp(1.7, 38.0);
        let price = 22.5 + 6.0 * (rm - 6.3) - 0.55 * (lstat - 12.6) - 0.1 * crim - 0.01 * (tax - 408.0)
            + rng.normal(0.0, 2.5);
        data.extend([crim, rm, age, dis, tax, lstat]);
        y.push(price.clamp(5.0, 50.0));
    }
    Ok(Dataset {
        name: "boston",
        feature_names: strings(&["CRIM", "RM", "AGE", "DIS", "TAX", "LSTAT"]),
        target_name: "price",
        x: FeatureMatrix::new(data, rows, 6)?,
        y,
        task: Task::Regression,
    })
}

fn diabetes() -> Result<Dataset> {
    let mut rng = SeededRng::new(442);
    let rows = 300;
    let cols = 10;
    let mut data = Vec::with_capacity(rows * cols);
    let mut y = Vec::with_capacity(rows);
    for _ in 0..rows {
        let features: Vec<f32> = (0..cols).map(|_| rng.normal(0.0, 0.05)).collect();
        let (bmi, bp, s5) = (features[2], features[3], features[8]);
        let target = 152.0 + 900.0 * bmi + 400.0 * bp + 600.0 * s5 + rng.normal(0.0, 45.0);
        data.extend(features);
        y.push(target.clamp(25.0, 346.0));
    }
    Ok(Dataset {
        name: "diabetes",
        feature_names: strings(&["age", "sex", "bmi", "bp", "s1", "s2", "s3", "s4", "s5", "s6"]),
        target_name: "disease progression",
        x: FeatureMatrix::new(data, rows, cols)?,
        y,
        task: Task::Regression,
    })
}

/// Generate the dataset called `name`, if there is one.
pub(crate) fn by_name(name: &str) -> Option<Result<Dataset>> {
    let generate: fn() -> Result<Dataset> = match name {
        "iris" => iris,
        "wine" => wine,
        "knowledge" => knowledge,
        "digits" => digits,
        "boston" => boston,
        "diabetes" => diabetes,
        _ => return None,
    };
    Some(generate())
}

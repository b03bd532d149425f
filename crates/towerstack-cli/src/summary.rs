use serde::Serialize;

/// Descriptive statistics over one metric of a batch of runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub median: f32,
    pub std_dev: f32,
}

impl Summary {
    /// Returns `None` for an empty dataset.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f32::total_cmp);

        let min = *values.first()?;
        let max = *values.last()?;
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        let median = values[values.len() / 2];
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }

    #[expect(clippy::cast_precision_loss)]
    pub fn from_counts<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        Self::new(values.into_iter().map(|v| v as f32))
    }
}

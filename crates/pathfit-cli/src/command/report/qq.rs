use std::{fmt::Write as _, fs, path::Path};

use anyhow::Context;
use pathfit_analysis::{pipeline::RunAnalysis, qq::QqPlot};

/// Writes `run_<id>_qq.csv` with Q-Q points of every fitted family.
pub(super) fn save_run_qq_data(dir: &Path, analysis: &RunAnalysis) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let csv_path = dir.join(format!("run_{}_qq.csv", analysis.run));
    let csv_content = qq_csv(analysis)?;

    fs::write(&csv_path, csv_content)
        .with_context(|| format!("Failed to write CSV file: {}", csv_path.display()))?;
    println!("  Q-Q data saved to: {}", csv_path.display());

    Ok(())
}

fn qq_csv(analysis: &RunAnalysis) -> anyhow::Result<String> {
    let mut csv_content = String::from("family,probability,theoretical,empirical\n");
    for result in analysis.fits.iter().filter_map(|fit| fit.result()) {
        let plot = QqPlot::new(&result.distribution, &analysis.sample);
        for point in &plot.points {
            writeln!(
                &mut csv_content,
                "{},{},{},{}",
                plot.family, point.probability, point.theoretical, point.empirical
            )
            .with_context(|| format!("Failed to write Q-Q data for {}", plot.family))?;
        }
    }
    Ok(csv_content)
}

#[cfg(test)]
mod tests {
    use pathfit_analysis::pipeline::{AnalysisConfig, analyze_run};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn test_qq_csv_has_row_per_family_and_value() {
        let sample = [4.0, 2.0, 3.0, 5.0, 1.0];
        let mut config = AnalysisConfig::default();
        config.bootstrap.resamples = 10;
        let mut rng = Pcg64::seed_from_u64(9);
        let analysis = analyze_run(7, &sample, &config, &mut rng);

        let csv = qq_csv(&analysis).unwrap();
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "family,probability,theoretical,empirical");
        assert_eq!(lines.len(), 1 + 4 * sample.len());
        assert!(lines[1].starts_with("norm,0.1,"));
        assert!(lines[1].ends_with(",1"));
    }

    #[test]
    fn test_save_writes_file_named_after_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AnalysisConfig::default();
        config.bootstrap.resamples = 10;
        let mut rng = Pcg64::seed_from_u64(4);
        let analysis = analyze_run(12, &[1.0, 2.0, 4.0], &config, &mut rng);

        save_run_qq_data(dir.path(), &analysis).unwrap();
        let text = fs::read_to_string(dir.path().join("run_12_qq.csv")).unwrap();
        assert!(text.starts_with("family,probability,theoretical,empirical\n"));
    }
}

use crate::clustering::NOISE;
use crate::context::SegmentationContext;
use crate::encoder::Feature;
use crate::metrics::format_score;
use crate::model_bank::Strategy;
use crate::profiler::{self, ClusterProfile};
use colored::Colorize;
use std::fmt;

/// Print the per-strategy cluster summary to stdout.
pub fn print_cluster_report(context: &SegmentationContext) {
    println!("{}", render_cluster_report(context));
}

pub fn render_cluster_report(context: &SegmentationContext) -> String {
    ClusterReport(context).to_string()
}

/// Display adapter over the trained strategies of a context.
struct ClusterReport<'a>(&'a SegmentationContext);

impl fmt::Display for ClusterReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{}", "=== Cluster Analysis ===".bold())?;
        for strategy in Strategy::ALL {
            write_strategy(f, self.0, strategy)?;
        }
        Ok(())
    }
}

fn write_strategy(out: &mut fmt::Formatter<'_>, context: &SegmentationContext, strategy: Strategy) -> fmt::Result {
    let x = context.x();
    let labels = context.bank().labels(strategy);
    let listing = profiler::list_clusters(strategy, &x, labels);
    let noise = labels.iter().filter(|&&label| label == NOISE).count();
    let quality = context.bank().quality(strategy);

    writeln!(out, "\n{}", format!("{}:", strategy).bold())?;
    writeln!(out, "Total Clusters: {}", listing.len())?;
    if noise > 0 {
        writeln!(out, "Noise Points: {}", noise)?;
    }
    if !listing.is_empty() {
        let avg_cluster_size = (labels.len() - noise) as f64 / listing.len() as f64;
        writeln!(out, "Average Cluster Size: {:.2}", avg_cluster_size)?;
    }
    writeln!(
        out,
        "Silhouette: {}, Calinski-Harabasz: {}",
        format_score(quality.silhouette, 3),
        format_score(quality.calinski_harabasz, 1)
    )?;
    if let Some(root) = context.bank().dendrogram(strategy).and_then(|tree| tree.merges().last()) {
        writeln!(out, "Final Merge Height: {:.4}", root.distance)?;
    }

    let expected_size = labels.len() as f64 / listing.len().max(1) as f64;
    for profile in listing.values() {
        let line = describe(context, profile);
        let size = profile.size as f64;
        let line = match size {
            size if size < expected_size / 2.0 => line.as_str().red(),
            size if size > expected_size * 1.5 => line.as_str().yellow(),
            _ => line.as_str().green(),
        };
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

fn describe(context: &SegmentationContext, profile: &ClusterProfile) -> String {
    let raw_mean = |feature: Feature| {
        let encoded = profile.features.get(feature.column_name()).copied().unwrap_or(0.0);
        context.encoder().decode_value(feature, encoded)
    };
    format!(
        "  Cluster {}: {} customers ({:.2}%), Age {:.1}, Income {:.1}k$, Spending {:.1}, Male {:.0}%",
        profile.cluster_id,
        profile.size,
        profile.percentage,
        raw_mean(Feature::Age),
        raw_mean(Feature::AnnualIncome),
        raw_mean(Feature::SpendingScore),
        raw_mean(Feature::GenreIsMale) * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::context::SegmentationContextBuilder;
    use crate::encoder::RawRecord;

    #[test]
    fn test_report_lists_every_strategy() {
        colored::control::set_override(false);
        let records = (0..30)
            .map(|i| RawRecord {
                age: 20.0 + i as f64,
                annual_income: 30.0 + (i % 6) as f64 * 10.0,
                spending_score: 10.0 + (i % 5) as f64 * 20.0,
                genre: if i % 2 == 0 { "Male" } else { "Female" }.to_string(),
            })
            .collect();
        let context = SegmentationContextBuilder::new(&Config::default())
            .with_records(records)
            .build()
            .unwrap();

        let report = render_cluster_report(&context);
        for strategy in Strategy::ALL {
            assert!(report.contains(&format!("{}:", strategy)));
        }
        assert!(report.contains("Final Merge Height"));
        assert_eq!(report.matches("Silhouette: ").count(), 3);
        assert!(report.contains("Cluster 0:"));
    }
}

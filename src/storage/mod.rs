//! Results persistence module

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use polars::prelude::*;
use serde_json::{json, to_string_pretty};

use crate::activity::DeveloperActivity;
use crate::community::{dominant_type_counts, CohesionRatio, CommunityCohesion, CommunityFunction};
use crate::data::InteractionType;
use crate::error::Result;
use crate::pipeline::AnalysisOutput;
use crate::roles::statistics::RoleStatistics;
use crate::roles::{Role, RoleAssignment, RoleClassification};
use crate::temporal::{MonthlyActivity, TemporalStatistics};

pub const ROLE_CLASSIFICATION_FILE: &str = "role_classification.csv";
pub const ROLE_STATISTICS_FILE: &str = "role_statistics.csv";
pub const COMMUNITY_COHESION_FILE: &str = "community_cohesion.csv";
pub const COMMUNITY_FUNCTION_FILE: &str = "community_function.csv";
pub const DEVELOPER_ACTIVITY_FILE: &str = "developer_activity.csv";
pub const MONTHLY_ACTIVITY_FILE: &str = "monthly_activity.csv";
pub const TEMPORAL_STATISTICS_FILE: &str = "temporal_statistics.csv";
pub const SUMMARY_FILE: &str = "summary.json";

/// Save every output table and the run summary to `output_dir`
pub fn save_results(output: &AnalysisOutput, output_dir: &Path) -> Result<()> {
    log::info!("Saving results to {}", output_dir.display());

    // Ensure output directory exists
    fs::create_dir_all(output_dir)?;

    write_table(
        &mut role_classification_frame(&output.roles)?,
        &output_dir.join(ROLE_CLASSIFICATION_FILE),
        6,
    )?;
    write_table(
        &mut role_statistics_frame(&output.role_statistics)?,
        &output_dir.join(ROLE_STATISTICS_FILE),
        6,
    )?;
    write_table(
        &mut cohesion_frame(&output.communities.cohesion)?,
        &output_dir.join(COMMUNITY_COHESION_FILE),
        6,
    )?;
    write_table(
        &mut function_frame(&output.communities.function)?,
        &output_dir.join(COMMUNITY_FUNCTION_FILE),
        2,
    )?;
    write_table(
        &mut activity_frame(&output.activity)?,
        &output_dir.join(DEVELOPER_ACTIVITY_FILE),
        2,
    )?;
    write_table(
        &mut monthly_frame(&output.temporal.monthly)?,
        &output_dir.join(MONTHLY_ACTIVITY_FILE),
        2,
    )?;
    if let Some(stats) = &output.temporal.statistics {
        write_table(
            &mut temporal_statistics_frame(stats)?,
            &output_dir.join(TEMPORAL_STATISTICS_FILE),
            2,
        )?;
    }

    save_summary(output, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

fn write_table(df: &mut DataFrame, path: &Path, float_precision: usize) -> Result<()> {
    log::debug!("Writing {} rows to {}", df.height(), path.display());

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_float_precision(Some(float_precision))
        .finish(df)?;

    Ok(())
}

fn counts(values: impl Iterator<Item = usize>) -> Vec<u64> {
    values.map(|v| v as u64).collect()
}

/// `Vertex, Label, Role, DegreeCentrality, BetweennessCentrality, ClosenessCentrality, PageRank, BridgingStrength`
pub fn role_classification_frame(roles: &RoleClassification) -> Result<DataFrame> {
    let rows = roles.sorted_assignments();
    let metric = |f: fn(&RoleAssignment) -> f64| rows.iter().map(|a| f(a)).collect::<Vec<f64>>();

    let df = DataFrame::new(vec![
        Column::new(
            "Vertex".into(),
            rows.iter().map(|a| a.record.centrality.vertex.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "Label".into(),
            rows.iter().map(|a| a.record.centrality.label.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "Role".into(),
            rows.iter().map(|a| a.role.as_str()).collect::<Vec<_>>(),
        ),
        Column::new("DegreeCentrality".into(), metric(|a| a.record.centrality.degree)),
        Column::new("BetweennessCentrality".into(), metric(|a| a.record.centrality.betweenness)),
        Column::new("ClosenessCentrality".into(), metric(|a| a.record.centrality.closeness)),
        Column::new("PageRank".into(), metric(|a| a.record.centrality.pagerank)),
        Column::new("BridgingStrength".into(), metric(|a| a.record.bridging_strength)),
    ])?;

    Ok(df)
}

pub fn role_statistics_frame(stats: &[RoleStatistics]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new("Role".into(), stats.iter().map(|s| s.role.as_str()).collect::<Vec<_>>()),
        Column::new("Count".into(), counts(stats.iter().map(|s| s.count))),
        Column::new("SharePct".into(), stats.iter().map(|s| s.share_pct).collect::<Vec<_>>()),
        Column::new("DegreeMean".into(), stats.iter().map(|s| s.degree.mean).collect::<Vec<_>>()),
        Column::new("DegreeMedian".into(), stats.iter().map(|s| s.degree.median).collect::<Vec<_>>()),
        Column::new(
            "BetweennessMean".into(),
            stats.iter().map(|s| s.betweenness.mean).collect::<Vec<_>>(),
        ),
        Column::new(
            "BetweennessMedian".into(),
            stats.iter().map(|s| s.betweenness.median).collect::<Vec<_>>(),
        ),
        Column::new("PageRankMean".into(), stats.iter().map(|s| s.pagerank.mean).collect::<Vec<_>>()),
        Column::new(
            "PageRankMedian".into(),
            stats.iter().map(|s| s.pagerank.median).collect::<Vec<_>>(),
        ),
        Column::new(
            "BridgingMean".into(),
            stats.iter().map(|s| s.bridging_strength.mean).collect::<Vec<_>>(),
        ),
        Column::new(
            "BridgingMedian".into(),
            stats.iter().map(|s| s.bridging_strength.median).collect::<Vec<_>>(),
        ),
    ])?;

    Ok(df)
}

/// `CommunityID, Size, IntraEdges, InterEdges, IntraDensity, IntraInterRatio`.
/// Communities without external ties are written as `inf`.
pub fn cohesion_frame(rows: &[CommunityCohesion]) -> Result<DataFrame> {
    let ratios: Vec<f64> = rows
        .iter()
        .map(|r| match r.intra_inter_ratio {
            CohesionRatio::Finite(ratio) => ratio,
            CohesionRatio::NoExternalTies => f64::INFINITY,
        })
        .collect();

    let df = DataFrame::new(vec![
        Column::new("CommunityID".into(), rows.iter().map(|r| r.community).collect::<Vec<i64>>()),
        Column::new("Size".into(), counts(rows.iter().map(|r| r.size))),
        Column::new("IntraEdges".into(), counts(rows.iter().map(|r| r.intra_edges))),
        Column::new("InterEdges".into(), counts(rows.iter().map(|r| r.inter_edges))),
        Column::new("IntraDensity".into(), rows.iter().map(|r| r.intra_density).collect::<Vec<_>>()),
        Column::new("IntraInterRatio".into(), ratios),
    ])?;

    Ok(df)
}

/// `CommunityID, Size, TotalIntraInteractions, <TYPE>_pct..., DominantType`
pub fn function_frame(rows: &[CommunityFunction]) -> Result<DataFrame> {
    let mut columns = vec![
        Column::new("CommunityID".into(), rows.iter().map(|r| r.community).collect::<Vec<i64>>()),
        Column::new("Size".into(), counts(rows.iter().map(|r| r.size))),
        Column::new("TotalIntraInteractions".into(), counts(rows.iter().map(|r| r.total_intra))),
    ];
    for kind in InteractionType::ALL {
        columns.push(Column::new(
            format!("{}_pct", kind.as_str()).into(),
            rows.iter().map(|r| r.percentage(kind)).collect::<Vec<_>>(),
        ));
    }
    columns.push(Column::new(
        "DominantType".into(),
        rows.iter().map(|r| r.dominant.as_str()).collect::<Vec<_>>(),
    ));

    Ok(DataFrame::new(columns)?)
}

pub fn activity_frame(rows: &[DeveloperActivity]) -> Result<DataFrame> {
    let mut columns = vec![
        Column::new("Rank".into(), counts(rows.iter().map(|r| r.rank))),
        Column::new(
            "Developer".into(),
            rows.iter().map(|r| r.developer.clone()).collect::<Vec<_>>(),
        ),
        Column::new("Total".into(), counts(rows.iter().map(|r| r.total))),
    ];
    for kind in InteractionType::ALL {
        columns.push(Column::new(
            kind.as_str().into(),
            counts(rows.iter().map(|r| r.count(kind))),
        ));
    }

    Ok(DataFrame::new(columns)?)
}

/// `Month, ActiveDevelopers, Interactions`, oldest month first
pub fn monthly_frame(rows: &[MonthlyActivity]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new(
            "Month".into(),
            rows.iter().map(|r| r.month.to_string()).collect::<Vec<_>>(),
        ),
        Column::new(
            "ActiveDevelopers".into(),
            counts(rows.iter().map(|r| r.active_developers)),
        ),
        Column::new("Interactions".into(), counts(rows.iter().map(|r| r.interactions))),
    ])?;

    Ok(df)
}

/// Two-column `Metric, Value` table; a missing spread is left empty
pub fn temporal_statistics_frame(stats: &TemporalStatistics) -> Result<DataFrame> {
    let rows: [(&str, String); 10] = [
        ("PeriodStart", stats.start.to_string()),
        ("PeriodEnd", stats.end.to_string()),
        ("MonthCount", stats.month_count.to_string()),
        ("MeanInteractionsPerMonth", format!("{:.2}", stats.mean_per_month)),
        (
            "StdInteractionsPerMonth",
            stats.std_per_month.map(|std| format!("{:.2}", std)).unwrap_or_default(),
        ),
        ("PeakMonth", stats.peak_month.to_string()),
        ("PeakInteractions", stats.peak_count.to_string()),
        ("ValleyMonth", stats.valley_month.to_string()),
        ("ValleyInteractions", stats.valley_count.to_string()),
        ("MonthlyGrowthPct", format!("{:.2}", stats.growth_pct)),
    ];

    let df = DataFrame::new(vec![
        Column::new("Metric".into(), rows.iter().map(|(metric, _)| *metric).collect::<Vec<_>>()),
        Column::new(
            "Value".into(),
            rows.iter().map(|(_, value)| value.clone()).collect::<Vec<_>>(),
        ),
    ])?;

    Ok(df)
}

/// Save summary information
fn save_summary(output: &AnalysisOutput, output_dir: &Path) -> Result<()> {
    log::info!("Saving run summary");

    let path = output_dir.join(SUMMARY_FILE);
    let mut file = File::create(path)?;

    let role_counts = output.roles.role_counts();
    let roles: serde_json::Map<String, serde_json::Value> = Role::ALL
        .iter()
        .map(|role| (role.as_str().to_string(), json!(role_counts[role.rank() as usize])))
        .collect();
    let dominant: serde_json::Map<String, serde_json::Value> = dominant_type_counts(&output.communities.function)
        .into_iter()
        .map(|(kind, count)| (kind.as_str().to_string(), json!(count)))
        .collect();

    let summary = json!({
        "input": {
            "vertex_count": output.vertex_count,
            "interaction_count": output.interaction_count,
            "unassigned_interaction_endpoints": output.communities.unassigned_endpoints,
        },
        "roles": {
            "counts": roles,
            "thresholds": output.roles.thresholds,
            "warnings": output.roles.warnings,
        },
        "communities": {
            "cohesion": output.communities.summary,
            "profiled_count": output.communities.function.len(),
            "dominant_types": dominant,
        },
        "temporal": {
            "active_months": output.temporal.monthly.len(),
            "unparsed_timestamps": output.temporal.unparsed_timestamps,
            "statistics": output.temporal.statistics,
        },
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::YearMonth;

    #[test]
    fn cohesion_frame_renders_sentinel_as_infinity() {
        let rows = vec![
            CommunityCohesion {
                community: 1,
                size: 3,
                intra_edges: 3,
                inter_edges: 1,
                intra_density: 0.5,
                intra_inter_ratio: CohesionRatio::Finite(3.0),
            },
            CommunityCohesion {
                community: 2,
                size: 2,
                intra_edges: 1,
                inter_edges: 0,
                intra_density: 0.5,
                intra_inter_ratio: CohesionRatio::NoExternalTies,
            },
        ];

        let df = cohesion_frame(&rows).unwrap();
        assert_eq!(df.height(), 2);
        let ratios: Vec<Option<f64>> = df.column("IntraInterRatio").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(ratios, vec![Some(3.0), Some(f64::INFINITY)]);
    }

    #[test]
    fn temporal_statistics_frame_lists_every_metric() {
        let month = |m| YearMonth { year: 2024, month: m };
        let stats = TemporalStatistics {
            start: month(1),
            end: month(4),
            month_count: 3,
            mean_per_month: 10.0 / 3.0,
            std_per_month: None,
            peak_month: month(2),
            peak_count: 5,
            valley_month: month(1),
            valley_count: 2,
            growth_pct: 50.0,
        };

        let df = temporal_statistics_frame(&stats).unwrap();
        assert_eq!(df.height(), 10);
        let values: Vec<Option<&str>> = df.column("Value").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(values[0], Some("2024-01"));
        assert_eq!(values[3], Some("3.33"));
        assert_eq!(values[4], Some(""));
        assert_eq!(values[9], Some("50.00"));
    }

    #[test]
    fn function_frame_has_a_column_per_type() {
        let df = function_frame(&[]).unwrap();
        let names: Vec<String> = df.get_column_names().into_iter().map(|n| n.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "CommunityID",
                "Size",
                "TotalIntraInteractions",
                "COMMENT_ISSUE_pct",
                "COMMENT_PR_pct",
                "ISSUE_CLOSE_pct",
                "PR_REVIEW_pct",
                "PR_APPROVAL_pct",
                "PR_MERGE_pct",
                "DominantType",
            ]
        );
    }
}

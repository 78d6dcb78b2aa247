//! CSV loading for the metric tables and the interaction log

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use polars::prelude::*;

use crate::config::Config;
use crate::data::{BridgingRecord, CentralityRecord, CommunityAssignment, Interaction, MetricsSnapshot};
use crate::error::{AnalysisError, Result};
use crate::temporal::YearMonth;

const CENTRALITY_TABLE: &str = "centrality";
const COMMUNITIES_TABLE: &str = "community_assignments";
const BRIDGING_TABLE: &str = "bridging_developers";
const INTERACTIONS_TABLE: &str = "interactions";

/// Placeholder name given to the stray column of the malformed interaction layout
const STRAY_COLUMN: &str = "__stray";

/// Data rows inspected before the malformed interaction layout is assumed
const LAYOUT_SAMPLE_ROWS: usize = 5;

/// Load every input table named by the configuration
pub fn load_snapshot(config: &Config) -> Result<MetricsSnapshot> {
    let centrality = load_centrality(&config.centrality_path())?;
    let communities = load_communities(&config.communities_path())?;

    let bridging_path = config.bridging_path();
    let bridging = if bridging_path.exists() {
        load_bridging(&bridging_path)?
    } else {
        log::warn!(
            "Bridging table not found at {}, assuming no bridging developers",
            bridging_path.display()
        );
        Vec::new()
    };

    let interactions = load_interactions(&config.interactions_path)?;

    log::info!(
        "Loaded {} vertices, {} community assignments, {} bridging records, {} interactions",
        centrality.len(),
        communities.len(),
        bridging.len(),
        interactions.len()
    );

    Ok(MetricsSnapshot {
        centrality,
        communities,
        bridging,
        interactions,
    })
}

/// Load `Vertex, Label, DegreeCentrality, BetweennessCentrality, ClosenessCentrality, PageRank`
pub fn load_centrality(path: &Path) -> Result<Vec<CentralityRecord>> {
    log::info!("Reading centrality table: {}", path.display());
    let df = read_csv(path)?;
    require_columns(
        &df,
        CENTRALITY_TABLE,
        &[
            "Vertex",
            "Label",
            "DegreeCentrality",
            "BetweennessCentrality",
            "ClosenessCentrality",
            "PageRank",
        ],
    )?;

    let vertices = required_strings(&df, CENTRALITY_TABLE, "Vertex")?;
    let labels = optional_strings(&df, "Label")?;
    let degree = floats(&df, "DegreeCentrality")?;
    let betweenness = floats(&df, "BetweennessCentrality")?;
    let closeness = floats(&df, "ClosenessCentrality")?;
    let pagerank = floats(&df, "PageRank")?;

    let records = vertices
        .into_iter()
        .zip(labels)
        .enumerate()
        .map(|(i, (vertex, label))| CentralityRecord {
            label: label.unwrap_or_else(|| vertex.clone()),
            vertex,
            degree: degree[i],
            betweenness: betweenness[i],
            closeness: closeness[i],
            pagerank: pagerank[i],
        })
        .collect();

    Ok(records)
}

/// Load `Vertex, Label, CommunityID`
pub fn load_communities(path: &Path) -> Result<Vec<CommunityAssignment>> {
    log::info!("Reading community assignments: {}", path.display());
    let df = read_csv(path)?;
    require_columns(&df, COMMUNITIES_TABLE, &["Vertex", "Label", "CommunityID"])?;

    let vertices = required_strings(&df, COMMUNITIES_TABLE, "Vertex")?;
    let labels = optional_strings(&df, "Label")?;
    let communities = required_ints(&df, COMMUNITIES_TABLE, "CommunityID")?;

    let records = vertices
        .into_iter()
        .zip(labels)
        .zip(communities)
        .map(|((vertex, label), community)| CommunityAssignment {
            label: label.unwrap_or_else(|| vertex.clone()),
            vertex,
            community,
        })
        .collect();

    Ok(records)
}

/// Load `Vertex, Label, CommunityID, BridgingStrength, ConnectedCommunities`.
/// A zero-length file holds no bridging developers.
pub fn load_bridging(path: &Path) -> Result<Vec<BridgingRecord>> {
    log::info!("Reading bridging table: {}", path.display());
    if fs::metadata(path)?.len() == 0 {
        log::warn!(
            "Bridging table {} is empty, assuming no bridging developers",
            path.display()
        );
        return Ok(Vec::new());
    }

    let df = read_csv(path)?;
    require_columns(
        &df,
        BRIDGING_TABLE,
        &[
            "Vertex",
            "Label",
            "CommunityID",
            "BridgingStrength",
            "ConnectedCommunities",
        ],
    )?;

    let vertices = required_strings(&df, BRIDGING_TABLE, "Vertex")?;
    let labels = optional_strings(&df, "Label")?;
    let communities = required_ints(&df, BRIDGING_TABLE, "CommunityID")?;
    let strengths = floats(&df, "BridgingStrength")?;
    let connected = required_ints(&df, BRIDGING_TABLE, "ConnectedCommunities")?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            u32::try_from(value).map_err(|_| AnalysisError::InvalidValue {
                table: BRIDGING_TABLE,
                column: "ConnectedCommunities",
                row,
                value: value.to_string(),
            })
        })
        .collect::<Result<Vec<u32>>>()?;

    let below_two = connected.iter().filter(|&&count| count < 2).count();
    if below_two > 0 {
        log::warn!(
            "{} bridging records report fewer than two connected communities",
            below_two
        );
    }

    let records = vertices
        .into_iter()
        .zip(labels)
        .enumerate()
        .map(|(i, (vertex, label))| BridgingRecord {
            label: label.unwrap_or_else(|| vertex.clone()),
            vertex,
            community: communities[i],
            bridging_strength: strengths[i],
            connected_communities: connected[i],
        })
        .collect();

    Ok(records)
}

/// Load `Source, Target, Type, Weight, Timestamp`.
///
/// Some exports carry one extra unnamed field between `Weight` and
/// `Timestamp` on every data row while the header does not declare it.
/// That layout is detected from the header and the first few data rows and
/// the stray field is dropped before the columns are read. Rows with a
/// trailing empty field in an otherwise well-formed log are truncated.
pub fn load_interactions(path: &Path) -> Result<Vec<Interaction>> {
    log::info!("Reading interaction log: {}", path.display());

    let df = match stray_column_layout(path)? {
        Some(names) => {
            log::warn!(
                "Interaction log {} has one more field per row than its header, discarding the field after Weight",
                path.display()
            );
            let schema = Schema::from_iter(
                names
                    .iter()
                    .map(|name| (PlSmallStr::from(name.as_str()), DataType::String)),
            );
            let df = CsvReadOptions::default()
                .with_has_header(false)
                .with_skip_rows(1)
                .with_schema(Some(Arc::new(schema)))
                .map_parse_options(|options| options.with_truncate_ragged_lines(true))
                .try_into_reader_with_file_path(Some(path.to_path_buf()))?
                .finish()?;
            df.drop(STRAY_COLUMN)?
        }
        None => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .map_parse_options(|options| options.with_truncate_ragged_lines(true))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
    };

    let unnamed: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .filter(|name| is_unnamed(name))
        .collect();
    if !unnamed.is_empty() {
        log::warn!("Discarding unnamed interaction columns: {:?}", unnamed);
    }

    require_columns(
        &df,
        INTERACTIONS_TABLE,
        &["Source", "Target", "Type", "Weight", "Timestamp"],
    )?;

    let sources = required_strings(&df, INTERACTIONS_TABLE, "Source")?;
    let targets = required_strings(&df, INTERACTIONS_TABLE, "Target")?;
    let types = optional_strings(&df, "Type")?;
    let weights = floats(&df, "Weight")?;
    let timestamps = optional_strings(&df, "Timestamp")?;

    let interactions = sources
        .into_iter()
        .zip(targets)
        .zip(types.into_iter().zip(timestamps))
        .enumerate()
        .map(|(i, ((source, target), (kind, timestamp)))| {
            Interaction::new(
                source,
                target,
                kind.unwrap_or_default(),
                weights[i],
                timestamp.unwrap_or_default(),
            )
        })
        .collect();

    Ok(interactions)
}

/// Every column is read as text; numeric columns are cast afterwards so a
/// late non-numeric vertex id cannot break type inference.
fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

fn require_columns(df: &DataFrame, table: &'static str, columns: &[&'static str]) -> Result<()> {
    for &column in columns {
        if df.get_column_index(column).is_none() {
            return Err(AnalysisError::Schema { table, column });
        }
    }
    Ok(())
}

fn optional_strings(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let values = df.column(column)?.cast(&DataType::String)?;
    let values = values
        .str()?
        .into_iter()
        .map(|value| value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
        .collect();
    Ok(values)
}

fn required_strings(df: &DataFrame, table: &'static str, column: &'static str) -> Result<Vec<String>> {
    optional_strings(df, column)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.ok_or(AnalysisError::MissingValue { table, column, row }))
        .collect()
}

/// Unparseable or empty cells become NaN
fn floats(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let values = df.column(column)?.cast(&DataType::Float64)?;
    let values = values
        .f64()?
        .into_iter()
        .map(|value| value.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

/// Empty cells are `MissingValue`; anything that is not a whole number is `InvalidValue`
fn required_ints(df: &DataFrame, table: &'static str, column: &'static str) -> Result<Vec<i64>> {
    required_strings(df, table, column)?
        .into_iter()
        .enumerate()
        .map(|(row, text)| match text.parse::<f64>() {
            // "3.0" style ids written by other tools still parse
            Ok(value) if value.is_finite() && value.fract() == 0.0 => Ok(value as i64),
            _ => Err(AnalysisError::InvalidValue {
                table,
                column,
                row,
                value: text,
            }),
        })
        .collect()
}

/// Names pandas and polars give to header cells that were left blank
fn is_unnamed(name: &str) -> bool {
    let name = name.trim();
    name.is_empty()
        || name.starts_with("Unnamed")
        || name
            .strip_prefix("column_")
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

/// Returns the full column list, stray column included, when every sampled
/// data row carries exactly one more field than the header, the header has a
/// `Weight` column, and the field right after `Weight` is never a timestamp.
fn stray_column_layout(path: &Path) -> Result<Option<Vec<String>>> {
    let mut lines = BufReader::new(File::open(path)?).lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Ok(None),
    };
    let header: Vec<String> = split_fields(header.trim_start_matches('\u{feff}'))
        .into_iter()
        .map(|name| name.trim().trim_matches('"').to_string())
        .collect();

    let Some(weight) = header.iter().position(|name| name == "Weight") else {
        return Ok(None);
    };

    let mut sampled = 0;
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_fields(&line);
        if fields.len() != header.len() + 1 {
            return Ok(None);
        }
        let after_weight = fields[weight + 1].trim().trim_matches('"');
        if YearMonth::parse(after_weight).is_some() {
            return Ok(None);
        }

        sampled += 1;
        if sampled == LAYOUT_SAMPLE_ROWS {
            break;
        }
    }
    if sampled == 0 {
        return Ok(None);
    }

    let mut names = header;
    names.insert(weight + 1, STRAY_COLUMN.to_string());
    Ok(Some(names))
}

/// Split a CSV line on commas outside double quotes
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn split_fields_respects_quotes() {
        assert_eq!(split_fields("a,\"b,c\",d"), vec!["a", "\"b,c\"", "d"]);
        assert_eq!(split_fields(""), vec![""]);
    }

    #[test]
    fn recognizes_unnamed_headers() {
        assert!(is_unnamed(""));
        assert!(is_unnamed("Unnamed: 4"));
        assert!(is_unnamed("column_5"));
        assert!(!is_unnamed("column_name"));
        assert!(!is_unnamed("Timestamp"));
    }

    #[test]
    fn loads_centrality_with_mixed_vertex_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "centrality.csv",
            "Vertex,Label,DegreeCentrality,BetweennessCentrality,ClosenessCentrality,PageRank\n\
             0,alice,0.5,0.1,0.3,0.4\n\
             x1,bob,1,0,0.2,0.6\n",
        );

        let records = load_centrality(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].vertex, "0");
        assert_eq!(records[1].vertex, "x1");
        assert_eq!(records[1].label, "bob");
        assert_eq!(records[1].degree, 1.0);
        assert_eq!(records[1].pagerank, 0.6);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "centrality.csv",
            "Vertex,Label,DegreeCentrality,ClosenessCentrality,PageRank\n0,alice,0.5,0.3,0.4\n",
        );

        let err = load_centrality(&path).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Schema {
                column: "BetweennessCentrality",
                ..
            }
        ));
    }

    #[test]
    fn empty_bridging_table_loads_as_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "bridging.csv",
            "Vertex,Label,CommunityID,BridgingStrength,ConnectedCommunities\n",
        );

        assert!(load_bridging(&path).unwrap().is_empty());
    }

    #[test]
    fn zero_length_bridging_file_loads_as_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "bridging_developers.csv", "");

        assert!(load_bridging(&path).unwrap().is_empty());
    }

    #[test]
    fn non_integer_community_id_is_an_invalid_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "communities.csv",
            "Vertex,Label,CommunityID\n0,alice,3.0\n1,bob,abc\n",
        );

        let err = load_communities(&path).unwrap_err();
        match err {
            AnalysisError::InvalidValue {
                column, row, value, ..
            } => {
                assert_eq!(column, "CommunityID");
                assert_eq!(row, 1);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_community_id_is_a_missing_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "communities.csv", "Vertex,Label,CommunityID\n0,alice,\n");

        let err = load_communities(&path).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MissingValue {
                column: "CommunityID",
                row: 0,
                ..
            }
        ));
    }

    #[test]
    fn negative_connected_communities_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "bridging.csv",
            "Vertex,Label,CommunityID,BridgingStrength,ConnectedCommunities\n\
             2,carol,1,0.25,2\n\
             3,dave,2,0.10,-1\n",
        );

        let err = load_bridging(&path).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidValue {
                column: "ConnectedCommunities",
                row: 1,
                ..
            }
        ));
    }

    #[test]
    fn drops_stray_field_after_weight() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "interactions.csv",
            "Source,Target,Type,Weight,Timestamp,Context\n\
             alice,bob,COMMENT_PR,1.0,,2024-01-02T10:00:00Z,\"repo#1, first\"\n\
             bob,carol,PR_MERGE,2.0,,2024-01-03T10:00:00Z,repo#2\n",
        );

        let interactions = load_interactions(&path).unwrap();
        assert_eq!(interactions.len(), 2);
        assert_eq!(interactions[0].raw_type, "COMMENT_PR");
        assert_eq!(interactions[0].timestamp, "2024-01-02T10:00:00Z");
        assert_eq!(interactions[1].weight, 2.0);
    }

    #[test]
    fn trailing_comma_on_first_row_keeps_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "interactions.csv",
            "Source,Target,Type,Weight,Timestamp\n\
             A,B,PR_MERGE,2.0,2024-01-01,\n\
             B,A,COMMENT_PR,3.0,2024-01-02\n",
        );

        assert!(stray_column_layout(&path).unwrap().is_none());

        let interactions = load_interactions(&path).unwrap();
        assert_eq!(interactions.len(), 2);
        assert_eq!(interactions[0].timestamp, "2024-01-01");
        assert_eq!(interactions[1].timestamp, "2024-01-02");
        assert_eq!(interactions[1].weight, 3.0);
    }

    #[test]
    fn timestamp_after_weight_is_not_a_stray_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "interactions.csv",
            "Source,Target,Type,Weight,Timestamp\n\
             A,B,PR_MERGE,2.0,2024-01-01,\n\
             B,A,COMMENT_PR,3.0,2024-01-02,\n",
        );

        assert!(stray_column_layout(&path).unwrap().is_none());
        let interactions = load_interactions(&path).unwrap();
        assert_eq!(interactions[0].timestamp, "2024-01-01");
    }

    #[test]
    fn ignores_unnamed_header_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "interactions.csv",
            "Source,Target,Type,Weight,Unnamed: 4,Timestamp\n\
             alice,bob,ISSUE_CLOSE,1.0,,2024-01-02\n",
        );

        let interactions = load_interactions(&path).unwrap();
        assert_eq!(interactions.len(), 1);
        assert_eq!(interactions[0].timestamp, "2024-01-02");
    }
}
